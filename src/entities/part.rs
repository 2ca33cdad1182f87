//! Part entity type - configuration catalog items and their qualification tests

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::entity::{PartLevel, PartStatus};

/// Weight given to a QC test when none is supplied
pub const DEFAULT_QC_WEIGHT: f64 = 0.10;

/// A catalog part tracked for configuration and qualification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// User-entered identifier (e.g. "P-1001"), unique across a catalog
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub part_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<PartLevel>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,

    #[serde(default)]
    pub status: PartStatus,

    // Qualification fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<QcTest>,
}

impl Part {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            short_name: String::new(),
            category: None,
            part_type: None,
            level: None,
            owner: String::new(),
            status: PartStatus::Draft,
            revision: None,
            description: None,
            remarks: None,
            tests: Vec::new(),
        }
    }

    /// Name for display: the catalog name, else the qualification description
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            self.description.as_deref().unwrap_or("")
        }
    }

    pub fn test(&self, test_id: &str) -> Option<&QcTest> {
        self.tests.iter().find(|t| t.id == test_id)
    }

    pub fn test_mut(&mut self, test_id: &str) -> Option<&mut QcTest> {
        self.tests.iter_mut().find(|t| t.id == test_id)
    }

    /// Qualification score: summed weight of tests that are documented and NCR-free
    pub fn qualification_score(&self) -> f64 {
        self.tests
            .iter()
            .filter(|t| t.counts_toward_score())
            .fold(0.0, |acc, t| acc + t.qc_weight)
    }

    /// Tests ordered by their `order` field; stable for equal orders
    pub fn tests_by_order(&self) -> Vec<&QcTest> {
        let mut tests: Vec<&QcTest> = self.tests.iter().collect();
        tests.sort_by_key(|t| t.order);
        tests
    }
}

/// A part-scoped, ordered and weighted qualification test record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcTest {
    pub id: String,

    pub name: String,

    /// Reference name of the attached document; blank input means none
    #[serde(default, deserialize_with = "blank_as_none")]
    pub document: Option<String>,

    /// Execution sequence within the part (descriptive, never re-sorted on insert)
    #[serde(default = "default_order", deserialize_with = "lenient_u32")]
    pub order: u32,

    /// Contribution to the qualification score, 0..=1
    #[serde(default = "default_weight", deserialize_with = "lenient_f64")]
    pub qc_weight: f64,

    /// Whether a non-conformance report was raised
    #[serde(default)]
    pub ncr: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl QcTest {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            document: None,
            order: default_order(),
            qc_weight: DEFAULT_QC_WEIGHT,
            ncr: false,
            remarks: None,
        }
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    fn counts_toward_score(&self) -> bool {
        self.has_document() && !self.ncr
    }
}

fn default_order() -> u32 {
    1
}

fn default_weight() -> f64 {
    DEFAULT_QC_WEIGHT
}

/// Numbers in older catalogs were stored as strings ("1", "0.40")
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(u64),
    Float(f64),
    Text(String),
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => u32::try_from(n).map_err(D::Error::custom),
        NumberOrString::Float(f) if f.fract() == 0.0 && f >= 0.0 => Ok(f as u32),
        NumberOrString::Float(f) => Err(D::Error::custom(format!("expected integer, got {}", f))),
        NumberOrString::Text(s) if s.trim().is_empty() => Ok(default_order()),
        NumberOrString::Text(s) => s.trim().parse().map_err(D::Error::custom),
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => Ok(n as f64),
        NumberOrString::Float(f) => Ok(f),
        NumberOrString::Text(s) if s.trim().is_empty() => Ok(DEFAULT_QC_WEIGHT),
        NumberOrString::Text(s) => s.trim().parse().map_err(D::Error::custom),
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
