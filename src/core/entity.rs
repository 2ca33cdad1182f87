//! Status and level vocabularies shared across entity types

use serde::{Deserialize, Serialize};

/// Lifecycle status of a production project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum ProjectStatus {
    #[default]
    Draft,
    #[serde(rename = "In Configuration")]
    InConfiguration,
    #[serde(rename = "In Production")]
    InProduction,
    Complete,
}

impl ProjectStatus {
    pub fn all() -> &'static [ProjectStatus] {
        &[
            ProjectStatus::Draft,
            ProjectStatus::InConfiguration,
            ProjectStatus::InProduction,
            ProjectStatus::Complete,
        ]
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Draft => write!(f, "Draft"),
            ProjectStatus::InConfiguration => write!(f, "In Configuration"),
            ProjectStatus::InProduction => write!(f, "In Production"),
            ProjectStatus::Complete => write!(f, "Complete"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "draft" => Ok(ProjectStatus::Draft),
            "in-configuration" | "configuration" => Ok(ProjectStatus::InConfiguration),
            "in-production" | "production" => Ok(ProjectStatus::InProduction),
            "complete" | "completed" => Ok(ProjectStatus::Complete),
            _ => Err(format!(
                "Unknown project status: {}. Use draft, in-configuration, in-production, or complete",
                s
            )),
        }
    }
}

/// Qualification status of a configuration part
///
/// Parts move `Draft -> Under Review -> Qualified`; see
/// [`crate::core::workflow`] for the transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum PartStatus {
    #[default]
    Draft,
    #[serde(rename = "Under Review", alias = "Review")]
    UnderReview,
    Qualified,
}

impl std::fmt::Display for PartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartStatus::Draft => write!(f, "Draft"),
            PartStatus::UnderReview => write!(f, "Under Review"),
            PartStatus::Qualified => write!(f, "Qualified"),
        }
    }
}

impl std::str::FromStr for PartStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "draft" => Ok(PartStatus::Draft),
            "under-review" | "review" => Ok(PartStatus::UnderReview),
            "qualified" => Ok(PartStatus::Qualified),
            _ => Err(format!(
                "Unknown part status: {}. Use draft, under-review, or qualified",
                s
            )),
        }
    }
}

/// Status of a project- or set-level QC report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReportStatus {
    #[default]
    Draft,
    #[serde(rename = "In Progress")]
    InProgress,
    Pending,
    Accepted,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Draft => write!(f, "Draft"),
            ReportStatus::InProgress => write!(f, "In Progress"),
            ReportStatus::Pending => write!(f, "Pending"),
            ReportStatus::Accepted => write!(f, "Accepted"),
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "draft" => Ok(ReportStatus::Draft),
            "in-progress" => Ok(ReportStatus::InProgress),
            "pending" => Ok(ReportStatus::Pending),
            "accepted" => Ok(ReportStatus::Accepted),
            _ => Err(format!("Unknown report status: {}", s)),
        }
    }
}

/// Part level in the product breakdown (L1 = system, L4 = sub-assembly)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PartLevel {
    L1,
    L2,
    L3,
    L4,
}

impl PartLevel {
    /// Human label used by the catalog views
    pub fn describe(&self) -> &'static str {
        match self {
            PartLevel::L1 => "System",
            PartLevel::L2 => "Subsystem",
            PartLevel::L3 => "Assembly",
            PartLevel::L4 => "Sub-assembly",
        }
    }
}

impl std::fmt::Display for PartLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartLevel::L1 => write!(f, "L1"),
            PartLevel::L2 => write!(f, "L2"),
            PartLevel::L3 => write!(f, "L3"),
            PartLevel::L4 => write!(f, "L4"),
        }
    }
}

impl std::str::FromStr for PartLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "L1" | "1" => Ok(PartLevel::L1),
            "L2" | "2" => Ok(PartLevel::L2),
            "L3" | "3" => Ok(PartLevel::L3),
            "L4" | "4" => Ok(PartLevel::L4),
            _ => Err(format!("Invalid level: {}. Use L1, L2, L3, or L4", s)),
        }
    }
}

/// Top-level console module shown in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    #[default]
    Dashboard,
    Production,
    Financial,
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Module::Dashboard => write!(f, "dashboard"),
            Module::Production => write!(f, "production"),
            Module::Financial => write!(f, "financial"),
        }
    }
}

impl std::str::FromStr for Module {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dashboard" => Ok(Module::Dashboard),
            "production" => Ok(Module::Production),
            "financial" => Ok(Module::Financial),
            _ => Err(format!("Unknown module: {}", s)),
        }
    }
}

/// Color theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

/// Lowercase and collapse separators so "In Configuration", "in_configuration"
/// and "in-configuration" all compare equal.
fn normalize_token(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_display_matches_serde() {
        for status in ProjectStatus::all() {
            let yaml = serde_yml::to_string(status).unwrap();
            assert_eq!(yaml.trim().trim_matches('\''), status.to_string());
        }
    }

    #[test]
    fn test_project_status_parse_variants() {
        assert_eq!(
            "In Configuration".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::InConfiguration
        );
        assert_eq!(
            "in_production".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::InProduction
        );
        assert!("shipped".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_part_status_accepts_review_alias() {
        let status: PartStatus = serde_yml::from_str("Review").unwrap();
        assert_eq!(status, PartStatus::UnderReview);
        assert_eq!("under review".parse::<PartStatus>().unwrap(), PartStatus::UnderReview);
    }

    #[test]
    fn test_part_level_parse() {
        assert_eq!("l3".parse::<PartLevel>().unwrap(), PartLevel::L3);
        assert_eq!("4".parse::<PartLevel>().unwrap(), PartLevel::L4);
        assert!("L5".parse::<PartLevel>().is_err());
        assert!(PartLevel::L1 < PartLevel::L4);
    }
}
