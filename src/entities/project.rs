//! Project entity type - a production program and its set hierarchy

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::entity::{ProjectStatus, ReportStatus};
use crate::entities::set::Set;

/// File attached to a QC report (metadata only, no binary content)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Size in bytes
    #[serde(default)]
    pub size: u64,

    /// Reference the file can be retrieved by
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Narrative quality-control report scoped to a project or a set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcReport {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub status: ReportStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

/// A production project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Globally unique identifier
    pub id: String,

    pub name: String,

    /// Short program code (e.g. "AT-001")
    #[serde(default)]
    pub code: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub system: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,

    /// Whether the project is offered for reuse and set imports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<bool>,

    #[serde(default)]
    pub qc_reports: Vec<QcReport>,

    #[serde(default)]
    pub sets: Vec<Set>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            code: String::new(),
            description: String::new(),
            status: ProjectStatus::Draft,
            owner: String::new(),
            system: String::new(),
            category: None,
            project_type: None,
            visibility: None,
            qc_reports: Vec::new(),
            sets: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_set(mut self, set: Set) -> Self {
        self.sets.push(set);
        self
    }

    /// Find a set by id
    pub fn set(&self, set_id: &str) -> Option<&Set> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    /// Id of the first set, used when the tree auto-expands a project
    pub fn first_set_id(&self) -> Option<&str> {
        self.sets.first().map(|s| s.id.as_str())
    }

    /// Normalize every set; returns true if anything changed
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        for set in &mut self.sets {
            changed |= set.normalize();
        }
        changed
    }

    /// Every QC report on the project and its sets
    pub fn all_qc_reports(&self) -> impl Iterator<Item = &QcReport> {
        self.qc_reports
            .iter()
            .chain(self.sets.iter().flat_map(|s| s.qc_reports.iter()))
    }

    /// Number of structures across all sets
    pub fn structure_count(&self) -> usize {
        self.sets.iter().map(|s| s.structures.len()).sum()
    }
}

/// Partial update for a project; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qc_reports: Option<Vec<QcReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<Vec<Set>>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        *self == ProjectPatch::default()
    }

    /// Shallow-merge this patch into `project`
    pub fn apply_to(&self, project: &mut Project) {
        if let Some(ref name) = self.name {
            project.name = name.clone();
        }
        if let Some(ref code) = self.code {
            project.code = code.clone();
        }
        if let Some(ref description) = self.description {
            project.description = description.clone();
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(ref owner) = self.owner {
            project.owner = owner.clone();
        }
        if let Some(ref system) = self.system {
            project.system = system.clone();
        }
        if let Some(ref category) = self.category {
            project.category = Some(category.clone());
        }
        if let Some(ref project_type) = self.project_type {
            project.project_type = Some(project_type.clone());
        }
        if let Some(visibility) = self.visibility {
            project.visibility = Some(visibility);
        }
        if let Some(ref reports) = self.qc_reports {
            project.qc_reports = reports.clone();
        }
        if let Some(ref sets) = self.sets {
            project.sets = sets.clone();
        }
    }
}
