//! Qualification tests browser
//!
//! Sets expand into parts, parts expand into their QC tests. Tests are added
//! to the selected part and documents are attached by reference only.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::action::Action;
use crate::core::entity::PartStatus;
use crate::core::identity::{new_id, IdPrefix};
use crate::core::selection::{CascadeEngine, Level, Selection};
use crate::core::store::AppState;
use crate::core::validation::ValidationErrors;
use crate::core::workflow::{QualificationWorkflow, WorkflowError};
use crate::editors::catalog::{mount_project, Catalog, CatalogSet};
use crate::entities::{Part, QcTest};

/// Form input for a new QC test, as typed
#[derive(Debug, Clone, Default)]
pub struct TestDraft {
    pub name: String,
    pub order: Option<String>,
    pub qc_weight: Option<String>,
    pub document: Option<String>,
    pub ncr: bool,
    pub remarks: Option<String>,
}

/// Default reference recorded when a document is attached without a name
pub fn default_attachment_name(test_id: &str) -> String {
    format!("QC_Attachment_{}.pdf", test_id)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualificationEditor {
    #[serde(default)]
    catalog: Catalog,

    #[serde(default)]
    selection: Selection,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    expanded_sets: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    expanded_parts: BTreeSet<String>,
}

impl QualificationEditor {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn available_sets(&self) -> &[CatalogSet] {
        self.selection
            .project
            .as_deref()
            .and_then(|id| self.catalog.get(id))
            .map(|c| c.sets.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_part(&self) -> Option<&Part> {
        self.part(self.selection.part.as_deref()?)
    }

    /// A part of the current project
    pub fn part(&self, part_id: &str) -> Option<&Part> {
        self.available_sets().iter().find_map(|s| s.part(part_id))
    }

    pub fn is_set_expanded(&self, set_id: &str) -> bool {
        self.expanded_sets.contains(set_id)
    }

    pub fn is_part_expanded(&self, part_id: &str) -> bool {
        self.expanded_parts.contains(part_id)
    }

    pub fn mount(&mut self, url_project: Option<&str>, state: &AppState) -> Vec<Action> {
        let (project, action) = mount_project(url_project, state, |id| self.catalog.contains_key(id));
        if project != self.selection.project {
            self.reset(project);
        }
        action.into_iter().collect()
    }

    /// Switch project; clears the part and all expansion state
    pub fn select_project(&mut self, project_id: Option<String>) -> Option<Action> {
        self.reset(project_id.clone());
        project_id.map(Action::set_active_project)
    }

    fn reset(&mut self, project_id: Option<String>) {
        self.selection = CascadeEngine::catalog().apply(&self.selection, Level::Project, project_id, &[]);
        self.expanded_sets.clear();
        self.expanded_parts.clear();
    }

    /// Flip a set open or closed; returns the new state
    pub fn toggle_set(&mut self, set_id: &str) -> bool {
        toggle(&mut self.expanded_sets, set_id)
    }

    /// Flip a part open or closed and select it
    ///
    /// Parts outside the current project are ignored.
    pub fn toggle_part(&mut self, part_id: &str) -> Option<bool> {
        self.select_part(part_id)?;
        Some(toggle(&mut self.expanded_parts, part_id))
    }

    /// Select a part (and its set) without touching expansion state
    pub fn select_part(&mut self, part_id: &str) -> Option<&Part> {
        let set_id = self
            .available_sets()
            .iter()
            .find(|s| s.part(part_id).is_some())
            .map(|s| s.id.clone())?;

        let engine = CascadeEngine::catalog();
        let selection = engine.apply(&self.selection, Level::Set, Some(set_id), &[]);
        self.selection = engine.apply(&selection, Level::Part, Some(part_id.to_string()), &[]);
        self.selected_part()
    }

    /// Validate and append a test to the selected part
    ///
    /// Tests keep insertion order; `order` is descriptive only.
    pub fn add_test(&mut self, draft: TestDraft, default_weight: f64) -> Result<&QcTest, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.selected_part().is_none() {
            errors.add("part", "Select a part");
        }
        errors.require("name", Some(draft.name.as_str()), "Test name is required");

        let order = match blank_to_none(draft.order.as_deref()) {
            None => Some(1),
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n >= 1 => Some(n),
                _ => {
                    errors.add("order", "Order must be a whole number of at least 1");
                    None
                }
            },
        };

        let weight = match blank_to_none(draft.qc_weight.as_deref()) {
            None => Some(default_weight),
            Some(raw) => match raw.parse::<f64>() {
                Ok(w) if (0.0..=1.0).contains(&w) => Some(w),
                _ => {
                    errors.add("qcWeight", "QC weight must be between 0 and 1");
                    None
                }
            },
        };
        errors.into_result()?;

        let mut test = QcTest::new(new_id(IdPrefix::QcTest), draft.name.trim());
        test.order = order.unwrap_or(1);
        test.qc_weight = weight.unwrap_or(default_weight);
        test.document = blank_to_none(draft.document.as_deref()).map(str::to_string);
        test.ncr = draft.ncr;
        test.remarks = blank_to_none(draft.remarks.as_deref()).map(str::to_string);

        let test_id = test.id.clone();
        let part = self.selected_part_mut().ok_or_else(|| {
            let mut errors = ValidationErrors::new();
            errors.add("part", "Select a part");
            errors
        })?;
        tracing::debug!(part = %part.id, test = %test_id, "qc test added");
        part.tests.push(test);
        part.tests.last().ok_or_else(ValidationErrors::new)
    }

    /// Record a document reference on a test; misses are silent no-ops
    pub fn attach(&mut self, part_id: &str, test_id: &str, document: Option<&str>) -> Option<&QcTest> {
        let project_id = self.selection.project.clone()?;
        let test = self
            .catalog
            .get_mut(&project_id)?
            .part_mut(part_id)?
            .test_mut(test_id)?;
        let reference = blank_to_none(document)
            .map(str::to_string)
            .unwrap_or_else(|| default_attachment_name(test_id));
        tracing::debug!(part = %part_id, test = %test_id, document = %reference, "document attached");
        test.document = Some(reference);
        Some(test)
    }

    /// Qualification score of a part in the current project
    pub fn score(&self, part_id: &str) -> Option<f64> {
        let project_id = self.selection.project.as_deref()?;
        let (_, part) = self.catalog.get(project_id)?.locate_part(part_id)?;
        Some(part.qualification_score())
    }

    /// Move a part through the qualification lifecycle
    ///
    /// Returns `Ok(None)` when the part is not in the current project.
    pub fn transition(&mut self, part_id: &str, to: PartStatus) -> Result<Option<PartStatus>, WorkflowError> {
        let Some(part) = self
            .selection
            .project
            .clone()
            .and_then(|project_id| self.catalog.get_mut(&project_id))
            .and_then(|c| c.part_mut(part_id))
        else {
            return Ok(None);
        };
        QualificationWorkflow::new().transition(part, to).map(Some)
    }

    fn selected_part_mut(&mut self) -> Option<&mut Part> {
        let project_id = self.selection.project.clone()?;
        let part_id = self.selection.part.clone()?;
        self.catalog.get_mut(&project_id)?.part_mut(&part_id)
    }
}

fn toggle(set: &mut BTreeSet<String>, key: &str) -> bool {
    if set.remove(key) {
        false
    } else {
        set.insert(key.to_string());
        true
    }
}

fn blank_to_none(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
