//! Configuration parts editor
//!
//! Browses a project's catalog set by set and adds parts to the selected
//! set. Selection walks the `project -> set -> part` hierarchy through the
//! catalog [`CascadeEngine`].

use serde::{Deserialize, Serialize};

use crate::core::action::Action;
use crate::core::entity::{PartLevel, PartStatus};
use crate::core::selection::{CascadeEngine, Level, Selection};
use crate::core::store::AppState;
use crate::core::validation::ValidationErrors;
use crate::editors::catalog::{mount_project, Catalog, CatalogSet};
use crate::entities::Part;

/// Form input for a new part
#[derive(Debug, Clone, Default)]
pub struct PartDraft {
    pub id: String,
    pub name: String,
    pub short_name: String,
    pub category: String,
    pub part_type: String,
    pub level: Option<PartLevel>,
    pub owner: String,
    pub status: PartStatus,
}

impl PartDraft {
    fn into_part(self) -> Part {
        let mut part = Part::new(self.id.trim(), self.name.trim());
        part.short_name = self.short_name.trim().to_string();
        part.category = Some(self.category.trim().to_string());
        part.part_type = Some(self.part_type.trim().to_string());
        part.level = self.level;
        part.owner = self.owner.trim().to_string();
        part.status = self.status;
        part
    }
}

/// Editor state: the catalog plus what is selected in it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationEditor {
    #[serde(default)]
    catalog: Catalog,

    #[serde(default)]
    selection: Selection,
}

impl ConfigurationEditor {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            selection: Selection::default(),
        }
    }

    fn engine() -> CascadeEngine {
        CascadeEngine::catalog()
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

    pub fn selected_set(&self) -> Option<&CatalogSet> {
        let set_id = self.selection.set.as_deref()?;
        self.available_sets().iter().find(|s| s.id == set_id)
    }

    pub fn selected_part(&self) -> Option<&Part> {
        let part_id = self.selection.part.as_deref()?;
        self.selected_set()?.part(part_id)
    }

    /// Parts of the selected set
    pub fn visible_parts(&self) -> &[Part] {
        self.selected_set().map(|s| s.parts.as_slice()).unwrap_or(&[])
    }

    /// Open the editor against the store; returns actions to dispatch
    pub fn mount(&mut self, url_project: Option<&str>, state: &AppState) -> Vec<Action> {
        let (project, action) = mount_project(url_project, state, |id| self.catalog.contains_key(id));
        if project != self.selection.project {
            self.apply(Level::Project, project);
        }
        self.reconcile();
        action.into_iter().collect()
    }

    /// Switch project; the set and part are reset
    pub fn select_project(&mut self, project_id: Option<String>) -> Option<Action> {
        self.apply(Level::Project, project_id.clone());
        self.reconcile();
        project_id.map(Action::set_active_project)
    }

    /// Switch set; a part that is not in the new set is deselected
    ///
    /// Unknown set ids are ignored.
    pub fn select_set(&mut self, set_id: &str) -> bool {
        let Some(set) = self.available_sets().iter().find(|s| s.id == set_id) else {
            return false;
        };
        let keep_part = self
            .selection
            .part
            .clone()
            .filter(|part_id| set.part(part_id).is_some());

        self.apply(Level::Set, Some(set_id.to_string()));
        if keep_part.is_some() {
            self.selection.part = keep_part;
        }
        true
    }

    /// Select a part of the current set; unknown ids are ignored
    pub fn select_part(&mut self, part_id: &str) -> bool {
        let exists = self
            .selected_set()
            .map_or(false, |set| set.part(part_id).is_some());
        if exists {
            self.apply(Level::Part, Some(part_id.to_string()));
        }
        exists
    }

    /// Validate and append a part to the selected set, then select it
    pub fn add_part(&mut self, draft: PartDraft) -> Result<&Part, ValidationErrors> {
        self.validate(&draft).into_result()?;

        let project_id = self.selection.project.clone().unwrap_or_default();
        let set_id = self.selection.set.clone().unwrap_or_default();
        let part = draft.into_part();
        let part_id = part.id.clone();

        let set = self
            .catalog
            .get_mut(&project_id)
            .and_then(|c| c.set_mut(&set_id))
            .ok_or_else(|| {
                let mut errors = ValidationErrors::new();
                errors.add("set", "Select a set");
                errors
            })?;
        set.parts.push(part);
        tracing::debug!(project = %project_id, set = %set_id, part = %part_id, "part added");

        self.apply(Level::Part, Some(part_id.clone()));
        self.selected_set()
            .and_then(|s| s.part(&part_id))
            .ok_or_else(ValidationErrors::new)
    }

    fn validate(&self, draft: &PartDraft) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if self.selection.project.is_none() {
            errors.add("project", "Select a project");
        }
        if self.selected_set().is_none() {
            errors.add("set", "Select a set");
        }
        errors
            .require("id", Some(draft.id.as_str()), "Part Id is required")
            .require("name", Some(draft.name.as_str()), "Name is required")
            .require("category", Some(draft.category.as_str()), "Choose a category")
            .require("type", Some(draft.part_type.as_str()), "Choose a type");
        if draft.level.is_none() {
            errors.add("level", "Select a level");
        }

        let id = draft.id.trim();
        if !id.is_empty() && self.contains_part(id) {
            errors.add("id", format!("Part Id {} already exists", id));
        }
        errors
    }

    fn contains_part(&self, part_id: &str) -> bool {
        self.catalog
            .values()
            .any(|c| c.locate_part(part_id).is_some())
    }

    fn apply(&mut self, level: Level, value: Option<String>) {
        self.selection = Self::engine().apply(&self.selection, level, value, &[]);
    }

    /// With a project chosen, make sure a set is too
    fn reconcile(&mut self) {
        if self.selection.project.is_none() {
            return;
        }
        let first = self.available_sets().first().map(|s| s.id.clone());
        match first {
            None => {
                if self.selection.set.is_some() {
                    self.apply(Level::Set, None);
                }
            }
            Some(first) if self.selected_set().is_none() => {
                tracing::trace!(set = %first, "defaulting to first set");
                self.apply(Level::Set, Some(first));
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editors::catalog::ProjectCatalog;
    use crate::entities::Project;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert(
            "proj-001".to_string(),
            ProjectCatalog {
                sets: vec![
                    CatalogSet {
                        id: "set-gc".to_string(),
                        name: "Guidance Control Set".to_string(),
                        description: None,
                        parts: vec![Part::new("P-1001", "Inertial Sensor Module")],
                    },
                    CatalogSet {
                        id: "set-telemetry".to_string(),
                        name: "Telemetry & Data Set".to_string(),
                        description: None,
                        parts: vec![Part::new("P-1101", "Data Recorder Board")],
                    },
                ],
            },
        );
        catalog.insert("proj-002".to_string(), ProjectCatalog::default());
        catalog
    }

    fn state() -> AppState {
        AppState::with_projects(vec![
            Project::new("proj-001", "Atlas"),
            Project::new("proj-002", "Skyline"),
        ])
    }

    fn draft(id: &str) -> PartDraft {
        PartDraft {
            id: id.to_string(),
            name: "Gimbal Bracket".to_string(),
            category: "Structure".to_string(),
            part_type: "Mechanical".to_string(),
            level: Some(PartLevel::L3),
            ..Default::default()
        }
    }

    #[test]
    fn test_mount_defaults_to_first_set() {
        let mut editor = ConfigurationEditor::new(catalog());
        let actions = editor.mount(None, &state());
        assert_eq!(actions, vec![Action::set_active_project("proj-001")]);
        assert_eq!(editor.selection().set.as_deref(), Some("set-gc"));
        assert_eq!(editor.visible_parts().len(), 1);
    }

    #[test]
    fn test_project_without_sets_clears_set_and_part() {
        let mut editor = ConfigurationEditor::new(catalog());
        editor.mount(Some("proj-001"), &state());
        assert!(editor.select_part("P-1001"));

        editor.select_project(Some("proj-002".to_string()));
        assert!(editor.selection().set.is_none());
        assert!(editor.selection().part.is_none());
        assert!(editor.visible_parts().is_empty());
    }

    #[test]
    fn test_changing_set_drops_missing_part() {
        let mut editor = ConfigurationEditor::new(catalog());
        editor.mount(Some("proj-001"), &state());
        editor.select_part("P-1001");

        assert!(editor.select_set("set-telemetry"));
        assert!(editor.selection().part.is_none());
        assert!(!editor.select_set("set-missing"));
        assert_eq!(editor.selection().set.as_deref(), Some("set-telemetry"));
    }

    #[test]
    fn test_add_part_appends_and_selects() {
        let mut editor = ConfigurationEditor::new(catalog());
        editor.mount(Some("proj-001"), &state());

        let part = editor.add_part(draft("P-1003")).unwrap();
        assert_eq!(part.id, "P-1003");
        assert_eq!(part.status, PartStatus::Draft);
        assert_eq!(editor.selection().part.as_deref(), Some("P-1003"));
        assert_eq!(editor.visible_parts().last().map(|p| p.id.as_str()), Some("P-1003"));
    }

    #[test]
    fn test_add_part_reports_every_missing_field() {
        let mut editor = ConfigurationEditor::new(catalog());
        editor.mount(Some("proj-001"), &state());
        let before = editor.visible_parts().len();

        let errors = editor.add_part(PartDraft::default()).unwrap_err();
        assert_eq!(errors.get("id"), Some("Part Id is required"));
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("category"), Some("Choose a category"));
        assert_eq!(errors.get("type"), Some("Choose a type"));
        assert_eq!(errors.get("level"), Some("Select a level"));
        assert_eq!(errors.len(), 5);
        assert_eq!(editor.visible_parts().len(), before);
    }

    #[test]
    fn test_add_part_requires_set() {
        let mut editor = ConfigurationEditor::new(catalog());
        editor.select_project(Some("proj-002".to_string()));
        let errors = editor.add_part(draft("P-2999")).unwrap_err();
        assert_eq!(errors.get("set"), Some("Select a set"));
    }

    #[test]
    fn test_duplicate_part_id_is_a_field_error() {
        let mut editor = ConfigurationEditor::new(catalog());
        editor.mount(Some("proj-001"), &state());
        let errors = editor.add_part(draft("P-1101")).unwrap_err();
        assert!(errors.get("id").unwrap().contains("already exists"));
    }

    #[test]
    fn test_editor_does_not_touch_store_projects() {
        let state = state();
        let mut editor = ConfigurationEditor::new(catalog());
        editor.mount(Some("proj-001"), &state);
        editor.add_part(draft("P-1004")).unwrap();
        assert!(state.projects.iter().all(|p| p.sets.is_empty()));
    }
}
