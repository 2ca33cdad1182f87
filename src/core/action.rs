//! Actions accepted by the store
//!
//! Actions keep the wire shape the console has always exchanged: an object
//! tagged by `type` with the payload alongside, e.g.
//! `{"type": "setActiveProject", "projectId": "proj-001"}`. Kinds the store
//! does not know deserialize to [`Action::Unknown`] and leave the state
//! unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::entity::{Module, Theme};
use crate::core::selection::SelectionPatch;
use crate::core::url::{Section, ViewMode};
use crate::entities::{Project, ProjectPatch};

/// Shallow patch of top-level UI flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_show: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sidebar_unfoldable: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_module: Option<Module>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewMode>,

    /// Flags the console does not model explicitly
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl UiPatch {
    pub fn module(module: Module) -> Self {
        Self {
            active_module: Some(module),
            ..Default::default()
        }
    }

    pub fn section(section: Section) -> Self {
        Self {
            section: Some(section),
            ..Default::default()
        }
    }

    pub fn view(view: ViewMode) -> Self {
        Self {
            view: Some(view),
            ..Default::default()
        }
    }
}

/// A requested state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Shallow-merge UI flags
    Set(UiPatch),

    /// Append a project and make it active
    AddProject { project: Project },

    /// Set the active project id, even if it does not resolve
    SetActiveProject {
        #[serde(rename = "projectId")]
        project_id: Option<String>,
    },

    /// Shallow-merge changes into every project with this id
    UpdateProject {
        #[serde(rename = "projectId")]
        project_id: String,
        changes: ProjectPatch,
    },

    /// Shallow-merge into the selection, without prefix enforcement
    UpdateSelection { selection: SelectionPatch },

    /// Replace the project list with data from the transport collaborator
    LoadProjects { projects: Vec<Project> },

    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn set_active_project(project_id: impl Into<String>) -> Self {
        Action::SetActiveProject {
            project_id: Some(project_id.into()),
        }
    }

    /// Wire name of the action kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Set(_) => "set",
            Action::AddProject { .. } => "addProject",
            Action::SetActiveProject { .. } => "setActiveProject",
            Action::UpdateProject { .. } => "updateProject",
            Action::UpdateSelection { .. } => "updateSelection",
            Action::LoadProjects { .. } => "loadProjects",
            Action::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_action_keeps_unmodeled_flags() {
        let json = r#"{"type": "set", "activeModule": "production", "asideShow": true}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        match action {
            Action::Set(patch) => {
                assert_eq!(patch.active_module, Some(Module::Production));
                assert_eq!(patch.extra.get("asideShow"), Some(&serde_json::Value::Bool(true)));
                assert!(!patch.extra.contains_key("type"));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_set_active_project_wire_shape() {
        let action: Action =
            serde_json::from_str(r#"{"type": "setActiveProject", "projectId": "proj-002"}"#).unwrap();
        assert_eq!(action, Action::set_active_project("proj-002"));
        assert_eq!(action.kind(), "setActiveProject");
    }

    #[test]
    fn test_unknown_kind_parses() {
        let action: Action = serde_json::from_str(r#"{"type": "toggleAside"}"#).unwrap();
        assert_eq!(action, Action::Unknown);
    }

    #[test]
    fn test_update_selection_payload() {
        let json = r#"{"type": "updateSelection", "selection": {"set": "set-1", "part": null}}"#;
        let action: Action = serde_json::from_str(json).unwrap();
        let Action::UpdateSelection { selection } = action else {
            panic!("expected updateSelection");
        };
        assert_eq!(selection.set, Some(Some("set-1".to_string())));
        assert_eq!(selection.part, Some(None));
    }
}
