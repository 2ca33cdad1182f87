//! Sidebar navigator
//!
//! Reads the store, never writes it directly: every click becomes actions
//! handed to the dispatcher.

use serde::{Deserialize, Serialize};

use crate::core::action::{Action, UiPatch};
use crate::core::entity::Module;
use crate::core::selection::{CascadeEngine, Level};
use crate::core::store::{AppState, Store};
use crate::core::url::{HistoryMode, Location, Section, UrlState, UrlSync};

/// One row of the project hierarchy as the sidebar lays it out
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    pub depth: usize,
    pub level: Level,
    pub id: String,
    pub label: String,
    pub status: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Navigator {
    #[serde(default)]
    open_projects: Vec<String>,

    #[serde(skip)]
    auto_expand: bool,
}

impl Navigator {
    /// Sidebar with the active project (else the first one) opened
    pub fn new(state: &AppState, auto_expand: bool) -> Self {
        let open_projects = state
            .active_project_id
            .clone()
            .or_else(|| state.projects.first().map(|p| p.id.clone()))
            .into_iter()
            .collect();
        Self {
            open_projects,
            auto_expand,
        }
    }

    fn engine(&self) -> CascadeEngine {
        CascadeEngine::navigator().with_auto_expand(self.auto_expand)
    }

    pub fn is_open(&self, project_id: &str) -> bool {
        self.open_projects.iter().any(|p| p == project_id)
    }

    /// Keep the active project's accordion open
    pub fn track_active(&mut self, state: &AppState) {
        if let Some(active) = state.active_project_id.as_deref() {
            if !self.is_open(active) {
                self.open_projects.push(active.to_string());
            }
        }
    }

    /// Header click: activate the project and select it in the tree
    pub fn select_project(&mut self, store: &mut Store, project_id: &str) {
        let patch = self.engine().select(
            Level::Project,
            Some(project_id.to_string()),
            &store.state().projects,
        );
        store.dispatch_batch([
            Action::set_active_project(project_id),
            Action::UpdateSelection { selection: patch },
        ]);
        self.track_active(&store.state());
    }

    /// Select one level of the hierarchy; deeper levels are cleared
    pub fn select(&self, store: &mut Store, level: Level, id: Option<String>) {
        let patch = self.engine().select(level, id, &store.state().projects);
        store.dispatch(Action::UpdateSelection { selection: patch });
    }

    pub fn clear(&self, store: &mut Store) {
        store.dispatch(Action::UpdateSelection {
            selection: self.engine().clear(),
        });
    }

    /// Section button: open the project's tree view on that section
    ///
    /// A section is a tab change, so the current history entry is replaced.
    pub fn open_section(&mut self, store: &mut Store, sync: &mut UrlSync, project_id: &str, section: Section) {
        store.dispatch_batch([
            Action::set_active_project(project_id),
            Action::Set(UiPatch::module(Module::Production)),
        ]);
        let target = Location::tree_view(&UrlState {
            project: Some(project_id.to_string()),
            section,
            view: store.state().ui.view,
        });
        sync.open(store, target, HistoryMode::Replace);
        self.track_active(&store.state());
    }

    /// "Add Project" button
    pub fn open_tree_view(&self, store: &mut Store, sync: &mut UrlSync) {
        sync.open(store, Location::default(), HistoryMode::Push);
    }

    pub fn toggle_unfoldable(&self, store: &mut Store) {
        let unfoldable = store.state().ui.sidebar_unfoldable;
        store.dispatch(Action::Set(UiPatch {
            sidebar_unfoldable: Some(!unfoldable),
            ..Default::default()
        }));
    }

    /// Project hierarchy down to assemblies, marking the selected path
    pub fn hierarchy(state: &AppState) -> Vec<TreeLine> {
        let selection = &state.selection;
        let mut lines = Vec::new();
        for project in &state.projects {
            let project_selected = selection.project.as_deref() == Some(project.id.as_str());
            lines.push(TreeLine {
                depth: 0,
                level: Level::Project,
                id: project.id.clone(),
                label: project.name.clone(),
                status: project.status.to_string(),
                selected: project_selected,
            });
            for set in &project.sets {
                let set_selected = project_selected && selection.set.as_deref() == Some(set.id.as_str());
                lines.push(TreeLine {
                    depth: 1,
                    level: Level::Set,
                    id: set.id.clone(),
                    label: set.name.clone(),
                    status: set.status.clone(),
                    selected: set_selected,
                });
                for structure in &set.structures {
                    let structure_selected =
                        set_selected && selection.component.as_deref() == Some(structure.name.as_str());
                    lines.push(TreeLine {
                        depth: 2,
                        level: Level::Component,
                        id: structure.name.clone(),
                        label: structure.name.clone(),
                        status: structure.status.clone(),
                        selected: structure_selected,
                    });
                    for assembly in &structure.assemblies {
                        lines.push(TreeLine {
                            depth: 3,
                            level: Level::Assembly,
                            id: assembly.name.clone(),
                            label: assembly.name.clone(),
                            status: assembly.status.clone(),
                            selected: structure_selected
                                && selection.assembly.as_deref() == Some(assembly.name.as_str()),
                        });
                    }
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Assembly, Project, Set, Structure};

    fn store() -> Store {
        let chassis = Set {
            structures: vec![Structure::new("Front frame").with_assembly(Assembly::new("Steering column"))],
            ..Set::new("set-1", "Chassis Set")
        };
        Store::new(AppState::with_projects(vec![
            Project::new("proj-001", "Atlas").with_set(chassis),
            Project::new("proj-002", "Skyline"),
        ]))
    }

    #[test]
    fn test_new_opens_first_project() {
        let nav = Navigator::new(&store().state(), true);
        assert!(nav.is_open("proj-001"));
        assert!(!nav.is_open("proj-002"));
    }

    #[test]
    fn test_select_project_auto_expands_first_set() {
        let mut store = store();
        let mut nav = Navigator::new(&store.state(), true);
        nav.select_project(&mut store, "proj-001");

        let state = store.state();
        assert_eq!(state.active_project_id.as_deref(), Some("proj-001"));
        assert_eq!(state.selection.set.as_deref(), Some("set-1"));
    }

    #[test]
    fn test_project_without_sets_leaves_downstream_empty() {
        let mut store = store();
        let mut nav = Navigator::new(&store.state(), true);
        nav.select_project(&mut store, "proj-001");
        nav.select(&mut store, Level::Component, Some("Front frame".to_string()));
        nav.select(&mut store, Level::Assembly, Some("Steering column".to_string()));

        nav.select_project(&mut store, "proj-002");
        let selection = &store.state().selection;
        assert!(selection.set.is_none());
        assert!(selection.component.is_none());
        assert!(selection.assembly.is_none());
        assert!(selection.part.is_none());
        assert!(nav.is_open("proj-002"));
    }

    #[test]
    fn test_open_section_replaces_location() {
        let mut store = store();
        let mut sync = UrlSync::default();
        let mut nav = Navigator::new(&store.state(), false);
        nav.open_section(&mut store, &mut sync, "proj-002", Section::Materials);

        let state = store.state();
        assert_eq!(state.active_project_id.as_deref(), Some("proj-002"));
        assert_eq!(state.ui.active_module, Module::Production);
        assert_eq!(state.ui.section, Section::Materials);
        assert_eq!(sync.location().to_string(), "/production/treeview?project=proj-002&section=materials");
        assert!(!sync.history().can_go_back());

        nav.open_section(&mut store, &mut sync, "proj-002", Section::Reports);
        assert_eq!(sync.location().to_string(), "/production/treeview?project=proj-002&section=reports");
        assert!(!sync.history().can_go_back());
    }

    #[test]
    fn test_hierarchy_marks_selected_path() {
        let mut store = store();
        let mut nav = Navigator::new(&store.state(), true);
        nav.select_project(&mut store, "proj-001");
        nav.select(&mut store, Level::Component, Some("Front frame".to_string()));

        let lines = Navigator::hierarchy(&store.state());
        let selected: Vec<&str> = lines.iter().filter(|l| l.selected).map(|l| l.id.as_str()).collect();
        assert_eq!(selected, vec!["proj-001", "set-1", "Front frame"]);
        assert_eq!(lines.last().map(|l| l.depth), Some(0));
    }

    #[test]
    fn test_toggle_unfoldable() {
        let mut store = store();
        let nav = Navigator::new(&store.state(), false);
        nav.toggle_unfoldable(&mut store);
        assert!(store.state().ui.sidebar_unfoldable);
    }
}
