//! Entity store, reducer and dispatcher
//!
//! [`reduce`] is a pure function from a snapshot and an [`Action`] to the
//! next snapshot. It never fails: lookups that miss are no-ops and unknown
//! actions return the snapshot unchanged.
//!
//! [`Store`] is the single mutable owner of the state. Snapshots are shared
//! as `Arc<AppState>`; subscribers are told about a new snapshot only when
//! it differs from the previous one, and never see a half-applied batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::action::{Action, UiPatch};
use crate::core::entity::{Module, Theme};
use crate::core::selection::Selection;
use crate::core::transport::{ProjectSource, TransportError};
use crate::core::url::{Section, ViewMode};
use crate::entities::Project;

/// Top-level UI flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiFlags {
    pub sidebar_show: bool,
    pub sidebar_unfoldable: bool,
    pub theme: Theme,
    pub active_module: Module,
    pub section: Section,
    pub view: ViewMode,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for UiFlags {
    fn default() -> Self {
        Self {
            sidebar_show: true,
            sidebar_unfoldable: false,
            theme: Theme::default(),
            active_module: Module::default(),
            section: Section::default(),
            view: ViewMode::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl UiFlags {
    fn merge(&mut self, patch: &UiPatch) {
        if let Some(show) = patch.sidebar_show {
            self.sidebar_show = show;
        }
        if let Some(unfoldable) = patch.sidebar_unfoldable {
            self.sidebar_unfoldable = unfoldable;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(module) = patch.active_module {
            self.active_module = module;
        }
        if let Some(section) = patch.section {
            self.section = section;
        }
        if let Some(view) = patch.view {
            self.view = view;
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// One immutable snapshot of the console state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub ui: UiFlags,
    pub projects: Vec<Project>,
    /// Drives page-level context; independent of `selection.project`
    pub active_project_id: Option<String>,
    pub selection: Selection,
}

impl AppState {
    pub fn with_projects(projects: Vec<Project>) -> Self {
        Self {
            projects: ingest_all(projects),
            ..Default::default()
        }
    }

    /// Look up a project; duplicates resolve to the last one added
    pub fn project(&self, id: &str) -> Option<&Project> {
        find_project(&self.projects, id)
    }

    /// The active project, or `None` when the id is unset or dangling
    pub fn active_project(&self) -> Option<&Project> {
        self.active_project_id
            .as_deref()
            .and_then(|id| self.project(id))
    }
}

/// Last-write-wins lookup by id
pub fn find_project<'a>(projects: &'a [Project], id: &str) -> Option<&'a Project> {
    projects.iter().rev().find(|p| p.id == id)
}

fn ingest(mut project: Project) -> Project {
    if project.normalize() {
        tracing::debug!(project = %project.id, "normalized legacy set shapes");
    }
    project
}

fn ingest_all(projects: Vec<Project>) -> Vec<Project> {
    projects.into_iter().map(ingest).collect()
}

/// Apply one action to a snapshot
pub fn reduce(state: &AppState, action: &Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::Set(patch) => next.ui.merge(patch),
        Action::AddProject { project } => {
            next.projects.push(ingest(project.clone()));
            next.active_project_id = Some(project.id.clone());
        }
        Action::SetActiveProject { project_id } => {
            next.active_project_id = project_id.clone();
        }
        Action::UpdateProject {
            project_id,
            changes,
        } => {
            for project in next.projects.iter_mut().filter(|p| p.id == *project_id) {
                changes.apply_to(project);
                if changes.sets.is_some() {
                    project.normalize();
                }
            }
        }
        Action::UpdateSelection { selection } => next.selection.merge(selection),
        Action::LoadProjects { projects } => {
            next.projects = ingest_all(projects.clone());
        }
        Action::Unknown => {}
    }
    next
}

/// Handle returned by [`Store::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&Arc<AppState>)>;

/// Explicit state container: the single channel for every state change
pub struct Store {
    state: Arc<AppState>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        Self {
            state: Arc::new(initial),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current snapshot
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    pub fn dispatch(&mut self, action: Action) -> Arc<AppState> {
        self.dispatch_batch([action])
    }

    /// Apply actions in order and publish only the fully merged result
    pub fn dispatch_batch<I>(&mut self, actions: I) -> Arc<AppState>
    where
        I: IntoIterator<Item = Action>,
    {
        let mut next: Option<AppState> = None;
        for action in actions {
            tracing::debug!(kind = action.kind(), "dispatch");
            let current: &AppState = match next.as_ref() {
                Some(pending) => pending,
                None => &self.state,
            };
            next = Some(reduce(current, &action));
        }

        match next {
            Some(next) if next != *self.state => self.publish(next),
            _ => {
                tracing::trace!("state unchanged, subscribers not notified");
            }
        }
        self.state()
    }

    /// Replace the project list with data fetched from `source`
    ///
    /// On a transport error the state is left exactly as it was.
    pub fn load_from(&mut self, source: &dyn ProjectSource) -> Result<Arc<AppState>, TransportError> {
        let projects = source.fetch_projects()?;
        tracing::info!(count = projects.len(), "loaded projects from transport");
        Ok(self.dispatch(Action::LoadProjects { projects }))
    }

    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&Arc<AppState>) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns false if the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn publish(&mut self, next: AppState) {
        self.state = Arc::new(next);
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&self.state);
        }
    }
}
