//! URL/state synchronizer
//!
//! Three pieces of state are mirrored into the query string: the active
//! project (`project`), the section tab (`section`) and the view mode
//! (`view`). [`encode`] and [`decode`] are a pure, total pair: decoding
//! never fails, unknown values fall back to the defaults, and default
//! values are left out of the encoded query.
//!
//! [`UrlSync`] owns an in-memory [`History`] and turns navigations into
//! store actions.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::core::action::{Action, UiPatch};
use crate::core::store::{AppState, Store};

/// Route of the production tree view
pub const TREE_VIEW_PATH: &str = "/production/treeview";

const PROJECT_KEY: &str = "project";
const SECTION_KEY: &str = "section";
const VIEW_KEY: &str = "view";

/// Section tab of the production tree view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    General,
    Configuration,
    Production,
    Materials,
    Reports,
    Administration,
}

impl Section {
    pub fn all() -> &'static [Section] {
        &[
            Section::General,
            Section::Configuration,
            Section::Production,
            Section::Materials,
            Section::Reports,
            Section::Administration,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::General => "general",
            Section::Configuration => "configuration",
            Section::Production => "production",
            Section::Materials => "materials",
            Section::Reports => "reports",
            Section::Administration => "administration",
        }
    }

    /// Tab title
    pub fn title(&self) -> &'static str {
        match self {
            Section::General => "General",
            Section::Configuration => "Configuration",
            Section::Production => "Production",
            Section::Materials => "Materials",
            Section::Reports => "Reports",
            Section::Administration => "Administration",
        }
    }

    /// Parse a query value; anything unrecognized is the default section
    pub fn from_query(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::all()
            .iter()
            .find(|section| section.as_str() == s.trim().to_lowercase())
            .copied()
            .ok_or_else(|| {
                format!(
                    "Unknown section: {}. Use general, configuration, production, materials, reports, or administration",
                    s
                )
            })
    }
}

/// How project lists are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Card,
    Table,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Card => "card",
            ViewMode::Table => "table",
        }
    }

    pub fn from_query(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "card" | "cards" => Ok(ViewMode::Card),
            "table" => Ok(ViewMode::Table),
            _ => Err(format!("Unknown view: {}. Use card or table", s)),
        }
    }
}

/// The slice of state mirrored into the query string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlState {
    pub project: Option<String>,
    pub section: Section,
    pub view: ViewMode,
}

impl UrlState {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            project: state.active_project_id.clone(),
            section: state.ui.section,
            view: state.ui.view,
        }
    }
}

/// Encode to a query string (without the leading `?`)
pub fn encode(state: &UrlState) -> String {
    merge_into("", state)
}

/// Write `state` into an existing query, keeping parameters it does not own
pub fn merge_into(query: &str, state: &UrlState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        if key != PROJECT_KEY && key != SECTION_KEY && key != VIEW_KEY {
            serializer.append_pair(&key, &value);
        }
    }
    if let Some(ref project) = state.project {
        serializer.append_pair(PROJECT_KEY, project);
    }
    if state.section != Section::default() {
        serializer.append_pair(SECTION_KEY, state.section.as_str());
    }
    if state.view != ViewMode::default() {
        serializer.append_pair(VIEW_KEY, state.view.as_str());
    }
    serializer.finish()
}

/// Decode a query string; total, unknown values fall back to defaults
pub fn decode(query: &str) -> UrlState {
    let mut state = UrlState::default();
    for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        match key.as_ref() {
            PROJECT_KEY if !value.is_empty() => state.project = Some(value.into_owned()),
            SECTION_KEY => state.section = Section::from_query(&value),
            VIEW_KEY => state.view = ViewMode::from_query(&value),
            _ => {}
        }
    }
    state
}

/// A path plus query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    #[serde(default)]
    pub query: String,
}

impl Location {
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: query.into(),
        }
    }

    pub fn tree_view(state: &UrlState) -> Self {
        Self::new(TREE_VIEW_PATH, encode(state))
    }

    /// Split `/path?query`
    pub fn parse(href: &str) -> Self {
        match href.split_once('?') {
            Some((path, query)) => Self::new(path, query),
            None => Self::new(href, ""),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(TREE_VIEW_PATH, "")
    }
}

/// Whether a navigation grows the back stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Real navigation, e.g. redirect after project creation
    Push,
    /// Filter or tab change
    Replace,
}

/// In-memory back-button stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    past: Vec<Location>,
    current: Location,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            past: Vec::new(),
            current: initial,
        }
    }

    pub fn current(&self) -> &Location {
        &self.current
    }

    /// Number of entries up to and including the current one
    pub fn depth(&self) -> usize {
        self.past.len() + 1
    }

    pub fn entries(&self) -> impl Iterator<Item = &Location> {
        self.past.iter().chain(std::iter::once(&self.current))
    }

    pub fn navigate(&mut self, location: Location, mode: HistoryMode) {
        if mode == HistoryMode::Push {
            let previous = std::mem::replace(&mut self.current, location);
            self.past.push(previous);
        } else {
            self.current = location;
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.past.is_empty()
    }

    /// Step back one entry; returns false at the start of the stack
    pub fn back(&mut self) -> bool {
        match self.past.pop() {
            Some(previous) => {
                self.current = previous;
                true
            }
            None => false,
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Location::default())
    }
}

/// Keeps the store and the location bar in step
#[derive(Debug, Clone, Default)]
pub struct UrlSync {
    history: History,
}

impl UrlSync {
    pub fn new(history: History) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn location(&self) -> &Location {
        self.history.current()
    }

    /// Project the page should show for a decoded query
    ///
    /// A query parameter always wins. Without one, an active project that
    /// resolves is kept, else the first project in the store is used.
    pub fn resolve_project(url: &UrlState, state: &AppState) -> Option<String> {
        if let Some(ref project) = url.project {
            return Some(project.clone());
        }
        if let Some(active) = state.active_project() {
            return Some(active.id.clone());
        }
        state.projects.first().map(|p| p.id.clone())
    }

    /// Actions that bring the store in line with a query string
    pub fn actions_for(query: &str, state: &AppState) -> Vec<Action> {
        let url = decode(query);
        let project = Self::resolve_project(&url, state);
        tracing::trace!(?url, resolved = ?project, "resolved location");

        let mut actions = Vec::new();
        if project.is_some() && project != state.active_project_id {
            actions.push(Action::SetActiveProject { project_id: project });
        }
        if url.section != state.ui.section || url.view != state.ui.view {
            actions.push(Action::Set(UiPatch {
                section: Some(url.section),
                view: Some(url.view),
                ..Default::default()
            }));
        }
        actions
    }

    /// Follow a link: record it, then apply its query to the store
    pub fn open(&mut self, store: &mut Store, location: Location, mode: HistoryMode) {
        let actions = Self::actions_for(&location.query, &store.state());
        self.history.navigate(location, mode);
        store.dispatch_batch(actions);
        self.sync(&store.state());
    }

    /// Mirror the store into the current location (replace semantics)
    pub fn sync(&mut self, state: &AppState) {
        let current = self.history.current().clone();
        let query = merge_into(&current.query, &UrlState::from_state(state));
        if query != current.query {
            self.history
                .navigate(Location::new(current.path, query), HistoryMode::Replace);
        }
    }

    /// Step back and re-apply the previous location
    pub fn back(&mut self, store: &mut Store) -> bool {
        if !self.history.back() {
            return false;
        }
        let query = self.history.current().query.clone();
        store.dispatch_batch(Self::actions_for(&query, &store.state()));
        true
    }
}
