//! Workspace discovery and persistence
//!
//! A workspace is any directory holding `.prodcfg/`. Between invocations it
//! keeps the store snapshot with its navigation history (`state.yaml`) and
//! the editors' working catalogs (`catalogs.yaml`).

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::Config;
use crate::core::fixtures::{self, FixtureError};
use crate::core::store::{AppState, Store};
use crate::core::url::{History, UrlSync};
use crate::editors::Editors;

/// Store snapshot plus the back stack, as written to `state.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub state: AppState,

    #[serde(default)]
    pub history: History,
}

/// Represents a console workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of .prodcfg/)
    root: PathBuf,
}

impl Workspace {
    pub const DIR: &'static str = ".prodcfg";

    /// Find workspace root by walking up from the current directory
    pub fn discover() -> Result<Self, WorkspaceError> {
        let current = std::env::current_dir().map_err(|e| WorkspaceError::Io(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find workspace root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkspaceError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| WorkspaceError::Io(e.to_string()))?;

        loop {
            if current.join(Self::DIR).is_dir() {
                tracing::debug!(root = %current.display(), "found workspace");
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(WorkspaceError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open an explicit workspace root, or discover one when `None`
    pub fn locate(root: Option<&Path>) -> Result<Self, WorkspaceError> {
        match root {
            Some(root) => Self::discover_from(root),
            None => Self::discover(),
        }
    }

    /// Create a new workspace at the given path
    ///
    /// With `seed`, the store and the editors start from the embedded
    /// fixtures; otherwise both start empty.
    pub fn init(path: &Path, seed: bool) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(Self::DIR).exists() {
            return Err(WorkspaceError::AlreadyExists(root));
        }
        Self::create(root, seed)
    }

    /// Initialize even if .prodcfg/ exists; state and catalogs are reset
    pub fn init_force(path: &Path, seed: bool) -> Result<Self, WorkspaceError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create(root, seed)
    }

    fn create(root: PathBuf, seed: bool) -> Result<Self, WorkspaceError> {
        let dir = root.join(Self::DIR);
        std::fs::create_dir_all(&dir).map_err(|e| WorkspaceError::Io(e.to_string()))?;

        let config_path = dir.join("config.yaml");
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| WorkspaceError::Io(e.to_string()))?;
        }

        let workspace = Self { root };
        let (state, editors) = if seed {
            (
                AppState::with_projects(fixtures::seed_projects()?),
                fixtures::seeded_editors()?,
            )
        } else {
            (AppState::default(), Editors::default())
        };
        workspace.save_snapshot(&Snapshot {
            state,
            history: History::default(),
        })?;
        workspace.save_editors(&editors)?;
        tracing::info!(root = %workspace.root.display(), seed, "initialized workspace");
        Ok(workspace)
    }

    fn default_config() -> &'static str {
        r#"# Production configuration console settings

# Default author for new entities (can be overridden by global config)
# author: ""

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# View mode used when the location does not name one (card, table)
# default_view: card

# Re-seed the set when the sidebar switches project
# auto_expand_first_set: true

# Weight given to QC tests added without one
# default_qc_weight: 0.10
"#
    }

    /// Get the workspace root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .prodcfg directory
    pub fn dir(&self) -> PathBuf {
        self.root.join(Self::DIR)
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir().join("state.yaml")
    }

    pub fn catalogs_path(&self) -> PathBuf {
        self.dir().join("catalogs.yaml")
    }

    /// Read `state.yaml`; a missing file is an empty snapshot
    pub fn load_snapshot(&self) -> Result<Snapshot, WorkspaceError> {
        read_yaml(&self.state_path())
    }

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<(), WorkspaceError> {
        write_yaml(&self.state_path(), snapshot)
    }

    /// Read `catalogs.yaml`; a missing file means empty catalogs
    pub fn load_editors(&self) -> Result<Editors, WorkspaceError> {
        read_yaml(&self.catalogs_path())
    }

    pub fn save_editors(&self, editors: &Editors) -> Result<(), WorkspaceError> {
        write_yaml(&self.catalogs_path(), editors)
    }
}

fn read_yaml<T: DeserializeOwned + Default>(path: &Path) -> Result<T, WorkspaceError> {
    if !path.exists() {
        return Ok(T::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| WorkspaceError::Io(e.to_string()))?;
    serde_yml::from_str(&contents).map_err(|e| WorkspaceError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), WorkspaceError> {
    let yaml = serde_yml::to_string(value).map_err(|e| WorkspaceError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    std::fs::write(path, yaml).map_err(|e| WorkspaceError::Io(e.to_string()))
}

/// Everything one command works on, loaded from and saved to a workspace
pub struct Session {
    pub workspace: Workspace,
    pub config: Config,
    pub store: Store,
    pub sync: UrlSync,
    pub editors: Editors,
}

impl Session {
    pub fn open(root: Option<&Path>) -> Result<Self, WorkspaceError> {
        let workspace = Workspace::locate(root)?;
        let config = Config::load_for(Some(workspace.root()));
        let snapshot = workspace.load_snapshot()?;
        let editors = workspace.load_editors()?;
        Ok(Self {
            config,
            store: Store::new(snapshot.state),
            sync: UrlSync::new(snapshot.history),
            editors,
            workspace,
        })
    }

    /// Write the store, history and editors back
    pub fn save(&self) -> Result<(), WorkspaceError> {
        self.workspace.save_snapshot(&Snapshot {
            state: self.store.state().as_ref().clone(),
            history: self.sync.history().clone(),
        })?;
        self.workspace.save_editors(&self.editors)
    }
}

/// Errors that can occur during workspace operations
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("not a prodcfg workspace (searched from {searched_from:?}). Run 'prodcfg init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("prodcfg workspace already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(String),

    #[error("{path:?} is malformed: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::Action;
    use tempfile::tempdir;

    #[test]
    fn test_init_seeds_state_and_catalogs() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), true).unwrap();

        assert!(workspace.dir().join("config.yaml").exists());
        let snapshot = workspace.load_snapshot().unwrap();
        assert_eq!(snapshot.state.projects.len(), 2);
        assert!(snapshot.state.active_project_id.is_none());

        let editors = workspace.load_editors().unwrap();
        assert!(editors.configuration.catalog().contains_key("proj-001"));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let err = Workspace::init(tmp.path(), false).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyExists(_)));
        assert!(Workspace::init_force(tmp.path(), false).is_ok());
    }

    #[test]
    fn test_discover_walks_up() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), false).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let workspace = Workspace::discover_from(&subdir).unwrap();
        assert_eq!(
            workspace.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_discover_fails_without_dir() {
        let tmp = tempdir().unwrap();
        let err = Workspace::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotFound { .. }));
    }

    #[test]
    fn test_session_round_trip() {
        let tmp = tempdir().unwrap();
        Workspace::init(tmp.path(), true).unwrap();

        let mut session = Session::open(Some(tmp.path())).unwrap();
        session.store.dispatch(Action::set_active_project("proj-002"));
        session.sync.sync(&session.store.state());
        session.save().unwrap();

        let reopened = Session::open(Some(tmp.path())).unwrap();
        assert_eq!(reopened.store.state().active_project_id.as_deref(), Some("proj-002"));
        assert_eq!(reopened.sync.location().query, "project=proj-002");
    }

    #[test]
    fn test_malformed_state_is_reported() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::init(tmp.path(), false).unwrap();
        std::fs::write(workspace.state_path(), "state: [not, a, map").unwrap();
        let err = workspace.load_snapshot().unwrap_err();
        assert!(matches!(err, WorkspaceError::Malformed { .. }));
    }
}
