//! Core module - state, dispatch, cascade and URL mapping

pub mod action;
pub mod config;
pub mod entity;
pub mod fixtures;
pub mod identity;
pub mod selection;
pub mod store;
pub mod transport;
pub mod url;
pub mod validation;
pub mod workflow;
pub mod workspace;

pub use action::{Action, UiPatch};
pub use config::Config;
pub use entity::{Module, PartLevel, PartStatus, ProjectStatus, ReportStatus, Theme};
pub use identity::{new_id, IdPrefix};
pub use selection::{CascadeEngine, Crumb, Hierarchy, Level, Selection, SelectionPatch};
pub use store::{reduce, AppState, Store, SubscriptionId, UiFlags};
pub use transport::{FileSource, ProjectSource, TransportError};
pub use self::url::{History, HistoryMode, Location, Section, UrlState, UrlSync, ViewMode};
pub use validation::ValidationErrors;
pub use workflow::{QualificationWorkflow, WorkflowError};
pub use workspace::{Session, Snapshot, Workspace, WorkspaceError};
