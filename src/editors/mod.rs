//! Configuration editors
//!
//! Each editor works on its own catalog copy, seeded from fixtures and kept
//! apart from the store's projects.

pub mod build;
pub mod catalog;
pub mod configuration;
pub mod qualification;
pub mod timeline;
pub mod wizard;

pub use build::{BuildBrowser, BuildConfiguration, BuildNode, BuildPart};
pub use catalog::{mount_project, Catalog, CatalogSet, ProjectCatalog};
pub use configuration::{ConfigurationEditor, PartDraft};
pub use qualification::{QualificationEditor, TestDraft};
pub use timeline::{CommentDraft, Timeline, TimelineBoard};
pub use wizard::{ProjectWizard, WizardError, WizardStep};

use serde::{Deserialize, Serialize};

/// Every persisted editor, as kept in the workspace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Editors {
    #[serde(default)]
    pub configuration: ConfigurationEditor,

    #[serde(default)]
    pub qualification: QualificationEditor,

    #[serde(default)]
    pub build: BuildBrowser,

    #[serde(default)]
    pub timeline: TimelineBoard,
}
