//! Seed data embedded in the binary
//!
//! `init` seeds a workspace from these files; the editors' catalogs start
//! from them too.

use std::collections::BTreeMap;

use rust_embed::Embed;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::editors::{
    BuildBrowser, BuildConfiguration, Catalog, ConfigurationEditor, Editors, QualificationEditor, Timeline, TimelineBoard,
};
use crate::entities::Project;

#[derive(Embed)]
#[folder = "fixtures/"]
struct EmbeddedFixtures;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Fixture not found: {0}")]
    NotFound(String),

    #[error("Fixture {name} is malformed: {message}")]
    Malformed { name: String, message: String },
}

fn load<T: DeserializeOwned>(name: &str) -> Result<T, FixtureError> {
    let file = EmbeddedFixtures::get(name).ok_or_else(|| FixtureError::NotFound(name.to_string()))?;
    let malformed = |message: String| FixtureError::Malformed {
        name: name.to_string(),
        message,
    };
    let text = std::str::from_utf8(&file.data).map_err(|e| malformed(e.to_string()))?;
    serde_yml::from_str(text).map_err(|e| malformed(e.to_string()))
}

/// Projects a fresh store starts with
pub fn seed_projects() -> Result<Vec<Project>, FixtureError> {
    load("seed.yaml")
}

pub fn configuration_catalog() -> Result<Catalog, FixtureError> {
    load("configuration.yaml")
}

pub fn qualification_catalog() -> Result<Catalog, FixtureError> {
    load("qualification.yaml")
}

pub fn build_configurations() -> Result<BTreeMap<String, BuildConfiguration>, FixtureError> {
    load("build.yaml")
}

pub fn timelines() -> Result<BTreeMap<String, Timeline>, FixtureError> {
    load("timeline.yaml")
}

/// All editors, freshly seeded
pub fn seeded_editors() -> Result<Editors, FixtureError> {
    Ok(Editors {
        configuration: ConfigurationEditor::new(configuration_catalog()?),
        qualification: QualificationEditor::new(qualification_catalog()?),
        build: BuildBrowser::new(build_configurations()?),
        timeline: TimelineBoard::new(timelines()?),
    })
}
