//! Project-scoped part catalogs shared by the editors
//!
//! Catalogs are working copies keyed by project id. They are seeded from
//! fixtures and never written back into the store, and the store never
//! writes into them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::action::Action;
use crate::core::store::AppState;
use crate::entities::Part;

/// A set as the editors see it: a bucket of parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSet {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl CatalogSet {
    pub fn part(&self, part_id: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == part_id)
    }
}

/// All sets one project has in a catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectCatalog {
    #[serde(default)]
    pub sets: Vec<CatalogSet>,
}

impl ProjectCatalog {
    pub fn set(&self, set_id: &str) -> Option<&CatalogSet> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    pub fn set_mut(&mut self, set_id: &str) -> Option<&mut CatalogSet> {
        self.sets.iter_mut().find(|s| s.id == set_id)
    }

    /// Find a part and the id of the set holding it
    pub fn locate_part(&self, part_id: &str) -> Option<(&CatalogSet, &Part)> {
        self.sets
            .iter()
            .find_map(|set| set.part(part_id).map(|part| (set, part)))
    }

    pub fn part_mut(&mut self, part_id: &str) -> Option<&mut Part> {
        self.sets
            .iter_mut()
            .flat_map(|s| s.parts.iter_mut())
            .find(|p| p.id == part_id)
    }

    pub fn parts(&self) -> impl Iterator<Item = (&CatalogSet, &Part)> {
        self.sets
            .iter()
            .flat_map(|set| set.parts.iter().map(move |part| (set, part)))
    }
}

/// Catalogs for every project, keyed by project id
pub type Catalog = BTreeMap<String, ProjectCatalog>;

/// Project an editor shows when it is opened
///
/// A query project with a catalog entry wins and becomes active. Otherwise
/// an active project with a catalog entry is kept. Failing both, the first
/// store project is chosen and made active.
pub fn mount_project<F>(
    url_project: Option<&str>,
    state: &AppState,
    has_catalog: F,
) -> (Option<String>, Option<Action>)
where
    F: Fn(&str) -> bool,
{
    if let Some(project) = url_project.filter(|id| has_catalog(id)) {
        return (
            Some(project.to_string()),
            Some(Action::set_active_project(project)),
        );
    }

    if let Some(active) = state.active_project_id.as_deref().filter(|id| has_catalog(id)) {
        return (Some(active.to_string()), None);
    }

    match state.projects.first() {
        Some(first) => (
            Some(first.id.clone()),
            Some(Action::set_active_project(first.id.clone())),
        ),
        None => (None, None),
    }
}
