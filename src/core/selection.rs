//! Selection cascade engine
//!
//! A [`Selection`] is the drilled-down path through the production
//! hierarchy. Choosing an entity at one level invalidates every deeper
//! level in the same update, so a selection read by a subscriber is always
//! a prefix of its [`Hierarchy`].
//!
//! The sidebar tree walks the full five-level hierarchy; the editors walk
//! the shorter `project -> set -> part` catalog hierarchy. Both go through
//! [`CascadeEngine`].

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::store::find_project;
use crate::entities::Project;

/// One level of the production hierarchy, shallowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Project,
    Set,
    /// A structure within a set
    Component,
    Assembly,
    Part,
}

impl Level {
    pub fn all() -> &'static [Level] {
        &[
            Level::Project,
            Level::Set,
            Level::Component,
            Level::Assembly,
            Level::Part,
        ]
    }

    /// Breadcrumb label
    pub fn label(&self) -> &'static str {
        match self {
            Level::Project => "Project",
            Level::Set => "Set",
            Level::Component => "Structure",
            Level::Assembly => "Assembly",
            Level::Part => "Part",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Project => write!(f, "project"),
            Level::Set => write!(f, "set"),
            Level::Component => write!(f, "component"),
            Level::Assembly => write!(f, "assembly"),
            Level::Part => write!(f, "part"),
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project" => Ok(Level::Project),
            "set" => Ok(Level::Set),
            "component" | "structure" => Ok(Level::Component),
            "assembly" => Ok(Level::Assembly),
            "part" => Ok(Level::Part),
            _ => Err(format!(
                "Unknown level: {}. Use project, set, component, assembly, or part",
                s
            )),
        }
    }
}

/// The currently drilled-down path; each field is an id or absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub project: Option<String>,
    pub set: Option<String>,
    pub component: Option<String>,
    pub assembly: Option<String>,
    pub part: Option<String>,
}

impl Selection {
    pub fn get(&self, level: Level) -> Option<&str> {
        self.slot(level).as_deref()
    }

    fn slot(&self, level: Level) -> &Option<String> {
        match level {
            Level::Project => &self.project,
            Level::Set => &self.set,
            Level::Component => &self.component,
            Level::Assembly => &self.assembly,
            Level::Part => &self.part,
        }
    }

    fn slot_mut(&mut self, level: Level) -> &mut Option<String> {
        match level {
            Level::Project => &mut self.project,
            Level::Set => &mut self.set,
            Level::Component => &mut self.component,
            Level::Assembly => &mut self.assembly,
            Level::Part => &mut self.part,
        }
    }

    /// Shallow-merge a patch; fields the patch does not mention are kept
    ///
    /// No prefix enforcement happens here. Callers that need it go through
    /// [`CascadeEngine::select`] first.
    pub fn merge(&mut self, patch: &SelectionPatch) {
        for (level, value) in patch.entries() {
            *self.slot_mut(level) = value.clone();
        }
    }

    pub fn is_empty(&self) -> bool {
        Level::all().iter().all(|l| self.get(*l).is_none())
    }
}

/// Partial selection update
///
/// `None` leaves a level untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub project: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub set: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub component: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub assembly: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub part: Option<Option<String>>,
}

/// A field that is present (even as null) becomes `Some`
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl SelectionPatch {
    pub fn with(mut self, level: Level, value: Option<String>) -> Self {
        *self.slot_mut(level) = Some(value);
        self
    }

    fn slot_mut(&mut self, level: Level) -> &mut Option<Option<String>> {
        match level {
            Level::Project => &mut self.project,
            Level::Set => &mut self.set,
            Level::Component => &mut self.component,
            Level::Assembly => &mut self.assembly,
            Level::Part => &mut self.part,
        }
    }

    /// Levels this patch touches, shallowest first
    pub fn entries(&self) -> impl Iterator<Item = (Level, &Option<String>)> {
        [
            (Level::Project, &self.project),
            (Level::Set, &self.set),
            (Level::Component, &self.component),
            (Level::Assembly, &self.assembly),
            (Level::Part, &self.part),
        ]
        .into_iter()
        .filter_map(|(level, slot)| slot.as_ref().map(|v| (level, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

/// An ordered list of levels a selection walks through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hierarchy {
    levels: &'static [Level],
}

impl Hierarchy {
    /// Sidebar and tree view: project, set, component, assembly, part
    pub const NAVIGATOR: Hierarchy = Hierarchy {
        levels: &[
            Level::Project,
            Level::Set,
            Level::Component,
            Level::Assembly,
            Level::Part,
        ],
    };

    /// Editor catalogs: project, set, part
    pub const CATALOG: Hierarchy = Hierarchy {
        levels: &[Level::Project, Level::Set, Level::Part],
    };

    pub fn levels(&self) -> &'static [Level] {
        self.levels
    }

    pub fn contains(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }

    /// Levels strictly below `level` in this hierarchy
    pub fn deeper_than(&self, level: Level) -> &'static [Level] {
        match self.levels.iter().position(|l| *l == level) {
            Some(idx) => &self.levels[idx + 1..],
            None => &[],
        }
    }
}

/// One breadcrumb entry of the derived current path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub level: Level,
    pub id: String,
    /// Display name when the id resolves, else the id itself
    pub label: String,
}

/// Centralized cascade rules for a hierarchy
#[derive(Debug, Clone, Copy)]
pub struct CascadeEngine {
    hierarchy: Hierarchy,
    auto_expand_first_set: bool,
}

impl CascadeEngine {
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self {
            hierarchy,
            auto_expand_first_set: false,
        }
    }

    /// Engine for the sidebar/tree navigator
    pub fn navigator() -> Self {
        Self::new(Hierarchy::NAVIGATOR)
    }

    /// Engine for the editor catalogs
    pub fn catalog() -> Self {
        Self::new(Hierarchy::CATALOG)
    }

    /// Re-seed `set` with the project's first set when the project changes
    pub fn with_auto_expand(mut self, enabled: bool) -> Self {
        self.auto_expand_first_set = enabled;
        self
    }

    pub fn hierarchy(&self) -> Hierarchy {
        self.hierarchy
    }

    /// Build the single patch that selects `value` at `level`
    ///
    /// Every deeper level of the hierarchy is cleared in the same patch. A
    /// level outside the hierarchy yields an empty patch.
    pub fn select(&self, level: Level, value: Option<String>, projects: &[Project]) -> SelectionPatch {
        if !self.hierarchy.contains(level) {
            tracing::trace!(%level, "level not part of hierarchy, ignoring");
            return SelectionPatch::default();
        }

        let mut patch = SelectionPatch::default();
        for deeper in self.hierarchy.deeper_than(level) {
            patch = patch.with(*deeper, None);
        }

        if level == Level::Project && self.auto_expand_first_set {
            let first_set = value
                .as_deref()
                .and_then(|id| find_project(projects, id))
                .and_then(|p| p.first_set_id())
                .map(str::to_string);
            tracing::trace!(project = ?value, set = ?first_set, "auto-expanding first set");
            patch = patch.with(Level::Set, first_set);
        }

        patch.with(level, value)
    }

    /// Apply [`select`](Self::select) to a selection and return the result
    pub fn apply(
        &self,
        current: &Selection,
        level: Level,
        value: Option<String>,
        projects: &[Project],
    ) -> Selection {
        let mut next = current.clone();
        next.merge(&self.select(level, value, projects));
        next
    }

    /// Clear every level
    pub fn clear(&self) -> SelectionPatch {
        self.hierarchy
            .levels()
            .iter()
            .fold(SelectionPatch::default(), |patch, level| patch.with(*level, None))
    }

    /// True when no hierarchy level is set below an absent one
    pub fn is_prefix(&self, selection: &Selection) -> bool {
        let mut seen_gap = false;
        for level in self.hierarchy.levels() {
            match selection.get(*level) {
                Some(_) if seen_gap => return false,
                Some(_) => {}
                None => seen_gap = true,
            }
        }
        true
    }

    /// Derived current path, stopping at the first absent level
    ///
    /// A deeper level set without its parent is tolerated and simply not
    /// reached.
    pub fn path(&self, selection: &Selection, projects: &[Project]) -> Vec<Crumb> {
        let project = selection.project.as_deref().and_then(|id| find_project(projects, id));
        let set = project.and_then(|p| selection.set.as_deref().and_then(|id| p.set(id)));
        let structure = set.and_then(|s| selection.component.as_deref().and_then(|n| s.structure(n)));

        let mut crumbs = Vec::new();
        for level in self.hierarchy.levels() {
            let Some(id) = selection.get(*level) else {
                break;
            };
            let label = match level {
                Level::Project => project.map(|p| p.name.clone()),
                Level::Set => set.map(|s| s.name.clone()),
                Level::Component => structure.map(|s| s.name.clone()),
                Level::Assembly => structure
                    .and_then(|s| s.assembly(id))
                    .map(|a| a.name.clone()),
                Level::Part => None,
            };
            crumbs.push(Crumb {
                level: *level,
                id: id.to_string(),
                label: label.unwrap_or_else(|| id.to_string()),
            });
        }
        crumbs
    }
}

impl Default for CascadeEngine {
    fn default() -> Self {
        Self::navigator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Assembly, Set};

    fn projects() -> Vec<Project> {
        let mut airframe = Set::from_names("set-1", "Airframe Set", ["Center fuselage", "Wing spars"]);
        airframe.structures[0]
            .assemblies
            .push(Assembly::new("Keel beam"));
        vec![
            Project::new("proj-001", "Atlas Sedan Platform")
                .with_set(airframe)
                .with_set(Set::new("set-2", "Trim Set")),
            Project::new("proj-empty", "No Sets Yet"),
        ]
    }

    fn deep_selection() -> Selection {
        Selection {
            project: Some("proj-001".into()),
            set: Some("set-1".into()),
            component: Some("Center fuselage".into()),
            assembly: Some("Keel beam".into()),
            part: Some("P-1001".into()),
        }
    }

    #[test]
    fn test_select_clears_deeper_levels() {
        let engine = CascadeEngine::navigator();
        let next = engine.apply(&deep_selection(), Level::Set, Some("set-2".into()), &projects());
        assert_eq!(next.project.as_deref(), Some("proj-001"));
        assert_eq!(next.set.as_deref(), Some("set-2"));
        assert!(next.component.is_none());
        assert!(next.assembly.is_none());
        assert!(next.part.is_none());
        assert!(engine.is_prefix(&next));
    }

    #[test]
    fn test_prefix_holds_after_every_level_change() {
        let engine = CascadeEngine::navigator();
        let projects = projects();
        for level in Level::all() {
            for value in [None, Some("x".to_string())] {
                let next = engine.apply(&deep_selection(), *level, value, &projects);
                let set_absent = next.set.is_none();
                if set_absent {
                    assert!(next.component.is_none() && next.assembly.is_none() && next.part.is_none());
                }
                assert!(engine.is_prefix(&next));
            }
        }
    }

    #[test]
    fn test_auto_expand_seeds_first_set() {
        let engine = CascadeEngine::navigator().with_auto_expand(true);
        let next = engine.apply(&Selection::default(), Level::Project, Some("proj-001".into()), &projects());
        assert_eq!(next.set.as_deref(), Some("set-1"));
        assert!(next.component.is_none());
    }

    #[test]
    fn test_project_without_sets_leaves_downstream_absent() {
        let projects = projects();
        for engine in [
            CascadeEngine::navigator(),
            CascadeEngine::navigator().with_auto_expand(true),
        ] {
            let next = engine.apply(&deep_selection(), Level::Project, Some("proj-empty".into()), &projects);
            assert_eq!(next.project.as_deref(), Some("proj-empty"));
            assert!(next.set.is_none());
            assert!(next.component.is_none());
            assert!(next.assembly.is_none());
            assert!(next.part.is_none());
        }
    }

    #[test]
    fn test_dangling_project_does_not_panic() {
        let engine = CascadeEngine::navigator().with_auto_expand(true);
        let next = engine.apply(&deep_selection(), Level::Project, Some("proj-missing".into()), &projects());
        assert!(next.set.is_none());
        assert!(engine.path(&next, &projects()).len() == 1);
    }

    #[test]
    fn test_catalog_hierarchy_ignores_component_level() {
        let engine = CascadeEngine::catalog();
        assert!(engine.select(Level::Component, Some("x".into()), &[]).is_empty());

        let patch = engine.select(Level::Set, Some("set-gc".into()), &[]);
        assert_eq!(patch.part, Some(None));
        assert_eq!(patch.component, None);
    }

    #[test]
    fn test_gap_is_tolerated_but_not_a_prefix() {
        let engine = CascadeEngine::navigator();
        let gapped = Selection {
            project: Some("proj-001".into()),
            part: Some("P-1".into()),
            ..Default::default()
        };
        assert!(!engine.is_prefix(&gapped));
        let path = engine.path(&gapped, &projects());
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].label, "Atlas Sedan Platform");
    }

    #[test]
    fn test_path_resolves_labels() {
        let engine = CascadeEngine::navigator();
        let path = engine.path(&deep_selection(), &projects());
        let labels: Vec<&str> = path.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Atlas Sedan Platform", "Airframe Set", "Center fuselage", "Keel beam", "P-1001"]
        );
        assert_eq!(path[2].level.label(), "Structure");
    }

    #[test]
    fn test_merge_does_not_enforce_prefix() {
        let mut selection = Selection::default();
        selection.merge(&SelectionPatch::default().with(Level::Part, Some("P-1".into())));
        assert_eq!(selection.part.as_deref(), Some("P-1"));
        assert!(selection.project.is_none());
    }

    #[test]
    fn test_patch_distinguishes_null_from_missing() {
        let patch: SelectionPatch = serde_json::from_str(r#"{"set": null, "part": "P-1"}"#).unwrap();
        assert_eq!(patch.set, Some(None));
        assert_eq!(patch.part, Some(Some("P-1".to_string())));
        assert_eq!(patch.project, None);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("structure".parse::<Level>().unwrap(), Level::Component);
        assert!("bogus".parse::<Level>().is_err());
    }
}
