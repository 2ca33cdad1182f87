//! Project creation wizard
//!
//! Four steps: basics, sets, structures and assemblies, review. Moving
//! forward out of the basics step requires a valid basics form. Submitting
//! builds a Draft project whose sets are given in the legacy name-list shape
//! and left for the store to normalize on ingestion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::action::Action;
use crate::core::entity::ProjectStatus;
use crate::core::identity::{new_id, IdPrefix};
use crate::core::store::{find_project, Store};
use crate::core::url::{HistoryMode, Location, UrlState, UrlSync};
use crate::core::validation::ValidationErrors;
use crate::entities::{normalize_structures, Assembly, AssemblyEntry, Project, Set, StructureEntry};

/// Structure that receives assemblies when a set has none of its own
pub const UNASSIGNED_STRUCTURE: &str = "Unassigned";

/// Categories offered by the basics step
pub const CATEGORIES: [&str; 3] = ["Aerial", "Ballistic", "Naval"];

pub const PROJECT_TYPES: [&str; 2] = ["Special", "Conventional"];

/// Errors raised while importing sets from an existing project
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("Please select a project to import from first.")]
    NoProjectSelected,

    #[error("The selected project does not contain any sets to import yet.")]
    NoSets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    Basics,
    Sets,
    Structures,
    Review,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::Basics,
            WizardStep::Sets,
            WizardStep::Structures,
            WizardStep::Review,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::Basics => "Project details",
            WizardStep::Sets => "Sets & templates",
            WizardStep::Structures => "Structures & assemblies",
            WizardStep::Review => "Review & create",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            WizardStep::Basics => "Name, code, category, and type",
            WizardStep::Sets => "Add sets or import from existing projects",
            WizardStep::Structures => "Capture structures and assemblies per set",
            WizardStep::Review => "Confirm details before creating the project",
        }
    }
}

/// Where a step sits relative to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Complete,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectForm {
    pub name: String,
    pub code: String,
    pub category: String,
    pub project_type: String,
    pub visibility: bool,
    pub description: String,
    /// Blank means "Unassigned"
    pub owner: String,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            code: String::new(),
            category: String::new(),
            project_type: String::new(),
            visibility: true,
            description: String::new(),
            owner: String::new(),
        }
    }
}

impl ProjectForm {
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors
            .require("name", Some(self.name.as_str()), "Project name is required")
            .require("code", Some(self.code.as_str()), "Project code is required")
            .require("category", Some(self.category.as_str()), "Select a category")
            .require(
                "projectType",
                Some(self.project_type.as_str()),
                "Choose Special or Conventional",
            );
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftStructure {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftAssembly {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub saved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub structures: Vec<DraftStructure>,
    #[serde(default)]
    pub assemblies: Vec<DraftAssembly>,
}

impl DraftSet {
    /// Starter set every new wizard opens with
    fn starter() -> Self {
        Self {
            id: "set-1".to_string(),
            name: "Set 1".to_string(),
            description: "Default starter set".to_string(),
            structures: vec![DraftStructure {
                id: "st-1".to_string(),
                name: "Structure 1".to_string(),
                material: "Composite".to_string(),
            }],
            assemblies: vec![DraftAssembly {
                id: "as-1".to_string(),
                name: "Assembly 1".to_string(),
                description: "Baseline assembly for this set".to_string(),
                source: "Local".to_string(),
                saved: true,
            }],
        }
    }

    /// Convert to a store set, going through the legacy name-list shape
    fn into_set(self) -> Set {
        let mut entries: Vec<StructureEntry> = self
            .structures
            .iter()
            .map(|s| s.name.trim())
            .filter(|name| !name.is_empty())
            .map(StructureEntry::from)
            .collect();

        let assemblies: Vec<Assembly> = self
            .assemblies
            .iter()
            .map(|a| a.name.trim())
            .filter(|name| !name.is_empty())
            .map(|name| Assembly::from(AssemblyEntry::Name(name.to_string())))
            .collect();

        if !assemblies.is_empty() {
            if entries.is_empty() {
                entries.push(StructureEntry::from(UNASSIGNED_STRUCTURE));
            }
            let first = entries.remove(0);
            let mut holder = crate::entities::Structure::from(first);
            holder.assemblies.extend(assemblies);
            entries.insert(0, StructureEntry::from(holder));
        }

        let mut set = Set::new(self.id, self.name);
        if !self.description.trim().is_empty() {
            set.description = Some(self.description);
        }
        set.structures = normalize_structures(entries);
        set
    }
}

/// An assembly that can be dropped into any draft set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectWizard {
    step: usize,
    pub form: ProjectForm,
    sets: Vec<DraftSet>,
    inventory: Vec<InventoryItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alert: Option<String>,
}

impl ProjectWizard {
    /// Open the wizard; the inventory is seeded from existing projects
    pub fn new(projects: &[Project]) -> Self {
        let mut wizard = Self {
            step: 0,
            form: ProjectForm::default(),
            sets: vec![DraftSet::starter()],
            inventory: Vec::new(),
            alert: None,
        };
        wizard.refresh_inventory(projects);
        wizard
    }

    pub fn step(&self) -> WizardStep {
        WizardStep::all()[self.step.min(WizardStep::all().len() - 1)]
    }

    /// Percentage of steps reached, current one included
    pub fn progress(&self) -> u8 {
        let total = WizardStep::all().len();
        (((self.step + 1) * 100 + total / 2) / total) as u8
    }

    pub fn step_states(&self) -> Vec<(WizardStep, StepState)> {
        WizardStep::all()
            .iter()
            .enumerate()
            .map(|(idx, step)| {
                let state = match idx.cmp(&self.step) {
                    std::cmp::Ordering::Less => StepState::Complete,
                    std::cmp::Ordering::Equal => StepState::Active,
                    std::cmp::Ordering::Greater => StepState::Upcoming,
                };
                (*step, state)
            })
            .collect()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn sets(&self) -> &[DraftSet] {
        &self.sets
    }

    pub fn set_mut(&mut self, set_id: &str) -> Option<&mut DraftSet> {
        self.sets.iter_mut().find(|s| s.id == set_id)
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    /// Move one step forward
    ///
    /// Leaving the basics step requires a valid form. The last step is a
    /// ceiling.
    pub fn next(&mut self) -> Result<WizardStep, ValidationErrors> {
        if self.step() == WizardStep::Basics {
            self.form.validate().into_result()?;
        }
        self.alert = None;
        self.step = (self.step + 1).min(WizardStep::all().len() - 1);
        Ok(self.step())
    }

    pub fn back(&mut self) -> WizardStep {
        self.alert = None;
        self.step = self.step.saturating_sub(1);
        self.step()
    }

    pub fn add_set(&mut self) -> &DraftSet {
        let name = format!("Set {}", self.sets.len() + 1);
        self.sets.push(DraftSet {
            id: new_id(IdPrefix::Set),
            name,
            description: String::new(),
            structures: Vec::new(),
            assemblies: Vec::new(),
        });
        &self.sets[self.sets.len() - 1]
    }

    pub fn add_structure(&mut self, set_id: &str) -> Option<&DraftStructure> {
        let set = self.set_mut(set_id)?;
        let name = format!("Structure {}", set.structures.len() + 1);
        set.structures.push(DraftStructure {
            id: new_id(IdPrefix::Structure),
            name,
            material: String::new(),
        });
        set.structures.last()
    }

    pub fn add_assembly(&mut self, set_id: &str) -> Option<&DraftAssembly> {
        let set = self.set_mut(set_id)?;
        let name = format!("Assembly {}", set.assemblies.len() + 1);
        set.assemblies.push(DraftAssembly {
            id: new_id(IdPrefix::Assembly),
            name,
            description: String::new(),
            source: "Local".to_string(),
            saved: false,
        });
        set.assemblies.last()
    }

    /// Copy an inventory assembly into a set; misses are no-ops
    pub fn add_assembly_from_inventory(&mut self, set_id: &str, inventory_id: &str) -> Option<&DraftAssembly> {
        let template = self.inventory.iter().find(|i| i.id == inventory_id)?.clone();
        let set = self.set_mut(set_id)?;
        set.assemblies.push(DraftAssembly {
            id: new_id(IdPrefix::Assembly),
            name: template.name,
            description: template.description,
            source: template.source,
            saved: true,
        });
        set.assemblies.last()
    }

    /// Save a draft assembly to the inventory
    ///
    /// Names are compared case-insensitively; blank or known names are
    /// skipped and `false` is returned.
    pub fn save_to_inventory(&mut self, set_id: &str, assembly_id: &str) -> bool {
        let Some(assembly) = self
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
            .and_then(|s| s.assemblies.iter_mut().find(|a| a.id == assembly_id))
        else {
            return false;
        };
        let name = assembly.name.trim().to_string();
        if name.is_empty() || self.inventory.iter().any(|i| i.name.eq_ignore_ascii_case(&name)) {
            return false;
        }
        assembly.saved = true;
        let description = if assembly.description.trim().is_empty() {
            "Saved from project wizard".to_string()
        } else {
            assembly.description.clone()
        };
        self.inventory.push(InventoryItem {
            id: new_id(IdPrefix::Inventory),
            name,
            description,
            source: "Wizard inventory".to_string(),
        });
        true
    }

    pub fn is_in_inventory(&self, name: &str) -> bool {
        let name = name.trim();
        self.inventory.iter().any(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Pull assemblies of existing projects into the inventory
    ///
    /// Entries are keyed `<project>-<set>-<index>`; ones already present are
    /// not added twice.
    pub fn refresh_inventory(&mut self, projects: &[Project]) {
        for project in projects {
            for set in &project.sets {
                for (idx, name) in set.assembly_names().into_iter().enumerate() {
                    let id = format!("{}-{}-{}", project.id, set.id, idx);
                    if self.inventory.iter().any(|i| i.id == id) {
                        continue;
                    }
                    self.inventory.push(InventoryItem {
                        id,
                        name: name.to_string(),
                        description: "Imported from existing project".to_string(),
                        source: format!("{} / {}", project.name, set.name),
                    });
                }
            }
        }
    }

    /// Replace the draft sets with copies of another project's sets
    pub fn import_sets(&mut self, projects: &[Project], project_id: Option<&str>) -> Result<usize, WizardError> {
        let result = self.try_import(projects, project_id);
        self.alert = Some(match &result {
            Ok(count) => format!(
                "Imported {} set(s) from {} for reuse.",
                count,
                project_id.and_then(|id| find_project(projects, id)).map_or("", |p| p.name.as_str())
            ),
            Err(e) => e.to_string(),
        });
        result
    }

    fn try_import(&mut self, projects: &[Project], project_id: Option<&str>) -> Result<usize, WizardError> {
        let template = project_id
            .and_then(|id| find_project(projects, id))
            .ok_or(WizardError::NoProjectSelected)?;
        if template.sets.is_empty() {
            return Err(WizardError::NoSets);
        }

        self.sets = template
            .sets
            .iter()
            .enumerate()
            .map(|(index, set)| DraftSet {
                id: format!("import-{}", index + 1),
                name: set.name.clone(),
                description: format!("Imported from {}", template.name),
                structures: set
                    .structures
                    .iter()
                    .enumerate()
                    .map(|(idx, s)| DraftStructure {
                        id: format!("st-{}-{}", index + 1, idx + 1),
                        name: s.name.clone(),
                        material: "Imported".to_string(),
                    })
                    .collect(),
                assemblies: set
                    .assembly_names()
                    .into_iter()
                    .enumerate()
                    .map(|(idx, name)| DraftAssembly {
                        id: format!("as-{}-{}", index + 1, idx + 1),
                        name: name.to_string(),
                        description: String::new(),
                        source: "Imported".to_string(),
                        saved: false,
                    })
                    .collect(),
            })
            .collect();
        tracing::debug!(from = %template.id, count = self.sets.len(), "imported sets");
        Ok(self.sets.len())
    }

    /// Build the project the wizard describes
    pub fn build(&self) -> Result<Project, ValidationErrors> {
        self.form.validate().into_result()?;

        let form = &self.form;
        let mut project = Project::new(new_id(IdPrefix::Project), form.name.trim());
        project.code = form.code.trim().to_string();
        project.description = form.description.trim().to_string();
        project.status = ProjectStatus::Draft;
        project.owner = match form.owner.trim() {
            "" => "Unassigned".to_string(),
            owner => owner.to_string(),
        };
        project.system = "TBD".to_string();
        project.category = Some(form.category.trim().to_string());
        project.project_type = Some(form.project_type.trim().to_string());
        project.visibility = Some(form.visibility);
        project.sets = self.sets.iter().cloned().map(DraftSet::into_set).collect();
        Ok(project)
    }

    /// Create the project and open its tree view as a new history entry
    pub fn submit(&self, store: &mut Store, sync: &mut UrlSync) -> Result<String, ValidationErrors> {
        let project = self.build()?;
        let id = project.id.clone();
        store.dispatch(Action::AddProject { project });

        let target = Location::tree_view(&UrlState {
            project: Some(id.clone()),
            ..Default::default()
        });
        sync.open(store, target, HistoryMode::Push);
        tracing::info!(project = %id, "project created");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::AppState;
    use crate::entities::Structure;

    fn existing() -> Vec<Project> {
        let set = Set {
            structures: vec![Structure::new("Center fuselage")
                .with_assembly(Assembly::new("Keel Beam"))
                .with_assembly(Assembly::new("Floor Grid"))],
            ..Set::new("set-1", "Fuselage")
        };
        vec![
            Project::new("proj-001", "Atlas").with_set(set),
            Project::new("proj-002", "Skyline"),
        ]
    }

    fn filled() -> ProjectWizard {
        let mut wizard = ProjectWizard::new(&existing());
        wizard.form.name = "Falcon".to_string();
        wizard.form.code = "FAL-1".to_string();
        wizard.form.category = "Aerospace".to_string();
        wizard.form.project_type = "Special".to_string();
        wizard
    }

    #[test]
    fn test_basics_gate_forward_navigation() {
        let mut wizard = ProjectWizard::new(&[]);
        let errors = wizard.next().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("projectType"), Some("Choose Special or Conventional"));
        assert_eq!(wizard.step(), WizardStep::Basics);

        let mut wizard = filled();
        assert_eq!(wizard.next(), Ok(WizardStep::Sets));
        assert_eq!(wizard.progress(), 50);
        assert_eq!(wizard.back(), WizardStep::Basics);
        assert_eq!(wizard.back(), WizardStep::Basics);
    }

    #[test]
    fn test_step_states() {
        let mut wizard = filled();
        wizard.next().unwrap();
        let states: Vec<StepState> = wizard.step_states().into_iter().map(|(_, s)| s).collect();
        assert_eq!(
            states,
            vec![StepState::Complete, StepState::Active, StepState::Upcoming, StepState::Upcoming]
        );
    }

    #[test]
    fn test_last_step_is_a_ceiling() {
        let mut wizard = filled();
        for _ in 0..6 {
            wizard.next().unwrap();
        }
        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.progress(), 100);
    }

    #[test]
    fn test_empty_name_and_code_give_two_errors() {
        let mut wizard = filled();
        wizard.form.name = String::new();
        wizard.form.code = "  ".to_string();
        let errors = wizard.build().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.get("name").is_some());
        assert!(errors.get("code").is_some());
    }

    #[test]
    fn test_import_errors_set_alert() {
        let mut wizard = ProjectWizard::new(&existing());
        assert_eq!(wizard.import_sets(&existing(), None), Err(WizardError::NoProjectSelected));
        assert_eq!(wizard.alert(), Some("Please select a project to import from first."));
        assert_eq!(wizard.import_sets(&existing(), Some("proj-002")), Err(WizardError::NoSets));
        assert_eq!(wizard.sets().len(), 1);
    }

    #[test]
    fn test_import_copies_structures_and_assemblies() {
        let mut wizard = ProjectWizard::new(&existing());
        assert_eq!(wizard.import_sets(&existing(), Some("proj-001")), Ok(1));
        assert_eq!(wizard.alert(), Some("Imported 1 set(s) from Atlas for reuse."));
        let set = &wizard.sets()[0];
        assert_eq!(set.id, "import-1");
        assert_eq!(set.structures[0].name, "Center fuselage");
        assert_eq!(set.assemblies.len(), 2);
    }

    #[test]
    fn test_inventory_is_seeded_and_case_insensitive() {
        let mut wizard = ProjectWizard::new(&existing());
        assert_eq!(wizard.inventory().len(), 2);
        assert_eq!(wizard.inventory()[0].id, "proj-001-set-1-0");
        wizard.refresh_inventory(&existing());
        assert_eq!(wizard.inventory().len(), 2);

        let assembly_id = wizard.add_assembly("set-1").unwrap().id.clone();
        wizard.set_mut("set-1").unwrap().assemblies.last_mut().unwrap().name = "KEEL BEAM".to_string();
        assert!(!wizard.save_to_inventory("set-1", &assembly_id));

        wizard.set_mut("set-1").unwrap().assemblies.last_mut().unwrap().name = "Wing Root".to_string();
        assert!(wizard.save_to_inventory("set-1", &assembly_id));
        assert!(wizard.is_in_inventory("wing root"));
    }

    #[test]
    fn test_add_from_inventory() {
        let mut wizard = ProjectWizard::new(&existing());
        let item = wizard.inventory()[1].id.clone();
        let added = wizard.add_assembly_from_inventory("set-1", &item).unwrap();
        assert_eq!(added.name, "Floor Grid");
        assert!(added.saved);
        assert!(wizard.add_assembly_from_inventory("set-1", "missing").is_none());
    }

    #[test]
    fn test_build_produces_normalized_draft_project() {
        let wizard = filled();
        let project = wizard.build().unwrap();
        assert!(project.id.starts_with("proj-"));
        assert_eq!(project.status, ProjectStatus::Draft);
        assert_eq!(project.owner, "Unassigned");
        assert_eq!(project.system, "TBD");

        let set = &project.sets[0];
        assert_eq!(set.structures[0].name, "Structure 1");
        assert_eq!(set.structures[0].status, "Draft");
        assert_eq!(set.assembly_names(), vec!["Assembly 1"]);
    }

    #[test]
    fn test_assemblies_without_structures_get_a_holder() {
        let mut wizard = filled();
        wizard.set_mut("set-1").unwrap().structures.clear();
        let project = wizard.build().unwrap();
        assert_eq!(project.sets[0].structures[0].name, UNASSIGNED_STRUCTURE);
    }

    #[test]
    fn test_submit_adds_project_and_pushes_tree_view() {
        let mut store = Store::new(AppState::with_projects(existing()));
        let mut sync = UrlSync::default();
        let wizard = filled();

        let id = wizard.submit(&mut store, &mut sync).unwrap();
        let state = store.state();
        assert_eq!(state.projects.len(), 3);
        assert_eq!(state.active_project_id.as_deref(), Some(id.as_str()));
        assert_eq!(sync.history().depth(), 2);
        assert_eq!(sync.location().path, "/production/treeview");
        assert!(sync.location().query.contains(&id));
    }
}
