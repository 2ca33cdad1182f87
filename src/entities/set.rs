//! Set, Structure and Assembly entity types
//!
//! Sets and structures have historically been exchanged in two shapes: a
//! plain list of names, or a list of objects carrying `name`/`status`. Both
//! are accepted on input through [`StructureEntry`] and [`AssemblyEntry`] and
//! resolved to the canonical object form exactly once, during
//! deserialization or through [`normalize_structures`]. Readers only ever see
//! [`Structure`] and [`Assembly`].

use serde::{Deserialize, Serialize};

use crate::entities::project::QcReport;

/// Status given to structures and assemblies that arrive without one
pub const DEFAULT_STATUS: &str = "Draft";

/// Smallest tracked build unit under a structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AssemblyEntry")]
pub struct Assembly {
    pub name: String,
    pub status: String,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DEFAULT_STATUS.to_string(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// Wire shape of an assembly: a bare name or an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssemblyEntry {
    Name(String),
    Object {
        name: String,
        #[serde(default)]
        status: Option<String>,
    },
}

impl From<AssemblyEntry> for Assembly {
    fn from(entry: AssemblyEntry) -> Self {
        match entry {
            AssemblyEntry::Name(name) => Assembly::new(name),
            AssemblyEntry::Object { name, status } => Assembly {
                name,
                status: status_or_default(status),
            },
        }
    }
}

impl From<Assembly> for AssemblyEntry {
    fn from(assembly: Assembly) -> Self {
        AssemblyEntry::Object {
            name: assembly.name,
            status: Some(assembly.status),
        }
    }
}

/// Physical or logical subdivision of a set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StructureEntry")]
pub struct Structure {
    pub name: String,
    pub status: String,
    pub assemblies: Vec<Assembly>,
}

impl Structure {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DEFAULT_STATUS.to_string(),
            assemblies: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_assembly(mut self, assembly: Assembly) -> Self {
        self.assemblies.push(assembly);
        self
    }

    /// Find an assembly by name
    pub fn assembly(&self, name: &str) -> Option<&Assembly> {
        self.assemblies.iter().find(|a| a.name == name)
    }
}

/// Wire shape of a structure: a bare name or an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructureEntry {
    Name(String),
    Object {
        name: String,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        assemblies: Vec<Assembly>,
    },
}

impl From<StructureEntry> for Structure {
    fn from(entry: StructureEntry) -> Self {
        match entry {
            StructureEntry::Name(name) => Structure::new(name),
            StructureEntry::Object {
                name,
                status,
                assemblies,
            } => Structure {
                name,
                status: status_or_default(status),
                assemblies,
            },
        }
    }
}

impl From<Structure> for StructureEntry {
    fn from(structure: Structure) -> Self {
        StructureEntry::Object {
            name: structure.name,
            status: Some(structure.status),
            assemblies: structure.assemblies,
        }
    }
}

impl From<&str> for StructureEntry {
    fn from(name: &str) -> Self {
        StructureEntry::Name(name.to_string())
    }
}

/// Resolve a list of structure entries to the canonical shape
///
/// Idempotent: feeding the output back in (as [`StructureEntry::Object`])
/// yields an identical list, and an existing non-blank status is never
/// replaced.
pub fn normalize_structures<I, E>(entries: I) -> Vec<Structure>
where
    I: IntoIterator<Item = E>,
    E: Into<StructureEntry>,
{
    entries
        .into_iter()
        .map(|entry| {
            let mut structure = Structure::from(entry.into());
            structure.normalize();
            structure
        })
        .collect()
}

impl Structure {
    /// Fill blank statuses in place; returns true if anything changed
    pub fn normalize(&mut self) -> bool {
        let mut changed = fill_blank_status(&mut self.status);
        for assembly in &mut self.assemblies {
            changed |= fill_blank_status(&mut assembly.status);
        }
        changed
    }
}

/// Named subdivision of a project grouping related structures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Set {
    pub id: String,

    pub name: String,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub structures: Vec<Structure>,

    #[serde(default)]
    pub qc_reports: Vec<QcReport>,
}

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

impl Set {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: default_status(),
            description: None,
            structures: Vec::new(),
            qc_reports: Vec::new(),
        }
    }

    /// Build a set from a legacy list of structure names
    pub fn from_names<I, S>(id: impl Into<String>, name: impl Into<String>, structures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Set::new(id, name);
        set.structures = normalize_structures(structures.into_iter().map(|s| s.as_ref().to_string()).map(StructureEntry::Name));
        set
    }

    /// Find a structure by name
    pub fn structure(&self, name: &str) -> Option<&Structure> {
        self.structures.iter().find(|s| s.name == name)
    }

    /// Names of every assembly across all structures, in order
    pub fn assembly_names(&self) -> Vec<&str> {
        self.structures
            .iter()
            .flat_map(|s| s.assemblies.iter().map(|a| a.name.as_str()))
            .collect()
    }

    /// Fill blank statuses on the set and everything below it
    pub fn normalize(&mut self) -> bool {
        let mut changed = fill_blank_status(&mut self.status);
        for structure in &mut self.structures {
            changed |= structure.normalize();
        }
        changed
    }
}

fn status_or_default(status: Option<String>) -> String {
    match status {
        Some(s) if !s.trim().is_empty() => s,
        _ => default_status(),
    }
}

fn fill_blank_status(status: &mut String) -> bool {
    if status.trim().is_empty() {
        *status = default_status();
        true
    } else {
        false
    }
}
