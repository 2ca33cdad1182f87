//! Identifier generation for entities created inside the console
//!
//! Identifiers are opaque strings. Ones created locally combine a lowercase
//! type prefix with a ULID (`proj-01J...`, `qt-01J...`); ids arriving from
//! fixtures or the transport collaborator are taken as-is.

use std::fmt;
use ulid::Ulid;

/// Prefixes for locally generated identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdPrefix {
    /// Production project
    Project,
    /// Set within a project
    Set,
    /// Structure draft (wizard)
    Structure,
    /// Assembly draft (wizard)
    Assembly,
    /// Assembly inventory entry (wizard)
    Inventory,
    /// Qualification test on a part
    QcTest,
    /// Project- or set-level QC report
    QcReport,
    /// Timeline discussion comment
    Comment,
}

impl IdPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Project => "proj",
            IdPrefix::Set => "set",
            IdPrefix::Structure => "st",
            IdPrefix::Assembly => "as",
            IdPrefix::Inventory => "inventory",
            IdPrefix::QcTest => "qt",
            IdPrefix::QcReport => "qc",
            IdPrefix::Comment => "cmt",
        }
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generate a fresh identifier with the given prefix
pub fn new_id(prefix: IdPrefix) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// True when `id` looks like one of ours for `prefix`
pub fn has_prefix(id: &str, prefix: IdPrefix) -> bool {
    id.split_once('-')
        .map(|(p, rest)| p == prefix.as_str() && !rest.is_empty())
        .unwrap_or(false)
}
