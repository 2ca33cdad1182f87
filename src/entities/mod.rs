//! Entity type definitions
//!
//! The production hierarchy is:
//!
//! - [`Project`] - a production program, owned by the store
//! - [`Set`] - a named subdivision of a project
//! - [`Structure`] - a subdivision of a set
//! - [`Assembly`] - the smallest tracked build unit under a structure
//!
//! Editor catalogs hold [`Part`]s and their [`QcTest`]s independently of
//! the store. Projects and sets carry narrative [`QcReport`]s.

pub mod part;
pub mod project;
pub mod set;

pub use part::{Part, QcTest};
pub use project::{Attachment, Project, ProjectPatch, QcReport};
pub use set::{normalize_structures, Assembly, AssemblyEntry, Set, Structure, StructureEntry};
