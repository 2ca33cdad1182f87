//! CLI command implementations

pub mod build;
pub mod completions;
pub mod init;
pub mod nav;
pub mod part;
pub mod project;
pub mod qual;
pub mod select;
pub mod timeline;
pub mod tree;
