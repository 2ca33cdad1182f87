//! Navigation shell: sidebar, header and tree view
//!
//! Pure consumers of the store; intent is forwarded as actions.

pub mod header;
pub mod navigator;
pub mod tree_view;

pub use navigator::{Navigator, TreeLine};
