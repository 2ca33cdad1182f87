//! prodcfg: Production Configuration Console
//!
//! Tracks production programs and their set/structure/assembly hierarchy,
//! keeps the sidebar selection consistent, mirrors the navigation state in
//! a shareable query string and hosts the configuration editors.

pub mod cli;
pub mod core;
pub mod editors;
pub mod entities;
pub mod shell;
