//! KBScan Checks - Knowledge base, check registry and scan engine
//!
//! This crate provides:
//! - `KbEntry`: YAML knowledge-base entries and their check instantiation
//! - `CheckRegistry`: index of all loaded entries
//! - Loader reading entries from a directory tree
//! - `ScanEngine`: evaluates the registry against a target application

pub mod engine;
pub mod kb_entry;
pub mod loader;
pub mod registry;

pub use engine::{ScanEngine, ScanReport, SeverityCounts};
pub use kb_entry::KbEntry;
pub use loader::load_checks_from_dir;
pub use registry::CheckRegistry;
