//! KBScan Core - Check abstractions, version comparison and error handling
//!
//! This crate provides the core abstractions of the KBScan engine:
//! - `VersionComparator`: decides whether a version predates a fix version
//! - `Check`: the trait every knowledge-base check implements
//! - `BasicCheck`, `DependencyCheck`: framework version and dependency checks
//! - `Finding`, `Severity`, `CheckKind`: reporting types

pub mod check;
pub mod cvss;
pub mod dependency;
pub mod error;
pub mod finding;
pub mod severity;
pub mod target;
pub mod version;

// Re-export commonly used types at crate root
pub use check::{BasicCheck, Check, CheckConfig};
pub use cvss::CvssScorer;
pub use dependency::DependencyCheck;
pub use error::{Error, Result};
pub use finding::{Finding, FindingBuilder};
pub use severity::{CheckKind, Severity};
pub use target::{Dependency, Framework, TargetApplication};
pub use version::VersionComparator;
