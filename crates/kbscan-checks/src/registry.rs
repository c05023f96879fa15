//! Check registry - index of all knowledge-base entries

use crate::KbEntry;
use kbscan_core::{CheckKind, Error, Result, Severity};
use std::collections::BTreeMap;
use tracing::warn;

/// Registry of knowledge-base entries, ordered by name.
///
/// The registry holds definitions, not check instances: checks carry
/// per-scan state, so the engine instantiates fresh ones for every target.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    entries: BTreeMap<String, KbEntry>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entry, replacing any entry with the same name
    pub fn register(&mut self, entry: KbEntry) {
        let name = entry.name().to_string();
        if self.entries.insert(name.clone(), entry).is_some() {
            warn!(check = %name, "duplicate knowledge-base entry, keeping the latest");
        }
    }

    pub fn get(&self, name: &str) -> Option<&KbEntry> {
        self.entries.get(name)
    }

    /// Like [`CheckRegistry::get`], failing for unknown names
    pub fn require(&self, name: &str) -> Result<&KbEntry> {
        self.get(name).ok_or_else(|| Error::CheckNotFound {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    pub fn all(&self) -> impl Iterator<Item = &KbEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn by_kind(&self, kind: CheckKind) -> Vec<&KbEntry> {
        self.entries.values().filter(|e| e.kind() == kind).collect()
    }

    /// Entries whose `applies` list names the framework
    pub fn applicable_to(&self, framework: &str) -> Vec<&KbEntry> {
        self.entries
            .values()
            .filter(|e| e.applies_to(framework))
            .collect()
    }

    pub fn by_min_severity(&self, min_severity: Severity) -> Vec<&KbEntry> {
        self.entries
            .values()
            .filter(|e| e.severity() >= min_severity)
            .collect()
    }

    /// Drop every entry whose kind is not listed. An empty list keeps everything.
    pub fn retain_kinds(&mut self, kinds: &[CheckKind]) {
        if kinds.is_empty() {
            return;
        }
        self.entries.retain(|_, e| kinds.contains(&e.kind()));
    }
}
