//! Knowledge-base loader - loads entries from YAML files

use crate::{CheckRegistry, KbEntry};
use kbscan_core::{Error, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load every `.yaml` / `.yml` entry below a directory.
///
/// Files that fail to parse are logged and skipped so that one broken entry
/// does not take the whole knowledge base down.
pub fn load_checks_from_dir(dir: impl AsRef<Path>) -> Result<CheckRegistry> {
    let dir = dir.as_ref();
    let mut registry = CheckRegistry::new();

    if !dir.is_dir() {
        return Err(Error::FileNotFound {
            path: dir.display().to_string(),
        });
    }

    info!("Loading knowledge base from: {}", dir.display());
    load_recursive(&mut registry, dir)?;

    info!("Loaded {} knowledge-base entries", registry.len());
    Ok(registry)
}

fn load_recursive(registry: &mut CheckRegistry, dir: &Path) -> Result<()> {
    let mut paths = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    // Stable order so duplicate resolution does not depend on the filesystem
    paths.sort();

    for path in paths {
        if path.is_dir() {
            load_recursive(registry, &path)?;
        } else if let Some(ext) = path.extension() {
            if ext == "yaml" || ext == "yml" {
                match load_kb_entry(&path) {
                    Ok(entry) => {
                        debug!("Loaded entry: {} from {}", entry.name(), path.display());
                        registry.register(entry);
                    }
                    Err(e) => {
                        warn!("Failed to load entry from {}: {}", path.display(), e);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Load a single knowledge-base entry
pub fn load_kb_entry(path: &Path) -> Result<KbEntry> {
    let content = std::fs::read_to_string(path)?;

    KbEntry::from_yaml(&content).map_err(|e| Error::InvalidCheckDefinition {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
