//! Target application facts supplied to checks at scan time

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named dependency at a given version.
///
/// Used both for the dependencies observed in a target and for the fix
/// boundaries declared by a knowledge-base entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Framework the target application is built on (e.g. rails 3.2.13)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    pub name: String,
    pub version: Option<String>,
}

/// Everything a scan knows about the application under test
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetApplication {
    /// Display name for reports
    pub name: String,

    /// Framework in use, if detected
    #[serde(default)]
    pub framework: Option<Framework>,

    /// Runtime / interpreter version (e.g. "1.9.3")
    #[serde(default)]
    pub runtime_version: Option<String>,

    /// Declared dependencies, in manifest order
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl TargetApplication {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_framework(mut self, name: impl Into<String>, version: Option<String>) -> Self {
        self.framework = Some(Framework {
            name: name.into(),
            version,
        });
        self
    }

    pub fn with_runtime(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = Some(version.into());
        self
    }

    pub fn with_dependency(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.dependencies.push(Dependency::new(name, version));
        self
    }

    pub fn framework_name(&self) -> Option<&str> {
        self.framework.as_ref().map(|f| f.name.as_str())
    }

    pub fn framework_version(&self) -> Option<&str> {
        self.framework.as_ref().and_then(|f| f.version.as_deref())
    }

    /// Load a target description from a YAML or JSON file, chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let target: Self = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        if target.name.trim().is_empty() {
            return Err(Error::InvalidTarget(format!(
                "{}: target name must not be empty",
                path.display()
            )));
        }

        Ok(target)
    }
}
