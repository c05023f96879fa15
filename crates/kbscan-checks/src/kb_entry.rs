//! Knowledge-base entries defined in YAML

use kbscan_core::{
    BasicCheck, Check, CheckConfig, CheckKind, Dependency, DependencyCheck, Severity,
    TargetApplication,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One catalogued weakness as stored in the knowledge base.
///
/// ```yaml
/// name: CVE-2013-0269
/// kind: dependency
/// cvss: "AV:N/AC:L/Au:N/C:N/I:P/A:P"
/// applies: [rails, sinatra, padrino]
/// safe_dependencies:
///   - name: json
///     version: "1.7.7"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbEntry {
    #[serde(flatten)]
    pub config: CheckConfig,

    /// Fix boundaries, for `kind: dependency`
    #[serde(default)]
    pub safe_dependencies: Vec<Dependency>,

    /// Dependency whose presence neutralises the weakness
    #[serde(default)]
    pub mitigation_dependency: Option<String>,
}

impl KbEntry {
    /// Parse an entry from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let entry: KbEntry = serde_yaml::from_str(yaml)?;
        entry.warn_if_inert();
        Ok(entry)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn kind(&self) -> CheckKind {
        self.config.kind
    }

    /// Severity declared by the entry, `Info` when absent
    pub fn severity(&self) -> Severity {
        self.config.severity.unwrap_or_default()
    }

    /// Whether the entry targets the framework. Entries without an
    /// `applies` list target nothing.
    pub fn applies_to(&self, framework: &str) -> bool {
        self.config.applies.iter().any(|a| a == framework)
    }

    /// Build a fresh check instance loaded with the target's facts
    pub fn instantiate(&self, target: &TargetApplication) -> Box<dyn Check> {
        match self.config.kind {
            CheckKind::Dependency => {
                let mut check =
                    DependencyCheck::new(self.config.clone(), self.safe_dependencies.clone());
                if let Some(mitigation) = &self.mitigation_dependency {
                    check = check.with_mitigation(mitigation);
                }
                check.set_dependencies(target.dependencies.clone());
                check
                    .basic_mut()
                    .set_runtime_version(target.runtime_version.clone());
                Box::new(check)
            }
            CheckKind::Version => {
                let mut check = BasicCheck::new(self.config.clone());
                if let Some(version) = target.framework_version() {
                    check.set_target_version(Some(version.to_string()));
                }
                check.set_runtime_version(target.runtime_version.clone());
                Box::new(check)
            }
        }
    }

    // Entries without fix data load fine but can never fire
    fn warn_if_inert(&self) {
        let inert = match self.config.kind {
            CheckKind::Dependency => self.safe_dependencies.is_empty(),
            CheckKind::Version => self.config.fixes_version.is_empty(),
        };
        if inert {
            warn!(
                check = %self.config.name,
                kind = %self.config.kind,
                "knowledge-base entry has no fix versions and will never report"
            );
        }
    }
}
