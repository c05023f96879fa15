//! Dependency checks - vulnerable library versions in a target's dependency set

use crate::check::{BasicCheck, Check, CheckConfig};
use crate::target::Dependency;
use crate::version::VersionComparator;
use tracing::debug;

/// A check that fires when the target depends on a vulnerable version of a library.
///
/// Some weaknesses are reachable through more than one library, so
/// `safe_dependencies` may name several. A dependency listed as
/// `mitigation_dependency` neutralises the finding whatever its version.
#[derive(Debug, Clone)]
pub struct DependencyCheck {
    basic: BasicCheck,
    dependencies: Vec<Dependency>,
    safe_dependencies: Vec<Dependency>,
    mitigation_dependency: Option<String>,
}

impl DependencyCheck {
    pub fn new(config: CheckConfig, safe_dependencies: Vec<Dependency>) -> Self {
        Self {
            basic: BasicCheck::new(config),
            dependencies: Vec::new(),
            safe_dependencies,
            mitigation_dependency: None,
        }
    }

    pub fn with_mitigation(mut self, dependency: impl Into<String>) -> Self {
        self.mitigation_dependency = Some(dependency.into());
        self
    }

    /// Replace the observed dependency set
    pub fn set_dependencies(&mut self, dependencies: Vec<Dependency>) {
        self.dependencies = dependencies;
    }
}

impl Check for DependencyCheck {
    fn basic(&self) -> &BasicCheck {
        &self.basic
    }

    fn basic_mut(&mut self) -> &mut BasicCheck {
        &mut self.basic
    }

    fn vuln(&mut self) -> bool {
        let mut vulnerable = false;
        let mut mitigated = false;
        let mut message = String::new();
        let runtime_required = !self
            .basic
            .config()
            .runtime_vulnerable_versions
            .is_empty();

        for dep in &self.dependencies {
            // Version of the mitigating dependency is not considered
            if self.mitigation_dependency.as_deref() == Some(dep.name.as_str()) {
                mitigated = true;
            }

            for safe in &self.safe_dependencies {
                if dep.name != safe.name {
                    continue;
                }
                if !VersionComparator::is_vulnerable(Some(dep.version.as_str()), &[&safe.version]) {
                    continue;
                }
                if runtime_required && !self.is_runtime_vulnerable() {
                    continue;
                }

                vulnerable = true;
                // Last match wins for the message
                message = format!(
                    "Vulnerable {} dependency version found: {}",
                    dep.name, dep.version
                );
            }
        }

        if vulnerable && mitigated {
            vulnerable = false;
            if let Some(mitigation) = &self.mitigation_dependency {
                message.push_str(&format!(
                    ". Vulnerability has been mitigated by dependency {}. Don't remove it from your dependency manifest",
                    mitigation
                ));
            }
        }

        debug!(
            check = %self.name(),
            dependencies = self.dependencies.len(),
            vulnerable,
            mitigated,
            "evaluated dependency check"
        );

        if !message.is_empty() {
            self.basic.push_evidence(message);
        }
        self.basic.set_mitigated(mitigated);
        self.basic.set_status(vulnerable);

        vulnerable
    }
}
