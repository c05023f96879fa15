//! Check trait and the basic version check - the interface all knowledge-base checks implement

use crate::cvss::CvssScorer;
use crate::error::Result;
use crate::severity::{CheckKind, Severity};
use crate::version::VersionComparator;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The trait that all knowledge-base checks must implement.
///
/// Implementors embed a [`BasicCheck`] holding the catalogued metadata and
/// the evaluation state; every method except [`Check::vuln`] has a default
/// implementation working on it.
pub trait Check: Send + Sync {
    /// The embedded basic check
    fn basic(&self) -> &BasicCheck;

    /// Mutable access to the embedded basic check
    fn basic_mut(&mut self) -> &mut BasicCheck;

    /// Evaluate the check against the facts it was given.
    ///
    /// Overwrites `status` and `mitigated`, appends to `evidences`.
    fn vuln(&mut self) -> bool;

    /// Vulnerability identifier (e.g. "CVE-2013-0269")
    fn name(&self) -> &str {
        &self.basic().config.name
    }

    fn kind(&self) -> CheckKind {
        self.basic().config.kind
    }

    fn cve_link(&self) -> String {
        format!("http://cve.mitre.org/cgi-bin/cvename.cgi?name={}", self.name())
    }

    fn nvd_link(&self) -> String {
        format!(
            "http://web.nvd.nist.gov/view/vuln/detail?vulnId={}",
            self.name()
        )
    }

    /// Whether this check is relevant to the given framework
    fn applies_to(&self, framework: &str) -> bool {
        self.basic().config.applies.iter().any(|a| a == framework)
    }

    /// Whether the target runtime is one of the versions the weakness needs.
    ///
    /// Always `false` when the check lists no runtime versions. Matching is
    /// exact string equality.
    fn is_runtime_vulnerable(&self) -> bool {
        let config = &self.basic().config;
        match config.runtime_version.as_deref() {
            Some(runtime) => config
                .runtime_vulnerable_versions
                .iter()
                .any(|v| v == runtime),
            None => false,
        }
    }

    /// Compare a version against fix versions, defaulting to the check's own
    /// `target_version` and `fixes_version`
    fn evaluate(&self, target: Option<&str>, fixes: Option<&[String]>) -> bool {
        let config = &self.basic().config;
        let target = target.or(config.target_version.as_deref());
        let fixes = fixes.unwrap_or(&config.fixes_version);
        VersionComparator::is_vulnerable(target, fixes)
    }

    /// CVSS base score, or `None` when the check has no vector
    fn cvss_score(&self, scorer: &dyn CvssScorer) -> Result<Option<f64>> {
        match self.basic().config.cvss.as_deref() {
            Some(vector) => scorer.score(vector).map(Some),
            None => Ok(None),
        }
    }

    fn is_mitigated(&self) -> bool {
        self.basic().mitigated
    }

    /// Verdict of the latest `vuln` call
    fn status(&self) -> bool {
        self.basic().status
    }

    fn evidences(&self) -> &[String] {
        &self.basic().evidences
    }
}

/// Static description of a catalogued weakness, as read from the knowledge base.
///
/// Only `name` is required; everything else defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Vulnerability identifier
    pub name: String,

    /// Raw CVSS vector
    pub cvss: Option<String>,

    pub cwe: Option<String>,

    pub owasp: Option<String>,

    pub release_date: Option<NaiveDate>,

    /// Frameworks this check is relevant to
    #[serde(default)]
    pub applies: Vec<String>,

    #[serde(default)]
    pub kind: CheckKind,

    pub message: Option<String>,

    pub remediation: Option<String>,

    #[serde(default)]
    pub aux_links: Vec<String>,

    /// Version under evaluation
    pub target_version: Option<String>,

    /// Versions that fix the weakness, one per maintained line
    #[serde(default)]
    pub fixes_version: Vec<String>,

    /// Runtime version of the target
    pub runtime_version: Option<String>,

    /// Runtime versions required for exploitation (empty = any)
    #[serde(default)]
    pub runtime_vulnerable_versions: Vec<String>,

    /// Severity used when no CVSS score is available
    pub severity: Option<Severity>,
}

impl CheckConfig {
    pub fn new(name: impl Into<String>, kind: CheckKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_cvss(mut self, vector: impl Into<String>) -> Self {
        self.cvss = Some(vector.into());
        self
    }

    pub fn with_cwe(mut self, cwe: impl Into<String>) -> Self {
        self.cwe = Some(cwe.into());
        self
    }

    pub fn with_owasp(mut self, owasp: impl Into<String>) -> Self {
        self.owasp = Some(owasp.into());
        self
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn applies_to(mut self, framework: impl Into<String>) -> Self {
        self.applies.push(framework.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    pub fn with_aux_link(mut self, url: impl Into<String>) -> Self {
        self.aux_links.push(url.into());
        self
    }

    pub fn with_target_version(mut self, version: impl Into<String>) -> Self {
        self.target_version = Some(version.into());
        self
    }

    pub fn with_fix(mut self, version: impl Into<String>) -> Self {
        self.fixes_version.push(version.into());
        self
    }

    pub fn with_runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = Some(version.into());
        self
    }

    pub fn with_runtime_vulnerable_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_vulnerable_versions.push(version.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
}

/// A check built from a [`CheckConfig`] plus its evaluation state.
///
/// On its own it checks the target framework version against
/// `fixes_version`; [`crate::DependencyCheck`] embeds one for the shared
/// metadata and bookkeeping.
#[derive(Debug, Clone)]
pub struct BasicCheck {
    config: CheckConfig,
    evidences: Vec<String>,
    mitigated: bool,
    status: bool,
}

impl BasicCheck {
    pub fn new(config: CheckConfig) -> Self {
        Self {
            config,
            evidences: Vec::new(),
            mitigated: false,
            status: false,
        }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Set the runtime version observed on the target
    pub fn set_runtime_version(&mut self, version: Option<String>) {
        self.config.runtime_version = version;
    }

    /// Set the version under evaluation
    pub fn set_target_version(&mut self, version: Option<String>) {
        self.config.target_version = version;
    }

    pub(crate) fn push_evidence(&mut self, evidence: String) {
        self.evidences.push(evidence);
    }

    pub(crate) fn set_mitigated(&mut self, mitigated: bool) {
        self.mitigated = mitigated;
    }

    pub(crate) fn set_status(&mut self, status: bool) {
        self.status = status;
    }
}

impl Check for BasicCheck {
    fn basic(&self) -> &BasicCheck {
        self
    }

    fn basic_mut(&mut self) -> &mut BasicCheck {
        self
    }

    fn vuln(&mut self) -> bool {
        let mut vulnerable = self.evaluate(None, None);
        if !self.config.runtime_vulnerable_versions.is_empty() {
            vulnerable = vulnerable && self.is_runtime_vulnerable();
        }

        self.mitigated = false;
        if vulnerable {
            if let Some(target) = self.config.target_version.clone() {
                self.push_evidence(format!("Vulnerable version found: {}", target));
            }
        }

        debug!(check = %self.config.name, vulnerable, "evaluated version check");
        self.status = vulnerable;
        vulnerable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn version_check(target: &str, fix: &str) -> BasicCheck {
        BasicCheck::new(
            CheckConfig::new("CVE-2013-0156", CheckKind::Version)
                .applies_to("rails")
                .with_target_version(target)
                .with_fix(fix),
        )
    }

    #[test]
    fn test_evaluate_against_own_versions() {
        assert!(version_check("1.0.0", "1.0.1").evaluate(None, None));
        assert!(!version_check("1.0.0", "0.9.0").evaluate(None, None));
    }

    #[test]
    fn test_evaluate_with_overrides() {
        let check = version_check("1.0.0", "1.0.1");
        let fixes = vec![String::from("2.4.0")];
        assert!(check.evaluate(Some("2.3.9"), Some(fixes.as_slice())));
        assert!(!check.evaluate(Some("2.4.1"), None));
        assert!(!check.evaluate(None, Some(&[][..])));
    }

    #[test]
    fn test_absent_versions_are_not_vulnerable() {
        let mut check = BasicCheck::new(CheckConfig::new("CVE-2013-0000", CheckKind::Version));
        assert!(!check.evaluate(None, None));
        assert!(!check.vuln());
        assert!(check.evidences().is_empty());
    }

    #[test]
    fn test_blank_target_version_is_not_vulnerable() {
        let mut check = version_check("", "");
        assert!(!check.evaluate(None, None));
        assert!(!check.vuln());
        assert!(check.evidences().is_empty());
    }

    #[test]
    fn test_applies_to() {
        let check = version_check("1.0.0", "1.0.1");
        assert!(check.applies_to("rails"));
        assert!(!check.applies_to("sinatra"));

        let unscoped = BasicCheck::new(CheckConfig::new("CVE-2013-0333", CheckKind::Version));
        assert!(!unscoped.applies_to("rails"));
    }

    #[test]
    fn test_links() {
        let check = version_check("1.0.0", "1.0.1");
        assert_eq!(
            check.cve_link(),
            "http://cve.mitre.org/cgi-bin/cvename.cgi?name=CVE-2013-0156"
        );
        assert_eq!(
            check.nvd_link(),
            "http://web.nvd.nist.gov/view/vuln/detail?vulnId=CVE-2013-0156"
        );
    }

    #[test]
    fn test_runtime_vulnerable() {
        let config = CheckConfig::new("CVE-2013-1655", CheckKind::Dependency)
            .with_runtime_vulnerable_version("1.9.3")
            .with_runtime_vulnerable_version("2.0.0");

        let mut check = BasicCheck::new(config);
        assert!(!check.is_runtime_vulnerable());

        check.set_runtime_version(Some(String::from("2.0.0")));
        assert!(check.is_runtime_vulnerable());

        check.set_runtime_version(Some(String::from("1.9.2")));
        assert!(!check.is_runtime_vulnerable());

        // No exact match for a longer patch string
        check.set_runtime_version(Some(String::from("1.9.3-p392")));
        assert!(!check.is_runtime_vulnerable());
    }

    #[test]
    fn test_runtime_not_required() {
        let mut check = version_check("1.0.0", "1.0.1");
        check.set_runtime_version(Some(String::from("1.9.3")));
        assert!(!check.is_runtime_vulnerable());
    }

    #[test]
    fn test_cvss_score() {
        let scorer = |vector: &str| -> Result<f64> {
            if vector.starts_with("AV:N") {
                Ok(7.5)
            } else {
                Err(Error::CvssScoring {
                    vector: vector.to_string(),
                    message: String::from("unsupported vector"),
                })
            }
        };

        let check = version_check("1.0.0", "1.0.1");
        assert_eq!(check.cvss_score(&scorer).unwrap(), None);

        let scored = BasicCheck::new(
            CheckConfig::new("CVE-2013-0156", CheckKind::Version)
                .with_cvss("AV:N/AC:L/Au:N/C:P/I:P/A:P"),
        );
        assert_eq!(scored.cvss_score(&scorer).unwrap(), Some(7.5));

        let broken = BasicCheck::new(
            CheckConfig::new("CVE-2013-0156", CheckKind::Version).with_cvss("bogus"),
        );
        assert!(broken.cvss_score(&scorer).is_err());
    }

    #[test]
    fn test_vuln_records_status_and_evidence() {
        let mut check = version_check("3.2.12", "3.2.13");
        assert!(!check.status());

        assert!(check.vuln());
        assert!(check.status());
        assert!(!check.is_mitigated());
        assert_eq!(check.evidences(), ["Vulnerable version found: 3.2.12"]);

        check.vuln();
        assert_eq!(check.evidences().len(), 2);

        check.set_target_version(Some(String::from("3.2.13")));
        assert!(!check.vuln());
        assert!(!check.status());
        assert_eq!(check.evidences().len(), 2);
    }

    #[test]
    fn test_vuln_requires_runtime_when_listed() {
        let config = CheckConfig::new("CVE-2013-4164", CheckKind::Version)
            .with_target_version("1.4.0")
            .with_fix("1.4.5")
            .with_runtime_vulnerable_version("1.9.3");

        let mut check = BasicCheck::new(config);
        check.set_runtime_version(Some(String::from("2.0.0")));
        assert!(!check.vuln());

        check.set_runtime_version(Some(String::from("1.9.3")));
        assert!(check.vuln());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
name: CVE-2013-0269
cvss: "AV:N/AC:L/Au:N/C:N/I:P/A:P"
cwe: "20"
owasp: A9
release_date: 2013-02-08
applies: [rails, sinatra, padrino]
kind: dependency
fixes_version: ["1.7.7"]
"#;
        let config: CheckConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name, "CVE-2013-0269");
        assert_eq!(config.applies.len(), 3);
        assert_eq!(config.release_date, NaiveDate::from_ymd_opt(2013, 2, 8));
        assert!(config.runtime_vulnerable_versions.is_empty());
        assert!(config.target_version.is_none());
    }
}
