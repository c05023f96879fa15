//! Scan engine - evaluates the knowledge base against a target application
//!
//! Takes the target's facts, runs every applicable check on a fresh instance
//! and turns the results into findings.

use crate::CheckRegistry;
use chrono::{DateTime, Utc};
use kbscan_core::{Check, CvssScorer, Finding, Severity, TargetApplication};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of scanning one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: String,
    pub framework: Option<String>,
    /// Number of checks evaluated
    pub checks_run: usize,
    /// Whether any finding is exploitable
    pub vulnerable: bool,
    pub findings: Vec<Finding>,
    pub severity_counts: SeverityCounts,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Vulnerable finding counts by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub info: u32,
    /// Findings neutralised by a mitigation dependency
    pub mitigated: u32,
}

impl SeverityCounts {
    fn record(&mut self, finding: &Finding) {
        if !finding.vulnerable {
            if finding.mitigated {
                self.mitigated += 1;
            }
            return;
        }
        match finding.severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }

    pub fn total_vulnerable(&self) -> u32 {
        self.critical + self.high + self.medium + self.low + self.info
    }
}

/// Knowledge-base scan engine
pub struct ScanEngine<'a> {
    registry: &'a CheckRegistry,
    scorer: Option<&'a dyn CvssScorer>,
    min_severity: Severity,
    report_mitigated: bool,
}

impl<'a> ScanEngine<'a> {
    pub fn new(registry: &'a CheckRegistry) -> Self {
        Self {
            registry,
            scorer: None,
            min_severity: Severity::Info,
            report_mitigated: true,
        }
    }

    /// Use an external CVSS scorer for finding severities
    pub fn with_scorer(mut self, scorer: &'a dyn CvssScorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn with_report_mitigated(mut self, report: bool) -> Self {
        self.report_mitigated = report;
        self
    }

    /// Evaluate every applicable check against the target
    pub fn scan(&self, target: &TargetApplication) -> ScanReport {
        let started_at = Utc::now();
        let framework = target.framework_name();

        let Some(framework_name) = framework else {
            warn!("{} declares no framework, no checks apply", target.name);
            return self.report(target, 0, Vec::new(), SeverityCounts::default(), started_at);
        };

        info!(
            "Scanning {} against {} knowledge-base entries (framework: {})",
            target.name,
            self.registry.len(),
            framework_name
        );

        let mut checks_run = 0;
        let mut findings = Vec::new();
        let mut severity_counts = SeverityCounts::default();

        for entry in self.registry.all() {
            let mut check = entry.instantiate(target);
            if !check.applies_to(framework_name) {
                continue;
            }
            checks_run += 1;
            check.vuln();

            if let Some(finding) = self.finding_for(check.as_ref(), &target.name) {
                severity_counts.record(&finding);
                findings.push(finding);
            }
        }

        self.report(target, checks_run, findings, severity_counts, started_at)
    }

    fn report(
        &self,
        target: &TargetApplication,
        checks_run: usize,
        findings: Vec<Finding>,
        severity_counts: SeverityCounts,
        started_at: DateTime<Utc>,
    ) -> ScanReport {
        let vulnerable = findings.iter().any(|f| f.vulnerable);
        info!(
            "Scan of {} finished: {} checks, {} vulnerable (Critical: {}, High: {}, Medium: {}, Low: {}), {} mitigated",
            target.name,
            checks_run,
            severity_counts.total_vulnerable(),
            severity_counts.critical,
            severity_counts.high,
            severity_counts.medium,
            severity_counts.low,
            severity_counts.mitigated
        );

        ScanReport {
            target: target.name.clone(),
            framework: target.framework_name().map(String::from),
            checks_run,
            vulnerable,
            findings,
            severity_counts,
            started_at,
            finished_at: Utc::now(),
        }
    }

    fn finding_for(&self, check: &dyn Check, target: &str) -> Option<Finding> {
        let reportable = check.status()
            || (self.report_mitigated && check.is_mitigated() && !check.evidences().is_empty());
        if !reportable {
            debug!(check = %check.name(), "not vulnerable");
            return None;
        }

        let finding = Finding::from_check(check, target, self.score(check));
        if finding.severity < self.min_severity {
            debug!(
                check = %check.name(),
                severity = %finding.severity,
                "finding below minimum severity"
            );
            return None;
        }

        Some(finding)
    }

    // Scorer failures are logged and the finding keeps the entry's severity
    fn score(&self, check: &dyn Check) -> Option<f64> {
        let scorer = self.scorer?;
        match check.cvss_score(scorer) {
            Ok(score) => score,
            Err(e) => {
                warn!(check = %check.name(), code = e.code(), "CVSS scoring failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KbEntry;
    use kbscan_core::{Error, Result};

    fn registry() -> CheckRegistry {
        let entries = [
            r#"
name: CVE-2013-0269
kind: dependency
cvss: "AV:N/AC:L/Au:N/C:N/I:P/A:P"
applies: [rails, sinatra]
severity: medium
safe_dependencies:
  - name: json
    version: "1.7.7"
"#,
            r#"
name: CVE-2013-0156
kind: version
applies: [rails]
severity: critical
fixes_version: ["2.3.15", "3.0.19", "3.1.10", "3.2.11"]
mitigation_dependency: ignored_for_version_checks
"#,
            r#"
name: CVE-2013-0155
kind: dependency
applies: [rails]
severity: low
mitigation_dependency: strong_parameters
safe_dependencies:
  - name: activerecord
    version: "3.2.11"
"#,
        ];

        let mut registry = CheckRegistry::new();
        for yaml in entries {
            registry.register(KbEntry::from_yaml(yaml).unwrap());
        }
        registry
    }

    fn rails_app() -> TargetApplication {
        TargetApplication::new("hello_world")
            .with_framework("rails", Some(String::from("3.2.10")))
            .with_runtime("1.9.3")
            .with_dependency("json", "1.7.6")
            .with_dependency("activerecord", "3.2.10")
            .with_dependency("strong_parameters", "0.2.0")
    }

    #[test]
    fn test_scan_rails_app() {
        let registry = registry();
        let report = ScanEngine::new(&registry).scan(&rails_app());

        assert_eq!(report.checks_run, 3);
        assert!(report.vulnerable);
        assert_eq!(report.findings.len(), 3);
        assert_eq!(report.severity_counts.critical, 1);
        assert_eq!(report.severity_counts.medium, 1);
        assert_eq!(report.severity_counts.mitigated, 1);
        assert_eq!(report.severity_counts.total_vulnerable(), 2);

        let mitigated = report
            .findings
            .iter()
            .find(|f| f.check_name == "CVE-2013-0155")
            .unwrap();
        assert!(!mitigated.vulnerable);
        assert!(mitigated.evidences[0].contains("strong_parameters"));
    }

    #[test]
    fn test_framework_filter() {
        let registry = registry();
        let target = TargetApplication::new("sinatra-app")
            .with_framework("sinatra", Some(String::from("1.3.4")))
            .with_dependency("json", "1.7.7");

        let report = ScanEngine::new(&registry).scan(&target);
        assert_eq!(report.checks_run, 1);
        assert!(!report.vulnerable);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_min_severity_and_mitigated_filtering() {
        let registry = registry();
        let report = ScanEngine::new(&registry)
            .with_min_severity(Severity::High)
            .with_report_mitigated(false)
            .scan(&rails_app());

        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].check_name, "CVE-2013-0156");
    }

    #[test]
    fn test_scorer_overrides_severity() {
        let scorer = |vector: &str| -> Result<f64> {
            if vector.contains("I:P") {
                Ok(9.4)
            } else {
                Err(Error::CvssScoring {
                    vector: vector.to_string(),
                    message: String::from("unexpected vector"),
                })
            }
        };

        let registry = registry();
        let report = ScanEngine::new(&registry)
            .with_scorer(&scorer)
            .scan(&rails_app());

        let json = report
            .findings
            .iter()
            .find(|f| f.check_name == "CVE-2013-0269")
            .unwrap();
        assert_eq!(json.cvss_score, Some(9.4));
        assert_eq!(json.severity, Severity::Critical);
        assert_eq!(report.severity_counts.critical, 2);
    }

    #[test]
    fn test_only_applicable_checks_run() {
        let mut registry = registry();
        registry.register(
            KbEntry::from_yaml(
                r#"
name: CVE-2013-0333
kind: dependency
severity: high
safe_dependencies:
  - name: json
    version: "1.7.7"
"#,
            )
            .unwrap(),
        );

        // No `applies` list: the check itself says it does not apply
        let report = ScanEngine::new(&registry).scan(&rails_app());
        assert_eq!(report.checks_run, 3);
        assert!(report.findings.iter().all(|f| f.check_name != "CVE-2013-0333"));
    }

    #[test]
    fn test_target_without_framework_runs_nothing() {
        let registry = registry();
        let target = TargetApplication::new("bare").with_dependency("json", "1.7.6");

        let report = ScanEngine::new(&registry).scan(&target);
        assert_eq!(report.checks_run, 0);
        assert!(report.framework.is_none());
        assert!(!report.vulnerable);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_report_serializes() {
        let registry = registry();
        let report = ScanEngine::new(&registry).scan(&rails_app());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["target"], "hello_world");
        assert_eq!(json["findings"].as_array().unwrap().len(), 3);
    }
}
