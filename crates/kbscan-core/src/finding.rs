//! Finding definitions - the reportable outcome of an evaluated check

use crate::check::Check;
use crate::severity::{CheckKind, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vulnerability reported against a target application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Unique finding ID
    pub id: Uuid,

    /// Check that generated this finding (vulnerability identifier)
    pub check_name: String,
    pub kind: CheckKind,

    /// Target application name
    pub target: String,

    pub title: String,
    pub severity: Severity,

    /// Whether the target is exploitable. A mitigated finding is reported
    /// with `vulnerable = false`.
    pub vulnerable: bool,
    pub mitigated: bool,

    pub cwe: Option<String>,
    pub owasp: Option<String>,

    /// CVSS scoring
    pub cvss_vector: Option<String>,
    pub cvss_score: Option<f64>,

    /// Evidence and remediation
    #[serde(default)]
    pub evidences: Vec<String>,
    pub remediation: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,

    pub detected_at: DateTime<Utc>,
}

impl Finding {
    /// Create a new finding builder
    pub fn builder(check_name: impl Into<String>, target: impl Into<String>) -> FindingBuilder {
        FindingBuilder::new(check_name, target)
    }

    /// Build a finding from an evaluated check.
    ///
    /// Severity comes from the CVSS score when one is known, otherwise from
    /// the knowledge-base entry.
    pub fn from_check(check: &dyn Check, target: &str, cvss_score: Option<f64>) -> Finding {
        let config = check.basic().config();
        let severity = cvss_score
            .map(Severity::from_cvss)
            .or(config.severity)
            .unwrap_or_default();

        let mut builder = Finding::builder(check.name(), target)
            .kind(check.kind())
            .title(config.message.clone().unwrap_or_else(|| check.name().to_string()))
            .severity(severity)
            .vulnerable(check.status())
            .mitigated(check.is_mitigated())
            .evidences(check.evidences().to_vec())
            .reference(check.cve_link())
            .reference(check.nvd_link());

        if let Some(cwe) = &config.cwe {
            builder = builder.cwe(cwe);
        }
        if let Some(owasp) = &config.owasp {
            builder = builder.owasp(owasp);
        }
        if let Some(vector) = &config.cvss {
            builder = builder.cvss(cvss_score, vector);
        }
        if let Some(remediation) = &config.remediation {
            builder = builder.remediation(remediation);
        }
        for link in &config.aux_links {
            builder = builder.reference(link);
        }

        builder.build()
    }
}

/// Builder for constructing findings
pub struct FindingBuilder {
    finding: Finding,
}

impl FindingBuilder {
    pub fn new(check_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            finding: Finding {
                id: Uuid::new_v4(),
                check_name: check_name.into(),
                kind: CheckKind::Dependency,
                target: target.into(),
                title: String::new(),
                severity: Severity::Info,
                vulnerable: false,
                mitigated: false,
                cwe: None,
                owasp: None,
                cvss_vector: None,
                cvss_score: None,
                evidences: Vec::new(),
                remediation: None,
                references: Vec::new(),
                detected_at: Utc::now(),
            },
        }
    }

    pub fn kind(mut self, kind: CheckKind) -> Self {
        self.finding.kind = kind;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.finding.title = title.into();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.finding.severity = severity;
        self
    }

    pub fn vulnerable(mut self, vulnerable: bool) -> Self {
        self.finding.vulnerable = vulnerable;
        self
    }

    pub fn mitigated(mut self, mitigated: bool) -> Self {
        self.finding.mitigated = mitigated;
        self
    }

    pub fn cwe(mut self, cwe: impl Into<String>) -> Self {
        self.finding.cwe = Some(cwe.into());
        self
    }

    pub fn owasp(mut self, owasp: impl Into<String>) -> Self {
        self.finding.owasp = Some(owasp.into());
        self
    }

    pub fn cvss(mut self, score: Option<f64>, vector: impl Into<String>) -> Self {
        self.finding.cvss_score = score;
        self.finding.cvss_vector = Some(vector.into());
        self
    }

    pub fn evidence(mut self, evidence: impl Into<String>) -> Self {
        self.finding.evidences.push(evidence.into());
        self
    }

    pub fn evidences(mut self, evidences: Vec<String>) -> Self {
        self.finding.evidences = evidences;
        self
    }

    pub fn remediation(mut self, remediation: impl Into<String>) -> Self {
        self.finding.remediation = Some(remediation.into());
        self
    }

    pub fn reference(mut self, url: impl Into<String>) -> Self {
        self.finding.references.push(url.into());
        self
    }

    pub fn build(self) -> Finding {
        self.finding
    }
}
