//! Configuration management for KBScan components

use kbscan_core::{CheckKind, Error, Result, Severity};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Knowledge-base location and filtering
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    /// Scan behaviour
    #[serde(default)]
    pub scan: ScanConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (KBSCAN_ prefix)
    pub fn merge_env(self) -> Result<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(val) = lookup("KBSCAN_KB_DIR") {
            self.knowledge_base.dir = Some(val);
        }
        if let Some(val) = lookup("KBSCAN_MIN_SEVERITY") {
            self.scan.min_severity = Severity::parse_lenient(&val);
        }
        if let Some(val) = lookup("KBSCAN_FAIL_ON_VULNERABLE") {
            self.scan.fail_on_vulnerable = val.parse().map_err(|_| Error::InvalidConfig {
                key: String::from("KBSCAN_FAIL_ON_VULNERABLE"),
                message: format!("expected true or false, got {:?}", val),
            })?;
        }
        if let Some(val) = lookup("KBSCAN_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("KBSCAN_LOG_FORMAT") {
            self.logging.format = val;
        }

        Ok(self)
    }

    /// The knowledge-base directory, which has no sensible default
    pub fn kb_dir(&self) -> Result<&str> {
        self.knowledge_base
            .dir
            .as_deref()
            .ok_or_else(|| Error::MissingConfig {
                key: String::from("knowledge_base.dir"),
            })
    }
}

/// Knowledge-base configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Directory holding YAML check definitions
    pub dir: Option<String>,

    /// Only load these kinds (empty = all)
    #[serde(default)]
    pub enabled_kinds: Vec<CheckKind>,
}

/// Scan configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Findings below this severity are left out of the report
    #[serde(default)]
    pub min_severity: Severity,

    /// Exit non-zero when the target is vulnerable
    #[serde(default = "default_true")]
    pub fail_on_vulnerable: bool,

    /// Report mitigated findings alongside vulnerable ones
    #[serde(default = "default_true")]
    pub report_mitigated: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_severity: Severity::Info,
            fail_on_vulnerable: true,
            report_mitigated: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("warn")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn kb_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.knowledge_base.dir = Some(dir.into());
        self
    }

    pub fn enable_kind(mut self, kind: CheckKind) -> Self {
        self.config.knowledge_base.enabled_kinds.push(kind);
        self
    }

    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.config.scan.min_severity = severity;
        self
    }

    pub fn fail_on_vulnerable(mut self, fail: bool) -> Self {
        self.config.scan.fail_on_vulnerable = fail;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [knowledge_base]
            dir = "/var/lib/kbscan/kb"
            enabled_kinds = ["dependency"]

            [scan]
            min_severity = "medium"
            fail_on_vulnerable = false

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.kb_dir().unwrap(), "/var/lib/kbscan/kb");
        assert_eq!(config.knowledge_base.enabled_kinds, vec![CheckKind::Dependency]);
        assert_eq!(config.scan.min_severity, Severity::Medium);
        assert!(!config.scan.fail_on_vulnerable);
        assert!(config.scan.report_mitigated);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.kb_dir().is_err());
        assert_eq!(config.scan.min_severity, Severity::Info);
        assert!(config.scan.fail_on_vulnerable);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[scan\nmin_severity = 1").unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder()
            .kb_dir("./kb")
            .enable_kind(CheckKind::Version)
            .min_severity(Severity::High)
            .fail_on_vulnerable(false)
            .log_level("info")
            .build();

        assert_eq!(config.kb_dir().unwrap(), "./kb");
        assert_eq!(config.scan.min_severity, Severity::High);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("KBSCAN_KB_DIR", "/opt/kb"),
            ("KBSCAN_MIN_SEVERITY", "critical"),
            ("KBSCAN_LOG_FORMAT", "compact"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .merge_vars(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.kb_dir().unwrap(), "/opt/kb");
        assert_eq!(config.scan.min_severity, Severity::Critical);
        assert_eq!(config.logging.format, "compact");

        let err = Config::default()
            .merge_vars(|k| (k == "KBSCAN_FAIL_ON_VULNERABLE").then(|| String::from("maybe")))
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");
    }
}
