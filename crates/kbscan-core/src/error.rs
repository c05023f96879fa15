//! Error types for KBScan
//!
//! Version comparison and check evaluation never fail: indeterminate input
//! resolves to "not vulnerable". Errors only come from the surrounding
//! machinery (knowledge-base loading, configuration, CVSS scoring).

use thiserror::Error;

/// Result type alias using KBScan Error
pub type Result<T> = std::result::Result<T, Error>;

/// KBScan error types
#[derive(Error, Debug)]
pub enum Error {
    // === Check Errors ===
    #[error("Check not found: {name}")]
    CheckNotFound { name: String },

    #[error("Invalid check definition: {path} - {message}")]
    InvalidCheckDefinition { path: String, message: String },

    #[error("CVSS scoring failed for {vector}: {message}")]
    CvssScoring { vector: String, message: String },

    // === Target Errors ===
    #[error("Invalid target description: {0}")]
    InvalidTarget(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required configuration: {key}")]
    MissingConfig { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Check if this error is fatal (should stop the scan)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Configuration(_)
                | Error::MissingConfig { .. }
                | Error::InvalidConfig { .. }
                | Error::InvalidTarget(_)
        )
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::CheckNotFound { .. } => "CHECK_NOT_FOUND",
            Error::InvalidCheckDefinition { .. } => "INVALID_CHECK_DEF",
            Error::CvssScoring { .. } => "CVSS_SCORING_FAILED",
            Error::InvalidTarget(_) => "INVALID_TARGET",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::MissingConfig { .. } => "MISSING_CONFIG",
            Error::InvalidConfig { .. } => "INVALID_CONFIG",
            Error::Io(_) => "IO_ERROR",
            Error::FileNotFound { .. } => "FILE_NOT_FOUND",
            Error::Json(_) => "JSON_ERROR",
            Error::Yaml(_) => "YAML_ERROR",
        }
    }
}
