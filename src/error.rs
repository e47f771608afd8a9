//! Unified error type hierarchy for slurm_convert
//!
//! Provides structured error handling with ConfigError (everything that is wrong
//! with the configuration tree or the checkpoint it points at) and SubmitError
//! (the top-level error of a submission attempt).

use std::io;
use thiserror::Error;

/// Configuration file parsing, extraction and checkpoint resolution errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid YAML in config: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid TOML in config: {0}")]
    InvalidToml(#[from] toml::de::Error),

    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    #[error("Configuration key '{key}' has the wrong type: expected {expected}")]
    InvalidType { key: String, expected: &'static str },

    #[error("Invalid override '{0}'")]
    InvalidOverride(String),

    #[error("Interpolation failed: {0}")]
    Interpolation(String),

    #[error("No checkpoint found with the checkpoint name pattern: {0}")]
    NoCheckpoint(String),

    #[error("Too many checkpoints ({count}) fit the checkpoint name pattern: {pattern}")]
    AmbiguousCheckpoint { pattern: String, count: usize },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error during config operations: {0}")]
    IoError(#[from] io::Error),
}

impl ConfigError {
    /// Shorthand for a type mismatch on a dotted key.
    pub fn invalid_type(key: impl Into<String>, expected: &'static str) -> Self {
        ConfigError::InvalidType {
            key: key.into(),
            expected,
        }
    }
}

/// Top-level error of a conversion submission.
///
/// Every variant is fatal: nothing is retried and no job id is returned.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The configuration or the checkpoint it describes is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Output directory or batch script could not be written
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The scheduler command could not be spawned or exited non-zero
    #[error("Command '{cmd}' failed: {reason}")]
    OsCommand { cmd: String, reason: String },

    /// The scheduler printed something that is not UTF-8
    #[error("Command '{cmd}' produced undecodable output: {reason}")]
    InvalidOutput { cmd: String, reason: String },
}

impl SubmitError {
    /// Get a user-facing error message suitable for terminal display
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Config(e) => format!("Configuration error: {}", e),
            SubmitError::Io(e) => format!("File operation failed: {}", e),
            SubmitError::OsCommand { cmd, reason } => {
                format!("Failed to execute '{}': {}", cmd, reason)
            }
            SubmitError::InvalidOutput { cmd, reason } => {
                format!("Could not read job id from '{}': {}", cmd, reason)
            }
        }
    }
}

/// Result alias for submission operations.
pub type Result<T> = std::result::Result<T, SubmitError>;
