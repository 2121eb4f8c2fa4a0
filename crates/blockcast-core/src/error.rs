//! Core error types for blockcast-core.
//!
//! This module defines the error hierarchy using thiserror. Configuration
//! errors are fatal at construction; state errors describe persisted data
//! that failed integrity checks and are recovered from by reinitialising.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for blockcast-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Persisted state failed integrity checks
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Predictor runtime errors
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Replay input could not be applied
    #[error("Replay error at observation {line}: {message}")]
    Replay { line: usize, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Two predictors share a name or unique id
    #[error("Duplicate predictor '{0}'")]
    Duplicate(String),

    /// No predictor with that name
    #[error("Unknown predictor '{0}'")]
    UnknownPredictor(String),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Integrity errors found in restored predictor state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Probabilities sequence does not match the configured block count
    #[error("Probabilities length {actual} does not match block count {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A stored probability is outside [0, 1] or not finite
    #[error("Probability at index {index} is out of range: {value}")]
    ProbabilityOutOfRange { index: usize, value: f64 },

    /// Rotation anchor is not a valid block index
    #[error("Rotation anchor {anchor} is outside 0..{block_count}")]
    AnchorOutOfRange { anchor: i64, block_count: usize },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to read a file from the data directory
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file to the data directory
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored file could not be decoded
    #[error("Failed to decode {path}: {message}")]
    DecodeFailed { path: PathBuf, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDirUnavailable(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(err: toml::ser::Error) -> Self {
        CoreError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        CoreError::Runtime(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_core_error() {
        let err: CoreError = ConfigError::invalid("fading", "must be in [0, 1]").into();
        assert!(matches!(err, CoreError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration value for 'fading': must be in [0, 1]"
        );
    }

    #[test]
    fn state_error_messages() {
        let err = StateError::LengthMismatch {
            expected: 48,
            actual: 24,
        };
        assert_eq!(
            err.to_string(),
            "Probabilities length 24 does not match block count 48"
        );
    }
}
