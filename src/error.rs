//! Error types for heartbeatd
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// All error types that can occur while bringing the process up
#[derive(Debug, Error)]
pub enum HeartbeatError {
    /// Configuration path was empty
    #[error("Config path must not be empty")]
    EmptyConfigPath,

    /// Configuration file does not exist
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Configuration path exists but is not a regular file
    #[error("Config path is not a regular file: {0}")]
    NotRegularFile(PathBuf),

    /// Configuration file is smaller or larger than allowed
    #[error("Config file size {size} bytes is outside {min}..={max}: {path}")]
    ConfigSize {
        path: PathBuf,
        size: u64,
        min: u64,
        max: u64,
    },

    /// Owner has no read permission on the configuration file
    #[error("Config file is not readable by its owner: {0}")]
    NotReadable(PathBuf),

    /// Log level outside the recognized range
    #[error("Invalid log level: {0} (expected 1..=6)")]
    InvalidLogLevel(u8),

    /// Signal listener could not be installed
    #[error("Signal error: {0}")]
    Signal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for heartbeatd operations
pub type Result<T> = std::result::Result<T, HeartbeatError>;
