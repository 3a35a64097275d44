//! Error types for configuration management.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing a configuration file failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid JSON in configuration file.
    #[error("Invalid JSON in {}: {source}", file.display())]
    InvalidJson {
        /// The file path.
        file: PathBuf,
        /// The decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Settings could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
