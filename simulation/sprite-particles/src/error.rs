//! Error types for configuration I/O

use std::io;
use thiserror::Error;

/// Error types for loading and saving emitter configuration
///
/// The simulation itself never fails; these only arise at the edges where
/// configuration crosses a file or text boundary.
#[derive(Error, Debug)]
pub enum EmitterError {
    /// I/O error while reading or writing a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON configuration
    #[cfg(feature = "serde-support")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed YAML configuration
    #[cfg(feature = "serde-support")]
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// File extension does not name a known configuration format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Result type using EmitterError
pub type Result<T> = std::result::Result<T, EmitterError>;
