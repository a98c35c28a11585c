//! Error types for the homing RL core library

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for RL operations
#[derive(Error, Debug)]
pub enum RLError {
    /// Environment-related errors
    #[error("Environment error: {0}")]
    Environment(String),

    /// The host simulation reported that it is stopping
    #[error("Host simulation stopped")]
    HostStopped,

    /// Invalid action
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Invalid state key
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A persisted path contains an entry that is neither an action nor the obstacle sentinel
    #[error("Invalid path format at entry {index}: {entry:?}")]
    InvalidPathFormat {
        /// Zero-based position of the offending entry
        index: usize,
        /// The unrecognized entry text
        entry: String,
    },

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Minimum length required
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing a learning artifact failed
    #[error("Failed to persist {path}: {source}")]
    Persistence {
        /// Destination that could not be written
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for RL operations
pub type Result<T> = std::result::Result<T, RLError>;
