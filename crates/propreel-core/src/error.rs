//! Error types for PropReel.

use thiserror::Error;

/// Main error type for PropReel I/O boundaries.
///
/// Timeline mutations never produce errors; they degrade to no-ops.
/// Only loading, saving, configuration and media ingestion can fail.
#[derive(Error, Debug)]
pub enum PropReelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for PropReel operations.
pub type Result<T> = std::result::Result<T, PropReelError>;
