//! Error types for media ingestion.

use std::path::PathBuf;

use propreel_core::PropReelError;
use thiserror::Error;

/// Why an input could not be ingested at all.
///
/// A file that opens but fails to decode is not an error: it is ingested
/// with its metadata left unknown.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported media type: {0}")]
    Unsupported(String),

    #[error("Probe task failed: {0}")]
    Task(String),
}

pub type MediaResult<T> = std::result::Result<T, MediaError>;

impl From<MediaError> for PropReelError {
    fn from(err: MediaError) -> Self {
        PropReelError::Media(err.to_string())
    }
}
