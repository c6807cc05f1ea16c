//! PropReel Core - Foundation types for the timeline editor
//!
//! This crate provides the fundamental types used throughout PropReel:
//! - Frame representation (Frame, FrameRate, FrameSpan)
//! - Identifier aliases for project entities
//! - Error type shared by all I/O boundaries
//! - Editor configuration

pub mod config;
pub mod error;
pub mod id;
pub mod time;

pub use config::EditorConfig;
pub use error::{PropReelError, Result};
pub use id::{new_id, AssetId, ClipId, EffectId, ProjectId, TrackId, TransitionId};
pub use time::{Frame, FrameRate, FrameSpan};

/// Wall-clock timestamp in unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
