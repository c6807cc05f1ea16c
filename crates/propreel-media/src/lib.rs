//! PropReel Media - Asset ingestion
//!
//! This crate handles:
//! - Media file probing (dimensions via `image`, duration via ffprobe)
//! - Building assets from probed files and placing them on the timeline

pub mod error;
pub mod import;
pub mod probe;

pub use error::{MediaError, MediaResult};
pub use import::{AssetImporter, PlacedMedia};
pub use probe::{mime_for_path, parse_ffprobe_output, FsProber, MediaProber, ProbedMedia};
