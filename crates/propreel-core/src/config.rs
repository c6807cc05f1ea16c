//! Editor configuration.
//!
//! All tunables of the editing engine live here. Every field has a default,
//! so a partial JSON file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{PropReelError, Result};
use crate::time::Frame;

/// Tunables for the timeline engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum entries kept on each of the undo and redo stacks.
    pub history_capacity: usize,
    /// Shortest allowed clip (15 frames ≈ 0.5s at 30 fps).
    pub min_clip_frames: Frame,
    /// Clip length used when neither caller nor asset supplies one.
    pub default_clip_frames: Frame,
    /// Slack kept after the last clip end when extending the project.
    pub clip_end_buffer_frames: Frame,
    /// Gap left between a clip and its duplicate.
    pub duplicate_gap_frames: Frame,
    /// Lower bound of the project duration, in seconds.
    pub min_project_seconds: u64,
    /// Snap tolerance in screen pixels.
    pub snap_threshold_px: f32,
    /// How often the renderer position is polled during playback.
    pub poll_interval_ms: u64,
    /// Quiet period before a burst of edits is written to storage.
    pub persist_debounce_ms: u64,
    /// Longest a pending write may wait while edits keep arriving.
    pub persist_max_wait_ms: u64,
    /// Key of the durable storage slot holding the project document.
    pub storage_key: String,
    /// Zoom amount of the default Ken Burns move on still images.
    pub ken_burns_intensity: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            min_clip_frames: 15,
            default_clip_frames: 90,
            clip_end_buffer_frames: 30,
            duplicate_gap_frames: 15,
            min_project_seconds: 30,
            snap_threshold_px: 10.0,
            poll_interval_ms: 100,
            persist_debounce_ms: 500,
            persist_max_wait_ms: 2000,
            storage_key: "propreel.project".to_string(),
            ken_burns_intensity: 0.10,
        }
    }
}

impl EditorConfig {
    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&data)
            .map_err(|e| PropReelError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded editor config");
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.history_capacity == 0 {
            return Err(PropReelError::Config(
                "history_capacity must be at least 1".into(),
            ));
        }
        if self.min_clip_frames == 0 {
            return Err(PropReelError::Config(
                "min_clip_frames must be at least 1".into(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(PropReelError::Config(
                "poll_interval_ms must be at least 1".into(),
            ));
        }
        if self.snap_threshold_px.is_nan() || self.snap_threshold_px < 0.0 {
            return Err(PropReelError::Config(
                "snap_threshold_px must be non-negative".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn persist_max_wait(&self) -> Duration {
        Duration::from_millis(self.persist_max_wait_ms)
    }
}
