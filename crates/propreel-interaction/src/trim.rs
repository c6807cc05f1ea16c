//! Trim handle interaction for timeline clips.

use propreel_core::{ClipId, Frame};
use propreel_timeline::ProjectStore;

use crate::ruler::{frames_for_pixels, offset_frame, x_for_frame};
use crate::snapping::{SnapEngine, SnapKind};

/// Which edge of a clip is being trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimEdge {
    Left,
    Right,
}

/// Active trim state.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimState {
    pub clip_id: ClipId,
    pub edge: TrimEdge,
    /// Pointer x at grab time.
    pub origin_x: f32,
    pub original_start: Frame,
    pub original_duration: Frame,
    pub current_start: Frame,
    pub current_duration: Frame,
    pub snap_indicator: Option<SnapKind>,
}

/// Hit test pointer `x` against the trim handles of a clip.
///
/// Returns `Some(TrimEdge)` if `x` is over a handle, otherwise `None`.
pub fn hit_test_trim_handle(
    start: Frame,
    duration: Frame,
    pixels_per_frame: f32,
    x: f32,
    handle_width: f32,
) -> Option<TrimEdge> {
    let left = x_for_frame(start, pixels_per_frame);
    let right = x_for_frame(start.saturating_add(duration), pixels_per_frame);
    if x < left || x > right {
        return None;
    }
    if x <= left + handle_width {
        return Some(TrimEdge::Left);
    }
    if x >= right - handle_width {
        return Some(TrimEdge::Right);
    }
    None
}

impl TrimState {
    /// Grab `edge` of `clip_id` at pointer `x`.
    pub fn begin(store: &ProjectStore, clip_id: ClipId, edge: TrimEdge, x: f32) -> Option<Self> {
        let clip = store.project().clip(clip_id)?;
        Some(Self {
            clip_id,
            edge,
            origin_x: x,
            original_start: clip.start_frame,
            original_duration: clip.duration_frames,
            current_start: clip.start_frame,
            current_duration: clip.duration_frames,
            snap_indicator: None,
        })
    }

    pub fn original_end(&self) -> Frame {
        self.original_start.saturating_add(self.original_duration)
    }

    /// Follow the pointer to `x`. Returns the previewed `(start, duration)`.
    ///
    /// The moving edge snaps. A left-edge trim keeps the end frame fixed;
    /// both edges respect the minimum clip length.
    pub fn update(&mut self, store: &ProjectStore, snapping: &SnapEngine, x: f32) -> (Frame, Frame) {
        let project = store.project();
        let min = store.config().min_clip_frames;
        let delta = frames_for_pixels(x - self.origin_x, project.zoom);

        match self.edge {
            TrimEdge::Right => {
                let end = offset_frame(self.original_end(), delta).max(self.original_start);
                let snap = snapping.snap_frame(project, end, Some(self.clip_id));
                self.snap_indicator = snap.target;
                self.current_start = self.original_start;
                self.current_duration = snap
                    .frame
                    .saturating_sub(self.original_start)
                    .max(min);
            }
            TrimEdge::Left => {
                let start = offset_frame(self.original_start, delta);
                let snap = snapping.snap_frame(project, start, Some(self.clip_id));
                self.snap_indicator = snap.target;
                let (start, duration) =
                    end_preserving(self.original_end(), self.original_end().saturating_sub(snap.frame), min);
                self.current_start = start;
                self.current_duration = duration;
            }
        }
        (self.current_start, self.current_duration)
    }

    pub fn has_changed(&self) -> bool {
        self.current_start != self.original_start || self.current_duration != self.original_duration
    }

    /// Release: checkpoint history and resize the clip.
    pub fn commit(self, store: &mut ProjectStore) -> bool {
        if !self.has_changed() {
            return false;
        }
        tracing::debug!(
            clip_id = %self.clip_id,
            edge = ?self.edge,
            duration = self.current_duration,
            "Trim committed"
        );
        store.checkpoint("Resize clip");
        store.resize_clip(self.clip_id, self.current_duration, self.edge == TrimEdge::Left)
    }
}

/// Start and duration for a left-edge trim to `duration` keeping `end` fixed.
fn end_preserving(end: Frame, duration: Frame, min: Frame) -> (Frame, Frame) {
    let duration = duration.max(min);
    if duration > end {
        (0, end.max(min))
    } else {
        (end - duration, duration)
    }
}
