//! Moving clips by dragging their body.

use propreel_core::{ClipId, Frame, TrackId};
use propreel_timeline::ProjectStore;

use crate::ruler::{frames_for_pixels, offset_frame};
use crate::snapping::{SnapEngine, SnapKind};

/// State for clip dragging (moving clips).
#[derive(Debug, Clone, PartialEq)]
pub struct ClipDragState {
    pub clip_id: ClipId,
    pub duration: Frame,
    pub original_start: Frame,
    pub original_track: TrackId,
    /// Pointer x at grab time.
    pub origin_x: f32,
    /// Where the clip would land if released now.
    pub current_start: Frame,
    pub target_track: TrackId,
    /// What the last update snapped to, for drawing a guide.
    pub snap_indicator: Option<SnapKind>,
}

impl ClipDragState {
    /// Grab `clip_id` at pointer `x`.
    pub fn begin(store: &ProjectStore, clip_id: ClipId, x: f32) -> Option<Self> {
        let clip = store.project().clip(clip_id)?;
        Some(Self {
            clip_id,
            duration: clip.duration_frames,
            original_start: clip.start_frame,
            original_track: clip.track_id,
            origin_x: x,
            current_start: clip.start_frame,
            target_track: clip.track_id,
            snap_indicator: None,
        })
    }

    /// Follow the pointer to `x` over `track`. Returns the tentative start.
    ///
    /// The start edge is snapped first; when it finds nothing the end edge is
    /// tried and the start re-derived from it.
    pub fn update(&mut self, store: &ProjectStore, snapping: &SnapEngine, x: f32, track: TrackId) -> Frame {
        let project = store.project();
        let delta = frames_for_pixels(x - self.origin_x, project.zoom);
        let tentative = offset_frame(self.original_start, delta);

        let snap = snapping.snap_clip(project, self.clip_id, self.duration, tentative);
        self.current_start = snap.frame;
        self.snap_indicator = snap.target;
        if project.track(track).is_some() {
            self.target_track = track;
        }
        self.current_start
    }

    pub fn has_moved(&self) -> bool {
        self.current_start != self.original_start || self.target_track != self.original_track
    }

    /// Release: move the clip to where it was dropped.
    pub fn commit(self, store: &mut ProjectStore) -> bool {
        if !self.has_moved() {
            return false;
        }
        tracing::debug!(
            clip_id = %self.clip_id,
            start = self.current_start,
            "Drag committed"
        );
        store.move_clip(self.clip_id, self.target_track, self.current_start)
    }
}
