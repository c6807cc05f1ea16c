//! Structural snapshots for undo/redo.
//!
//! A `ProjectSnapshot` holds only the structural part of a project: clips,
//! tracks, assets, transitions and the total duration. Playhead, play state,
//! zoom and selection are editor state and never travel through history.

use std::collections::HashMap;

use propreel_core::{AssetId, ClipId, Frame, TransitionId};
use serde::{Deserialize, Serialize};

use crate::asset::Asset;
use crate::clip::Clip;
use crate::project::Project;
use crate::track::Track;
use crate::transition::Transition;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub clips: HashMap<ClipId, Clip>,
    pub tracks: Vec<Track>,
    pub assets: HashMap<AssetId, Asset>,
    pub transitions: HashMap<TransitionId, Transition>,
    pub total_duration_frames: Frame,
}

impl ProjectSnapshot {
    /// Deep-copy the structural fields of `project`.
    pub fn capture(project: &Project) -> Self {
        Self {
            clips: project.clips.clone(),
            tracks: project.tracks.clone(),
            assets: project.assets.clone(),
            transitions: project.transitions.clone(),
            total_duration_frames: project.total_duration_frames,
        }
    }

    /// Write this snapshot's structure into `project`.
    ///
    /// Playhead, play state and zoom are kept. A selection that points at a
    /// clip or track absent from the snapshot is cleared. The playhead is
    /// clamped to the restored duration.
    pub fn restore(self, project: &mut Project) {
        project.clips = self.clips;
        project.tracks = self.tracks;
        project.assets = self.assets;
        project.transitions = self.transitions;
        project.total_duration_frames = self.total_duration_frames;

        if let Some(clip_id) = project.selected_clip_id {
            if !project.clips.contains_key(&clip_id) {
                project.selected_clip_id = None;
            }
        }
        if let Some(track_id) = project.selected_track_id {
            if project.track(track_id).is_none() {
                project.selected_track_id = None;
            }
        }
        project.current_frame = project.current_frame.min(project.total_duration_frames);

        tracing::debug!(
            tracks = project.tracks.len(),
            clips = project.clips.len(),
            "Snapshot restored"
        );
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }
}
