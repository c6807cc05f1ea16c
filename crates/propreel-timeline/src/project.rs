//! Project type and the cascading cleanup that keeps it consistent.

use std::collections::HashMap;

use propreel_core::{
    new_id, now_millis, AssetId, ClipId, Frame, FrameRate, ProjectId, TrackId, TransitionId,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::Asset;
use crate::clip::Clip;
use crate::track::{Track, TrackKind};
use crate::transition::Transition;

/// Output aspect-ratio class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// 16:9
    #[default]
    Landscape,
    /// 9:16 (stories, reels)
    Portrait,
    /// 1:1
    Square,
}

impl ExportFormat {
    /// Output resolution for this format.
    pub fn resolution(self) -> (u32, u32) {
        match self {
            ExportFormat::Landscape => (1920, 1080),
            ExportFormat::Portrait => (1080, 1920),
            ExportFormat::Square => (1080, 1080),
        }
    }
}

/// Default pixels-per-frame zoom of the timeline.
pub const DEFAULT_ZOOM: f32 = 2.0;

/// An editing project: tracks, clips, assets and transitions plus the
/// ephemeral editor state (playhead, play flag, zoom, selection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project ID
    pub id: ProjectId,
    /// Project name
    pub name: String,
    /// Output aspect ratio
    pub export_format: ExportFormat,
    /// Timeline frame rate
    pub frame_rate: FrameRate,
    /// Total timeline length
    pub total_duration_frames: Frame,
    /// Tracks, top to bottom
    pub tracks: Vec<Track>,
    pub clips: HashMap<ClipId, Clip>,
    pub assets: HashMap<AssetId, Asset>,
    pub transitions: HashMap<TransitionId, Transition>,
    /// Playhead position
    pub current_frame: Frame,
    pub is_playing: bool,
    /// Pixels per frame
    pub zoom: f32,
    pub selected_clip_id: Option<ClipId>,
    pub selected_track_id: Option<TrackId>,
    /// Creation time (unix millis)
    pub created_at: u64,
    /// Last modification time (unix millis)
    pub updated_at: u64,
}

impl Project {
    /// Create a new project with one visual and one audio track.
    pub fn new(name: impl Into<String>, frame_rate: FrameRate, min_duration: Frame) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            name: name.into(),
            export_format: ExportFormat::default(),
            frame_rate,
            total_duration_frames: min_duration,
            tracks: vec![
                Track::new(TrackKind::Visual, "Visual 1"),
                Track::new(TrackKind::Audio, "Audio 1"),
            ],
            clips: HashMap::new(),
            assets: HashMap::new(),
            transitions: HashMap::new(),
            current_frame: 0,
            is_playing: false,
            zoom: DEFAULT_ZOOM,
            selected_clip_id: None,
            selected_track_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn track_mut(&mut self, id: TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.get(&id)
    }

    /// Clips of a track in track order.
    pub fn clips_on_track(&self, track_id: TrackId) -> Vec<&Clip> {
        self.track(track_id)
            .map(|t| t.clip_ids.iter().filter_map(|id| self.clips.get(id)).collect())
            .unwrap_or_default()
    }

    /// Furthest clip end frame, or 0 for an empty project.
    pub fn max_clip_end(&self) -> Frame {
        self.clips.values().map(Clip::end_frame).max().unwrap_or(0)
    }

    /// Name for the next track of `kind`, e.g. "Audio 2".
    pub fn default_track_name(&self, kind: TrackKind) -> String {
        let count = self.tracks.iter().filter(|t| t.kind == kind).count();
        format!("{} {}", kind.label(), count + 1)
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }

    // ── Cascading cleanup ──────────────────────────────────────

    /// Remove a clip with everything that depends on it: its track-list
    /// entry, transitions referencing it, and a selection pointing at it.
    pub(crate) fn purge_clip(&mut self, clip_id: ClipId) -> Option<Clip> {
        let clip = self.clips.remove(&clip_id)?;
        if let Some(track) = self.track_mut(clip.track_id) {
            track.remove_clip(clip_id);
        }
        self.transitions.retain(|_, t| !t.references(clip_id));
        if self.selected_clip_id == Some(clip_id) {
            self.selected_clip_id = None;
        }
        Some(clip)
    }

    /// Remove a track and every clip it owned. Returns the removed clip ids.
    pub(crate) fn purge_track(&mut self, track_id: TrackId) -> Option<Vec<ClipId>> {
        let index = self.tracks.iter().position(|t| t.id == track_id)?;
        let track = self.tracks.remove(index);
        for clip_id in &track.clip_ids {
            self.purge_clip(*clip_id);
        }
        // Clips claiming this track without being listed in it.
        let strays: Vec<ClipId> = self
            .clips
            .values()
            .filter(|c| c.track_id == track_id)
            .map(|c| c.id)
            .collect();
        for clip_id in &strays {
            self.purge_clip(*clip_id);
        }
        if self.selected_track_id == Some(track_id) {
            self.selected_track_id = None;
        }
        let mut removed = track.clip_ids;
        removed.extend(strays);
        Some(removed)
    }

    /// Remove an asset and every clip referencing it. Returns the removed clip ids.
    pub(crate) fn purge_asset(&mut self, asset_id: AssetId) -> Option<Vec<ClipId>> {
        self.assets.remove(&asset_id)?;
        let referencing: Vec<ClipId> = self
            .clips
            .values()
            .filter(|c| c.asset_id == Some(asset_id))
            .map(|c| c.id)
            .collect();
        for clip_id in &referencing {
            self.purge_clip(*clip_id);
        }
        Some(referencing)
    }

    /// Set the total duration to `max(max clip end + buffer, min_duration)`.
    pub(crate) fn recalculate_duration(&mut self, buffer: Frame, min_duration: Frame) {
        self.total_duration_frames = self.max_clip_end().saturating_add(buffer).max(min_duration);
        if self.current_frame > self.total_duration_frames {
            self.current_frame = self.total_duration_frames;
        }
    }

    /// Grow the total duration so that `end + buffer` fits.
    pub(crate) fn extend_duration(&mut self, end: Frame, buffer: Frame) {
        self.total_duration_frames = self.total_duration_frames.max(end.saturating_add(buffer));
    }

    // ── Integrity ──────────────────────────────────────────────

    /// Check the structural invariants. An empty list means the project is consistent.
    pub fn validate(&self, min_clip_frames: Frame, end_buffer: Frame) -> Vec<IntegrityError> {
        let mut errors = Vec::new();

        for track in &self.tracks {
            for clip_id in &track.clip_ids {
                match self.clips.get(clip_id) {
                    None => errors.push(IntegrityError::DanglingClipId {
                        track: track.id,
                        clip: *clip_id,
                    }),
                    Some(clip) if clip.track_id != track.id => {
                        errors.push(IntegrityError::TrackMismatch {
                            clip: *clip_id,
                            listed_in: track.id,
                            claims: clip.track_id,
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for clip in self.clips.values() {
            let listed = self
                .track(clip.track_id)
                .map(|t| t.contains(clip.id))
                .unwrap_or(false);
            if !listed {
                errors.push(IntegrityError::UnlistedClip { clip: clip.id });
            }
            if clip.duration_frames < min_clip_frames {
                errors.push(IntegrityError::ClipTooShort {
                    clip: clip.id,
                    duration: clip.duration_frames,
                });
            }
            if let Some(asset_id) = clip.asset_id {
                if !self.assets.contains_key(&asset_id) {
                    errors.push(IntegrityError::MissingAsset {
                        clip: clip.id,
                        asset: asset_id,
                    });
                }
            }
            let mut seen = std::collections::HashSet::new();
            for effect in &clip.effects {
                if !seen.insert(effect.id) {
                    errors.push(IntegrityError::DuplicateEffect {
                        clip: clip.id,
                        effect: effect.id,
                    });
                }
            }
        }

        for transition in self.transitions.values() {
            if !self.clips.contains_key(&transition.from_clip_id)
                || !self.clips.contains_key(&transition.to_clip_id)
            {
                errors.push(IntegrityError::DanglingTransition {
                    transition: transition.id,
                });
            }
        }

        let required = self.max_clip_end().saturating_add(end_buffer);
        if !self.clips.is_empty() && self.total_duration_frames < required {
            errors.push(IntegrityError::DurationTooShort {
                total: self.total_duration_frames,
                required,
            });
        }

        errors
    }
}

/// A violated structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("track {track} lists missing clip {clip}")]
    DanglingClipId { track: TrackId, clip: ClipId },

    #[error("clip {clip} is listed in track {listed_in} but belongs to {claims}")]
    TrackMismatch {
        clip: ClipId,
        listed_in: TrackId,
        claims: TrackId,
    },

    #[error("clip {clip} is not listed by its track")]
    UnlistedClip { clip: ClipId },

    #[error("clip {clip} is {duration} frames, below the minimum")]
    ClipTooShort { clip: ClipId, duration: Frame },

    #[error("clip {clip} references missing asset {asset}")]
    MissingAsset { clip: ClipId, asset: AssetId },

    #[error("clip {clip} has duplicate effect id {effect}")]
    DuplicateEffect {
        clip: ClipId,
        effect: propreel_core::EffectId,
    },

    #[error("transition {transition} references a missing clip")]
    DanglingTransition { transition: TransitionId },

    #[error("total duration {total} is shorter than required {required}")]
    DurationTooShort { total: Frame, required: Frame },
}
