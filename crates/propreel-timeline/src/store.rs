//! The project store: single owner of the canonical project.
//!
//! Every mutation goes through a method here. Each method runs to completion,
//! repairs dependent structures (track lists, transitions, selection, total
//! duration), then commits: observers are notified and the new state is
//! handed to the persister.
//!
//! Out-of-range calls are no-ops and report it through their return value
//! (`None` / `false`). Nothing here returns an error.
//!
//! Structural edits that are hard to redo by hand (adding, removing, moving,
//! splitting and duplicating clips, tracks and assets) checkpoint history
//! before mutating. Property tweaks (clip patches, effects, transitions,
//! Ken Burns) do not.

use propreel_core::{
    AssetId, ClipId, EditorConfig, EffectId, Frame, FrameRate, TrackId, TransitionId,
};
use tracing::debug;

use crate::asset::Asset;
use crate::clip::{Clip, ClipPatch, Effect, EffectKind, EffectPatch, KenBurns, TextContent};
use crate::event::{Observers, ProjectEvent};
use crate::history::HistoryManager;
use crate::project::{ExportFormat, IntegrityError, Project};
use crate::storage::Persister;
use crate::track::{Track, TrackKind, TrackPatch};
use crate::transition::{Transition, TransitionKind, TransitionPatch};

/// Zoom limits in pixels per frame.
pub const MIN_ZOOM: f32 = 0.05;
pub const MAX_ZOOM: f32 = 64.0;

pub struct ProjectStore {
    project: Project,
    history: HistoryManager,
    config: EditorConfig,
    observers: Observers,
    persister: Option<Persister>,
    revision: u64,
}

impl ProjectStore {
    /// Create a store around a fresh project.
    pub fn new(name: impl Into<String>, frame_rate: FrameRate, config: EditorConfig) -> Self {
        let min_duration = frame_rate.frames_for_seconds(config.min_project_seconds);
        Self::from_project(Project::new(name, frame_rate, min_duration), config)
    }

    /// Take ownership of an existing (already pruned) project.
    pub fn from_project(project: Project, config: EditorConfig) -> Self {
        let violations = project.validate(config.min_clip_frames, config.clip_end_buffer_frames);
        for violation in &violations {
            tracing::warn!(%violation, "Project integrity problem");
        }
        Self {
            history: HistoryManager::new(config.history_capacity),
            project,
            config,
            observers: Observers::default(),
            persister: None,
            revision: 0,
        }
    }

    /// Persist every committed state through `persister`.
    pub fn with_persister(mut self, persister: Persister) -> Self {
        self.persister = Some(persister);
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    /// Number of commits since the store was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Receive an event for every committed state transition.
    pub fn subscribe(&mut self) -> crossbeam_channel::Receiver<ProjectEvent> {
        self.observers.subscribe()
    }

    /// Number of live event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    /// Wait for pending writes to reach storage.
    pub fn flush(&self) {
        if let Some(persister) = &self.persister {
            persister.flush();
        }
    }

    /// Check the structural invariants of the current project.
    pub fn validate(&self) -> Vec<IntegrityError> {
        self.project
            .validate(self.config.min_clip_frames, self.config.clip_end_buffer_frames)
    }

    fn min_duration(&self) -> Frame {
        self.project
            .frame_rate
            .frames_for_seconds(self.config.min_project_seconds)
    }

    fn checkpoint_as(&mut self, label: &str) {
        self.history.push_state(label, &self.project);
    }

    fn commit(&mut self, event: ProjectEvent) {
        if event.is_structural() {
            self.project.touch();
        }
        self.revision += 1;
        debug!(revision = self.revision, ?event, "Committed");
        if let Some(persister) = &self.persister {
            persister.schedule(&self.project);
        }
        self.observers.broadcast(event);
    }

    // ── Duration ───────────────────────────────────────────────

    /// Set the total duration to `max(last clip end + buffer, minimum project length)`.
    pub fn recalculate_duration(&mut self) {
        let before = self.project.total_duration_frames;
        self.refresh_duration();
        if self.project.total_duration_frames != before {
            self.commit(ProjectEvent::ProjectChanged);
        }
    }

    fn refresh_duration(&mut self) {
        let min = self.min_duration();
        self.project
            .recalculate_duration(self.config.clip_end_buffer_frames, min);
    }

    fn extend_duration(&mut self, end: Frame) {
        self.project
            .extend_duration(end, self.config.clip_end_buffer_frames);
    }

    // ── Tracks ─────────────────────────────────────────────────

    /// Append an empty track. Unnamed tracks get "<Kind> <n>".
    pub fn add_track(&mut self, kind: TrackKind, name: Option<&str>) -> TrackId {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| self.project.default_track_name(kind));
        self.checkpoint_as("Add track");
        let track = Track::new(kind, name);
        let id = track.id;
        self.project.tracks.push(track);
        self.commit(ProjectEvent::TrackAdded(id));
        id
    }

    /// Delete a track with its clips and their transitions.
    pub fn remove_track(&mut self, track_id: TrackId) -> bool {
        if self.project.track(track_id).is_none() {
            return false;
        }
        self.checkpoint_as("Remove track");
        let removed = self.project.purge_track(track_id).unwrap_or_default();
        self.refresh_duration();
        debug!(%track_id, clips = removed.len(), "Track removed");
        self.commit(ProjectEvent::TrackRemoved(track_id));
        true
    }

    pub fn update_track(&mut self, track_id: TrackId, patch: TrackPatch) -> bool {
        let Some(track) = self.project.track_mut(track_id) else {
            return false;
        };
        patch.apply_to(track);
        self.commit(ProjectEvent::TrackUpdated(track_id));
        true
    }

    // ── Assets ─────────────────────────────────────────────────

    pub fn add_asset(&mut self, asset: Asset) -> AssetId {
        let id = asset.id;
        debug!(%id, name = %asset.name, kind = ?asset.kind, "Asset added");
        self.project.assets.insert(id, asset);
        self.commit(ProjectEvent::AssetAdded(id));
        id
    }

    /// Delete an asset and every clip that references it.
    pub fn remove_asset(&mut self, asset_id: AssetId) -> bool {
        if !self.project.assets.contains_key(&asset_id) {
            return false;
        }
        self.checkpoint_as("Remove asset");
        let clips = self.project.purge_asset(asset_id).unwrap_or_default();
        self.refresh_duration();
        self.commit(ProjectEvent::AssetRemoved {
            asset: asset_id,
            clips,
        });
        true
    }

    // ── Clips ──────────────────────────────────────────────────

    /// Place an asset on a track.
    ///
    /// Duration defaults to the asset's natural length, then to the
    /// configured fallback. Still images get a gentle Ken Burns zoom-in.
    pub fn add_clip(
        &mut self,
        asset_id: AssetId,
        track_id: TrackId,
        start_frame: Frame,
        duration_frames: Option<Frame>,
    ) -> Option<ClipId> {
        let asset = self.project.assets.get(&asset_id)?;
        self.project.track(track_id)?;

        let duration = duration_frames
            .or(asset.duration_frames)
            .unwrap_or(self.config.default_clip_frames)
            .max(self.config.min_clip_frames);
        let mut clip = Clip::new_media(asset_id, track_id, start_frame, duration);
        if asset.is_image() {
            clip.ken_burns = Some(KenBurns::zoom_in(self.config.ken_burns_intensity));
        }

        self.checkpoint_as("Add clip");
        Some(self.insert_clip(clip))
    }

    /// Place an inline text clip on a track.
    pub fn add_text_clip(
        &mut self,
        track_id: TrackId,
        start_frame: Frame,
        content: TextContent,
    ) -> Option<ClipId> {
        self.project.track(track_id)?;
        let duration = self
            .config
            .default_clip_frames
            .max(self.config.min_clip_frames);
        let clip = Clip::new_text(track_id, start_frame, duration, content);

        self.checkpoint_as("Add text");
        Some(self.insert_clip(clip))
    }

    fn insert_clip(&mut self, clip: Clip) -> ClipId {
        let id = clip.id;
        let end = clip.end_frame();
        if let Some(track) = self.project.track_mut(clip.track_id) {
            track.append_clip(id);
        }
        self.project.clips.insert(id, clip);
        self.extend_duration(end);
        self.commit(ProjectEvent::ClipAdded(id));
        id
    }

    /// Delete a clip, its track entry and any transition touching it.
    pub fn remove_clip(&mut self, clip_id: ClipId) -> bool {
        if !self.project.clips.contains_key(&clip_id) {
            return false;
        }
        self.checkpoint_as("Remove clip");
        self.project.purge_clip(clip_id);
        self.refresh_duration();
        self.commit(ProjectEvent::ClipRemoved(clip_id));
        true
    }

    /// Shallow-merge `patch` into a clip. Does not checkpoint history.
    pub fn update_clip(&mut self, clip_id: ClipId, patch: ClipPatch) -> bool {
        let min = self.config.min_clip_frames;
        let Some(clip) = self.project.clips.get_mut(&clip_id) else {
            return false;
        };
        let span_before = clip.span();
        patch.apply_to(clip, min);
        if clip.span() != span_before {
            self.refresh_duration();
        }
        self.commit(ProjectEvent::ClipUpdated(clip_id));
        true
    }

    /// Move a clip to `track_id` at `start_frame`.
    ///
    /// The clip is appended to the destination track's list. Overlapping
    /// clips on the destination are left as they are.
    pub fn move_clip(&mut self, clip_id: ClipId, track_id: TrackId, start_frame: Frame) -> bool {
        let Some(from_track) = self.project.clips.get(&clip_id).map(|c| c.track_id) else {
            return false;
        };
        if self.project.track(track_id).is_none() {
            return false;
        }

        self.checkpoint_as("Move clip");
        if let Some(track) = self.project.track_mut(from_track) {
            track.remove_clip(clip_id);
        }
        if let Some(track) = self.project.track_mut(track_id) {
            track.append_clip(clip_id);
        }
        if let Some(clip) = self.project.clips.get_mut(&clip_id) {
            clip.track_id = track_id;
            clip.start_frame = start_frame;
        }
        self.refresh_duration();
        self.commit(ProjectEvent::ClipMoved {
            clip: clip_id,
            from_track,
            to_track: track_id,
        });
        true
    }

    /// Change a clip's duration.
    ///
    /// With `from_start` the end frame stays put and the start absorbs the
    /// change; otherwise the start stays put. Duration never drops below the
    /// minimum, and the start never goes below frame 0.
    pub fn resize_clip(&mut self, clip_id: ClipId, duration_frames: Frame, from_start: bool) -> bool {
        let min = self.config.min_clip_frames;
        let Some(clip) = self.project.clips.get_mut(&clip_id) else {
            return false;
        };
        let duration = duration_frames.max(min);
        if from_start {
            let end = clip.end_frame();
            if duration > end {
                clip.start_frame = 0;
                clip.duration_frames = end.max(min);
            } else {
                clip.start_frame = end - duration;
                clip.duration_frames = duration;
            }
        } else {
            clip.duration_frames = duration;
        }
        self.refresh_duration();
        self.commit(ProjectEvent::ClipUpdated(clip_id));
        true
    }

    /// Cut a clip in two at `at_frame`.
    ///
    /// The original keeps `[start, at_frame)`; a new clip covering
    /// `[at_frame, end)` is inserted right after it in the track order with
    /// copies of all properties and freshly identified effects. No-op unless
    /// `at_frame` lies strictly inside the clip and both halves reach the
    /// minimum duration.
    pub fn split_clip(&mut self, clip_id: ClipId, at_frame: Frame) -> Option<ClipId> {
        let min = self.config.min_clip_frames;
        let clip = self.project.clips.get(&clip_id)?;
        let span = clip.span();
        if !span.contains_interior(at_frame) {
            debug!(%clip_id, at_frame, "Split point outside clip");
            return None;
        }
        let left = at_frame - span.start;
        let right = span.end() - at_frame;
        if left < min || right < min {
            debug!(%clip_id, at_frame, "Split would leave a clip below the minimum length");
            return None;
        }

        let mut second = clip.duplicate();
        second.start_frame = at_frame;
        second.duration_frames = right;
        let second_id = second.id;
        let track_id = clip.track_id;

        self.checkpoint_as("Split clip");
        if let Some(first) = self.project.clips.get_mut(&clip_id) {
            first.duration_frames = left;
        }
        if let Some(track) = self.project.track_mut(track_id) {
            track.insert_clip_after(clip_id, second_id);
        }
        self.project.clips.insert(second_id, second);
        self.refresh_duration();
        self.commit(ProjectEvent::ClipSplit {
            original: clip_id,
            created: second_id,
        });
        Some(second_id)
    }

    /// Copy a clip onto the same track, a short gap after the original.
    pub fn duplicate_clip(&mut self, clip_id: ClipId) -> Option<ClipId> {
        let original = self.project.clips.get(&clip_id)?;
        let mut copy = original.duplicate();
        copy.start_frame = original
            .end_frame()
            .saturating_add(self.config.duplicate_gap_frames);

        self.checkpoint_as("Duplicate clip");
        Some(self.insert_clip(copy))
    }

    // ── Transitions ────────────────────────────────────────────

    /// Add a transition between two existing clips.
    pub fn add_transition(
        &mut self,
        kind: TransitionKind,
        from_clip_id: ClipId,
        to_clip_id: ClipId,
        duration_frames: Frame,
    ) -> Option<TransitionId> {
        if from_clip_id == to_clip_id
            || !self.project.clips.contains_key(&from_clip_id)
            || !self.project.clips.contains_key(&to_clip_id)
        {
            return None;
        }
        let transition = Transition::new(kind, from_clip_id, to_clip_id, duration_frames);
        let id = transition.id;
        self.project.transitions.insert(id, transition);
        self.commit(ProjectEvent::TransitionsChanged);
        Some(id)
    }

    pub fn remove_transition(&mut self, transition_id: TransitionId) -> bool {
        if self.project.transitions.remove(&transition_id).is_none() {
            return false;
        }
        self.commit(ProjectEvent::TransitionsChanged);
        true
    }

    pub fn update_transition(&mut self, transition_id: TransitionId, patch: TransitionPatch) -> bool {
        let Some(transition) = self.project.transitions.get_mut(&transition_id) else {
            return false;
        };
        patch.apply_to(transition);
        self.commit(ProjectEvent::TransitionsChanged);
        true
    }

    // ── Effects ────────────────────────────────────────────────

    pub fn add_effect(&mut self, clip_id: ClipId, kind: EffectKind, intensity: f32) -> Option<EffectId> {
        let clip = self.project.clips.get_mut(&clip_id)?;
        let effect = Effect::new(kind, intensity);
        let id = effect.id;
        clip.effects.push(effect);
        self.commit(ProjectEvent::EffectsChanged(clip_id));
        Some(id)
    }

    pub fn remove_effect(&mut self, clip_id: ClipId, effect_id: EffectId) -> bool {
        let Some(clip) = self.project.clips.get_mut(&clip_id) else {
            return false;
        };
        let before = clip.effects.len();
        clip.effects.retain(|e| e.id != effect_id);
        if clip.effects.len() == before {
            return false;
        }
        self.commit(ProjectEvent::EffectsChanged(clip_id));
        true
    }

    pub fn update_effect(&mut self, clip_id: ClipId, effect_id: EffectId, patch: EffectPatch) -> bool {
        let Some(effect) = self
            .project
            .clips
            .get_mut(&clip_id)
            .and_then(|c| c.effect_mut(effect_id))
        else {
            return false;
        };
        if let Some(kind) = patch.kind {
            effect.kind = kind;
        }
        if let Some(intensity) = patch.intensity {
            effect.intensity = intensity;
        }
        self.commit(ProjectEvent::EffectsChanged(clip_id));
        true
    }

    // ── Ken Burns ──────────────────────────────────────────────

    pub fn set_ken_burns(&mut self, clip_id: ClipId, ken_burns: KenBurns) -> bool {
        let Some(clip) = self.project.clips.get_mut(&clip_id) else {
            return false;
        };
        clip.ken_burns = Some(ken_burns);
        self.commit(ProjectEvent::ClipUpdated(clip_id));
        true
    }

    pub fn remove_ken_burns(&mut self, clip_id: ClipId) -> bool {
        let Some(clip) = self.project.clips.get_mut(&clip_id) else {
            return false;
        };
        if clip.ken_burns.take().is_none() {
            return false;
        }
        self.commit(ProjectEvent::ClipUpdated(clip_id));
        true
    }

    // ── History ────────────────────────────────────────────────

    /// Checkpoint the current structure explicitly.
    ///
    /// Used before edits that do not checkpoint on their own, such as a
    /// committed resize gesture.
    pub fn checkpoint(&mut self, label: &str) {
        self.checkpoint_as(label);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the structure before the last checkpoint. Editor state
    /// (playhead, play flag, zoom, valid selection) is preserved.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo(&self.project) else {
            return false;
        };
        snapshot.restore(&mut self.project);
        self.commit(ProjectEvent::HistoryRestored);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo(&self.project) else {
            return false;
        };
        snapshot.restore(&mut self.project);
        self.commit(ProjectEvent::HistoryRestored);
        true
    }

    // ── Editor state ───────────────────────────────────────────

    /// Select a clip (and its track), or clear the clip selection.
    pub fn select_clip(&mut self, clip_id: Option<ClipId>) -> bool {
        match clip_id {
            Some(id) => {
                let Some(track_id) = self.project.clips.get(&id).map(|c| c.track_id) else {
                    return false;
                };
                self.project.selected_clip_id = Some(id);
                self.project.selected_track_id = Some(track_id);
            }
            None => self.project.selected_clip_id = None,
        }
        self.commit(ProjectEvent::SelectionChanged);
        true
    }

    pub fn select_track(&mut self, track_id: Option<TrackId>) -> bool {
        if let Some(id) = track_id {
            if self.project.track(id).is_none() {
                return false;
            }
        }
        self.project.selected_track_id = track_id;
        self.commit(ProjectEvent::SelectionChanged);
        true
    }

    /// Move the playhead, clamped to `[0, total duration]`. Returns the applied frame.
    pub fn set_current_frame(&mut self, frame: Frame) -> Frame {
        let frame = frame.min(self.project.total_duration_frames);
        if frame != self.project.current_frame {
            self.project.current_frame = frame;
            self.commit(ProjectEvent::PlayheadMoved(frame));
        }
        frame
    }

    pub fn set_playing(&mut self, playing: bool) {
        if self.project.is_playing != playing {
            self.project.is_playing = playing;
            self.commit(ProjectEvent::PlayStateChanged(playing));
        }
    }

    pub fn toggle_play(&mut self) -> bool {
        let playing = !self.project.is_playing;
        self.set_playing(playing);
        playing
    }

    /// Set pixels per frame, clamped to the supported zoom range.
    pub fn set_zoom(&mut self, pixels_per_frame: f32) {
        let zoom = if pixels_per_frame.is_finite() {
            pixels_per_frame.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            crate::project::DEFAULT_ZOOM
        };
        if zoom != self.project.zoom {
            self.project.zoom = zoom;
            self.commit(ProjectEvent::ZoomChanged);
        }
    }

    // ── Project metadata ───────────────────────────────────────

    pub fn rename(&mut self, name: impl Into<String>) {
        self.project.name = name.into();
        self.commit(ProjectEvent::ProjectChanged);
    }

    pub fn set_export_format(&mut self, format: ExportFormat) {
        if self.project.export_format != format {
            self.project.export_format = format;
            self.commit(ProjectEvent::ProjectChanged);
        }
    }
}
