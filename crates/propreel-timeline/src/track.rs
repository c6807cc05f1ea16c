//! Track types for the timeline.

use propreel_core::{new_id, ClipId, TrackId};
use serde::{Deserialize, Serialize};

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Visual,
    Audio,
    Text,
}

impl TrackKind {
    /// Prefix used for default track names.
    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Visual => "Visual",
            TrackKind::Audio => "Audio",
            TrackKind::Text => "Text",
        }
    }
}

/// An ordered lane of clips of one kind.
///
/// The track only stores clip ids; the clips themselves live in the
/// project's clip map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track kind
    pub kind: TrackKind,
    /// Track name
    pub name: String,
    /// Is track muted
    pub muted: bool,
    /// Is track locked (prevent edits)
    pub locked: bool,
    /// Is track shown in the preview
    pub visible: bool,
    /// Track gain, when set
    pub volume: Option<f32>,
    /// Clip ids in track order
    pub clip_ids: Vec<ClipId>,
}

impl Track {
    /// Create a new empty track.
    pub fn new(kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            kind,
            name: name.into(),
            muted: false,
            locked: false,
            visible: true,
            volume: None,
            clip_ids: Vec::new(),
        }
    }

    /// Position of a clip id in this track.
    pub fn position_of(&self, clip_id: ClipId) -> Option<usize> {
        self.clip_ids.iter().position(|id| *id == clip_id)
    }

    pub fn contains(&self, clip_id: ClipId) -> bool {
        self.position_of(clip_id).is_some()
    }

    /// Add a clip id to the end of the track.
    pub fn append_clip(&mut self, clip_id: ClipId) {
        self.clip_ids.push(clip_id);
    }

    /// Insert `clip_id` right after `after`, or append when `after` is absent.
    pub fn insert_clip_after(&mut self, after: ClipId, clip_id: ClipId) {
        match self.position_of(after) {
            Some(index) => self.clip_ids.insert(index + 1, clip_id),
            None => self.clip_ids.push(clip_id),
        }
    }

    /// Remove a clip id. Returns whether it was present.
    pub fn remove_clip(&mut self, clip_id: ClipId) -> bool {
        let before = self.clip_ids.len();
        self.clip_ids.retain(|id| *id != clip_id);
        self.clip_ids.len() != before
    }

    /// Number of clips in this track.
    pub fn clip_count(&self) -> usize {
        self.clip_ids.len()
    }
}

/// Partial update of a track's properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackPatch {
    pub name: Option<String>,
    pub muted: Option<bool>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
    pub volume: Option<Option<f32>>,
}

impl TrackPatch {
    pub fn apply_to(self, track: &mut Track) {
        if let Some(name) = self.name {
            track.name = name;
        }
        if let Some(muted) = self.muted {
            track.muted = muted;
        }
        if let Some(locked) = self.locked {
            track.locked = locked;
        }
        if let Some(visible) = self.visible {
            track.visible = visible;
        }
        if let Some(volume) = self.volume {
            track.volume = volume;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_after_keeps_order() {
        let mut track = Track::new(TrackKind::Visual, "Visual 1");
        let (a, b, c) = (new_id(), new_id(), new_id());
        track.append_clip(a);
        track.append_clip(b);
        track.insert_clip_after(a, c);
        assert_eq!(track.clip_ids, vec![a, c, b]);
    }

    #[test]
    fn test_insert_after_missing_appends() {
        let mut track = Track::new(TrackKind::Text, "Text 1");
        let (a, b) = (new_id(), new_id());
        track.append_clip(a);
        track.insert_clip_after(new_id(), b);
        assert_eq!(track.clip_ids, vec![a, b]);
    }

    #[test]
    fn test_remove_clip() {
        let mut track = Track::new(TrackKind::Audio, "Audio 1");
        let a = new_id();
        track.append_clip(a);
        assert!(track.remove_clip(a));
        assert!(!track.remove_clip(a));
        assert_eq!(track.clip_count(), 0);
    }

    #[test]
    fn test_patch() {
        let mut track = Track::new(TrackKind::Audio, "Audio 1");
        TrackPatch {
            muted: Some(true),
            volume: Some(Some(0.8)),
            ..Default::default()
        }
        .apply_to(&mut track);
        assert!(track.muted);
        assert_eq!(track.volume, Some(0.8));
        assert!(track.visible);
    }
}
