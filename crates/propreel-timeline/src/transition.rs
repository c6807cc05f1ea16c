//! Transitions between two clips.

use propreel_core::{new_id, ClipId, Frame, TransitionId};
use serde::{Deserialize, Serialize};

/// Blend style of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Fade,
    Dissolve,
    WipeLeft,
    WipeRight,
    SlideLeft,
    SlideRight,
    Zoom,
}

/// A timed blend from one clip into another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub id: TransitionId,
    pub kind: TransitionKind,
    pub from_clip_id: ClipId,
    pub to_clip_id: ClipId,
    pub duration_frames: Frame,
}

impl Transition {
    pub fn new(
        kind: TransitionKind,
        from_clip_id: ClipId,
        to_clip_id: ClipId,
        duration_frames: Frame,
    ) -> Self {
        Self {
            id: new_id(),
            kind,
            from_clip_id,
            to_clip_id,
            duration_frames,
        }
    }

    /// Whether this transition references `clip_id` on either side.
    pub fn references(&self, clip_id: ClipId) -> bool {
        self.from_clip_id == clip_id || self.to_clip_id == clip_id
    }
}

/// Partial update of a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionPatch {
    pub kind: Option<TransitionKind>,
    pub duration_frames: Option<Frame>,
}

impl TransitionPatch {
    pub fn apply_to(self, transition: &mut Transition) {
        if let Some(kind) = self.kind {
            transition.kind = kind;
        }
        if let Some(duration) = self.duration_frames {
            transition.duration_frames = duration;
        }
    }
}
