//! Clip types for the timeline.

use glam::Vec2;
use propreel_core::{new_id, AssetId, ClipId, EffectId, Frame, FrameSpan, TrackId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Kind of effect applied to a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Brightness,
    Contrast,
    Saturation,
    Blur,
    Grayscale,
    Sepia,
    Vignette,
    Sharpen,
}

/// A parameterized modifier owned by exactly one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: EffectId,
    pub kind: EffectKind,
    /// Strength, usually in `0.0..=1.0`.
    pub intensity: f32,
}

impl Effect {
    pub fn new(kind: EffectKind, intensity: f32) -> Self {
        Self {
            id: new_id(),
            kind,
            intensity,
        }
    }

    /// Copy with a fresh id, so the copy never aliases the original.
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_id(),
            ..self.clone()
        }
    }
}

/// Partial update of an effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectPatch {
    pub kind: Option<EffectKind>,
    pub intensity: Option<f32>,
}

/// Slow pan/zoom across a still image over the clip's duration.
///
/// Centers are normalized to the frame (`0.5, 0.5` is the middle).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KenBurns {
    pub start_scale: f32,
    pub end_scale: f32,
    pub start_center: Vec2,
    pub end_center: Vec2,
}

impl KenBurns {
    /// Centered zoom-in by `intensity` (0.1 = 10%).
    pub fn zoom_in(intensity: f32) -> Self {
        Self {
            start_scale: 1.0,
            end_scale: 1.0 + intensity,
            start_center: Vec2::splat(0.5),
            end_center: Vec2::splat(0.5),
        }
    }

    /// Centered zoom-out by `intensity`.
    pub fn zoom_out(intensity: f32) -> Self {
        Self {
            start_scale: 1.0 + intensity,
            end_scale: 1.0,
            start_center: Vec2::splat(0.5),
            end_center: Vec2::splat(0.5),
        }
    }

    /// Scale and center at `progress` through the clip (clamped to `0..=1`).
    pub fn sample(&self, progress: f32) -> (f32, Vec2) {
        let t = progress.clamp(0.0, 1.0);
        let scale = self.start_scale + (self.end_scale - self.start_scale) * t;
        (scale, self.start_center.lerp(self.end_center, t))
    }
}

/// Horizontal alignment of a text overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Inline text shown by a text clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: String,
    pub font_family: String,
    pub font_size: f32,
    /// CSS-style color, e.g. `#ffffff`.
    pub color: String,
    pub background: Option<String>,
    pub align: TextAlign,
    pub bold: bool,
    /// Normalized anchor position in the frame.
    pub position: Vec2,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: "Inter".to_string(),
            font_size: 48.0,
            color: "#ffffff".to_string(),
            background: None,
            align: TextAlign::Center,
            bold: false,
            position: Vec2::new(0.5, 0.85),
        }
    }
}

/// A clip placed on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Source asset (None for text clips)
    pub asset_id: Option<AssetId>,
    /// Owning track
    pub track_id: TrackId,
    /// First frame on the timeline
    pub start_frame: Frame,
    /// Length on the timeline
    pub duration_frames: Frame,
    /// Effects, unique by id
    pub effects: SmallVec<[Effect; 4]>,
    pub ken_burns: Option<KenBurns>,
    pub text: Option<TextContent>,
    pub fade_in_frames: Option<Frame>,
    pub fade_out_frames: Option<Frame>,
    pub volume: Option<f32>,
}

impl Clip {
    /// Create a clip referencing a media asset.
    pub fn new_media(
        asset_id: AssetId,
        track_id: TrackId,
        start_frame: Frame,
        duration_frames: Frame,
    ) -> Self {
        Self {
            id: new_id(),
            asset_id: Some(asset_id),
            track_id,
            start_frame,
            duration_frames,
            effects: SmallVec::new(),
            ken_burns: None,
            text: None,
            fade_in_frames: None,
            fade_out_frames: None,
            volume: None,
        }
    }

    /// Create a text clip with no backing asset.
    pub fn new_text(
        track_id: TrackId,
        start_frame: Frame,
        duration_frames: Frame,
        content: TextContent,
    ) -> Self {
        Self {
            asset_id: None,
            text: Some(content),
            ..Self::new_media(AssetId::nil(), track_id, start_frame, duration_frames)
        }
    }

    /// Frame span occupied on the timeline.
    pub fn span(&self) -> FrameSpan {
        FrameSpan::new(self.start_frame, self.duration_frames)
    }

    /// End frame (exclusive).
    pub fn end_frame(&self) -> Frame {
        self.start_frame.saturating_add(self.duration_frames)
    }

    pub fn is_text(&self) -> bool {
        self.asset_id.is_none()
    }

    /// Copy with a fresh id and freshly identified effects.
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_id(),
            effects: self.effects.iter().map(Effect::duplicate).collect(),
            ..self.clone()
        }
    }

    pub fn effect(&self, id: EffectId) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn effect_mut(&mut self, id: EffectId) -> Option<&mut Effect> {
        self.effects.iter_mut().find(|e| e.id == id)
    }
}

/// Partial update of a clip's properties.
///
/// `Some(None)` clears an optional field; `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipPatch {
    pub start_frame: Option<Frame>,
    pub duration_frames: Option<Frame>,
    pub text: Option<Option<TextContent>>,
    pub ken_burns: Option<Option<KenBurns>>,
    pub fade_in_frames: Option<Option<Frame>>,
    pub fade_out_frames: Option<Option<Frame>>,
    pub volume: Option<Option<f32>>,
}

impl ClipPatch {
    /// Shallow-merge into `clip`. Durations are floored at `min_frames`.
    pub fn apply_to(self, clip: &mut Clip, min_frames: Frame) {
        if let Some(start) = self.start_frame {
            clip.start_frame = start;
        }
        if let Some(duration) = self.duration_frames {
            clip.duration_frames = duration.max(min_frames);
        }
        if let Some(text) = self.text {
            clip.text = text;
        }
        if let Some(kb) = self.ken_burns {
            clip.ken_burns = kb;
        }
        if let Some(fade) = self.fade_in_frames {
            clip.fade_in_frames = fade;
        }
        if let Some(fade) = self.fade_out_frames {
            clip.fade_out_frames = fade;
        }
        if let Some(volume) = self.volume {
            clip.volume = volume;
        }
    }
}
