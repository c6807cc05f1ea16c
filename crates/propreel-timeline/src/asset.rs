//! Media assets referenced by clips.

use propreel_core::{new_id, now_millis, AssetId, Frame};
use serde::{Deserialize, Serialize};

/// Kind of media an asset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// Guess the media kind from a MIME type such as `image/jpeg`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.split('/').next()? {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

/// How long a storage reference stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    /// Survives restarts (file path, remote URL).
    Durable,
    /// Process-local handle that is invalid after a restart.
    Session,
}

/// Where the asset's bytes live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRef {
    pub uri: String,
    pub durability: Durability,
}

impl StorageRef {
    pub fn durable(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            durability: Durability::Durable,
        }
    }

    pub fn session(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            durability: Durability::Session,
        }
    }

    /// Session handles do not survive a reload of the project document.
    pub fn is_stale_after_restart(&self) -> bool {
        self.durability == Durability::Session
    }
}

/// An imported media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique asset ID
    pub id: AssetId,
    /// Media kind
    pub kind: MediaKind,
    /// Display name
    pub name: String,
    /// Storage location
    pub storage: StorageRef,
    /// Natural length in project frames, when known
    pub duration_frames: Option<Frame>,
    /// Pixel width, when known
    pub width: Option<u32>,
    /// Pixel height, when known
    pub height: Option<u32>,
    /// Size in bytes
    pub size_bytes: u64,
    /// MIME type
    pub mime_type: String,
    /// Creation time (unix millis)
    pub created_at: u64,
}

impl Asset {
    /// Create an asset with no probed metadata.
    pub fn new(kind: MediaKind, name: impl Into<String>, storage: StorageRef) -> Self {
        Self {
            id: new_id(),
            kind,
            name: name.into(),
            storage,
            duration_frames: None,
            width: None,
            height: None,
            size_bytes: 0,
            mime_type: String::new(),
            created_at: now_millis(),
        }
    }

    /// Set the natural duration.
    pub fn with_duration(mut self, frames: Frame) -> Self {
        self.duration_frames = Some(frames);
        self
    }

    /// Set the pixel dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("image/png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("video/mp4"), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_mime("audio/mpeg"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::from_mime("application/pdf"), None);
        assert_eq!(MediaKind::from_mime(""), None);
    }

    #[test]
    fn test_session_refs_are_stale() {
        assert!(StorageRef::session("blob:1234").is_stale_after_restart());
        assert!(!StorageRef::durable("/media/house.jpg").is_stale_after_restart());
    }
}
