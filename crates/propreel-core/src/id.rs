//! Identifier aliases.
//!
//! Every entity in a project is keyed by a random v4 UUID.

use uuid::Uuid;

pub type ProjectId = Uuid;
pub type TrackId = Uuid;
pub type ClipId = Uuid;
pub type AssetId = Uuid;
pub type TransitionId = Uuid;
pub type EffectId = Uuid;

/// Generate a fresh identifier.
#[inline]
pub fn new_id() -> Uuid {
    Uuid::new_v4()
}
