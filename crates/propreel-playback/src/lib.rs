//! PropReel Playback - Renderer transport and playhead sync
//!
//! - `PlayerHandle`: seek / play / pause / current-frame surface of a renderer
//! - `ClockPlayer`: real-time reference player
//! - `PlaybackSync`: one-way seek and poll channels between project and renderer

pub mod player;
pub mod sync;

pub use player::{ClockPlayer, PlayerHandle};
pub use sync::{PlaybackSync, SharedStore};
