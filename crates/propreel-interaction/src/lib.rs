//! PropReel Interaction - Pointer gestures over the timeline
//!
//! Pure gesture math on top of the project store:
//! - Snapping to the playhead, clip edges and whole seconds
//! - Clip dragging with start-then-end edge snapping
//! - Edge trimming with end-preserving left trims
//! - Click-to-seek on the ruler

pub mod drag;
pub mod ruler;
pub mod snapping;
pub mod trim;

pub use drag::ClipDragState;
pub use ruler::{frame_at_x, seek_to_x, x_for_frame};
pub use snapping::{Snap, SnapEngine, SnapKind, SnapPoint};
pub use trim::{hit_test_trim_handle, TrimEdge, TrimState};
