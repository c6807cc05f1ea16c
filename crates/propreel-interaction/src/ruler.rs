//! Pixel/frame mapping and click-to-seek on the ruler.
//!
//! All x coordinates are in timeline content space: pixel 0 is frame 0,
//! scrolling already accounted for by the caller.

use propreel_core::Frame;
use propreel_timeline::ProjectStore;

/// Whole-frame distance covered by a pointer movement of `dx` pixels.
pub fn frames_for_pixels(dx: f32, pixels_per_frame: f32) -> i64 {
    if pixels_per_frame <= 0.0 || !dx.is_finite() {
        return 0;
    }
    (f64::from(dx) / f64::from(pixels_per_frame)).round() as i64
}

/// Apply a signed frame delta, saturating at frame 0.
pub fn offset_frame(frame: Frame, delta: i64) -> Frame {
    if delta >= 0 {
        frame.saturating_add(delta as Frame)
    } else {
        frame.saturating_sub(delta.unsigned_abs())
    }
}

/// Frame under pixel `x`, clamped to `[0, total]`.
pub fn frame_at_x(x: f32, pixels_per_frame: f32, total: Frame) -> Frame {
    if pixels_per_frame <= 0.0 || x.is_nan() || x <= 0.0 {
        return 0;
    }
    let frame = (f64::from(x) / f64::from(pixels_per_frame)).floor();
    if frame >= total as f64 {
        total
    } else {
        frame as Frame
    }
}

/// Left pixel edge of `frame`.
pub fn x_for_frame(frame: Frame, pixels_per_frame: f32) -> f32 {
    frame as f32 * pixels_per_frame
}

/// Move the playhead to the frame under a ruler click. Returns the frame.
pub fn seek_to_x(store: &mut ProjectStore, x: f32) -> Frame {
    let project = store.project();
    let frame = frame_at_x(x, project.zoom, project.total_duration_frames);
    tracing::debug!(x, frame, "Ruler seek");
    store.set_current_frame(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use propreel_core::{EditorConfig, FrameRate};

    #[test]
    fn test_frame_at_x_is_linear_and_clamped() {
        assert_eq!(frame_at_x(200.0, 2.0, 900), 100);
        assert_eq!(frame_at_x(201.9, 2.0, 900), 100);
        assert_eq!(frame_at_x(-40.0, 2.0, 900), 0);
        assert_eq!(frame_at_x(1e9, 2.0, 900), 900);
        assert_eq!(frame_at_x(50.0, 0.0, 900), 0);
    }

    #[test]
    fn test_frames_for_pixels() {
        assert_eq!(frames_for_pixels(21.0, 2.0), 11);
        assert_eq!(frames_for_pixels(-21.0, 2.0), -11);
        assert_eq!(frames_for_pixels(10.0, 0.0), 0);
    }

    #[test]
    fn test_offset_frame_saturates() {
        assert_eq!(offset_frame(10, -25), 0);
        assert_eq!(offset_frame(10, 5), 15);
    }

    #[test]
    fn test_seek_to_x_moves_playhead() {
        let mut store = ProjectStore::new("Seek", FrameRate::FPS_30, EditorConfig::default());
        store.set_zoom(2.0);
        assert_eq!(seek_to_x(&mut store, 300.0), 150);
        assert_eq!(store.project().current_frame, 150);
        assert_eq!(seek_to_x(&mut store, 50_000.0), 900);
    }
}
