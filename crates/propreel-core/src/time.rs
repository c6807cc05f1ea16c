//! Frame representation for frame-accurate editing
//!
//! The timeline is measured in whole frames at the project frame rate.
//! Frame rates are rational so that conversions to and from seconds do
//! not accumulate floating-point error.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A frame index or a frame count on the project timeline.
pub type Frame = u64;

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator.max(1) as f64
    }

    /// Frames per second rounded to the nearest whole frame (at least 1).
    ///
    /// Used for one-second grid markers on the ruler.
    #[inline]
    pub fn whole_fps(self) -> Frame {
        (self.to_fps_f64().round() as Frame).max(1)
    }

    fn as_rational(self) -> Rational64 {
        Rational64::new(self.numerator as i64, self.denominator.max(1) as i64)
    }

    /// Number of whole frames covering `seconds` seconds (floored).
    pub fn frames_for_seconds(self, seconds: u64) -> Frame {
        let frames = self.as_rational() * Rational64::from_integer(seconds as i64);
        frames.floor().to_integer().max(0) as Frame
    }

    /// Frame index at a floating-point time in seconds (floored, clamped at 0).
    pub fn frame_at_seconds(self, seconds: f64) -> Frame {
        if !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        (seconds * self.to_fps_f64()).floor() as Frame
    }

    /// Whole frames elapsed in `elapsed` wall-clock time (floored, exact).
    pub fn frames_in(self, elapsed: Duration) -> Frame {
        if self.denominator == 0 {
            return 0;
        }
        let frames = elapsed.as_nanos() * u128::from(self.numerator)
            / (u128::from(self.denominator) * 1_000_000_000);
        Frame::try_from(frames).unwrap_or(Frame::MAX)
    }

    /// Convert a frame count to seconds.
    pub fn seconds_for_frames(self, frames: Frame) -> f64 {
        if self.numerator == 0 {
            return 0.0;
        }
        let secs = Rational64::from_integer(frames as i64) / self.as_rational();
        *secs.numer() as f64 / *secs.denom() as f64
    }

    /// Common frame rates
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// A half-open frame interval `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameSpan {
    /// First frame covered (inclusive)
    pub start: Frame,
    /// Number of frames covered
    pub duration: Frame,
}

impl FrameSpan {
    /// Create a new span from start and duration.
    #[inline]
    pub const fn new(start: Frame, duration: Frame) -> Self {
        Self { start, duration }
    }

    /// Create a span from start and end frames.
    #[inline]
    pub fn from_start_end(start: Frame, end: Frame) -> Self {
        Self {
            start,
            duration: end.saturating_sub(start),
        }
    }

    /// End frame (exclusive).
    #[inline]
    pub fn end(self) -> Frame {
        self.start.saturating_add(self.duration)
    }

    /// Check if a frame is within this span.
    #[inline]
    pub fn contains(self, frame: Frame) -> bool {
        frame >= self.start && frame < self.end()
    }

    /// Check if a frame lies strictly between the start and end frames.
    #[inline]
    pub fn contains_interior(self, frame: Frame) -> bool {
        frame > self.start && frame < self.end()
    }

    /// Check if two spans overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Compute the intersection of two spans, if any.
    pub fn intersection(self, other: Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self::from_start_end(
            self.start.max(other.start),
            self.end().min(other.end()),
        ))
    }
}
