//! Renderer transport surface and a clock-driven reference player.

use parking_lot::Mutex;
use propreel_core::{Frame, FrameRate};
use tokio::time::Instant;

/// Imperative transport of a renderer.
///
/// The renderer keeps its own notion of the playing frame; the playback
/// synchronizer decides when to trust it.
pub trait PlayerHandle: Send + Sync {
    fn seek_to(&self, frame: Frame);
    fn play(&self);
    fn pause(&self);
    /// Frame the renderer is presenting right now.
    fn current_frame(&self) -> Frame;
}

#[derive(Debug)]
struct ClockState {
    /// Frame at `started` (or the paused frame).
    anchor: Frame,
    started: Option<Instant>,
    end: Option<Frame>,
}

/// Player that advances through frames in real time at a fixed rate.
///
/// Stands in for a renderer in headless sessions and tests.
#[derive(Debug)]
pub struct ClockPlayer {
    frame_rate: FrameRate,
    state: Mutex<ClockState>,
}

impl ClockPlayer {
    pub fn new(frame_rate: FrameRate) -> Self {
        Self {
            frame_rate,
            state: Mutex::new(ClockState {
                anchor: 0,
                started: None,
                end: None,
            }),
        }
    }

    /// Hold at `end` instead of running past it.
    pub fn set_end(&self, end: Option<Frame>) {
        self.state.lock().end = end;
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().started.is_some()
    }

    fn frame_of(&self, state: &ClockState) -> Frame {
        let frame = match state.started {
            Some(started) => state.anchor + self.frame_rate.frames_in(started.elapsed()),
            None => state.anchor,
        };
        state.end.map_or(frame, |end| frame.min(end))
    }
}

impl PlayerHandle for ClockPlayer {
    fn seek_to(&self, frame: Frame) {
        let mut state = self.state.lock();
        state.anchor = frame;
        if state.started.is_some() {
            state.started = Some(Instant::now());
        }
    }

    fn play(&self) {
        let mut state = self.state.lock();
        if state.started.is_none() {
            state.started = Some(Instant::now());
        }
    }

    fn pause(&self) {
        let mut state = self.state.lock();
        state.anchor = self.frame_of(&state);
        state.started = None;
    }

    fn current_frame(&self) -> Frame {
        let state = self.state.lock();
        self.frame_of(&state)
    }
}
