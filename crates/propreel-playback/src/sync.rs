//! Keeps the project playhead and the renderer in step.
//!
//! The project's `current_frame` and `is_playing` are authoritative. Two
//! one-way channels connect them to the renderer:
//!
//! - while paused, playhead changes are pushed to the renderer as seeks;
//! - while playing, a periodic poll reads the renderer's frame back into
//!   the project.
//!
//! The renderer's frame is never read while paused and the project's frame
//! is never pushed while playing, so neither side can echo the other.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use propreel_core::{EditorConfig, Frame, PropReelError, Result};
use propreel_timeline::ProjectStore;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::player::PlayerHandle;

/// Store shared between the editing session and the poll task.
pub type SharedStore = Arc<Mutex<ProjectStore>>;

pub struct PlaybackSync<P: PlayerHandle + 'static> {
    store: SharedStore,
    player: Arc<P>,
    runtime: Handle,
    poll_interval: Duration,
    /// Last frame pushed to or read from the renderer.
    last_frame: Frame,
    playing: bool,
    poller: Option<JoinHandle<()>>,
}

impl<P: PlayerHandle + 'static> PlaybackSync<P> {
    /// Attach `player` to `store`. Must be called from within a tokio runtime.
    pub fn new(store: SharedStore, player: Arc<P>, config: &EditorConfig) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| PropReelError::Internal(format!("Playback needs a tokio runtime: {}", e)))?;
        let frame = store.lock().project().current_frame;
        player.seek_to(frame);
        Ok(Self {
            store,
            player,
            runtime,
            poll_interval: config.poll_interval(),
            last_frame: frame,
            playing: false,
            poller: None,
        })
    }

    pub fn player(&self) -> &Arc<P> {
        &self.player
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Bring the renderer in line with the project. Call after every store event.
    pub fn reconcile(&mut self) {
        let (frame, playing) = {
            let store = self.store.lock();
            (store.project().current_frame, store.project().is_playing)
        };

        if playing != self.playing {
            self.playing = playing;
            if playing {
                self.start(frame);
            } else {
                self.stop(frame);
            }
            return;
        }

        if !playing && frame != self.last_frame {
            debug!(frame, "Seeking renderer");
            self.player.seek_to(frame);
            self.last_frame = frame;
        }
    }

    fn start(&mut self, frame: Frame) {
        if frame != self.last_frame {
            self.player.seek_to(frame);
        }
        self.player.play();
        info!(frame, "Playback started");

        self.abort_poller();
        let store = Arc::clone(&self.store);
        let player = Arc::clone(&self.player);
        let period = self.poll_interval;
        self.poller = Some(self.runtime.spawn(poll_renderer(store, player, period)));
    }

    fn stop(&mut self, frame: Frame) {
        self.abort_poller();
        self.player.pause();
        self.last_frame = frame;
        info!(frame, "Playback paused");
    }

    fn abort_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

impl<P: PlayerHandle + 'static> Drop for PlaybackSync<P> {
    fn drop(&mut self) {
        self.abort_poller();
    }
}

/// Copy the renderer's frame into the project until playback stops.
///
/// Reaching the end of the project stops playback.
async fn poll_renderer<P: PlayerHandle>(store: SharedStore, player: Arc<P>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let frame = player.current_frame();
        if !write_polled_frame(&store, frame) {
            break;
        }
    }
}

/// Returns whether playback continues.
fn write_polled_frame(store: &Mutex<ProjectStore>, frame: Frame) -> bool {
    let mut store = store.lock();
    if !store.project().is_playing {
        return false;
    }
    let end = store.project().total_duration_frames;
    store.set_current_frame(frame);
    if frame >= end {
        debug!(frame, end, "Reached end of project");
        store.set_playing(false);
        return false;
    }
    true
}
