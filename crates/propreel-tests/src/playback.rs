//! Integration tests for the store, the playback synchronizer and a clock player.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use propreel_core::{EditorConfig, FrameRate};
use propreel_interaction::seek_to_x;
use propreel_playback::{ClockPlayer, PlaybackSync, PlayerHandle, SharedStore};
use propreel_timeline::ProjectStore;

struct Rig {
    store: SharedStore,
    player: Arc<ClockPlayer>,
    sync: PlaybackSync<ClockPlayer>,
}

/// A 900-frame project at 30 fps, zoomed to 2 px/frame.
fn rig() -> Rig {
    let config = EditorConfig::default();
    let mut store = ProjectStore::new("Playback", FrameRate::FPS_30, config.clone());
    store.set_zoom(2.0);
    let end = store.project().total_duration_frames;
    let store = Arc::new(Mutex::new(store));

    let player = Arc::new(ClockPlayer::new(FrameRate::FPS_30));
    player.set_end(Some(end));
    let sync = PlaybackSync::new(Arc::clone(&store), Arc::clone(&player), &config).unwrap();
    Rig { store, player, sync }
}

#[tokio::test(start_paused = true)]
async fn ruler_click_while_paused_moves_renderer() {
    let mut rig = rig();
    let frame = seek_to_x(&mut rig.store.lock(), 400.0);
    assert_eq!(frame, 200);

    rig.sync.reconcile();
    assert_eq!(rig.player.current_frame(), 200);
    assert!(!rig.sync.is_polling());
}

#[tokio::test(start_paused = true)]
async fn playing_advances_project_playhead() {
    let mut rig = rig();
    rig.store.lock().set_current_frame(300);
    rig.sync.reconcile();

    rig.store.lock().set_playing(true);
    rig.sync.reconcile();
    assert!(rig.player.is_playing());

    tokio::time::sleep(Duration::from_millis(1050)).await;
    let frame = rig.store.lock().project().current_frame;
    assert!((327..=331).contains(&frame), "playhead at {frame}");

    rig.store.lock().set_playing(false);
    rig.sync.reconcile();
    assert!(!rig.player.is_playing());
    assert!(!rig.sync.is_polling());

    // Paused: the renderer holds and the project no longer follows it.
    let held = rig.player.current_frame();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(rig.player.current_frame(), held);
    assert_eq!(rig.store.lock().project().current_frame, frame);
}

#[tokio::test(start_paused = true)]
async fn seek_during_playback_is_not_pushed() {
    let mut rig = rig();
    rig.store.lock().set_playing(true);
    rig.sync.reconcile();
    tokio::time::sleep(Duration::from_millis(250)).await;

    // A stray playhead write while playing is overwritten by the next poll.
    rig.store.lock().set_current_frame(600);
    rig.sync.reconcile();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let frame = rig.store.lock().project().current_frame;
    assert!(frame < 30, "playhead at {frame}");
}

#[tokio::test(start_paused = true)]
async fn playback_stops_at_project_end() {
    let mut rig = rig();
    rig.store.lock().set_current_frame(880);
    rig.sync.reconcile();
    rig.store.lock().set_playing(true);
    rig.sync.reconcile();

    tokio::time::sleep(Duration::from_secs(2)).await;
    {
        let store = rig.store.lock();
        assert!(!store.project().is_playing);
        assert_eq!(store.project().current_frame, 900);
    }
    assert!(!rig.sync.is_polling());

    rig.sync.reconcile();
    assert!(!rig.player.is_playing());
    assert_eq!(rig.player.current_frame(), 900);
}
