//! Integration tests for undo/redo through the project store.

use propreel_core::{EditorConfig, FrameRate};
use propreel_timeline::{Asset, MediaKind, ProjectSnapshot, ProjectStore, StorageRef};
use proptest::prelude::*;

fn store_with_asset() -> (ProjectStore, propreel_core::AssetId) {
    let mut store = ProjectStore::new("History", FrameRate::FPS_30, EditorConfig::default());
    let asset = store.add_asset(
        Asset::new(MediaKind::Video, "drone.mp4", StorageRef::durable("/m/drone.mp4"))
            .with_duration(120),
    );
    (store, asset)
}

/// Perform `n` checkpointed edits, returning the structure seen before each one
/// plus the final structure.
fn edit_n_times(store: &mut ProjectStore, asset: propreel_core::AssetId, n: usize) -> Vec<ProjectSnapshot> {
    let track = store.project().tracks[0].id;
    let mut states = Vec::with_capacity(n + 1);
    for i in 0..n {
        states.push(ProjectSnapshot::capture(store.project()));
        let start = i as u64 * 40;
        if i % 3 == 2 {
            let victim = store.project().tracks[0].clip_ids[0];
            store.remove_clip(victim);
        } else {
            store.add_clip(asset, track, start, Some(30)).unwrap();
        }
    }
    states.push(ProjectSnapshot::capture(store.project()));
    states
}

#[test]
fn fifty_one_checkpoints_keep_fifty() {
    let (mut store, asset) = store_with_asset();
    let states = edit_n_times(&mut store, asset, 51);

    let mut undone = 0;
    while store.undo() {
        undone += 1;
    }
    assert_eq!(undone, 50);
    // The very first pre-edit state was evicted.
    assert_eq!(ProjectSnapshot::capture(store.project()), states[1]);
}

#[test]
fn undo_keeps_playhead_and_zoom() {
    let (mut store, asset) = store_with_asset();
    edit_n_times(&mut store, asset, 4);
    store.set_zoom(5.0);
    store.set_current_frame(77);
    store.set_playing(true);

    assert!(store.undo());
    let project = store.project();
    assert_eq!(project.zoom, 5.0);
    assert_eq!(project.current_frame, 77);
    assert!(project.is_playing);
}

#[test]
fn undo_clears_selection_of_vanished_clip() {
    let (mut store, asset) = store_with_asset();
    let track = store.project().tracks[0].id;
    let clip = store.add_clip(asset, track, 0, None).unwrap();
    store.select_clip(Some(clip));

    assert!(store.undo());
    assert_eq!(store.project().selected_clip_id, None);
    // The track still exists, so its selection stays.
    assert_eq!(store.project().selected_track_id, Some(track));
}

#[test]
fn new_edit_discards_redo() {
    let (mut store, asset) = store_with_asset();
    edit_n_times(&mut store, asset, 3);
    assert!(store.undo());
    assert!(store.can_redo());

    let track = store.project().tracks[0].id;
    store.add_clip(asset, track, 500, None).unwrap();
    assert!(!store.can_redo());
    assert!(!store.redo());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn undo_redo_round_trip(n in 1usize..=50) {
        let (mut store, asset) = store_with_asset();
        let states = edit_n_times(&mut store, asset, n);

        for i in (0..n).rev() {
            prop_assert!(store.undo());
            prop_assert_eq!(&ProjectSnapshot::capture(store.project()), &states[i]);
        }
        prop_assert!(!store.undo());

        for state in states.iter().skip(1) {
            prop_assert!(store.redo());
            prop_assert_eq!(&ProjectSnapshot::capture(store.project()), state);
        }
        prop_assert!(!store.redo());
        prop_assert!(store.validate().is_empty());
    }
}
