//! Integration tests for editing and interaction.
//!
//! Exercises the project store together with snapping and gestures.

use propreel_core::{AssetId, ClipId, EditorConfig, FrameRate, TrackId};
use parking_lot::Mutex;
use propreel_interaction::{seek_to_x, ClipDragState, SnapEngine, SnapKind, TrimEdge, TrimState};
use propreel_media::AssetImporter;
use propreel_timeline::{Asset, MediaKind, ProjectStore, StorageRef, TrackKind};
use proptest::prelude::*;

// ── Helpers ────────────────────────────────────────────────────

struct Listing {
    store: ProjectStore,
    visual: TrackId,
    video: AssetId,
    clips: Vec<ClipId>,
}

/// 30 fps, one visual track with clips at [0,90), [90,150), [150,210).
fn listing() -> Listing {
    let mut store = ProjectStore::new("12 Harbor View", FrameRate::FPS_30, EditorConfig::default());
    store.set_zoom(2.0);
    let visual = store.project().tracks[0].id;
    let video = store.add_asset(
        Asset::new(MediaKind::Video, "walkthrough.mp4", StorageRef::durable("/m/walk.mp4"))
            .with_duration(900),
    );
    let clips = [(0, 90), (90, 60), (150, 60)]
        .into_iter()
        .map(|(s, d)| store.add_clip(video, visual, s, Some(d)).unwrap())
        .collect();
    Listing {
        store,
        visual,
        video,
        clips,
    }
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn split_then_drag_snaps_to_clip_end() {
    let mut l = listing();

    let second = l.store.split_clip(l.clips[1], 120).unwrap();
    let project = l.store.project();
    let first = project.clip(l.clips[1]).unwrap();
    let tail = project.clip(second).unwrap();
    assert_eq!((first.start_frame, first.end_frame()), (90, 120));
    assert_eq!((tail.start_frame, tail.end_frame()), (120, 150));

    // A new clip dragged so its start lands near frame 150.
    let overlay = l.store.add_track(TrackKind::Visual, None);
    let new_clip = l.store.add_clip(l.video, overlay, 600, Some(60)).unwrap();
    let engine = SnapEngine::from_config(l.store.config());
    let mut drag = ClipDragState::begin(&l.store, new_clip, 1200.0).unwrap();
    // 1200px -> 306px at 2 px/frame is -447 frames: start 153.
    let start = drag.update(&l.store, &engine, 306.0, overlay);
    assert_eq!(start, 150);
    assert!(drag.snap_indicator.is_some());

    assert!(drag.commit(&mut l.store));
    assert_eq!(l.store.project().clip(new_clip).unwrap().start_frame, 150);
    assert!(l.store.validate().is_empty());
}

#[test]
fn move_onto_overlapping_interval_is_accepted() {
    let mut l = listing();
    let other = l.store.add_track(TrackKind::Visual, None);
    let lone = l.store.add_clip(l.video, other, 0, Some(100)).unwrap();

    assert!(l.store.move_clip(lone, l.visual, 50));
    let project = l.store.project();
    let moved = project.clip(lone).unwrap();
    assert_eq!((moved.track_id, moved.start_frame), (l.visual, 50));
    let overlapping = project
        .clips_on_track(l.visual)
        .iter()
        .filter(|c| c.id != lone && c.span().overlaps(moved.span()))
        .count();
    assert_eq!(overlapping, 2);
    assert!(l.store.validate().is_empty());
}

#[test]
fn deleting_asset_leaves_no_dangling_ids() {
    let mut l = listing();
    let photo = l.store.add_asset(Asset::new(
        MediaKind::Image,
        "deck.jpg",
        StorageRef::durable("/m/deck.jpg"),
    ));
    let still = l.store.add_clip(photo, l.visual, 300, None).unwrap();
    let audio = l.store.project().tracks[1].id;
    let music_asset = l.store.add_asset(
        Asset::new(MediaKind::Audio, "bed.mp3", StorageRef::durable("/m/bed.mp3"))
            .with_duration(600),
    );
    l.store.add_clip(music_asset, audio, 0, None).unwrap();

    assert!(l.store.remove_asset(l.video));
    let project = l.store.project();
    for id in &l.clips {
        assert!(project.clip(*id).is_none());
        assert!(project.tracks.iter().all(|t| !t.contains(*id)));
    }
    assert_eq!(project.tracks[0].clip_ids, vec![still]);
    assert_eq!(project.clips.len(), 2);
    assert!(l.store.validate().is_empty());

    // The cascade is one undo step.
    assert!(l.store.undo());
    assert_eq!(l.store.project().clips.len(), 5);
}

#[test]
fn duplicate_lands_after_gap() {
    let mut l = listing();
    let copy = l.store.duplicate_clip(l.clips[2]).unwrap();
    let clip = l.store.project().clip(copy).unwrap();
    assert_eq!(clip.start_frame, 150 + 60 + 15);
    assert_eq!(clip.track_id, l.visual);
    assert_eq!(l.store.project().total_duration_frames, 900);
}

#[test]
fn left_trim_keeps_end_and_can_be_undone() {
    let mut l = listing();
    let mut engine = SnapEngine::from_config(l.store.config());
    engine.enabled = false;
    // Clip 2 is [90,150); its left edge sits at 180px.
    let mut trim = TrimState::begin(&l.store, l.clips[1], TrimEdge::Left, 180.0).unwrap();
    assert_eq!(trim.update(&l.store, &engine, 220.0), (110, 40));
    assert!(trim.commit(&mut l.store));
    assert_eq!(l.store.project().clip(l.clips[1]).unwrap().end_frame(), 150);

    assert!(l.store.undo());
    let clip = l.store.project().clip(l.clips[1]).unwrap();
    assert_eq!((clip.start_frame, clip.duration_frames), (90, 60));
}

#[test]
fn ruler_click_seeks_and_snap_points_follow() {
    let mut l = listing();
    assert_eq!(seek_to_x(&mut l.store, 500.0), 250);
    let snap = SnapEngine::default().snap_frame(l.store.project(), 252, None);
    assert_eq!(snap.frame, 250);
    assert_eq!(snap.target, Some(SnapKind::Playhead));
}

#[tokio::test]
async fn imported_still_snaps_next_to_existing_clip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("facade.png");
    std::fs::write(&path, b"header only, not decodable").unwrap();

    let store = Mutex::new(listing().store);
    let track = store.lock().project().tracks[0].id;
    let importer = AssetImporter::with_ffprobe(FrameRate::FPS_30);
    let placed = importer.import_clip(&store, &path, track, 700).await.unwrap();
    let still = placed.clip_id.unwrap();

    let mut store = store.into_inner();
    let clip = store.project().clip(still).unwrap();
    assert_eq!(clip.duration_frames, 90);
    assert!(clip.ken_burns.is_some());
    assert_eq!(store.project().assets[&placed.asset_id].width, None);

    // Drag it left so its start lands 2 frames past the last clip end.
    let engine = SnapEngine::default();
    let mut drag = ClipDragState::begin(&store, still, 1400.0).unwrap();
    assert_eq!(drag.update(&store, &engine, 424.0, track), 210);
    assert!(drag.commit(&mut store));
    assert!(store.validate().is_empty());
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn resize_from_start_keeps_end(clip in 0usize..3, duration in 0u64..400) {
        let mut l = listing();
        let id = l.clips[clip];
        let before = l.store.project().clip(id).unwrap().clone();
        prop_assert!(l.store.resize_clip(id, duration, true));
        let after = l.store.project().clip(id).unwrap();
        prop_assert!(after.duration_frames >= 15);
        if duration.max(15) <= before.end_frame() {
            prop_assert_eq!(after.end_frame(), before.end_frame());
            prop_assert_eq!(after.duration_frames, duration.max(15));
        } else {
            prop_assert_eq!(after.start_frame, 0);
        }
    }

    #[test]
    fn snapped_frame_is_within_threshold(frame in 0u64..400, zoom in 0.5f32..8.0) {
        let mut l = listing();
        l.store.set_zoom(zoom);
        let engine = SnapEngine::new(10.0);
        let snap = engine.snap_frame(l.store.project(), frame, None);
        if snap.snapped() {
            prop_assert!(snap.frame.abs_diff(frame) as f64 <= engine.threshold_frames(l.store.project().zoom));
        } else {
            prop_assert_eq!(snap.frame, frame);
        }
    }
}
