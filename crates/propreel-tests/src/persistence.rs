//! Integration tests for saving, reloading and pruning projects.

use std::sync::Arc;
use std::time::Duration;

use propreel_core::{EditorConfig, FrameRate};
use propreel_timeline::{
    load_project, save_project, Asset, EffectKind, FileSlot, MediaKind, MemorySlot, Persister,
    Project, ProjectStore, StorageRef, StorageSlot, TransitionKind,
};

fn populated_store(config: &EditorConfig) -> ProjectStore {
    let mut store = ProjectStore::new("4 Orchard Lane", FrameRate::FPS_30, config.clone());
    let visual = store.project().tracks[0].id;
    let audio = store.project().tracks[1].id;

    let tour = store.add_asset(
        Asset::new(MediaKind::Video, "tour.mp4", StorageRef::durable("/media/tour.mp4"))
            .with_duration(300)
            .with_dimensions(1920, 1080),
    );
    let kitchen = store.add_asset(Asset::new(
        MediaKind::Image,
        "kitchen.jpg",
        StorageRef::durable("/media/kitchen.jpg"),
    ));
    let music = store.add_asset(
        Asset::new(MediaKind::Audio, "bed.mp3", StorageRef::durable("/media/bed.mp3"))
            .with_duration(1200),
    );

    let a = store.add_clip(tour, visual, 0, Some(150)).unwrap();
    let b = store.add_clip(kitchen, visual, 150, None).unwrap();
    store.add_clip(music, audio, 0, None).unwrap();
    store.add_transition(TransitionKind::Dissolve, a, b, 20).unwrap();
    store.add_effect(b, EffectKind::Brightness, 0.3).unwrap();
    store.set_zoom(3.0);
    store.set_current_frame(45);
    store
}

#[test]
fn saved_project_reloads_unchanged() {
    let config = EditorConfig::default();
    let store = populated_store(&config);
    let dir = tempfile::tempdir().unwrap();
    let slot = FileSlot::new(dir.path());

    save_project(&slot, &config.storage_key, store.project()).unwrap();
    let loaded = load_project(&slot, &config).unwrap().unwrap();

    assert!(loaded.pruned.is_empty());
    assert_eq!(&loaded.project, store.project());
}

#[test]
fn missing_document_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let slot = FileSlot::new(dir.path().join("never-written"));
    assert!(load_project(&slot, &EditorConfig::default()).unwrap().is_none());
}

#[test]
fn session_media_is_pruned_on_reload() {
    let config = EditorConfig::default();
    let mut store = populated_store(&config);
    let visual = store.project().tracks[0].id;
    let first = store.project().tracks[0].clip_ids[0];

    let upload = store.add_asset(
        Asset::new(MediaKind::Video, "phone.mov", StorageRef::session("blob:3f9a"))
            .with_duration(600),
    );
    let temp_clip = store.add_clip(upload, visual, 240, None).unwrap();
    store.add_transition(TransitionKind::Fade, first, temp_clip, 15).unwrap();

    let slot = MemorySlot::new();
    save_project(&slot, &config.storage_key, store.project()).unwrap();
    let loaded = load_project(&slot, &config).unwrap().unwrap();

    assert_eq!(loaded.pruned.assets, vec![upload]);
    assert_eq!(loaded.pruned.clips, vec![temp_clip]);

    let project = &loaded.project;
    assert!(!project.assets.contains_key(&upload));
    assert!(project.clip(temp_clip).is_none());
    assert!(project.tracks.iter().all(|t| !t.contains(temp_clip)));
    assert_eq!(project.transitions.len(), 1);
    assert!(project
        .transitions
        .values()
        .all(|t| t.from_clip_id != temp_clip && t.to_clip_id != temp_clip));
    assert!(project
        .validate(config.min_clip_frames, config.clip_end_buffer_frames)
        .is_empty());

    let reopened = ProjectStore::from_project(loaded.project, config);
    assert!(reopened.validate().is_empty());
}

#[test]
fn reload_never_resumes_playback() {
    let config = EditorConfig::default();
    let mut store = populated_store(&config);
    store.set_playing(true);

    let slot = MemorySlot::new();
    save_project(&slot, &config.storage_key, store.project()).unwrap();
    let loaded = load_project(&slot, &config).unwrap().unwrap();
    assert!(!loaded.project.is_playing);
    assert_eq!(loaded.project.current_frame, 45);
}

#[test]
fn bare_legacy_document_is_migrated() {
    let config = EditorConfig::default();
    let project = Project::new("Legacy Listing", FrameRate::FPS_24, 720);
    let slot = MemorySlot::new();
    slot.write(&config.storage_key, &serde_json::to_vec(&project).unwrap())
        .unwrap();

    let loaded = load_project(&slot, &config).unwrap().unwrap();
    assert_eq!(loaded.project, project);
}

#[test]
fn persister_writes_latest_state() {
    let config = EditorConfig::default();
    let slot = Arc::new(MemorySlot::new());
    let persister = Persister::spawn(
        Arc::clone(&slot) as Arc<dyn StorageSlot>,
        config.storage_key.clone(),
        Duration::from_secs(60),
        Duration::from_secs(60),
    );
    let mut store = populated_store(&config).with_persister(persister);

    // A burst of edits inside the debounce window collapses to one write.
    store.rename("4 Orchard Lane (final)");
    store.set_current_frame(90);
    store.flush();
    assert_eq!(slot.write_count(), 1);

    let loaded = load_project(slot.as_ref(), &config).unwrap().unwrap();
    assert_eq!(loaded.project.name, "4 Orchard Lane (final)");
    assert_eq!(loaded.project.current_frame, 90);

    // Nothing new to write.
    store.flush();
    assert_eq!(slot.write_count(), 1);
}
