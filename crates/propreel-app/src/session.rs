//! An editing session: the store, its storage and its playback wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use propreel_core::{EditorConfig, Frame, FrameRate, TrackId};
use propreel_media::{AssetImporter, FsProber, MediaProber};
use propreel_playback::{ClockPlayer, PlaybackSync, PlayerHandle, SharedStore};
use propreel_timeline::{
    load_project, MediaKind, Persister, ProjectEvent, ProjectStore, StorageSlot, TrackKind,
};
use tracing::{info, warn};

pub struct Session {
    store: SharedStore,
    config: EditorConfig,
}

impl Session {
    /// Open the stored project, or start a new one, persisting to `slot`.
    pub fn open(slot: Arc<dyn StorageSlot>, config: EditorConfig) -> Result<Self> {
        let mut store = match load_project(slot.as_ref(), &config).context("Failed to load project")? {
            Some(loaded) => {
                if !loaded.pruned.is_empty() {
                    warn!(
                        assets = loaded.pruned.assets.len(),
                        clips = loaded.pruned.clips.len(),
                        "Dropped media that did not survive the restart"
                    );
                }
                ProjectStore::from_project(loaded.project, config.clone())
            }
            None => {
                info!("Starting a new project");
                ProjectStore::new("Untitled Listing", FrameRate::default(), config.clone())
            }
        };
        let persister = Persister::spawn(
            slot,
            config.storage_key.clone(),
            config.persist_debounce(),
            config.persist_max_wait(),
        );
        store = store.with_persister(persister);

        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            config,
        })
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Import each file and append it to the first track that fits its kind.
    pub async fn import_all<P: MediaProber>(&self, importer: &AssetImporter<P>, paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = self.import_one(importer, path).await {
                warn!(path = %path.display(), "Skipping input: {:#}", e);
            }
        }
    }

    async fn import_one<P: MediaProber>(&self, importer: &AssetImporter<P>, path: &Path) -> Result<()> {
        let asset = importer.import(path).await?;
        let kind = match asset.kind {
            MediaKind::Audio => TrackKind::Audio,
            MediaKind::Image | MediaKind::Video => TrackKind::Visual,
        };

        let mut store = self.store.lock();
        let track = track_for(&mut store, kind);
        let start = append_point(&store, track);
        let asset_id = store.add_asset(asset);
        store
            .add_clip(asset_id, track, start, None)
            .context("Track vanished during import")?;
        Ok(())
    }

    /// Play the timeline through a clock player for `duration` of wall time.
    pub async fn preview(&self, duration: Duration) -> Result<Frame> {
        let player = Arc::new(ClockPlayer::new(self.store.lock().project().frame_rate));
        player.set_end(Some(self.store.lock().project().total_duration_frames));
        let mut sync = PlaybackSync::new(Arc::clone(&self.store), Arc::clone(&player), &self.config)?;
        // Lives only as long as this preview.
        let events = self.store.lock().subscribe();

        self.store.lock().set_playing(true);
        sync.reconcile();

        let deadline = tokio::time::Instant::now() + duration;
        let mut ticker = tokio::time::interval(self.config.poll_interval());
        while tokio::time::Instant::now() < deadline {
            ticker.tick().await;
            let mut stopped = false;
            for event in events.try_iter() {
                stopped |= event == ProjectEvent::PlayStateChanged(false);
            }
            sync.reconcile();
            if stopped {
                break;
            }
        }

        self.store.lock().set_playing(false);
        sync.reconcile();
        Ok(player.current_frame())
    }

    /// Wait for the latest state to reach storage.
    pub fn close(self) {
        let store = self.store.lock();
        store.flush();
        let project = store.project();
        info!(
            name = %project.name,
            tracks = project.tracks.len(),
            clips = project.clips.len(),
            duration_frames = project.total_duration_frames,
            "Session closed"
        );
    }
}

/// First track of `kind`, created when there is none.
fn track_for(store: &mut ProjectStore, kind: TrackKind) -> TrackId {
    match store.project().tracks.iter().find(|t| t.kind == kind) {
        Some(track) => track.id,
        None => store.add_track(kind, None),
    }
}

/// Frame right after the last clip on `track`.
fn append_point(store: &ProjectStore, track: TrackId) -> Frame {
    store
        .project()
        .clips_on_track(track)
        .iter()
        .map(|c| c.end_frame())
        .max()
        .unwrap_or(0)
}

/// Importer used by the binary.
pub fn default_importer(frame_rate: FrameRate) -> AssetImporter<FsProber> {
    AssetImporter::with_ffprobe(frame_rate)
}
