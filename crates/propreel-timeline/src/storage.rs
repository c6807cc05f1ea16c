//! Durable storage of the project document.
//!
//! The whole project is stored as one document under a fixed key. Writes go
//! through a [`Persister`], a background thread that coalesces bursts of
//! commits and writes only the latest state. Loading always runs
//! stale-reference pruning before the project is handed out.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use propreel_core::{AssetId, ClipId, EditorConfig, PropReelError, Result};
use tracing::{debug, info, warn};

use crate::project::Project;
use crate::serialization::ProjectFile;

/// A keyed blob store.
pub trait StorageSlot: Send + Sync {
    /// Read the document under `key`, or `None` if nothing was stored.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Replace the document under `key`.
    fn write(&self, key: &str, data: &[u8]) -> Result<()>;
}

// ── File slot ───────────────────────────────────────────────────

/// One JSON file per key inside a directory.
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Slot under the platform data directory (`~/.local/share/propreel` on Linux).
    pub fn default_location() -> Result<Self> {
        let base = dirs::data_local_dir()
            .ok_or_else(|| PropReelError::Storage("No platform data directory".into()))?;
        Ok(Self::new(base.join("propreel")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl StorageSlot for FileSlot {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// ── Memory slot ─────────────────────────────────────────────────

/// In-process slot, used by tests and headless sessions.
#[derive(Default)]
pub struct MemorySlot {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    writes: Mutex<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        self.entries.lock().insert(key.to_string(), data.to_vec());
        *self.writes.lock() += 1;
        Ok(())
    }
}

// ── Loading ─────────────────────────────────────────────────────

/// What the load-time integrity pass removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PruneReport {
    pub assets: Vec<AssetId>,
    pub clips: Vec<ClipId>,
}

impl PruneReport {
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty() && self.clips.is_empty()
    }
}

/// Remove assets whose storage reference does not survive a restart,
/// together with their clips and those clips' track entries and transitions.
pub fn prune_stale_assets(project: &mut Project, config: &EditorConfig) -> PruneReport {
    let stale: Vec<AssetId> = project
        .assets
        .values()
        .filter(|a| a.storage.is_stale_after_restart())
        .map(|a| a.id)
        .collect();

    let mut report = PruneReport::default();
    for asset_id in stale {
        if let Some(clips) = project.purge_asset(asset_id) {
            report.assets.push(asset_id);
            report.clips.extend(clips);
        }
    }

    if !report.is_empty() {
        let min_duration = project
            .frame_rate
            .frames_for_seconds(config.min_project_seconds);
        project.recalculate_duration(config.clip_end_buffer_frames, min_duration);
        warn!(
            assets = report.assets.len(),
            clips = report.clips.len(),
            "Pruned assets with session-only storage references"
        );
    }
    report
}

/// A project read back from storage, already pruned.
#[derive(Debug)]
pub struct LoadedProject {
    pub project: Project,
    pub pruned: PruneReport,
}

/// Read, migrate and prune the project stored under `config.storage_key`.
pub fn load_project(slot: &dyn StorageSlot, config: &EditorConfig) -> Result<Option<LoadedProject>> {
    let Some(data) = slot.read(&config.storage_key)? else {
        debug!(key = %config.storage_key, "No stored project");
        return Ok(None);
    };
    let mut project = ProjectFile::from_json(&data)?.project;
    // Playback never resumes across a reload.
    project.is_playing = false;
    let pruned = prune_stale_assets(&mut project, config);
    info!(
        name = %project.name,
        clips = project.clips.len(),
        tracks = project.tracks.len(),
        "Project loaded"
    );
    Ok(Some(LoadedProject { project, pruned }))
}

/// Serialize and write a project synchronously.
pub fn save_project(slot: &dyn StorageSlot, key: &str, project: &Project) -> Result<()> {
    let data = ProjectFile::new(project.clone()).to_json()?;
    slot.write(key, &data)
}

// ── Background persister ────────────────────────────────────────

enum PersistMsg {
    Save(Box<Project>),
    Flush(Sender<()>),
}

/// Fire-and-forget project writer.
///
/// `schedule` never blocks on I/O. Saves arriving within the debounce window
/// of each other collapse into one write of the latest project, but no save
/// waits longer than `max_wait` for its write. Write failures are logged and
/// otherwise ignored.
pub struct Persister {
    tx: Option<Sender<PersistMsg>>,
    worker: Option<JoinHandle<()>>,
}

impl Persister {
    pub fn spawn(
        slot: Arc<dyn StorageSlot>,
        key: impl Into<String>,
        debounce: Duration,
        max_wait: Duration,
    ) -> Self {
        let key = key.into();
        let (tx, rx) = unbounded::<PersistMsg>();

        let worker = std::thread::Builder::new()
            .name("propreel-persist".into())
            .spawn(move || {
                let mut pending: Option<Box<Project>> = None;
                // When the oldest unwritten save arrived.
                let mut oldest: Option<Instant> = None;
                loop {
                    let msg = if let Some(since) = oldest {
                        let wait = debounce.min(max_wait.saturating_sub(since.elapsed()));
                        match rx.recv_timeout(wait) {
                            Ok(msg) => msg,
                            Err(RecvTimeoutError::Timeout) => {
                                write_pending(slot.as_ref(), &key, &mut pending);
                                oldest = None;
                                continue;
                            }
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    } else {
                        match rx.recv() {
                            Ok(msg) => msg,
                            Err(_) => break,
                        }
                    };
                    match msg {
                        PersistMsg::Save(project) => {
                            pending = Some(project);
                            let since = *oldest.get_or_insert_with(Instant::now);
                            if since.elapsed() >= max_wait {
                                write_pending(slot.as_ref(), &key, &mut pending);
                                oldest = None;
                            }
                        }
                        PersistMsg::Flush(ack) => {
                            write_pending(slot.as_ref(), &key, &mut pending);
                            oldest = None;
                            let _ = ack.send(());
                        }
                    }
                }
                write_pending(slot.as_ref(), &key, &mut pending);
                debug!("Persister stopped");
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "Failed to start persister thread; changes will not be saved");
                None
            }
        };

        Self {
            tx: worker.as_ref().map(|_| tx),
            worker,
        }
    }

    /// Queue the current project state for writing.
    pub fn schedule(&self, project: &Project) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(PersistMsg::Save(Box::new(project.clone())));
        }
    }

    /// Block until everything scheduled so far has been written.
    pub fn flush(&self) {
        if let Some(tx) = &self.tx {
            let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
            if tx.send(PersistMsg::Flush(ack_tx)).is_ok() {
                let _ = ack_rx.recv();
            }
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn write_pending(slot: &dyn StorageSlot, key: &str, pending: &mut Option<Box<Project>>) {
    let Some(project) = pending.take() else {
        return;
    };
    let result = ProjectFile::new(*project)
        .to_json()
        .and_then(|data| slot.write(key, &data));
    match result {
        Ok(()) => debug!(key, "Project persisted"),
        Err(e) => warn!(key, error = %e, "Project persistence failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{Asset, MediaKind, StorageRef};
    use crate::clip::Clip;
    use propreel_core::FrameRate;

    struct FailingSlot;

    impl StorageSlot for FailingSlot {
        fn read(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }
        fn write(&self, _key: &str, _data: &[u8]) -> Result<()> {
            Err(PropReelError::Storage("disk full".into()))
        }
    }

    fn project_with_asset(storage: StorageRef) -> (Project, AssetId, ClipId) {
        let mut project = Project::new("Stored", FrameRate::FPS_30, 900);
        let asset = Asset::new(MediaKind::Image, "kitchen.jpg", storage);
        let asset_id = asset.id;
        project.assets.insert(asset_id, asset);
        let track_id = project.tracks[0].id;
        let clip = Clip::new_media(asset_id, track_id, 0, 90);
        let clip_id = clip.id;
        project.tracks[0].append_clip(clip_id);
        project.clips.insert(clip_id, clip);
        (project, asset_id, clip_id)
    }

    #[test]
    fn test_file_slot_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path());
        assert!(slot.read("propreel.project").unwrap().is_none());

        slot.write("propreel.project", b"{}").unwrap();
        assert_eq!(slot.read("propreel.project").unwrap().unwrap(), b"{}");
        assert!(dir.path().join("propreel.project.json").exists());
    }

    #[test]
    fn test_load_prunes_session_assets() {
        let config = EditorConfig::default();
        let slot = MemorySlot::new();
        let (mut project, asset_id, clip_id) = project_with_asset(StorageRef::session("blob:x"));
        project.is_playing = true;
        save_project(&slot, &config.storage_key, &project).unwrap();

        let loaded = load_project(&slot, &config).unwrap().unwrap();
        assert_eq!(loaded.pruned.assets, vec![asset_id]);
        assert_eq!(loaded.pruned.clips, vec![clip_id]);
        assert!(loaded.project.clips.is_empty());
        assert!(loaded.project.tracks.iter().all(|t| t.clip_ids.is_empty()));
        assert!(!loaded.project.is_playing);
    }

    #[test]
    fn test_load_keeps_durable_assets() {
        let config = EditorConfig::default();
        let slot = MemorySlot::new();
        let (project, _, clip_id) = project_with_asset(StorageRef::durable("/media/kitchen.jpg"));
        save_project(&slot, &config.storage_key, &project).unwrap();

        let loaded = load_project(&slot, &config).unwrap().unwrap();
        assert!(loaded.pruned.is_empty());
        assert!(loaded.project.clips.contains_key(&clip_id));
    }

    #[test]
    fn test_load_missing_is_none() {
        let slot = MemorySlot::new();
        assert!(load_project(&slot, &EditorConfig::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_persister_coalesces_bursts() {
        let slot = Arc::new(MemorySlot::new());
        let minute = Duration::from_secs(60);
        let persister = Persister::spawn(slot.clone(), "k", minute, minute);
        let mut project = Project::new("Burst", FrameRate::FPS_30, 900);
        for i in 0..10 {
            project.current_frame = i;
            persister.schedule(&project);
        }
        persister.flush();

        assert_eq!(slot.write_count(), 1);
        let stored = ProjectFile::from_json(&slot.read("k").unwrap().unwrap()).unwrap();
        assert_eq!(stored.project.current_frame, 9);
    }

    #[test]
    fn test_persister_writes_on_drop() {
        let slot = Arc::new(MemorySlot::new());
        {
            let minute = Duration::from_secs(60);
            let persister = Persister::spawn(slot.clone(), "k", minute, minute);
            persister.schedule(&Project::new("Dropped", FrameRate::FPS_30, 900));
        }
        assert_eq!(slot.write_count(), 1);
    }

    #[test]
    fn test_persister_survives_write_failure() {
        let tick = Duration::from_millis(1);
        let persister = Persister::spawn(Arc::new(FailingSlot), "k", tick, tick);
        persister.schedule(&Project::new("Lost", FrameRate::FPS_30, 900));
        persister.flush();
        persister.schedule(&Project::new("Lost again", FrameRate::FPS_30, 900));
        persister.flush();
    }

    #[test]
    fn test_persister_writes_during_steady_edits() {
        let slot = Arc::new(MemorySlot::new());
        let persister = Persister::spawn(
            slot.clone(),
            "k",
            Duration::from_secs(60),
            Duration::from_millis(50),
        );
        // Edits every 10ms never leave the 60s quiet period a chance to elapse.
        let mut project = Project::new("Playing", FrameRate::FPS_30, 900);
        for i in 0..30 {
            project.current_frame = i;
            persister.schedule(&project);
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(slot.write_count() >= 1);

        persister.flush();
        let stored = ProjectFile::from_json(&slot.read("k").unwrap().unwrap()).unwrap();
        assert_eq!(stored.project.current_frame, 29);
    }
}
