//! Turning media files into project assets.

use std::path::Path;

use parking_lot::Mutex;
use propreel_core::{AssetId, ClipId, Frame, FrameRate, TrackId};
use propreel_timeline::{Asset, ProjectStore, StorageRef};
use tracing::info;

use crate::error::MediaResult;
use crate::probe::{FsProber, MediaProber, ProbedMedia};

/// Result of placing an imported file on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedMedia {
    pub asset_id: AssetId,
    /// `None` when the target track no longer exists.
    pub clip_id: Option<ClipId>,
}

/// Probes media inputs and builds assets from them.
pub struct AssetImporter<P = FsProber> {
    prober: P,
    frame_rate: FrameRate,
}

impl AssetImporter<FsProber> {
    pub fn with_ffprobe(frame_rate: FrameRate) -> Self {
        Self::new(FsProber::new(), frame_rate)
    }
}

impl<P: MediaProber> AssetImporter<P> {
    pub fn new(prober: P, frame_rate: FrameRate) -> Self {
        Self { prober, frame_rate }
    }

    /// Probe a file and describe it as a durable asset.
    pub async fn import(&self, path: &Path) -> MediaResult<Asset> {
        self.import_as(path, StorageRef::durable(path.to_string_lossy())).await
    }

    /// Probe a file and describe it as an asset stored at `storage`.
    ///
    /// Use a session reference for inputs that only live as long as the
    /// process, such as dropped blobs spilled to a temp directory.
    pub async fn import_as(&self, path: &Path, storage: StorageRef) -> MediaResult<Asset> {
        let probed = self.prober.probe(path, self.frame_rate).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| storage.uri.clone());
        let asset = build_asset(name, storage, probed);
        info!(
            asset_id = %asset.id,
            name = %asset.name,
            kind = ?asset.kind,
            "Imported media"
        );
        Ok(asset)
    }

    /// Import a file into the store's asset library.
    pub async fn import_into(&self, store: &Mutex<ProjectStore>, path: &Path) -> MediaResult<AssetId> {
        let asset = self.import(path).await?;
        Ok(store.lock().add_asset(asset))
    }

    /// Import a file and place it on `track_id` at `start_frame`.
    ///
    /// The clip takes the asset's natural length; stills get the default
    /// length and a Ken Burns move.
    pub async fn import_clip(
        &self,
        store: &Mutex<ProjectStore>,
        path: &Path,
        track_id: TrackId,
        start_frame: Frame,
    ) -> MediaResult<PlacedMedia> {
        let asset = self.import(path).await?;
        let mut store = store.lock();
        let asset_id = store.add_asset(asset);
        let clip_id = store.add_clip(asset_id, track_id, start_frame, None);
        Ok(PlacedMedia { asset_id, clip_id })
    }
}

fn build_asset(name: String, storage: StorageRef, probed: ProbedMedia) -> Asset {
    let mut asset = Asset::new(probed.kind, name, storage);
    asset.mime_type = probed.mime_type;
    asset.size_bytes = probed.size_bytes;
    asset.width = probed.width;
    asset.height = probed.height;
    asset.duration_frames = probed.duration_frames;
    asset
}
