//! Media file probing to get metadata without full decode.
//!
//! Still images are measured with the `image` crate; video and audio go
//! through `ffprobe` from ffmpeg-sidecar. Decode failures leave the
//! corresponding fields empty rather than failing the probe.

use std::future::Future;
use std::path::{Path, PathBuf};

use propreel_core::{Frame, FrameRate};
use propreel_timeline::MediaKind;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Metadata learned about a media input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedMedia {
    pub kind: MediaKind,
    pub mime_type: String,
    pub size_bytes: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Natural length in project frames.
    pub duration_frames: Option<Frame>,
}

impl ProbedMedia {
    fn bare(kind: MediaKind, mime_type: &str, size_bytes: u64) -> Self {
        Self {
            kind,
            mime_type: mime_type.to_string(),
            size_bytes,
            width: None,
            height: None,
            duration_frames: None,
        }
    }
}

/// Source of media metadata.
pub trait MediaProber: Send + Sync {
    /// Probe `path`, expressing durations at `frame_rate`.
    ///
    /// Fails when the input cannot be read, its type is unknown, or the
    /// decoding task dies.
    fn probe(
        &self,
        path: &Path,
        frame_rate: FrameRate,
    ) -> impl Future<Output = MediaResult<ProbedMedia>> + Send;
}

/// MIME type for a file extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" | "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        _ => return None,
    };
    Some(mime)
}

/// Run decoder work on the blocking pool.
async fn decode_blocking<T, F>(work: F) -> MediaResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| MediaError::Task(e.to_string()))
}

/// Prober backed by the filesystem, `image` and `ffprobe`.
#[derive(Debug, Clone)]
pub struct FsProber {
    ffprobe: PathBuf,
}

impl FsProber {
    /// Use the ffprobe binary that ffmpeg-sidecar resolves.
    pub fn new() -> Self {
        Self::with_ffprobe(ffmpeg_sidecar::ffprobe::ffprobe_path())
    }

    pub fn with_ffprobe(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    async fn image_dimensions(path: &Path) -> MediaResult<Option<(u32, u32)>> {
        let owned = path.to_path_buf();
        match decode_blocking(move || image::image_dimensions(&owned)).await? {
            Ok(dims) => Ok(Some(dims)),
            Err(e) => {
                warn!(path = %path.display(), "Image decode failed: {}", e);
                Ok(None)
            }
        }
    }

    async fn run_ffprobe(&self, path: &Path) -> Option<Vec<u8>> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => Some(output.stdout),
            Ok(output) => {
                warn!(
                    path = %path.display(),
                    status = %output.status,
                    "ffprobe could not decode input"
                );
                None
            }
            Err(e) => {
                warn!(ffprobe = %self.ffprobe.display(), "Failed to run ffprobe: {}", e);
                None
            }
        }
    }
}

impl Default for FsProber {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaProber for FsProber {
    async fn probe(&self, path: &Path, frame_rate: FrameRate) -> MediaResult<ProbedMedia> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|source| MediaError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let mime = mime_for_path(path)
            .ok_or_else(|| MediaError::Unsupported(path.display().to_string()))?;
        let kind = MediaKind::from_mime(mime)
            .ok_or_else(|| MediaError::Unsupported(mime.to_string()))?;

        let mut probed = ProbedMedia::bare(kind, mime, metadata.len());
        match kind {
            MediaKind::Image => {
                if let Some((width, height)) = Self::image_dimensions(path).await? {
                    probed.width = Some(width);
                    probed.height = Some(height);
                }
            }
            MediaKind::Video | MediaKind::Audio => {
                if let Some(json) = self.run_ffprobe(path).await {
                    let parsed = parse_ffprobe_output(&json, frame_rate);
                    probed.width = parsed.width;
                    probed.height = parsed.height;
                    probed.duration_frames = parsed.duration_frames;
                }
            }
        }

        debug!(
            path = %path.display(),
            ?kind,
            width = ?probed.width,
            height = ?probed.height,
            duration_frames = ?probed.duration_frames,
            "Probed media"
        );
        Ok(probed)
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Fields recovered from ffprobe JSON.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamFields {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_frames: Option<Frame>,
}

/// Extract dimensions and duration from `ffprobe -print_format json` output.
///
/// Container duration wins over stream duration. Anything unparseable is
/// left empty.
pub fn parse_ffprobe_output(json: &[u8], frame_rate: FrameRate) -> StreamFields {
    let output: FfprobeOutput = match serde_json::from_slice(json) {
        Ok(output) => output,
        Err(e) => {
            warn!("Failed to parse ffprobe output: {}", e);
            return StreamFields::default();
        }
    };

    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    let seconds = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or_else(|| output.streams.iter().find_map(|s| s.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);

    StreamFields {
        width: video.and_then(|s| s.width),
        height: video.and_then(|s| s.height),
        duration_frames: seconds.map(|s| frame_rate.frame_at_seconds(s)),
    }
}
