//! PropReel - Property listing video editor
//!
//! Headless entry point: opens the stored project, imports any media given
//! on the command line, optionally plays a short preview, and saves.

mod session;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use propreel_core::EditorConfig;
use propreel_timeline::{FileSlot, StorageSlot};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::session::{default_importer, Session};

/// Environment variable naming an optional JSON config file.
const CONFIG_ENV: &str = "PROPREEL_CONFIG";
/// Environment variable overriding the project storage directory.
const DATA_DIR_ENV: &str = "PROPREEL_DATA_DIR";

struct Args {
    media: Vec<PathBuf>,
    preview: Option<Duration>,
}

fn parse_args() -> Result<Args> {
    let mut media = Vec::new();
    let mut preview = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--preview" {
            let secs: u64 = args
                .next()
                .context("--preview needs a number of seconds")?
                .parse()
                .context("--preview needs a number of seconds")?;
            preview = Some(Duration::from_secs(secs));
        } else {
            media.push(PathBuf::from(arg));
        }
    }
    Ok(Args { media, preview })
}

fn load_config() -> Result<EditorConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => EditorConfig::load(&PathBuf::from(path)).context("Invalid editor config"),
        None => Ok(EditorConfig::default()),
    }
}

fn open_slot() -> Result<Arc<dyn StorageSlot>> {
    let slot = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) => FileSlot::new(dir),
        None => FileSlot::default_location()?,
    };
    info!(dir = %slot.dir().display(), "Using project storage");
    Ok(Arc::new(slot))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("PropReel starting...");

    let args = parse_args()?;
    let config = load_config()?;
    let session = Session::open(open_slot()?, config)?;

    if !args.media.is_empty() {
        let frame_rate = session.store().lock().project().frame_rate;
        session.import_all(&default_importer(frame_rate), &args.media).await;
    }

    if let Some(duration) = args.preview {
        let frame = session.preview(duration).await?;
        info!(frame, "Preview finished");
    }

    session.close();
    Ok(())
}
