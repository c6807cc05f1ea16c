//! PropReel Timeline - Timeline data model and editing engine
//!
//! Implements the editable state of a property-marketing video:
//! - Projects containing tracks, clips, assets and transitions
//! - The project store, the single owner of all mutations
//! - Snapshot-based undo/redo with bounded history
//! - Versioned persistence with debounced background writes

pub mod asset;
pub mod clip;
pub mod event;
pub mod history;
pub mod project;
pub mod serialization;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod track;
pub mod transition;

pub use asset::{Asset, Durability, MediaKind, StorageRef};
pub use clip::{
    Clip, ClipPatch, Effect, EffectKind, EffectPatch, KenBurns, TextAlign, TextContent,
};
pub use event::{Observers, ProjectEvent};
pub use history::{HistoryEntry, HistoryManager};
pub use project::{ExportFormat, IntegrityError, Project, DEFAULT_ZOOM};
pub use serialization::{ProjectFile, CURRENT_VERSION};
pub use snapshot::ProjectSnapshot;
pub use storage::{
    load_project, prune_stale_assets, save_project, FileSlot, LoadedProject, MemorySlot,
    Persister, PruneReport, StorageSlot,
};
pub use store::{ProjectStore, MAX_ZOOM, MIN_ZOOM};
pub use track::{Track, TrackKind, TrackPatch};
pub use transition::{Transition, TransitionKind, TransitionPatch};
