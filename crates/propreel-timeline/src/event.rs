//! Change notifications broadcast by the project store.

use crossbeam_channel::{unbounded, Receiver, Sender};
use propreel_core::{AssetId, ClipId, Frame, TrackId};

/// One committed state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectEvent {
    TrackAdded(TrackId),
    TrackRemoved(TrackId),
    TrackUpdated(TrackId),
    ClipAdded(ClipId),
    ClipRemoved(ClipId),
    ClipUpdated(ClipId),
    ClipMoved {
        clip: ClipId,
        from_track: TrackId,
        to_track: TrackId,
    },
    ClipSplit {
        original: ClipId,
        created: ClipId,
    },
    AssetAdded(AssetId),
    AssetRemoved {
        asset: AssetId,
        clips: Vec<ClipId>,
    },
    TransitionsChanged,
    EffectsChanged(ClipId),
    PlayheadMoved(Frame),
    PlayStateChanged(bool),
    SelectionChanged,
    ZoomChanged,
    /// Project-level metadata (name, export format) or a whole-document reload.
    ProjectChanged,
    /// An undo or redo replaced the structure.
    HistoryRestored,
}

impl ProjectEvent {
    /// Whether this event changes persisted structure rather than editor state only.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            ProjectEvent::PlayheadMoved(_)
                | ProjectEvent::PlayStateChanged(_)
                | ProjectEvent::SelectionChanged
                | ProjectEvent::ZoomChanged
        )
    }
}

/// Fan-out of events to any number of subscribers.
#[derive(Debug, Default)]
pub struct Observers {
    senders: Vec<Sender<ProjectEvent>>,
}

impl Observers {
    pub fn subscribe(&mut self) -> Receiver<ProjectEvent> {
        let (tx, rx) = unbounded();
        self.senders.push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber, forgetting disconnected ones.
    pub fn broadcast(&mut self, event: ProjectEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
