//! Snapshot-based undo/redo history.
//!
//! Two bounded stacks of `ProjectSnapshot`: `past` holds states to return to
//! on undo, `future` holds states undone and available for redo. Pushing a
//! new checkpoint clears `future` (linear history).
//!
//! Callers push *before* a destructive mutation, so the top of `past` is
//! always the pre-mutation state.

use std::collections::VecDeque;

use crate::project::Project;
use crate::snapshot::ProjectSnapshot;

/// A single entry in the undo/redo history.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Action that produced this checkpoint (e.g., "Split clip").
    pub label: String,
    pub snapshot: ProjectSnapshot,
}

/// Undo/redo history over structural project state.
#[derive(Debug)]
pub struct HistoryManager {
    past: VecDeque<HistoryEntry>,
    future: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryManager {
    /// Create a history keeping at most `capacity` entries per stack.
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Checkpoint the current structure of `project`.
    ///
    /// Evicts the oldest entry when over capacity and clears the redo stack.
    pub fn push_state(&mut self, label: &str, project: &Project) {
        self.future.clear();
        push_bounded(
            &mut self.past,
            HistoryEntry {
                label: label.to_string(),
                snapshot: ProjectSnapshot::capture(project),
            },
            self.capacity,
        );
        tracing::debug!(label, undo_depth = self.past.len(), "History entry pushed");
    }

    /// Step back. Saves `current` for redo and returns the snapshot to restore,
    /// or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &Project) -> Option<ProjectSnapshot> {
        let entry = self.past.pop_back()?;
        push_bounded(
            &mut self.future,
            HistoryEntry {
                label: entry.label.clone(),
                snapshot: ProjectSnapshot::capture(current),
            },
            self.capacity,
        );
        tracing::debug!(
            label = %entry.label,
            undo_remaining = self.past.len(),
            "Undo"
        );
        Some(entry.snapshot)
    }

    /// Step forward. Saves `current` for undo and returns the snapshot to
    /// restore, or `None` when there is nothing to redo.
    pub fn redo(&mut self, current: &Project) -> Option<ProjectSnapshot> {
        let entry = self.future.pop_back()?;
        push_bounded(
            &mut self.past,
            HistoryEntry {
                label: entry.label.clone(),
                snapshot: ProjectSnapshot::capture(current),
            },
            self.capacity,
        );
        tracing::debug!(
            label = %entry.label,
            redo_remaining = self.future.len(),
            "Redo"
        );
        Some(entry.snapshot)
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Label of the action that would be undone next.
    pub fn undo_label(&self) -> Option<&str> {
        self.past.back().map(|e| e.label.as_str())
    }

    /// Label of the action that would be redone next.
    pub fn redo_label(&self) -> Option<&str> {
        self.future.back().map(|e| e.label.as_str())
    }

    /// Number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.past.len()
    }

    /// Number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        tracing::debug!("History cleared");
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(50)
    }
}

fn push_bounded(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, capacity: usize) {
    stack.push_back(entry);
    while stack.len() > capacity {
        stack.pop_front();
    }
}
