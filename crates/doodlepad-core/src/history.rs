//! Undo/redo history over stroke-list snapshots.

use crate::stroke::Stroke;

/// Default maximum number of undo states to keep.
pub const DEFAULT_UNDO_LIMIT: usize = 50;

/// Undo and redo stacks of stroke-list snapshots.
///
/// The undo stack is bounded; the oldest snapshot is evicted first.
/// The redo stack is unbounded but cleared whenever a new snapshot is pushed.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Vec<Stroke>>,
    redo_stack: Vec<Vec<Stroke>>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            limit,
        }
    }

    /// Record `strokes` as an undo point (call before making changes).
    pub fn push(&mut self, strokes: &[Stroke]) {
        self.redo_stack.clear();

        if self.limit == 0 {
            return;
        }

        self.undo_stack.push(strokes.to_vec());
        if self.undo_stack.len() > self.limit {
            let excess = self.undo_stack.len() - self.limit;
            self.undo_stack.drain(..excess);
        }
    }

    /// Step back. `current` is saved for redo; returns the strokes to restore.
    pub fn undo(&mut self, current: &[Stroke]) -> Option<Vec<Stroke>> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current.to_vec());
        Some(snapshot)
    }

    /// Step forward. `current` is saved for undo; returns the strokes to restore.
    pub fn redo(&mut self, current: &[Stroke]) -> Option<Vec<Stroke>> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current.to_vec());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks.
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
