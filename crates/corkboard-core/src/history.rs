//! Snapshot-based undo/redo history.
//!
//! Callers push the pre-mutation board map before a semantic operation.
//! Pushes within the debounce window coalesce into the previous entry by
//! simply being skipped.

use crate::board::BoardMap;
use std::time::{Duration, Instant};

/// Maximum number of undo steps kept.
pub const MAX_HISTORY: usize = 20;

/// Window within which consecutive pushes coalesce.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Undo/redo stacks over whole-workspace snapshots.
#[derive(Debug, Clone)]
pub struct History {
    past: Vec<BoardMap>,
    future: Vec<BoardMap>,
    last_push: Option<Instant>,
    debounce: Duration,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_debounce(DEBOUNCE)
    }

    /// Create a history with a custom debounce window. Tests use
    /// `Duration::ZERO` to make every push take effect.
    pub fn with_debounce(debounce: Duration) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            last_push: None,
            debounce,
        }
    }

    /// Record the current state before a mutation.
    ///
    /// A push that lands within the debounce window of the previous one is
    /// dropped, so rapid successive edits undo as a single step. An
    /// effective push clears the redo stack and evicts the oldest entry
    /// beyond [`MAX_HISTORY`].
    pub fn push(&mut self, boards: &BoardMap) {
        let now = Instant::now();
        if let Some(last) = self.last_push {
            if now.duration_since(last) < self.debounce {
                return;
            }
        }
        self.last_push = Some(now);

        self.past.push(boards.clone());
        if self.past.len() > MAX_HISTORY {
            self.past.remove(0);
        }
        self.future.clear();
    }

    /// Step back, handing the caller the state to restore.
    /// `current` is the live state, which becomes redoable.
    pub fn undo(&mut self, current: &BoardMap) -> Option<BoardMap> {
        let previous = self.past.pop()?;
        self.future.insert(0, current.clone());
        Some(previous)
    }

    /// Step forward after an undo.
    pub fn redo(&mut self, current: &BoardMap) -> Option<BoardMap> {
        if self.future.is_empty() {
            return None;
        }
        let next = self.future.remove(0);
        self.past.push(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.last_push = None;
    }
}
