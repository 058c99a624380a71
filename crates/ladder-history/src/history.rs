//! Bounded linear undo/redo history over full snapshots
//!
//! The history is a single line of entries with a cursor pointing at the
//! entry that matches the live state. Recording after an undo discards the
//! entries past the cursor; recording past the bound drops the oldest entry.
//!
//! ```text
//!   record a, b, c        undo            record d
//!   [a, b, c]             [a, b, c]       [a, b, d]
//!          ^                  ^                  ^
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default bound on the number of entries
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// One recorded snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry<T> {
    /// Action that produced the snapshot; informational only
    pub label: String,
    /// Full copy of the state after the action
    pub snapshot: T,
}

/// UI-facing availability of undo and redo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStatus {
    /// Undo would restore something
    pub can_undo: bool,
    /// Redo would restore something
    pub can_redo: bool,
    /// Entries held
    pub len: usize,
}

/// Bounded, branch-discarding undo/redo log
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<HistoryEntry<T>>,
    cursor: usize,
    max_len: usize,
}

impl<T: Clone> History<T> {
    /// Create with a bound; a bound of zero is treated as one
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        let max_len = max_len.max(1);
        Self {
            entries: VecDeque::with_capacity(max_len.min(DEFAULT_MAX_HISTORY)),
            cursor: 0,
            max_len,
        }
    }

    /// Append a snapshot at the cursor
    ///
    /// Entries after the cursor are discarded first. When the bound is
    /// exceeded the oldest entry is dropped.
    pub fn record(&mut self, label: impl Into<String>, snapshot: &T) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }

        self.entries.push_back(HistoryEntry {
            label: label.into(),
            snapshot: snapshot.clone(),
        });

        if self.entries.len() > self.max_len {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry and return its snapshot
    ///
    /// `None` (cursor unchanged) when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(|entry| &entry.snapshot)
    }

    /// Step forward one entry and return its snapshot
    ///
    /// `None` (cursor unchanged) when already at the newest entry.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).map(|entry| &entry.snapshot)
    }

    /// Whether an older entry exists
    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    /// Whether a newer entry exists
    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    /// Snapshot of undo/redo availability
    #[must_use]
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            len: self.entries.len(),
        }
    }

    /// Entry at the cursor
    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry<T>> {
        self.entries.get(self.cursor)
    }

    /// Label of the entry at the cursor
    #[must_use]
    pub fn current_label(&self) -> Option<&str> {
        self.current().map(|entry| entry.label.as_str())
    }

    /// Labels oldest first
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.label.as_str())
    }

    /// Cursor position
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured bound
    #[inline]
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
