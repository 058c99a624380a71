//! Ladder History
//!
//! Bounded, branch-discarding undo/redo over full state snapshots.
//!
//! Restoring is whole-snapshot: labels describe the action that produced an
//! entry but never influence what undo or redo return.
//!
//! # Example
//!
//! ```rust
//! use ladder_history::History;
//!
//! let mut history = History::new(50);
//! history.record("load", &vec![1]);
//! history.record("push", &vec![1, 2]);
//!
//! assert_eq!(history.undo(), Some(&vec![1]));
//! assert_eq!(history.redo(), Some(&vec![1, 2]));
//! ```

#![warn(unreachable_pub)]

mod history;

pub use history::{History, HistoryEntry, HistoryStatus, DEFAULT_MAX_HISTORY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
