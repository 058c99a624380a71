//! Ladder Core
//!
//! Session orchestration for the responsibility ladder: login and logout,
//! the mutation catalogue with undo/redo, background persistence, user
//! notifications, invitations and streaks.
//!
//! # Core Concepts
//!
//! - [`Session`]: per-login owner of store, history and save queue
//! - [`Command`]: serializable request dispatched by [`Session::execute`]
//! - [`PersistenceGateway`]: document load/save seam
//! - [`SaveQueue`]: coalescing single-slot writer
//! - [`Invitation`]: parent-to-child account link
//! - [`ActivityLog`]: per-child completion records behind streaks
//!
//! # Example
//!
//! ```rust
//! use ladder_core::{Command, MemoryGateway, Role, Session, SessionConfig, UserId};
//! use ladder_store::{Category, TierId};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ladder_core::LadderError> {
//! let mut session = Session::new(SessionConfig::default(), Arc::new(MemoryGateway::new()));
//! session.login(UserId::new("parent-1"), Role::Parent).await?;
//!
//! session.execute(&Command::AddItem {
//!     tier: TierId::FIRST,
//!     category: Category::Responsibilities,
//!     text: "Water plants".into(),
//! })?;
//! session.undo()?;
//! session.flush().await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod activity;
pub mod command;
pub mod config;
pub mod error;
pub mod gateway;
pub mod invite;
pub mod saver;
pub mod session;
pub mod types;

pub use activity::{
    child_streak, overall_streak, responsibility_streak, ActivityLog, ActivityRecorder, CompletionRecord,
};
pub use command::Command;
pub use config::{SessionConfig, MAX_INVITE_TTL_HOURS};
pub use error::{ErrorKind, InviteError, LadderError, LadderResult, PersistenceError};
pub use gateway::{FileGateway, MemoryGateway, PersistenceGateway};
pub use invite::{InviteClaim, InviteCode, Invitation};
pub use saver::{SaveOutcome, SaveQueue};
pub use session::Session;
pub use types::{Action, Notification, NotificationLevel, Role, SessionState, UserId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
