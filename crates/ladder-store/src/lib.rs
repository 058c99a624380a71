//! Ladder Store
//!
//! The canonical in-memory document of one parent account: child profiles,
//! their tier-keyed responsibility and privilege lists, and per-child
//! mastery sets.
//!
//! # Core Concepts
//!
//! - [`Store`]: root document with invariant-preserving mutations
//! - [`Profile`] / [`TierData`]: one child's ladder
//! - [`TierId`] / [`Category`]: addressing of item lists
//! - [`validate_text`]: input rules shared by items and profile names
//! - [`level_progress`] / [`tier_progress`]: derived board figures
//!
//! # Example
//!
//! ```rust
//! use ladder_store::{Category, Store, TierId};
//!
//! let mut store = Store::default();
//! store.add_item(TierId::FIRST, Category::Responsibilities, "Make bed")?;
//! store.toggle_mastery("Make bed", true)?;
//! assert!(store.is_mastered("Make bed"));
//! # Ok::<(), ladder_store::StoreError>(())
//! ```

#![warn(unreachable_pub)]

mod document;
mod error;
mod profile;
mod progress;
mod store;
mod text;
mod tier;

pub use document::StoreDocument;
pub use error::{Namespace, StoreError, StoreResult, Target};
pub use profile::{Profile, TierData};
pub use progress::{level_progress, tier_progress, LevelProgress, TierProgress};
pub use store::{Change, MasterySet, Store, DEFAULT_KID};
pub use text::{validate_text, ValidationError, MAX_INPUT_LENGTH};
pub use tier::{Category, TierError, TierId, TierInfo, TIER_CATALOGUE, TIER_COUNT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
