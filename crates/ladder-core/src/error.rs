//! Error types for Ladder Core
//!
//! Store failures pass through unchanged; the session adds readiness,
//! persistence, invitation and configuration failures on top.

use crate::types::SessionState;
use ladder_store::StoreError;
use std::path::PathBuf;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    /// A store operation was rejected; the store is unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Operation issued before login completed or after logout
    #[error("session not ready (state: {state})")]
    NotReady {
        /// State the session was in
        state: SessionState,
    },

    /// The gateway failed to load or save
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// Invitation could not be redeemed
    #[error("invite rejected: {0}")]
    Invite(#[from] InviteError),

    /// Configuration could not be read or is out of range
    #[error("configuration error: {0}")]
    Config(String),
}

impl LadderError {
    /// Create not-ready error
    #[inline]
    pub fn not_ready(state: SessionState) -> Self {
        Self::NotReady { state }
    }

    /// Create configuration error
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Coarse classification of the failure
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(StoreError::Validation(_)) => ErrorKind::Validation,
            Self::Store(StoreError::Duplicate(_)) => ErrorKind::Duplicate,
            Self::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            Self::Store(StoreError::Invariant(_) | StoreError::Document(_)) => ErrorKind::Invariant,
            Self::NotReady { .. } => ErrorKind::NotReady,
            Self::Persistence(_) => ErrorKind::Persistence,
            Self::Invite(_) => ErrorKind::Invite,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Check if retrying the same call could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Persistence(PersistenceError::Unavailable(_) | PersistenceError::Io { .. })
        )
    }
}

/// Failure classes surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Empty, too long or disallowed characters
    Validation,
    /// Name or item already present
    Duplicate,
    /// Named child or item absent
    NotFound,
    /// Structural rule would break
    Invariant,
    /// Session not in the ready state
    NotReady,
    /// Backing store failure
    Persistence,
    /// Invitation expired or used
    Invite,
    /// Bad configuration
    Config,
}

/// Errors raised by a persistence gateway
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Backend refused or could not be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Local file access failed
    #[error("io error at {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Document could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl PersistenceError {
    /// Create unavailable error
    #[inline]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Create io error for a path
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Invitation redemption errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InviteError {
    /// Code is not six letters or digits
    #[error("Invalid invite code: {0}")]
    InvalidCode(String),

    /// Past its expiry
    #[error("Invite code {code} has expired")]
    Expired {
        /// Offending code
        code: String,
    },

    /// Already claimed by a child account
    #[error("Invite code {code} has already been used")]
    AlreadyUsed {
        /// Offending code
        code: String,
    },
}

/// Result type alias for session operations
pub type LadderResult<T> = Result<T, LadderError>;
