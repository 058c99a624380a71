//! Core types for Ladder Core

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account identifier issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Who is signed in
///
/// The store does not enforce roles; callers gate editing on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owns the document and edits the ladder
    Parent,
    /// Linked through an invitation; ticks off mastery
    Child,
}

impl Role {
    /// Whether this role may change the ladder itself
    #[inline]
    #[must_use]
    pub fn can_edit(self) -> bool {
        matches!(self, Self::Parent)
    }
}

/// Session lifecycle
///
/// ```text
/// Uninitialized --login--> Loading --loaded--> Ready --logout--> Cleared
///                              \--load failed--> Uninitialized
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No user has logged in
    Uninitialized,
    /// Document is being fetched
    Loading,
    /// Store and history available
    Ready,
    /// Logged out; store and history dropped
    Cleared,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Cleared => "cleared",
        })
    }
}

/// Recorded action kinds; the label is informational only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Baseline entry written on login
    Load,
    /// Active child changed
    SelectChild,
    /// Profile added
    AddChild,
    /// Profile renamed
    RenameChild,
    /// Profile removed
    DeleteChild,
    /// Item appended
    AddItem,
    /// Item text replaced
    EditItem,
    /// Item removed
    DeleteItem,
    /// Item moved between tiers
    MoveItem,
    /// Mastery flag changed
    ToggleMastery,
}

impl Action {
    /// History label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::SelectChild => "select-child",
            Self::AddChild => "add-child",
            Self::RenameChild => "rename-child",
            Self::DeleteChild => "delete-child",
            Self::AddItem => "add-item",
            Self::EditItem => "edit-item",
            Self::DeleteItem => "delete-item",
            Self::MoveItem => "move-item",
            Self::ToggleMastery => "toggle-mastery",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Action completed
    Success,
    /// Degraded but usable
    Warning,
    /// Action rejected
    Error,
}

/// User-facing notice published on the session channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Display text
    pub message: String,
}

impl Notification {
    /// Success notice
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Warning notice
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            message: message.into(),
        }
    }

    /// Error notice
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_kebab_case() {
        assert_eq!(Action::ToggleMastery.label(), "toggle-mastery");
        assert_eq!(Action::Load.to_string(), "load");
        let json = serde_json::to_string(&Action::MoveItem).unwrap();
        assert_eq!(json, "\"move-item\"");
    }

    #[test]
    fn only_parents_edit() {
        assert!(Role::Parent.can_edit());
        assert!(!Role::Child.can_edit());
    }

    #[test]
    fn user_id_is_transparent() {
        let id = UserId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");
        assert_eq!(id.to_string(), "abc123");
    }
}
