//! Error types for store operations
//!
//! Every store operation fails fast: when an error is returned the store is
//! exactly as it was before the call.

use crate::text::ValidationError;
use crate::tier::{Category, TierId};

/// Store operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Bad item text or profile name
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Uniqueness violated within a namespace
    #[error("{0}")]
    Duplicate(Namespace),

    /// Referenced child or item is absent
    #[error("{0}")]
    NotFound(Target),

    /// Operation would break a structural invariant
    #[error("{0}")]
    Invariant(String),

    /// Persisted document does not describe a valid store
    #[error("invalid store document: {0}")]
    Document(String),
}

impl StoreError {
    /// Create invariant error
    #[inline]
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    /// Create document error
    #[inline]
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document(message.into())
    }
}

/// Namespace in which a duplicate was found
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Namespace {
    /// Child profile names
    #[error("Kid name already exists: {name}")]
    Profile {
        /// Clashing name
        name: String,
    },

    /// One (tier, category) list
    #[error("Item already exists in tier {tier} {category}: {text}")]
    Items {
        /// Tier of the list
        tier: TierId,
        /// Category of the list
        category: Category,
        /// Clashing text
        text: String,
    },
}

/// Missing referent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Target {
    /// No profile with this name
    #[error("No such kid: {name}")]
    Profile {
        /// Requested name
        name: String,
    },

    /// No such item in the (tier, category) list
    #[error("No such item in tier {tier} {category}: {text}")]
    Item {
        /// Tier searched
        tier: TierId,
        /// Category searched
        category: Category,
        /// Requested text
        text: String,
    },
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_passes_message_through() {
        let err = StoreError::from(ValidationError::Empty);
        assert_eq!(err.to_string(), "Input cannot be empty");
    }

    #[test]
    fn duplicate_item_display() {
        let err = StoreError::Duplicate(Namespace::Items {
            tier: TierId::FIRST,
            category: Category::Responsibilities,
            text: "Shower".to_string(),
        });
        assert_eq!(err.to_string(), "Item already exists in tier 1 responsibilities: Shower");
    }

    #[test]
    fn not_found_profile_display() {
        let err = StoreError::NotFound(Target::Profile { name: "Zed".to_string() });
        assert!(err.to_string().contains("Zed"));
    }
}
