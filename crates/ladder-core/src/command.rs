//! Serializable mutation commands
//!
//! Front-ends describe what the user asked for as a [`Command`] and hand it
//! to [`Session::execute`]; validation and uniqueness checks live only in
//! the store.

use crate::error::LadderResult;
use crate::session::Session;
use crate::types::Action;
use ladder_store::{Category, Change, TierId};
use serde::{Deserialize, Serialize};

/// One user request against the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Command {
    /// Make a profile active
    SelectChild {
        /// Profile name
        name: String,
    },
    /// Create a profile
    AddChild {
        /// New profile name
        name: String,
    },
    /// Rename a profile
    RenameChild {
        /// Current name
        from: String,
        /// New name
        to: String,
    },
    /// Remove a profile
    DeleteChild {
        /// Profile name
        name: String,
    },
    /// Append an item
    AddItem {
        /// Target tier
        tier: TierId,
        /// Target list
        category: Category,
        /// Item text
        text: String,
    },
    /// Replace an item's text
    EditItem {
        /// Tier holding the item
        tier: TierId,
        /// List holding the item
        category: Category,
        /// Current text
        from: String,
        /// Replacement text
        to: String,
    },
    /// Remove an item
    DeleteItem {
        /// Tier holding the item
        tier: TierId,
        /// List holding the item
        category: Category,
        /// Item text
        text: String,
    },
    /// Move an item between tiers
    MoveItem {
        /// List holding the item
        category: Category,
        /// Item text
        text: String,
        /// Source tier
        from: TierId,
        /// Destination tier
        to: TierId,
    },
    /// Mark a responsibility mastered or not
    ToggleMastery {
        /// Responsibility text
        text: String,
        /// New flag
        mastered: bool,
    },
    /// Step back in history
    Undo,
    /// Step forward in history
    Redo,
}

impl Command {
    /// History label recorded when this command applies; `None` for undo/redo
    #[must_use]
    pub fn action(&self) -> Option<Action> {
        Some(match self {
            Self::SelectChild { .. } => Action::SelectChild,
            Self::AddChild { .. } => Action::AddChild,
            Self::RenameChild { .. } => Action::RenameChild,
            Self::DeleteChild { .. } => Action::DeleteChild,
            Self::AddItem { .. } => Action::AddItem,
            Self::EditItem { .. } => Action::EditItem,
            Self::DeleteItem { .. } => Action::DeleteItem,
            Self::MoveItem { .. } => Action::MoveItem,
            Self::ToggleMastery { .. } => Action::ToggleMastery,
            Self::Undo | Self::Redo => return None,
        })
    }
}

impl Session {
    /// Dispatch a command to the matching operation
    ///
    /// # Errors
    /// Whatever the dispatched operation returns
    pub fn execute(&mut self, command: &Command) -> LadderResult<Change> {
        match command {
            Command::SelectChild { name } => self.select_child(name),
            Command::AddChild { name } => self.add_child(name),
            Command::RenameChild { from, to } => self.rename_child(from, to),
            Command::DeleteChild { name } => self.delete_child(name),
            Command::AddItem { tier, category, text } => self.add_item(*tier, *category, text),
            Command::EditItem {
                tier,
                category,
                from,
                to,
            } => self.edit_item(*tier, *category, from, to),
            Command::DeleteItem { tier, category, text } => self.delete_item(*tier, *category, text),
            Command::MoveItem {
                category,
                text,
                from,
                to,
            } => self.move_item(*category, text, *from, *to),
            Command::ToggleMastery { text, mastered } => self.toggle_mastery(text, *mastered),
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commands_use_an_op_tag() {
        let command: Command = serde_json::from_value(json!({
            "op": "move-item",
            "category": "privileges",
            "text": "Phone",
            "from": 2,
            "to": 4
        }))
        .unwrap();
        assert_eq!(
            command,
            Command::MoveItem {
                category: Category::Privileges,
                text: "Phone".into(),
                from: TierId::new(2).unwrap(),
                to: TierId::new(4).unwrap(),
            }
        );
        assert_eq!(serde_json::to_value(Command::Undo).unwrap(), json!({"op": "undo"}));
    }

    #[test]
    fn out_of_range_tier_is_rejected() {
        let parsed = serde_json::from_value::<Command>(json!({
            "op": "add-item", "tier": 9, "category": "responsibilities", "text": "x"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn action_labels_match_commands() {
        let toggle = Command::ToggleMastery {
            text: "a".into(),
            mastered: true,
        };
        assert_eq!(toggle.action(), Some(Action::ToggleMastery));
        assert_eq!(Command::Redo.action(), None);
    }
}
