//! Persisted document shape
//!
//! ```text
//! { currentKid: string,
//!   profiles: { [kid]: { ["1".."5"]: { responsibilities?: string[], privileges?: string[] } } },
//!   mastered: { [kid]: string[] } }
//! ```
//!
//! Reading goes through [`StoreDocument`] so that every deserialized
//! [`Store`] satisfies the store invariants. Item lists and mastered arrays
//! are deduplicated on read; texts that break the input rules reject the
//! whole document.

use crate::error::{StoreError, StoreResult};
use crate::profile::Profile;
use crate::store::{MasterySet, Store};
use indexmap::IndexMap;
use serde::Deserialize;

/// Unvalidated wire form of a [`Store`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    /// Selected child
    pub current_kid: String,
    /// Profiles by child name
    pub profiles: IndexMap<String, Profile>,
    /// Mastered responsibility texts by child name; missing entries are created
    #[serde(default)]
    pub mastered: IndexMap<String, MasterySet>,
}

impl TryFrom<StoreDocument> for Store {
    type Error = StoreError;

    fn try_from(doc: StoreDocument) -> Result<Self, Self::Error> {
        Store::from_parts(doc.current_kid, doc.profiles, doc.mastered)
    }
}

impl Store {
    /// Serialize to the persisted JSON shape
    pub fn to_document(&self) -> StoreResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| StoreError::document(e.to_string()))
    }

    /// Parse and validate a persisted JSON document
    pub fn from_document(value: serde_json::Value) -> StoreResult<Self> {
        serde_json::from_value(value).map_err(|e| StoreError::document(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::{Category, TierId};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_to_document_shape() {
        let mut store = Store::new("A", Profile::empty());
        store
            .add_item(TierId::FIRST, Category::Responsibilities, "Shower")
            .unwrap();
        store.toggle_mastery("Shower", true).unwrap();

        assert_eq!(
            store.to_document().unwrap(),
            json!({
                "currentKid": "A",
                "profiles": { "A": { "1": { "responsibilities": ["Shower"] } } },
                "mastered": { "A": ["Shower"] }
            })
        );
    }

    #[test]
    fn reads_document_and_deduplicates_mastery() {
        let store = Store::from_document(json!({
            "currentKid": "A",
            "profiles": { "A": { "2": { "privileges": ["Laptop"] } } },
            "mastered": { "A": ["x", "x", "y"] }
        }))
        .unwrap();

        let tier = TierId::new(2).unwrap();
        assert_eq!(store.items(tier, Category::Privileges), ["Laptop"]);
        assert!(store.items(tier, Category::Responsibilities).is_empty());
        assert_eq!(store.current_mastered().len(), 2);
    }

    #[test]
    fn repairs_missing_mastery_and_selection() {
        let store = Store::from_document(json!({
            "currentKid": "Gone",
            "profiles": { "A": {}, "B": {} },
            "mastered": {}
        }))
        .unwrap();

        assert_eq!(store.current_kid(), "A");
        assert!(store.check_invariants().is_ok());

        let bare = Store::from_document(json!({ "currentKid": "A", "profiles": { "A": {} } })).unwrap();
        assert!(bare.mastered("A").is_some_and(MasterySet::is_empty));
    }

    #[test]
    fn rejects_broken_documents() {
        for doc in [
            json!({ "currentKid": "A", "profiles": {}, "mastered": {} }),
            json!({ "currentKid": "A", "profiles": { "A": { "9": {} } }, "mastered": {} }),
            json!({ "profiles": { "A": {} }, "mastered": {} }),
            json!("not an object"),
        ] {
            assert!(matches!(Store::from_document(doc), Err(StoreError::Document(_))));
        }
    }

    #[test]
    fn drops_repeated_items() {
        let store = Store::from_document(json!({
            "currentKid": "A",
            "profiles": { "A": { "1": { "responsibilities": ["Shower", "Shower", "Feed pet"] } } }
        }))
        .unwrap();

        assert_eq!(store.items(TierId::FIRST, Category::Responsibilities), ["Shower", "Feed pet"]);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn rejects_items_and_names_breaking_text_rules() {
        let long = "x".repeat(51);
        for items in [json!(["Shower", ""]), json!(["semi;colon"]), json!([long])] {
            let doc = json!({
                "currentKid": "A",
                "profiles": { "A": { "1": { "responsibilities": items } } }
            });
            assert!(matches!(Store::from_document(doc), Err(StoreError::Document(_))));
        }

        for name in ["", " A ", "bad;name"] {
            let doc = json!({ "currentKid": name, "profiles": { name: {} } });
            assert!(matches!(Store::from_document(doc), Err(StoreError::Document(_))), "{name:?}");
        }
    }

    #[test]
    fn document_round_trip_keeps_default_store() {
        let store = Store::default();
        let back = Store::from_document(store.to_document().unwrap()).unwrap();
        assert_eq!(back, store);
    }
}
