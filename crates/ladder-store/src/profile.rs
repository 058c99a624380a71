//! Child profiles: tier-keyed item lists

use crate::text::{validate_text, ValidationError};
use crate::tier::{Category, TierId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Item lists of one tier
///
/// Empty lists are omitted when serialized and default to empty when read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierData {
    /// Responsibility texts, unique within this tier
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub responsibilities: Vec<String>,
    /// Privilege texts, unique within this tier
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub privileges: Vec<String>,
}

impl TierData {
    /// Build from string slices
    #[must_use]
    pub fn new(responsibilities: &[&str], privileges: &[&str]) -> Self {
        Self {
            responsibilities: responsibilities.iter().map(|s| (*s).to_string()).collect(),
            privileges: privileges.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Items of one category
    #[inline]
    #[must_use]
    pub fn items(&self, category: Category) -> &[String] {
        match category {
            Category::Responsibilities => &self.responsibilities,
            Category::Privileges => &self.privileges,
        }
    }

    /// Mutable items of one category
    #[inline]
    pub fn items_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Responsibilities => &mut self.responsibilities,
            Category::Privileges => &mut self.privileges,
        }
    }

    /// Whether `text` is present in `category`
    #[inline]
    #[must_use]
    pub fn contains(&self, category: Category, text: &str) -> bool {
        self.items(category).iter().any(|item| item == text)
    }

    /// Both lists empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responsibilities.is_empty() && self.privileges.is_empty()
    }
}

/// One child's ladder: tier id to item lists
///
/// A tier absent from the map behaves as an empty tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(BTreeMap<TierId, TierData>);

impl Profile {
    /// Empty profile
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Profile cloned from the default template
    #[must_use]
    pub fn default_template() -> Self {
        let lists: [(&[&str], &[&str]); 5] = [
            (
                &["Shower daily", "Brush teeth 2x", "Put away shoes & coats"],
                &["Allowance", "1h screen time", "Choose family movie"],
            ),
            (&["Keep bedroom tidy", "Pack own lunch"], &["Smartphone", "Decorate room"]),
            (&["Take out trash", "Feed pet"], &["Video games", "Friend outings"]),
            (&["Maintain GPA B", "Manage homework"], &["Laptop", "Later curfew"]),
            (&["Budget money", "Safe driving"], &["Car access", "Flexible curfew"]),
        ];

        Self(
            TierId::all()
                .zip(lists)
                .map(|(tier, (resp, privs))| (tier, TierData::new(resp, privs)))
                .collect(),
        )
    }

    /// Tier data, if the tier has an entry
    #[inline]
    #[must_use]
    pub fn tier(&self, tier: TierId) -> Option<&TierData> {
        self.0.get(&tier)
    }

    /// Tier data, created empty on first access
    #[inline]
    pub fn tier_mut(&mut self, tier: TierId) -> &mut TierData {
        self.0.entry(tier).or_default()
    }

    /// Items of a (tier, category) pair; empty when the tier is absent
    #[must_use]
    pub fn items(&self, tier: TierId, category: Category) -> &[String] {
        self.tier(tier).map(|data| data.items(category)).unwrap_or(&[])
    }

    /// Whether `text` exists in a (tier, category) pair
    #[inline]
    #[must_use]
    pub fn contains(&self, tier: TierId, category: Category, text: &str) -> bool {
        self.items(tier, category).iter().any(|item| item == text)
    }

    /// Whether `text` is a responsibility in any tier
    #[must_use]
    pub fn has_responsibility(&self, text: &str) -> bool {
        self.0
            .values()
            .any(|data| data.contains(Category::Responsibilities, text))
    }

    /// Iterate tiers that have an entry, in ladder order
    pub fn tiers(&self) -> impl Iterator<Item = (TierId, &TierData)> {
        self.0.iter().map(|(id, data)| (*id, data))
    }

    /// Set a whole tier
    pub fn set_tier(&mut self, tier: TierId, data: TierData) {
        self.0.insert(tier, data);
    }

    /// Drop the tier entry once both lists are empty
    pub(crate) fn prune(&mut self, tier: TierId) {
        if self.0.get(&tier).is_some_and(TierData::is_empty) {
            self.0.remove(&tier);
        }
    }

    /// Bring stored lists back under the input rules
    ///
    /// Items are trimmed, repeats within one list are dropped and empty tiers
    /// are pruned. Returns the number of dropped repeats, or the first item
    /// that breaks the text rules.
    pub(crate) fn normalize(&mut self) -> Result<usize, ValidationError> {
        let mut dropped = 0;
        for data in self.0.values_mut() {
            for items in [&mut data.responsibilities, &mut data.privileges] {
                let mut unique = IndexSet::with_capacity(items.len());
                for item in items.iter() {
                    unique.insert(validate_text(item)?);
                }
                dropped += items.len() - unique.len();
                *items = unique.into_iter().collect();
            }
        }
        self.0.retain(|_, data| !data.is_empty());
        Ok(dropped)
    }
}
