//! The store: every child profile and mastery set of one parent account
//!
//! [`Store`] owns the canonical document and exposes in-place mutation
//! primitives. Each primitive validates fully before touching any field, so
//! an `Err` always leaves the store untouched.
//!
//! # Invariants
//!
//! - `profiles` is never empty
//! - `current_kid` is a key of `profiles`
//! - every key of `profiles` has an entry in `mastered`

use crate::error::{Namespace, StoreError, StoreResult, Target};
use crate::profile::{Profile, TierData};
use crate::text::validate_text;
use crate::tier::{Category, TierId};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Name of the profile created for a fresh account
pub const DEFAULT_KID: &str = "Kid 1";

/// Per-child set of mastered responsibility texts
pub type MasterySet = IndexSet<String>;

/// Outcome of a mutation that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The store was modified
    Applied,
    /// Nothing to do; the store is as before
    Unchanged,
}

impl Change {
    /// Whether the store was modified
    #[inline]
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Root document of one parent account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "crate::document::StoreDocument")]
pub struct Store {
    current_kid: String,
    profiles: IndexMap<String, Profile>,
    mastered: IndexMap<String, MasterySet>,
}

impl Store {
    /// Store with a single profile, selected, with nothing mastered
    #[must_use]
    pub fn new(kid: impl Into<String>, profile: Profile) -> Self {
        let kid = kid.into();
        let mut profiles = IndexMap::new();
        profiles.insert(kid.clone(), profile);
        let mut mastered = IndexMap::new();
        mastered.insert(kid.clone(), MasterySet::new());

        Self {
            current_kid: kid,
            profiles,
            mastered,
        }
    }

    /// Store with one profile cloned from the default template
    #[must_use]
    pub fn with_default_profile(kid: impl Into<String>) -> Self {
        Self::new(kid, Profile::default_template())
    }

    /// Assemble from raw parts, repairing what can be repaired
    ///
    /// Missing mastered entries are created, repeated items are dropped and
    /// a dangling current kid is reset to the first profile. An empty
    /// profile map, a profile name or an item that breaks the text rules
    /// cannot be repaired.
    pub(crate) fn from_parts(
        current_kid: String,
        mut profiles: IndexMap<String, Profile>,
        mut mastered: IndexMap<String, MasterySet>,
    ) -> StoreResult<Self> {
        let Some(first) = profiles.keys().next().cloned() else {
            return Err(StoreError::document("store has no profiles"));
        };

        for (kid, profile) in &mut profiles {
            if validate_text(kid).ok().as_deref() != Some(kid.as_str()) {
                return Err(StoreError::document(format!("invalid profile name {kid:?}")));
            }
            let dropped = profile
                .normalize()
                .map_err(|e| StoreError::document(format!("profile {kid}: {e}")))?;
            if dropped > 0 {
                tracing::warn!(kid = %kid, dropped, "dropped repeated items");
            }
        }

        for kid in profiles.keys() {
            mastered.entry(kid.clone()).or_default();
        }

        let current_kid = if profiles.contains_key(&current_kid) {
            current_kid
        } else {
            tracing::warn!(missing = %current_kid, fallback = %first, "current kid not in profiles");
            first
        };

        Ok(Self {
            current_kid,
            profiles,
            mastered,
        })
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    /// Name of the active child profile
    #[inline]
    #[must_use]
    pub fn current_kid(&self) -> &str {
        &self.current_kid
    }

    /// All profiles, in insertion order
    #[inline]
    #[must_use]
    pub fn profiles(&self) -> &IndexMap<String, Profile> {
        &self.profiles
    }

    /// Child names, in insertion order
    pub fn kid_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Profile by child name
    #[inline]
    #[must_use]
    pub fn profile(&self, kid: &str) -> Option<&Profile> {
        self.profiles.get(kid)
    }

    /// Profile of the active child
    #[must_use]
    pub fn current_profile(&self) -> &Profile {
        // current_kid always indexes profiles
        &self.profiles[self.current_kid.as_str()]
    }

    /// Tier data of the active child; `None` for a tier with no items
    #[must_use]
    pub fn tier(&self, tier: TierId) -> Option<&TierData> {
        self.current_profile().tier(tier)
    }

    /// Items of a (tier, category) pair of the active child
    #[must_use]
    pub fn items(&self, tier: TierId, category: Category) -> &[String] {
        self.current_profile().items(tier, category)
    }

    /// All mastery sets, keyed by child name
    #[inline]
    #[must_use]
    pub fn mastery(&self) -> &IndexMap<String, MasterySet> {
        &self.mastered
    }

    /// Mastery set of one child
    #[inline]
    #[must_use]
    pub fn mastered(&self, kid: &str) -> Option<&MasterySet> {
        self.mastered.get(kid)
    }

    /// Mastery set of the active child
    #[must_use]
    pub fn current_mastered(&self) -> &MasterySet {
        &self.mastered[self.current_kid.as_str()]
    }

    /// Whether the active child has mastered `text`
    #[must_use]
    pub fn is_mastered(&self, text: &str) -> bool {
        self.current_mastered().contains(text)
    }

    /// Verify the structural invariants
    pub fn check_invariants(&self) -> StoreResult<()> {
        if self.profiles.is_empty() {
            return Err(StoreError::invariant("store has no profiles"));
        }
        if !self.profiles.contains_key(&self.current_kid) {
            return Err(StoreError::invariant(format!(
                "current kid {} has no profile",
                self.current_kid
            )));
        }
        if let Some(kid) = self.profiles.keys().find(|k| !self.mastered.contains_key(*k)) {
            return Err(StoreError::invariant(format!("{kid} has no mastery set")));
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Profiles
    // ---------------------------------------------------------------------

    /// Make `kid` the active profile
    pub fn select_child(&mut self, kid: &str) -> StoreResult<Change> {
        if !self.profiles.contains_key(kid) {
            return Err(profile_not_found(kid));
        }
        if self.current_kid == kid {
            return Ok(Change::Unchanged);
        }

        self.current_kid = kid.to_string();
        Ok(Change::Applied)
    }

    /// Add a profile from the default template and select it
    pub fn add_child(&mut self, name: &str) -> StoreResult<Change> {
        let kid = validate_text(name)?;
        if self.profiles.contains_key(&kid) {
            return Err(StoreError::Duplicate(Namespace::Profile { name: kid }));
        }

        self.profiles.insert(kid.clone(), Profile::default_template());
        self.mastered.insert(kid.clone(), MasterySet::new());
        self.current_kid = kid;
        Ok(Change::Applied)
    }

    /// Rename a profile, keeping its position and mastery set
    pub fn rename_child(&mut self, old: &str, new: &str) -> StoreResult<Change> {
        if !self.profiles.contains_key(old) {
            return Err(profile_not_found(old));
        }
        let new = validate_text(new)?;
        if new == old {
            return Ok(Change::Unchanged);
        }
        if self.profiles.contains_key(&new) {
            return Err(StoreError::Duplicate(Namespace::Profile { name: new }));
        }

        rename_key(&mut self.profiles, old, new.clone());
        if self.mastered.contains_key(old) {
            rename_key(&mut self.mastered, old, new.clone());
        } else {
            self.mastered.insert(new.clone(), MasterySet::new());
        }
        if self.current_kid == old {
            self.current_kid = new;
        }
        Ok(Change::Applied)
    }

    /// Remove a profile and its mastery set
    ///
    /// Deleting the active profile selects the first remaining one.
    pub fn delete_child(&mut self, kid: &str) -> StoreResult<Change> {
        if !self.profiles.contains_key(kid) {
            return Err(profile_not_found(kid));
        }
        if self.profiles.len() == 1 {
            return Err(StoreError::invariant("Cannot delete the only profile"));
        }

        self.profiles.shift_remove(kid);
        self.mastered.shift_remove(kid);
        if self.current_kid == kid {
            if let Some(first) = self.profiles.keys().next() {
                self.current_kid = first.clone();
            }
        }
        Ok(Change::Applied)
    }

    // ---------------------------------------------------------------------
    // Items (active profile)
    // ---------------------------------------------------------------------

    /// Append an item to a (tier, category) list
    pub fn add_item(&mut self, tier: TierId, category: Category, text: &str) -> StoreResult<Change> {
        let text = validate_text(text)?;
        let profile = self.current_profile_mut()?;
        if profile.contains(tier, category, &text) {
            return Err(duplicate_item(tier, category, text));
        }

        profile.tier_mut(tier).items_mut(category).push(text);
        Ok(Change::Applied)
    }

    /// Replace an item's text in place
    ///
    /// Renaming a mastered responsibility moves the mastery over to the new
    /// text; the old text is no longer mastered.
    pub fn edit_item(
        &mut self,
        tier: TierId,
        category: Category,
        old: &str,
        new: &str,
    ) -> StoreResult<Change> {
        let new = validate_text(new)?;
        let Self {
            current_kid,
            profiles,
            mastered,
        } = self;
        let profile = profiles
            .get_mut(current_kid.as_str())
            .ok_or_else(|| missing_current(current_kid))?;

        let Some(position) = profile.items(tier, category).iter().position(|t| t == old) else {
            return Err(item_not_found(tier, category, old));
        };
        if new == old {
            return Ok(Change::Unchanged);
        }
        if profile.contains(tier, category, &new) {
            return Err(duplicate_item(tier, category, new));
        }

        profile.tier_mut(tier).items_mut(category)[position] = new.clone();

        if category == Category::Responsibilities {
            let set = mastered.entry(current_kid.clone()).or_default();
            if set.shift_remove(old) {
                set.insert(new);
            }
        }
        Ok(Change::Applied)
    }

    /// Remove an item from a (tier, category) list
    ///
    /// A deleted responsibility also leaves the mastery set.
    pub fn delete_item(&mut self, tier: TierId, category: Category, text: &str) -> StoreResult<Change> {
        let Self {
            current_kid,
            profiles,
            mastered,
        } = self;
        let profile = profiles
            .get_mut(current_kid.as_str())
            .ok_or_else(|| missing_current(current_kid))?;

        let Some(position) = profile.items(tier, category).iter().position(|t| t == text) else {
            return Err(item_not_found(tier, category, text));
        };

        profile.tier_mut(tier).items_mut(category).remove(position);
        profile.prune(tier);

        if category == Category::Responsibilities {
            if let Some(set) = mastered.get_mut(current_kid.as_str()) {
                set.shift_remove(text);
            }
        }
        Ok(Change::Applied)
    }

    /// Move an item to the end of another tier's list
    ///
    /// Moving within the same tier is a no-op. Mastery is keyed by text, so
    /// it follows the item automatically.
    pub fn move_item(
        &mut self,
        category: Category,
        text: &str,
        from: TierId,
        to: TierId,
    ) -> StoreResult<Change> {
        if from == to {
            return Ok(Change::Unchanged);
        }
        let profile = self.current_profile_mut()?;
        if profile.contains(to, category, text) {
            return Err(duplicate_item(to, category, text.to_string()));
        }
        let Some(position) = profile.items(from, category).iter().position(|t| t == text) else {
            return Err(item_not_found(from, category, text));
        };

        let item = profile.tier_mut(from).items_mut(category).remove(position);
        profile.prune(from);
        profile.tier_mut(to).items_mut(category).push(item);
        Ok(Change::Applied)
    }

    /// Mark or unmark a responsibility as mastered for the active child
    ///
    /// Texts that are not responsibilities of the active profile are ignored.
    pub fn toggle_mastery(&mut self, text: &str, mastered: bool) -> StoreResult<Change> {
        if !self.current_profile().has_responsibility(text) {
            tracing::debug!(text, "ignoring mastery toggle for unknown responsibility");
            return Ok(Change::Unchanged);
        }

        let set = self.mastered.entry(self.current_kid.clone()).or_default();
        let changed = if mastered {
            set.insert(text.to_string())
        } else {
            set.shift_remove(text)
        };

        Ok(if changed { Change::Applied } else { Change::Unchanged })
    }

    fn current_profile_mut(&mut self) -> StoreResult<&mut Profile> {
        self.profiles
            .get_mut(self.current_kid.as_str())
            .ok_or_else(|| missing_current(&self.current_kid))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::with_default_profile(DEFAULT_KID)
    }
}

fn rename_key<V>(map: &mut IndexMap<String, V>, old: &str, new: String) {
    if let Some((index, _, value)) = map.shift_remove_full(old) {
        map.shift_insert(index, new, value);
    }
}

fn profile_not_found(kid: &str) -> StoreError {
    StoreError::NotFound(Target::Profile {
        name: kid.to_string(),
    })
}

fn item_not_found(tier: TierId, category: Category, text: &str) -> StoreError {
    StoreError::NotFound(Target::Item {
        tier,
        category,
        text: text.to_string(),
    })
}

fn duplicate_item(tier: TierId, category: Category, text: String) -> StoreError {
    StoreError::Duplicate(Namespace::Items {
        tier,
        category,
        text,
    })
}

fn missing_current(kid: &str) -> StoreError {
    StoreError::invariant(format!("current kid {kid} has no profile"))
}
