//! Derived progress figures for the ladder board
//!
//! Pure reads over a profile and its mastery set; nothing here mutates.

use crate::profile::Profile;
use crate::store::{MasterySet, Store};
use crate::tier::{Category, TierId};
use serde::Serialize;

/// Mastery progress of one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierProgress {
    /// Tier measured
    pub tier: TierId,
    /// Responsibilities in the tier
    pub total: usize,
    /// Of which mastered
    pub mastered: usize,
    /// Non-empty and fully mastered
    pub complete: bool,
    /// Mastered share, 0..=100
    pub percent: u8,
}

/// Overall ladder position of one child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    /// Highest fully mastered tier, 0 when none
    pub level: u8,
    /// Tier being worked on
    pub next: TierId,
    /// Mastered responsibilities in `next`
    pub done: usize,
    /// Responsibilities in `next`
    pub total: usize,
    /// `done / total` rounded, 0 when `total` is 0
    pub percent: u8,
}

/// Progress of one tier
#[must_use]
pub fn tier_progress(profile: &Profile, mastered: &MasterySet, tier: TierId) -> TierProgress {
    let items = profile.items(tier, Category::Responsibilities);
    let total = items.len();
    let done = items.iter().filter(|text| mastered.contains(*text)).count();

    TierProgress {
        tier,
        total,
        mastered: done,
        complete: total > 0 && done == total,
        percent: percent(done, total),
    }
}

/// Current level and progress towards the next tier
///
/// The level is the highest tier whose non-empty responsibility list is
/// fully mastered; lower tiers need not be complete.
#[must_use]
pub fn level_progress(profile: &Profile, mastered: &MasterySet) -> LevelProgress {
    let level = TierId::all()
        .filter(|tier| tier_progress(profile, mastered, *tier).complete)
        .map(TierId::get)
        .max()
        .unwrap_or(0);

    let next = TierId::new(level + 1).unwrap_or(TierId::LAST);
    let next_progress = tier_progress(profile, mastered, next);

    LevelProgress {
        level,
        next,
        done: next_progress.mastered,
        total: next_progress.total,
        percent: next_progress.percent,
    }
}

impl Store {
    /// Progress of every tier for the active child
    #[must_use]
    pub fn tier_progress(&self) -> Vec<TierProgress> {
        TierId::all()
            .map(|tier| tier_progress(self.current_profile(), self.current_mastered(), tier))
            .collect()
    }

    /// Level progress of the active child
    #[must_use]
    pub fn level_progress(&self) -> LevelProgress {
        level_progress(self.current_profile(), self.current_mastered())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::TierData;

    fn tier(id: u8) -> TierId {
        TierId::new(id).unwrap()
    }

    fn profile() -> Profile {
        let mut profile = Profile::empty();
        profile.set_tier(tier(1), TierData::new(&["a", "b"], &["p"]));
        profile.set_tier(tier(2), TierData::new(&["c", "d", "e"], &[]));
        profile.set_tier(tier(3), TierData::new(&["f"], &[]));
        profile
    }

    fn mastered(items: &[&str]) -> MasterySet {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn tier_progress_counts_responsibilities_only() {
        let p = tier_progress(&profile(), &mastered(&["a", "p"]), tier(1));
        assert_eq!(p.total, 2);
        assert_eq!(p.mastered, 1);
        assert!(!p.complete);
        assert_eq!(p.percent, 50);
    }

    #[test]
    fn empty_tier_is_never_complete() {
        let p = tier_progress(&profile(), &mastered(&[]), tier(4));
        assert_eq!(p.total, 0);
        assert!(!p.complete);
        assert_eq!(p.percent, 0);
    }

    #[test]
    fn level_zero_when_nothing_mastered() {
        let level = level_progress(&profile(), &mastered(&[]));
        assert_eq!(level.level, 0);
        assert_eq!(level.next, tier(1));
        assert_eq!((level.done, level.total), (0, 2));
    }

    #[test]
    fn level_is_highest_complete_tier() {
        // tier 3 complete while tier 2 is not
        let level = level_progress(&profile(), &mastered(&["a", "b", "f", "c"]));
        assert_eq!(level.level, 3);
        assert_eq!(level.next, tier(4));
        assert_eq!(level.total, 0);
        assert_eq!(level.percent, 0);
    }

    #[test]
    fn percent_rounds() {
        let level = level_progress(&profile(), &mastered(&["a", "b", "c"]));
        assert_eq!(level.level, 1);
        assert_eq!(level.next, tier(2));
        assert_eq!(level.percent, 33);
        assert_eq!(percent(2, 3), 67);
    }

    #[test]
    fn next_saturates_at_top() {
        let mut p = Profile::empty();
        p.set_tier(tier(5), TierData::new(&["z"], &[]));
        let level = level_progress(&p, &mastered(&["z"]));
        assert_eq!(level.level, 5);
        assert_eq!(level.next, TierId::LAST);
        assert_eq!(level.percent, 100);
    }

    #[test]
    fn store_progress_uses_active_child() {
        let store = Store::default();
        let tiers = store.tier_progress();
        assert_eq!(tiers.len(), 5);
        assert_eq!(tiers[0].total, 3);
        assert_eq!(store.level_progress().level, 0);
    }
}
