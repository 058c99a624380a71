//! Plain-text rendering of the ladder

use chrono::NaiveDate;
use ladder_core::{child_streak, responsibility_streak, CompletionRecord, Notification, NotificationLevel, UserId};
use ladder_store::{Category, Store, TierId};
use std::fmt::Write;

pub(crate) fn board(store: &Store) -> String {
    let level = store.level_progress();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: level {}, tier {} at {}% ({}/{})",
        store.current_kid(),
        level.level,
        level.next,
        level.percent,
        level.done,
        level.total
    );

    for (tier, progress) in TierId::all().zip(store.tier_progress()) {
        let status = if progress.complete { " [complete]" } else { "" };
        let _ = writeln!(out, "\nTier {tier} {}{status}", tier.name());
        for text in store.items(tier, Category::Responsibilities) {
            let mark = if store.is_mastered(text) { 'x' } else { ' ' };
            let _ = writeln!(out, "  [{mark}] {text}");
        }
        for text in store.items(tier, Category::Privileges) {
            let _ = writeln!(out, "  (+) {text}");
        }
    }
    out
}

pub(crate) fn progress(store: &Store) -> String {
    store
        .tier_progress()
        .iter()
        .map(|p| {
            format!(
                "Tier {} {:<18} {}/{} ({}%)\n",
                p.tier,
                p.tier.name(),
                p.mastered,
                p.total,
                p.percent
            )
        })
        .collect()
}

pub(crate) fn kids(store: &Store) -> String {
    store
        .kid_names()
        .map(|name| {
            let marker = if name == store.current_kid() { '*' } else { ' ' };
            format!("{marker} {name}\n")
        })
        .collect()
}

/// Overall streak, then one line per responsibility of the active child
pub(crate) fn streaks(store: &Store, records: &[CompletionRecord], child: &UserId, today: NaiveDate) -> String {
    let days = child_streak(records, child, today);
    let mut out = format!("Current streak: {days} day{}\n", if days == 1 { "" } else { "s" });
    for tier in TierId::all() {
        for text in store.items(tier, Category::Responsibilities) {
            let streak = responsibility_streak(records, child, text, today);
            let _ = writeln!(out, "  {streak:>3}d {text}");
        }
    }
    out
}

pub(crate) fn notice(notice: &Notification) -> String {
    let level = match notice.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    };
    format!("{level}: {}", notice.message)
}
