//! Read-only queries over a profile.
//!
//! Nothing in here mutates state; asking about an unknown trick returns a
//! default record without inserting it.

use crate::core::achievements::AchievementContext;
use crate::core::ledger::XpProgress;
use crate::core::state::{Badge, BadgeCategory, ItemProgress, ItemStatus, ProfileState, Rarity};

/// Progress for a trick, or a `not_started` default if never seen.
pub fn item(state: &ProfileState, item_id: &str) -> ItemProgress {
    state
        .item_progress
        .get(item_id)
        .cloned()
        .unwrap_or_else(|| ItemProgress::new(item_id))
}

/// Progress through the current level band.
pub fn xp_progress(state: &ProfileState) -> XpProgress {
    state.xp.xp_progress()
}

/// Unlocked badges of the given rarity, in unlock order.
pub fn badges_by_rarity(state: &ProfileState, rarity: Rarity) -> Vec<&Badge> {
    state
        .badges
        .iter()
        .filter(|b| b.info.rarity == rarity)
        .collect()
}

/// Unlocked badges of the given category, in unlock order.
pub fn badges_by_category(state: &ProfileState, category: BadgeCategory) -> Vec<&Badge> {
    state
        .badges
        .iter()
        .filter(|b| b.info.category == category)
        .collect()
}

/// Whether the badge with this id has been unlocked.
pub fn is_unlocked(state: &ProfileState, badge_id: &str) -> bool {
    state.badges.iter().any(|b| b.id() == badge_id)
}

/// Watch time summed over every trick.
pub fn total_watch_seconds(state: &ProfileState) -> u64 {
    state
        .item_progress
        .values()
        .map(|p| p.watch_time_seconds)
        .fold(0u64, u64::saturating_add)
}

/// Number of paths with a completion timestamp.
pub fn paths_completed(state: &ProfileState) -> usize {
    state
        .path_progress
        .values()
        .filter(|p| p.is_completed())
        .count()
}

/// Completed modules summed over every path.
pub fn modules_completed(state: &ProfileState) -> usize {
    state
        .path_progress
        .values()
        .map(|p| p.completed_modules.len())
        .sum()
}

/// Tricks whose tutorial has been watched at least once.
pub fn tricks_watched(state: &ProfileState) -> usize {
    state
        .item_progress
        .values()
        .filter(|p| p.status > ItemStatus::NotStarted)
        .count()
}

/// Snapshot of the aggregates badge conditions are evaluated against.
pub fn achievement_context(state: &ProfileState) -> AchievementContext {
    AchievementContext {
        tricks_mastered: u64::from(state.tricks_mastered),
        tricks_watched: tricks_watched(state) as u64,
        current_streak: u64::from(state.streak.current_streak),
        longest_streak: u64::from(state.streak.longest_streak),
        paths_completed: paths_completed(state) as u64,
        modules_completed: modules_completed(state) as u64,
        total_watch_seconds: total_watch_seconds(state),
        lifetime_xp: state.xp.lifetime_xp,
        level: u64::from(state.xp.level),
    }
}
