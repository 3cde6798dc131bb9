//! Per-trick progress transitions.
//!
//! Each transition mutates a single `ItemProgress` and reports the XP it
//! earned. XP is only granted the first time a status is reached; repeated
//! calls still refresh `last_activity_at`. Lazy record creation, streak
//! updates and ledger credits are handled by [`crate::core::Progression`].

use chrono::{DateTime, Utc};

use crate::core::state::{ItemProgress, ItemStatus};

/// Watch time that makes up one bonus milestone.
pub const WATCH_MILESTONE_SECONDS: u64 = 300;

/// Number of whole milestones between two accumulated totals.
///
/// Computed from both totals rather than a running remainder, so any split of
/// the same watch time yields the same number of milestones.
pub fn milestones_crossed(old_total: u64, new_total: u64) -> u64 {
    (new_total / WATCH_MILESTONE_SECONDS).saturating_sub(old_total / WATCH_MILESTONE_SECONDS)
}

impl ItemProgress {
    /// Record a tutorial watch. Returns the XP earned.
    pub fn watch(&mut self, now: DateTime<Utc>, reward: u64) -> u64 {
        self.last_activity_at = Some(now);

        if self.status != ItemStatus::NotStarted {
            return 0;
        }

        self.status = ItemStatus::Watching;
        self.xp_earned += reward;
        reward
    }

    /// Promote the trick to `practicing`. Never demotes.
    ///
    /// Returns whether the status changed.
    pub fn practice(&mut self, now: DateTime<Utc>) -> bool {
        self.last_activity_at = Some(now);

        if self.status >= ItemStatus::Practicing {
            return false;
        }

        self.status = ItemStatus::Practicing;
        true
    }

    /// Master the trick.
    ///
    /// Returns `None` when it was already mastered (nothing changes),
    /// otherwise the XP earned.
    pub fn master(&mut self, now: DateTime<Utc>, reward: u64) -> Option<u64> {
        if self.status.is_terminal() {
            return None;
        }

        self.status = ItemStatus::Mastered;
        self.last_activity_at = Some(now);
        if self.mastered_at.is_none() {
            self.mastered_at = Some(now);
        }
        self.xp_earned += reward;
        Some(reward)
    }

    /// Add watch time. Returns the milestone bonus XP earned.
    pub fn add_watch_time(&mut self, delta_seconds: u64, milestone_reward: u64) -> u64 {
        let old_total = self.watch_time_seconds;
        let new_total = old_total.saturating_add(delta_seconds);
        self.watch_time_seconds = new_total;

        let bonus = milestones_crossed(old_total, new_total) * milestone_reward;
        self.xp_earned += bonus;
        bonus
    }

    /// Append a note. Returns the new note's index.
    pub fn add_note(&mut self, note: impl Into<String>) -> usize {
        self.notes.push(note.into());
        self.notes.len() - 1
    }

    /// Remove the note at `index`.
    ///
    /// Out-of-range indices are a silent no-op returning `None`.
    pub fn remove_note(&mut self, index: usize) -> Option<String> {
        if index < self.notes.len() {
            Some(self.notes.remove(index))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_watch_earns_reward() {
        let now = Utc::now();
        let mut item = ItemProgress::new("trick-1");

        assert_eq!(item.watch(now, 10), 10);
        assert_eq!(item.status, ItemStatus::Watching);
        assert_eq!(item.last_activity_at, Some(now));
        assert_eq!(item.xp_earned, 10);
    }

    #[test]
    fn test_rewatch_earns_nothing_but_touches() {
        let first = Utc::now();
        let mut item = ItemProgress::new("trick-1");
        item.watch(first, 10);

        let second = first + chrono::Duration::minutes(5);
        assert_eq!(item.watch(second, 10), 0);
        assert_eq!(item.status, ItemStatus::Watching);
        assert_eq!(item.last_activity_at, Some(second));
        assert_eq!(item.xp_earned, 10);
    }

    #[test]
    fn test_watch_does_not_demote() {
        let now = Utc::now();
        let mut item = ItemProgress::new("trick-1");
        item.master(now, 50);

        assert_eq!(item.watch(now, 10), 0);
        assert_eq!(item.status, ItemStatus::Mastered);
    }

    #[test]
    fn test_practice_promotes_once() {
        let now = Utc::now();
        let mut item = ItemProgress::new("trick-1");
        item.watch(now, 10);

        assert!(item.practice(now));
        assert_eq!(item.status, ItemStatus::Practicing);
        assert!(!item.practice(now));
        assert_eq!(item.xp_earned, 10);
    }

    #[test]
    fn test_practice_never_demotes_mastered() {
        let now = Utc::now();
        let mut item = ItemProgress::new("trick-1");
        item.master(now, 50);

        assert!(!item.practice(now));
        assert_eq!(item.status, ItemStatus::Mastered);
    }

    #[test]
    fn test_master_is_idempotent() {
        let first = Utc::now();
        let mut item = ItemProgress::new("trick-1");

        assert_eq!(item.master(first, 50), Some(50));
        let later = first + chrono::Duration::days(1);
        assert_eq!(item.master(later, 50), None);

        assert_eq!(item.mastered_at, Some(first));
        assert_eq!(item.last_activity_at, Some(first));
        assert_eq!(item.xp_earned, 50);
    }

    #[test]
    fn test_milestones_crossed() {
        assert_eq!(milestones_crossed(0, 299), 0);
        assert_eq!(milestones_crossed(0, 300), 1);
        assert_eq!(milestones_crossed(299, 301), 1);
        assert_eq!(milestones_crossed(300, 599), 0);
        assert_eq!(milestones_crossed(0, 900), 3);
        assert_eq!(milestones_crossed(100, 100), 0);
    }

    #[test]
    fn test_watch_time_single_and_split_match() {
        let mut one_call = ItemProgress::new("a");
        let bonus_one = one_call.add_watch_time(900, 5);

        let mut three_calls = ItemProgress::new("b");
        let bonus_three: u64 = (0..3).map(|_| three_calls.add_watch_time(300, 5)).sum();

        assert_eq!(bonus_one, 15);
        assert_eq!(bonus_three, 15);
        assert_eq!(one_call.watch_time_seconds, three_calls.watch_time_seconds);
    }

    #[test]
    fn test_watch_time_small_updates() {
        let mut item = ItemProgress::new("a");
        let mut bonus = 0;
        for _ in 0..60 {
            bonus += item.add_watch_time(10, 5);
        }
        assert_eq!(item.watch_time_seconds, 600);
        assert_eq!(bonus, 10);
        assert_eq!(item.xp_earned, 10);
    }

    #[test]
    fn test_notes() {
        let mut item = ItemProgress::new("a");
        assert_eq!(item.add_note("keep the throw straight"), 0);
        assert_eq!(item.add_note("land on the string"), 1);

        assert_eq!(item.remove_note(5), None);
        assert_eq!(item.notes.len(), 2);

        assert_eq!(
            item.remove_note(0),
            Some("keep the throw straight".to_string())
        );
        assert_eq!(item.notes, vec!["land on the string".to_string()]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: total bonus depends only on total watch time
            #[test]
            fn prop_milestones_exact(chunks in prop::collection::vec(0u64..700, 0..50)) {
                let mut item = ItemProgress::new("t");
                let bonus: u64 = chunks.iter().map(|c| item.add_watch_time(*c, 5)).sum();
                let total: u64 = chunks.iter().sum();
                prop_assert_eq!(item.watch_time_seconds, total);
                prop_assert_eq!(bonus, (total / WATCH_MILESTONE_SECONDS) * 5);
            }
        }
    }
}
