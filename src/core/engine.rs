//! Progression facade for Spindle.
//!
//! Wraps a borrowed [`ProfileState`] and runs every progress-affecting
//! action: the tracker transition, the streak recalculation and the XP ledger
//! credit. Badge evaluation is a separate step ([`Progression::check_achievements`])
//! so callers decide when the context snapshot is taken.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::achievements::{AchievementEngine, BadgeCatalog};
use crate::core::ledger::LevelUp;
use crate::core::selectors;
use crate::core::state::{Achievement, ItemProgress, PathProgress, ProfileState};
use crate::core::streak::StreakUpdate;

/// What a single action did to the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivityOutcome {
    /// XP credited by the action itself (badge XP is reported separately).
    pub xp_gained: u64,
    /// Ledger result of the credit.
    pub level_up: LevelUp,
    /// Streak recalculation, if the action counts as practice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakUpdate>,
}

impl ActivityOutcome {
    /// An action that changed nothing.
    pub fn noop() -> Self {
        Self::default()
    }
}

/// Progression engine over one profile.
///
/// `now` is fixed for the lifetime of the facade, and its time zone decides
/// calendar days for the streak.
#[derive(Debug)]
pub struct Progression<'a, Tz: TimeZone = Local> {
    state: &'a mut ProfileState,
    config: &'a Config,
    now: DateTime<Tz>,
    now_utc: DateTime<Utc>,
}

impl<'a> Progression<'a, Local> {
    /// Create a facade clocked at the current local time.
    pub fn new(state: &'a mut ProfileState, config: &'a Config) -> Self {
        Self::at(state, config, Local::now())
    }
}

impl<'a, Tz: TimeZone> Progression<'a, Tz> {
    /// Create a facade clocked at `now`.
    pub fn at(state: &'a mut ProfileState, config: &'a Config, now: DateTime<Tz>) -> Self {
        let now_utc = now.with_timezone(&Utc);
        Self {
            state,
            config,
            now,
            now_utc,
        }
    }

    /// The profile being driven.
    pub fn state(&self) -> &ProfileState {
        self.state
    }

    /// The facade's clock in UTC, as stamped on the profile.
    pub fn now_utc(&self) -> DateTime<Utc> {
        self.now_utc
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Mark a trick's tutorial as watched.
    pub fn mark_watched(&mut self, item_id: &str) -> ActivityOutcome {
        let reward = self.config.rewards.watched;
        let now = self.now_utc;
        let xp = self.item_mut(item_id).watch(now, reward);
        tracing::debug!(item = item_id, xp, "trick watched");
        self.finish(xp, true)
    }

    /// Mark a trick as being practiced. Grants no XP.
    pub fn mark_practicing(&mut self, item_id: &str) -> ActivityOutcome {
        let now = self.now_utc;
        let promoted = self.item_mut(item_id).practice(now);
        tracing::debug!(item = item_id, promoted, "trick practiced");
        self.finish(0, true)
    }

    /// Mark a trick as mastered.
    ///
    /// Mastering an already mastered trick changes nothing, not even the
    /// streak.
    pub fn mark_mastered(&mut self, item_id: &str) -> ActivityOutcome {
        let reward = self.config.rewards.mastered;
        let now = self.now_utc;
        match self.item_mut(item_id).master(now, reward) {
            Some(xp) => {
                self.state.tricks_mastered = self.state.tricks_mastered.saturating_add(1);
                tracing::debug!(item = item_id, xp, "trick mastered");
                self.finish(xp, true)
            }
            None => ActivityOutcome::noop(),
        }
    }

    /// Add watch time to a trick. Does not count toward the streak.
    pub fn update_watch_time(&mut self, item_id: &str, delta_seconds: u64) -> ActivityOutcome {
        let reward = self.config.rewards.watch_milestone;
        let xp = self.item_mut(item_id).add_watch_time(delta_seconds, reward);
        self.finish(xp, false)
    }

    /// Append a note to a trick. Returns the note's index.
    pub fn add_note(&mut self, item_id: &str, text: impl Into<String>) -> usize {
        let index = self.item_mut(item_id).add_note(text);
        self.state.touch(self.now_utc);
        index
    }

    /// Remove a trick's note by index.
    ///
    /// Returns the removed note, or `None` for an unknown trick or an
    /// out-of-range index.
    pub fn remove_note(&mut self, item_id: &str, index: usize) -> Option<String> {
        let removed = self
            .state
            .item_progress
            .get_mut(item_id)
            .and_then(|item| item.remove_note(index));
        if removed.is_some() {
            self.state.touch(self.now_utc);
        }
        removed
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Start (or restart) a path at its first module.
    pub fn start_path(&mut self, path_id: &str, first_module_id: &str) -> ActivityOutcome {
        let progress = PathProgress::new(path_id, first_module_id, self.now_utc);
        if self
            .state
            .path_progress
            .insert(path_id.to_string(), progress)
            .is_some()
        {
            tracing::debug!(path = path_id, "path restarted");
        }
        self.finish(0, true)
    }

    /// Complete a module on a started path.
    ///
    /// A path that was never started is left alone.
    pub fn complete_module(
        &mut self,
        path_id: &str,
        module_id: &str,
        next_module_id: Option<&str>,
    ) -> ActivityOutcome {
        let reward = self.config.rewards.module_completed;
        let Some(path) = self.state.path_progress.get_mut(path_id) else {
            tracing::debug!(path = path_id, "module completed on unstarted path ignored");
            return ActivityOutcome::noop();
        };

        let xp = path.complete_module(module_id, next_module_id.map(str::to_string), reward);
        self.finish(xp, true)
    }

    /// Complete a started path.
    pub fn complete_path(&mut self, path_id: &str) -> ActivityOutcome {
        let reward = self.config.rewards.path_completed;
        let now = self.now_utc;
        let xp = self
            .state
            .path_progress
            .get_mut(path_id)
            .and_then(|path| path.complete(now, reward));

        match xp {
            Some(xp) => {
                tracing::debug!(path = path_id, xp, "path completed");
                self.finish(xp, true)
            }
            None => ActivityOutcome::noop(),
        }
    }

    // =========================================================================
    // Achievements
    // =========================================================================

    /// Evaluate the catalog against the current profile and unlock what
    /// passes. Returns the unlocks in catalog order.
    pub fn check_achievements(&mut self, catalog: &BadgeCatalog) -> Vec<Achievement> {
        let ctx = selectors::achievement_context(self.state);
        let created = AchievementEngine::new(
            self.state,
            self.config.achievements.recent_limit,
            self.now_utc,
        )
        .check_achievements(catalog, &ctx);

        if !created.is_empty() {
            self.state.touch(self.now_utc);
        }
        created
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn item_mut(&mut self, item_id: &str) -> &mut ItemProgress {
        self.state
            .item_progress
            .entry(item_id.to_string())
            .or_insert_with(|| ItemProgress::new(item_id))
    }

    /// Credit the ledger, run the streak if the action counts, stamp the
    /// profile.
    fn finish(&mut self, xp: u64, counts_as_practice: bool) -> ActivityOutcome {
        let level_up = self.state.xp.add_xp(xp);
        if level_up.leveled_up {
            tracing::info!(level = self.state.xp.level, "level up");
        }

        let streak = if counts_as_practice {
            Some(self.state.streak.record_activity(&self.now))
        } else {
            None
        };
        self.state.touch(self.now_utc);

        ActivityOutcome {
            xp_gained: xp,
            level_up,
            streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::achievements::{BadgeDefinition, Condition, Metric};
    use crate::core::state::{BadgeCategory, ItemStatus, Rarity, StreakState};
    use chrono::Duration;

    fn noon(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_mark_watched_fresh_profile() {
        let config = Config::default();
        let mut state = ProfileState::default();
        let mut engine = Progression::at(&mut state, &config, noon(19));

        let outcome = engine.mark_watched("walk-the-dog");
        assert_eq!(outcome.xp_gained, 10);
        assert_eq!(outcome.streak, Some(StreakUpdate::Started));

        assert_eq!(state.xp.xp, 10);
        assert_eq!(state.streak.current_streak, 1);
        let item = &state.item_progress["walk-the-dog"];
        assert_eq!(item.status, ItemStatus::Watching);
        assert_eq!(item.last_activity_at, Some(noon(19)));
        assert_eq!(state.updated_at, Some(noon(19)));
    }

    #[test]
    fn test_mark_watched_twice_credits_once() {
        let config = Config::default();
        let mut state = ProfileState::default();
        let mut engine = Progression::at(&mut state, &config, noon(19));

        engine.mark_watched("walk-the-dog");
        let second = engine.mark_watched("walk-the-dog");
        assert_eq!(second.xp_gained, 0);
        assert_eq!(second.streak, Some(StreakUpdate::Unchanged));
        assert_eq!(state.xp.xp, 10);
    }

    #[test]
    fn test_mark_mastered_idempotent() {
        let config = Config::default();
        let mut state = ProfileState::default();
        Progression::at(&mut state, &config, noon(18)).mark_mastered("sleeper");

        let snapshot = state.clone();
        let outcome = Progression::at(&mut state, &config, noon(19)).mark_mastered("sleeper");

        assert_eq!(outcome, ActivityOutcome::noop());
        assert_eq!(state, snapshot);
        assert_eq!(state.tricks_mastered, 1);
        assert_eq!(state.xp.xp, 50);
    }

    #[test]
    fn test_mark_practicing_counts_toward_streak_only() {
        let config = Config::default();
        let mut state = ProfileState::default();
        let outcome =
            Progression::at(&mut state, &config, noon(19)).mark_practicing("gravity-pull");

        assert_eq!(outcome.xp_gained, 0);
        assert_eq!(outcome.streak, Some(StreakUpdate::Started));
        assert_eq!(
            state.item_progress["gravity-pull"].status,
            ItemStatus::Practicing
        );
    }

    #[test]
    fn test_watch_time_split_matches_single_update() {
        let config = Config::default();

        let mut single = ProfileState::default();
        let outcome = Progression::at(&mut single, &config, noon(19)).update_watch_time("t", 900);
        assert_eq!(outcome.xp_gained, 15);
        assert!(outcome.streak.is_none());

        let mut split = ProfileState::default();
        let mut engine = Progression::at(&mut split, &config, noon(19));
        let total: u64 = (0..3)
            .map(|_| engine.update_watch_time("t", 300).xp_gained)
            .sum();
        assert_eq!(total, 15);

        assert_eq!(single.xp, split.xp);
        assert_eq!(single.streak, StreakState::default());
    }

    #[test]
    fn test_notes() {
        let config = Config::default();
        let mut state = ProfileState::default();
        let mut engine = Progression::at(&mut state, &config, noon(19));

        assert_eq!(engine.add_note("brain-twister", "swing wide"), 0);
        assert_eq!(engine.remove_note("brain-twister", 3), None);
        assert_eq!(engine.remove_note("unknown", 0), None);
        assert_eq!(
            engine.remove_note("brain-twister", 0).as_deref(),
            Some("swing wide")
        );
        assert!(!state.item_progress.contains_key("unknown"));
        assert_eq!(state.streak, StreakState::default());
    }

    #[test]
    fn test_complete_module_on_unstarted_path() {
        let config = Config::default();
        let mut state = ProfileState::default();
        let outcome =
            Progression::at(&mut state, &config, noon(19)).complete_module("basics", "m1", None);

        assert_eq!(outcome, ActivityOutcome::noop());
        assert!(state.path_progress.is_empty());
        assert_eq!(state.streak, StreakState::default());
        assert!(state.updated_at.is_none());
    }

    #[test]
    fn test_path_lifecycle() {
        let config = Config::default();
        let mut state = ProfileState::default();
        let mut engine = Progression::at(&mut state, &config, noon(19));

        engine.start_path("basics", "m1");
        assert_eq!(engine.complete_module("basics", "m1", Some("m2")).xp_gained, 25);
        assert_eq!(engine.complete_module("basics", "m1", Some("m2")).xp_gained, 0);
        assert_eq!(engine.complete_module("basics", "m2", None).xp_gained, 25);
        assert_eq!(engine.complete_path("basics").xp_gained, 200);
        assert_eq!(engine.complete_path("basics"), ActivityOutcome::noop());
        assert_eq!(engine.complete_path("never-started"), ActivityOutcome::noop());

        let path = &state.path_progress["basics"];
        assert!(path.is_completed());
        assert!(path.current_module_id.is_none());
        assert_eq!(state.xp.xp, 250);
        assert_eq!(state.xp.level, 2);
    }

    #[test]
    fn test_start_path_overwrites() {
        let config = Config::default();
        let mut state = ProfileState::default();
        Progression::at(&mut state, &config, noon(18)).start_path("basics", "m1");
        {
            let mut engine = Progression::at(&mut state, &config, noon(18));
            engine.complete_module("basics", "m1", Some("m2"));
            engine.complete_path("basics");
        }

        Progression::at(&mut state, &config, noon(19)).start_path("basics", "m1");
        let path = &state.path_progress["basics"];
        assert_eq!(path.started_at, noon(19));
        assert!(path.completed_modules.is_empty());
        assert!(path.completed_at.is_none());
        assert_eq!(path.current_module_id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_consecutive_days_extend_streak() {
        let config = Config::default();
        let mut state = ProfileState::default();
        for day in 0..7 {
            let now = noon(10) + Duration::days(day);
            Progression::at(&mut state, &config, now).mark_practicing("t");
        }
        assert_eq!(state.streak.current_streak, 7);
        assert_eq!(state.streak.longest_streak, 7);
    }

    #[test]
    fn test_tenth_mastery_unlocks_badge_once() {
        let config = Config::default();
        let catalog = BadgeCatalog::new(vec![BadgeDefinition::new(
            "tricks_10",
            "Trick Collector",
            "Master 10 tricks",
            "🎯",
            BadgeCategory::Mastery,
            Rarity::Rare,
            Condition::at_least(Metric::TricksMastered, 10),
        )])
        .unwrap();

        let mut state = ProfileState::default();
        let mut engine = Progression::at(&mut state, &config, noon(19));
        for i in 0..9 {
            engine.mark_mastered(&format!("trick-{}", i));
            assert!(engine.check_achievements(&catalog).is_empty());
        }

        engine.mark_mastered("trick-9");
        let unlocked = engine.check_achievements(&catalog);
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].badge.id(), "tricks_10");
        assert!(engine.check_achievements(&catalog).is_empty());

        assert_eq!(state.tricks_mastered, 10);
        assert_eq!(state.xp.xp, 10 * 50 + 100);
    }

    #[test]
    fn test_builtin_catalog_first_watch() {
        let config = Config::default();
        let catalog = BadgeCatalog::builtin();
        let mut state = ProfileState::default();
        let mut engine = Progression::at(&mut state, &config, noon(19));

        engine.mark_watched("around-the-world");
        let unlocked = engine.check_achievements(&catalog);
        let ids: Vec<&str> = unlocked.iter().map(|a| a.badge.id()).collect();
        assert_eq!(ids, vec!["first_watch"]);
        assert_eq!(state.xp.xp, 10 + 25);
    }

    #[test]
    fn test_rewards_follow_config() {
        let mut config = Config::default();
        config.rewards.watched = 3;
        config.rewards.mastered = 7;
        let mut state = ProfileState::default();
        let mut engine = Progression::at(&mut state, &config, noon(19));

        assert_eq!(engine.mark_watched("t").xp_gained, 3);
        assert_eq!(engine.mark_mastered("t").xp_gained, 7);
    }
}
