//! Badge catalog and achievement unlock engine.
//!
//! Badges are declarative: each catalog entry carries a [`Condition`] that is
//! interpreted against an [`AchievementContext`] snapshot. The engine never
//! reads the trackers directly, so it can be driven by synthetic contexts.
//!
//! Unlock protocol:
//! 1. Skip the badge if its id is already unlocked (the only idempotency gate)
//! 2. Stamp `unlocked_at` and append to the unlocked set
//! 3. Prepend an [`Achievement`] to the recent feed, truncated to the cap
//! 4. Credit the XP ledger with the rarity reward
//!
//! XP credited by an unlock never triggers another evaluation pass.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::ledger::LevelUp;
use crate::core::state::{Achievement, Badge, BadgeCategory, BadgeInfo, ProfileState, Rarity};
use crate::error::{FailOpen, Result, SpindleError};

/// Aggregate a condition can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TricksMastered,
    TricksWatched,
    CurrentStreak,
    LongestStreak,
    PathsCompleted,
    ModulesCompleted,
    TotalWatchSeconds,
    LifetimeXp,
    Level,
}

/// Comparison applied between a metric and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    #[default]
    Gte,
    Gt,
    Eq,
    Lte,
    Lt,
}

impl Comparison {
    fn holds(&self, actual: u64, expected: u64) -> bool {
        match self {
            Self::Gte => actual >= expected,
            Self::Gt => actual > expected,
            Self::Eq => actual == expected,
            Self::Lte => actual <= expected,
            Self::Lt => actual < expected,
        }
    }
}

/// Unlock condition for a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// `metric <op> value`.
    Threshold {
        metric: Metric,
        #[serde(default)]
        op: Comparison,
        value: u64,
    },
    /// Every sub-condition holds (vacuously true when empty).
    All { conditions: Vec<Condition> },
    /// At least one sub-condition holds.
    Any { conditions: Vec<Condition> },
}

impl Condition {
    /// Shorthand for `metric >= value`.
    pub fn at_least(metric: Metric, value: u64) -> Self {
        Self::Threshold {
            metric,
            op: Comparison::Gte,
            value,
        }
    }

    /// Evaluate against a context snapshot.
    pub fn evaluate(&self, ctx: &AchievementContext) -> bool {
        match self {
            Self::Threshold { metric, op, value } => op.holds(ctx.get(*metric), *value),
            Self::All { conditions } => conditions.iter().all(|c| c.evaluate(ctx)),
            Self::Any { conditions } => conditions.iter().any(|c| c.evaluate(ctx)),
        }
    }
}

/// Read-only aggregates fed to condition evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AchievementContext {
    pub tricks_mastered: u64,
    pub tricks_watched: u64,
    pub current_streak: u64,
    pub longest_streak: u64,
    pub paths_completed: u64,
    pub modules_completed: u64,
    pub total_watch_seconds: u64,
    pub lifetime_xp: u64,
    pub level: u64,
}

impl AchievementContext {
    /// Value of a metric.
    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::TricksMastered => self.tricks_mastered,
            Metric::TricksWatched => self.tricks_watched,
            Metric::CurrentStreak => self.current_streak,
            Metric::LongestStreak => self.longest_streak,
            Metric::PathsCompleted => self.paths_completed,
            Metric::ModulesCompleted => self.modules_completed,
            Metric::TotalWatchSeconds => self.total_watch_seconds,
            Metric::LifetimeXp => self.lifetime_xp,
            Metric::Level => self.level,
        }
    }
}

/// A catalog entry: badge metadata plus its unlock condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    #[serde(flatten)]
    pub info: BadgeInfo,
    pub condition: Condition,
}

impl BadgeDefinition {
    /// Create a definition.
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        icon: &str,
        category: BadgeCategory,
        rarity: Rarity,
        condition: Condition,
    ) -> Self {
        Self {
            info: BadgeInfo {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                icon: icon.to_string(),
                category,
                rarity,
            },
            condition,
        }
    }
}

/// On-disk catalog layout (`[[badges]]` tables).
#[derive(Debug, Deserialize)]
struct CatalogFile {
    badges: Vec<BadgeDefinition>,
}

/// Ordered badge catalog. Evaluation follows this order.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeCatalog {
    badges: Vec<BadgeDefinition>,
}

impl BadgeCatalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(badges: Vec<BadgeDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for badge in &badges {
            if badge.info.id.is_empty() {
                return Err(SpindleError::catalog("badge id cannot be empty"));
            }
            if !seen.insert(badge.info.id.as_str()) {
                return Err(SpindleError::catalog(format!(
                    "duplicate badge id: {}",
                    badge.info.id
                )));
            }
        }
        Ok(Self { badges })
    }

    /// Parse a TOML catalog.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| SpindleError::catalog(e.to_string()))?;
        Self::new(file.badges)
    }

    /// Load a TOML catalog from disk.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| SpindleError::storage(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Catalog selected by config, falling back to the built-in one.
    pub fn from_config(config: &Config) -> Self {
        match &config.achievements.catalog_path {
            Some(path) => Self::load_from_file(path)
                .fail_open_with("loading badge catalog", Self::builtin()),
            None => Self::builtin(),
        }
    }

    /// The stock yo-yo badge catalog.
    pub fn builtin() -> Self {
        let mastery = |id, name, description, icon, rarity, count| {
            BadgeDefinition::new(
                id,
                name,
                description,
                icon,
                BadgeCategory::Mastery,
                rarity,
                Condition::at_least(Metric::TricksMastered, count),
            )
        };
        let streak = |id, name, description, icon, rarity, days| {
            BadgeDefinition::new(
                id,
                name,
                description,
                icon,
                BadgeCategory::Streak,
                rarity,
                Condition::at_least(Metric::CurrentStreak, days),
            )
        };

        let badges = vec![
            BadgeDefinition::new(
                "first_watch",
                "Front Row Seat",
                "Watch your first trick tutorial",
                "👀",
                BadgeCategory::Dedication,
                Rarity::Common,
                Condition::at_least(Metric::TricksWatched, 1),
            ),
            mastery(
                "first_trick",
                "First Throw",
                "Master your first trick",
                "🪀",
                Rarity::Common,
                1,
            ),
            mastery("tricks_5", "Getting Loopy", "Master 5 tricks", "🔁", Rarity::Uncommon, 5),
            mastery("tricks_10", "Trick Collector", "Master 10 tricks", "🎯", Rarity::Rare, 10),
            mastery("tricks_25", "String Theorist", "Master 25 tricks", "🧵", Rarity::Epic, 25),
            mastery("tricks_50", "Yo-Yo Master", "Master 50 tricks", "👑", Rarity::Legendary, 50),
            streak("streak_3", "Warming Up", "Practice 3 days in a row", "🔥", Rarity::Common, 3),
            streak(
                "streak_7",
                "Week of Throws",
                "Practice 7 days in a row",
                "📅",
                Rarity::Uncommon,
                7,
            ),
            streak(
                "streak_30",
                "Unbreakable String",
                "Practice 30 days in a row",
                "💎",
                Rarity::Epic,
                30,
            ),
            BadgeDefinition::new(
                "first_path",
                "Trailhead",
                "Complete your first learning path",
                "🥾",
                BadgeCategory::Path,
                Rarity::Uncommon,
                Condition::at_least(Metric::PathsCompleted, 1),
            ),
            BadgeDefinition::new(
                "paths_3",
                "Pathfinder",
                "Complete 3 learning paths",
                "🧭",
                BadgeCategory::Path,
                Rarity::Rare,
                Condition::at_least(Metric::PathsCompleted, 3),
            ),
            BadgeDefinition::new(
                "modules_10",
                "Module Marathon",
                "Complete 10 path modules",
                "📚",
                BadgeCategory::Path,
                Rarity::Uncommon,
                Condition::at_least(Metric::ModulesCompleted, 10),
            ),
            BadgeDefinition::new(
                "watch_1h",
                "Binge Learner",
                "Watch an hour of tutorials",
                "⏱️",
                BadgeCategory::Dedication,
                Rarity::Common,
                Condition::at_least(Metric::TotalWatchSeconds, 3_600),
            ),
            BadgeDefinition::new(
                "watch_10h",
                "Student of the Throw",
                "Watch ten hours of tutorials",
                "🎓",
                BadgeCategory::Dedication,
                Rarity::Rare,
                Condition::at_least(Metric::TotalWatchSeconds, 36_000),
            ),
            BadgeDefinition::new(
                "level_10",
                "Double Digits",
                "Reach level 10",
                "⭐",
                BadgeCategory::Milestone,
                Rarity::Uncommon,
                Condition::at_least(Metric::Level, 10),
            ),
            BadgeDefinition::new(
                "level_25",
                "Halfway Hero",
                "Reach level 25",
                "🌟",
                BadgeCategory::Milestone,
                Rarity::Epic,
                Condition::at_least(Metric::Level, 25),
            ),
            BadgeDefinition::new(
                "all_rounder",
                "All-Rounder",
                "Master 10 tricks, finish a path and hold a 7-day streak",
                "🏆",
                BadgeCategory::Milestone,
                Rarity::Legendary,
                Condition::All {
                    conditions: vec![
                        Condition::at_least(Metric::TricksMastered, 10),
                        Condition::at_least(Metric::PathsCompleted, 1),
                        Condition::at_least(Metric::CurrentStreak, 7),
                    ],
                },
            ),
        ];

        Self { badges }
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&BadgeDefinition> {
        self.badges.iter().find(|b| b.info.id == id)
    }

    /// Iterate definitions in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.badges.iter()
    }

    pub fn len(&self) -> usize {
        self.badges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.badges.is_empty()
    }
}

impl Default for BadgeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Achievement engine over a profile.
///
/// Owns the unlock protocol; all badge and feed mutations go through it.
#[derive(Debug)]
pub struct AchievementEngine<'a> {
    state: &'a mut ProfileState,
    recent_limit: usize,
    now: DateTime<Utc>,
}

impl<'a> AchievementEngine<'a> {
    /// Create an engine that keeps at most `recent_limit` feed entries.
    pub fn new(state: &'a mut ProfileState, recent_limit: usize, now: DateTime<Utc>) -> Self {
        Self {
            state,
            recent_limit: recent_limit.max(1),
            now,
        }
    }

    /// Check if a badge id is unlocked.
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.state.badges.iter().any(|b| b.id() == id)
    }

    /// Unlock a badge. Returns `false` without any change if already unlocked.
    pub fn unlock_badge(&mut self, info: &BadgeInfo) -> bool {
        self.unlock(info).is_some()
    }

    /// Evaluate every locked catalog entry and unlock those that pass.
    ///
    /// Returns the achievements created by this pass, in catalog order.
    pub fn check_achievements(
        &mut self,
        catalog: &BadgeCatalog,
        ctx: &AchievementContext,
    ) -> Vec<Achievement> {
        let mut created = Vec::new();

        for definition in catalog.iter() {
            if self.is_unlocked(&definition.info.id) {
                continue;
            }
            if !definition.condition.evaluate(ctx) {
                continue;
            }
            if let Some((achievement, _)) = self.unlock(&definition.info) {
                created.push(achievement);
            }
        }

        created
    }

    /// Unlock protocol. Returns the feed record and the ledger result.
    pub(crate) fn unlock(&mut self, info: &BadgeInfo) -> Option<(Achievement, LevelUp)> {
        if self.is_unlocked(&info.id) {
            return None;
        }

        let badge = Badge {
            info: info.clone(),
            unlocked_at: self.now,
        };
        let xp_awarded = info.rarity.xp_reward();
        let achievement = Achievement {
            id: format!("{}-{}", info.id, self.now.timestamp_millis()),
            badge: badge.clone(),
            timestamp: self.now,
            xp_awarded,
        };

        self.state.badges.push(badge);
        self.state.recent_achievements.insert(0, achievement.clone());
        self.state.recent_achievements.truncate(self.recent_limit);

        let level_up = self.state.xp.add_xp(xp_awarded);

        tracing::info!(
            badge = %info.id,
            rarity = info.rarity.as_str(),
            xp = xp_awarded,
            "badge unlocked"
        );

        Some((achievement, level_up))
    }
}
