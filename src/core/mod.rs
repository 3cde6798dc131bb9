//! Core types and logic for Spindle.
//!
//! This module contains the profile aggregate, the trackers that mutate it,
//! the XP ledger and leveling table, the achievement engine, and the
//! `Progression` facade that drives them together.

pub mod achievements;
pub mod engine;
pub mod items;
pub mod ledger;
pub mod leveling;
pub mod paths;
pub mod selectors;
pub mod state;
pub mod streak;

pub use achievements::{
    AchievementContext, AchievementEngine, BadgeCatalog, BadgeDefinition, Comparison, Condition,
    Metric,
};
pub use engine::{ActivityOutcome, Progression};
pub use items::{milestones_crossed, WATCH_MILESTONE_SECONDS};
pub use ledger::{LevelUp, XpProgress};
pub use leveling::{level_for_xp, level_title, xp_for_level, MAX_LEVEL};
pub use state::{
    Achievement, Badge, BadgeCategory, BadgeInfo, ItemProgress, ItemStatus, PathProgress,
    ProfileState, Rarity, StreakState, XpState, PROFILE_SCHEMA_VERSION,
};
pub use streak::StreakUpdate;
