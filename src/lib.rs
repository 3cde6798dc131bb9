//! Spindle - Progression Engine for yo-yo trick tutorials
//!
//! Spindle tracks a learner's progress through trick tutorials and learning
//! paths, keeps a daily practice streak, accrues XP toward levels, and
//! unlocks badges from a declarative catalog. Profiles persist as local JSON
//! snapshots with an append-only activity journal alongside.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod journal;
pub mod storage;

pub use config::Config;
pub use core::{
    Achievement, ActivityOutcome, Badge, BadgeCatalog, BadgeCategory, ItemProgress, ItemStatus,
    LevelUp, PathProgress, ProfileState, Progression, Rarity, StreakState, StreakUpdate, XpState,
};
pub use error::{Result, SpindleError};
pub use journal::{ActivityEvent, ActivityEventType, ActivityJournal};
pub use storage::{FileProfileStore, MemoryProfileStore, ProfileStore};

// CLI commands
pub use cli::{
    ActivityCommand, BadgesCommand, CommandEnv, ExportCommand, HistoryCommand, ImportCommand,
    NotesCommand, PathCommand, StatusCommand,
};
