//! Profile state types for Spindle.
//!
//! These types make up the single local profile aggregate: per-trick
//! progress, per-path progress, the streak, the XP ledger, unlocked badges
//! and the recent-achievements feed. Everything here serializes to the
//! persisted snapshot; mutation goes through the engine in `core`.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_PROFILE_ID;
use crate::error::{Result, SpindleError};

/// Schema version for persisted profile snapshots.
pub const PROFILE_SCHEMA_VERSION: u8 = 1;

/// The full local profile aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileState {
    /// Schema version for forward compatibility.
    pub schema_version: u8,
    /// Profile identifier.
    pub profile_id: String,
    /// Per-trick progress, keyed by trick id.
    pub item_progress: HashMap<String, ItemProgress>,
    /// Per-path progress, keyed by path id.
    pub path_progress: HashMap<String, PathProgress>,
    /// Number of tricks that reached `mastered`.
    pub tricks_mastered: u32,
    /// Daily practice streak.
    pub streak: StreakState,
    /// XP ledger.
    pub xp: XpState,
    /// Unlocked badges in unlock order.
    pub badges: Vec<Badge>,
    /// Most-recent-first feed of unlock events.
    pub recent_achievements: Vec<Achievement>,
    /// When the profile was last mutated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            schema_version: PROFILE_SCHEMA_VERSION,
            profile_id: DEFAULT_PROFILE_ID.to_string(),
            item_progress: HashMap::new(),
            path_progress: HashMap::new(),
            tricks_mastered: 0,
            streak: StreakState::default(),
            xp: XpState::default(),
            badges: Vec::new(),
            recent_achievements: Vec::new(),
            updated_at: None,
        }
    }
}

impl ProfileState {
    /// Create a fresh profile with the given id.
    pub fn new(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            ..Default::default()
        }
    }

    /// Update the profile's updated_at timestamp.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }

    /// Reject snapshots written by a newer schema.
    ///
    /// Fields unknown to this version would be dropped on the next save.
    pub fn check_schema(&self) -> Result<()> {
        if self.schema_version > PROFILE_SCHEMA_VERSION {
            return Err(SpindleError::unsupported_schema(
                self.schema_version,
                PROFILE_SCHEMA_VERSION,
            ));
        }
        Ok(())
    }
}

/// Learning status of a single trick.
///
/// The engine only ever promotes status; `Mastered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Never interacted with.
    #[default]
    NotStarted,
    /// Tutorial watched at least once.
    Watching,
    /// Learner is drilling the trick.
    Practicing,
    /// Trick landed consistently.
    Mastered,
}

impl ItemStatus {
    /// Check if the status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Mastered)
    }

    /// Get the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Watching => "watching",
            Self::Practicing => "practicing",
            Self::Mastered => "mastered",
        }
    }
}

/// Progress for one trick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemProgress {
    /// Trick identifier from the content catalog.
    pub item_id: String,
    /// Current status.
    pub status: ItemStatus,
    /// Accumulated tutorial watch time.
    pub watch_time_seconds: u64,
    /// Last watch/practice/master event.
    pub last_activity_at: Option<DateTime<Utc>>,
    /// First mastery, never overwritten.
    pub mastered_at: Option<DateTime<Utc>>,
    /// Free-text practice notes.
    pub notes: Vec<String>,
    /// XP earned from this trick.
    pub xp_earned: u64,
}

impl ItemProgress {
    /// Create a default record for an unseen trick.
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            status: ItemStatus::NotStarted,
            watch_time_seconds: 0,
            last_activity_at: None,
            mastered_at: None,
            notes: Vec::new(),
            xp_earned: 0,
        }
    }
}

/// Progress through one learning path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathProgress {
    /// Path identifier from the content catalog.
    pub path_id: String,
    /// When the path was (last) started.
    pub started_at: DateTime<Utc>,
    /// Completed module ids.
    pub completed_modules: BTreeSet<String>,
    /// Module the learner is on; `None` once the path is complete.
    pub current_module_id: Option<String>,
    /// Set once when the path is completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl PathProgress {
    /// Create a freshly started path.
    pub fn new(
        path_id: impl Into<String>,
        first_module_id: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            path_id: path_id.into(),
            started_at,
            completed_modules: BTreeSet::new(),
            current_module_id: Some(first_module_id.into()),
            completed_at: None,
        }
    }

    /// Check if the path has been completed.
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Daily practice streak.
///
/// Invariant: `longest_streak >= current_streak`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StreakState {
    /// Consecutive calendar days with activity, ending at the last activity.
    pub current_streak: u32,
    /// Best streak ever reached.
    pub longest_streak: u32,
    /// Timestamp of the last counted activity.
    pub last_activity_date: Option<DateTime<Utc>>,
}

/// XP ledger.
///
/// `xp` and `lifetime_xp` grow by the same delta on every credit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct XpState {
    /// Level-driving XP pool.
    pub xp: u64,
    /// Total XP ever earned.
    pub lifetime_xp: u64,
    /// Current level in `1..=MAX_LEVEL`.
    pub level: u32,
}

impl Default for XpState {
    fn default() -> Self {
        Self {
            xp: 0,
            lifetime_xp: 0,
            level: 1,
        }
    }
}

/// Badge grouping for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    /// Tricks mastered.
    Mastery,
    /// Daily practice streaks.
    Streak,
    /// Learning paths.
    Path,
    /// Watch time.
    Dedication,
    /// XP and levels.
    Milestone,
}

impl BadgeCategory {
    /// All categories in display order.
    pub fn all() -> &'static [BadgeCategory] {
        &[
            Self::Mastery,
            Self::Streak,
            Self::Path,
            Self::Dedication,
            Self::Milestone,
        ]
    }

    /// Get the category name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mastery => "mastery",
            Self::Streak => "streak",
            Self::Path => "path",
            Self::Dedication => "dedication",
            Self::Milestone => "milestone",
        }
    }

    /// Parse from a category name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.as_str() == s)
    }
}

/// Badge rarity, which fixes the XP awarded on unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All rarities from most to least common.
    pub fn all() -> &'static [Rarity] {
        &[
            Self::Common,
            Self::Uncommon,
            Self::Rare,
            Self::Epic,
            Self::Legendary,
        ]
    }

    /// XP credited when a badge of this rarity unlocks.
    pub fn xp_reward(&self) -> u64 {
        match self {
            Self::Common => 25,
            Self::Uncommon => 50,
            Self::Rare => 100,
            Self::Epic => 200,
            Self::Legendary => 500,
        }
    }

    /// Get the rarity name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    /// Parse from a rarity name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|r| r.as_str() == s)
    }
}

/// Descriptive badge data shared by catalog entries and unlocked badges.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BadgeInfo {
    /// Catalog key.
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: BadgeCategory,
    pub rarity: Rarity,
}

/// An unlocked badge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Badge {
    #[serde(flatten)]
    pub info: BadgeInfo,
    /// When the badge was unlocked.
    pub unlocked_at: DateTime<Utc>,
}

impl Badge {
    /// Badge catalog key.
    pub fn id(&self) -> &str {
        &self.info.id
    }
}

/// Record of one badge unlock, kept in the recent-achievements feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    /// Unique record id (`<badge id>-<unix millis>`).
    pub id: String,
    /// The unlocked badge.
    pub badge: Badge,
    /// When the unlock happened.
    pub timestamp: DateTime<Utc>,
    /// XP credited for the unlock.
    pub xp_awarded: u64,
}
