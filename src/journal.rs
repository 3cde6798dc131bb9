//! Activity journal for Spindle.
//!
//! Every command appends what it did to an append-only JSONL file
//! (`<home>/journal/<profile>.log`). The journal is a history for the
//! learner, never an input to the engine: profiles hydrate from snapshots.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::journal_path;
use crate::core::{Achievement, Rarity};
use crate::error::{Result, SpindleError};

/// Schema version for journal events.
pub const JOURNAL_SCHEMA_VERSION: u8 = 1;

/// One line of the journal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEvent {
    /// Schema version for forward compatibility.
    pub v: u8,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: ActivityEventType,
}

impl ActivityEvent {
    /// Create an event stamped `ts`.
    pub fn with_timestamp(data: ActivityEventType, ts: DateTime<Utc>) -> Self {
        Self {
            v: JOURNAL_SCHEMA_VERSION,
            ts,
            data,
        }
    }
}

/// What happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ActivityEventType {
    /// A trick tutorial was watched.
    Watched { item_id: String, xp: u64 },

    /// A trick moved to practicing.
    Practicing { item_id: String },

    /// A trick was mastered.
    Mastered { item_id: String, xp: u64 },

    /// Watch time was added to a trick.
    WatchTime {
        item_id: String,
        seconds: u64,
        /// Milestone bonus earned.
        xp: u64,
    },

    NoteAdded { item_id: String, index: usize },

    NoteRemoved { item_id: String, index: usize },

    /// A path was started (or restarted).
    PathStarted { path_id: String, module_id: String },

    ModuleCompleted {
        path_id: String,
        module_id: String,
        xp: u64,
    },

    PathCompleted { path_id: String, xp: u64 },

    /// The ledger reached a new level.
    LevelUp { level: u32 },

    /// A badge was unlocked.
    BadgeUnlocked {
        badge_id: String,
        rarity: Rarity,
        xp: u64,
    },
}

impl ActivityEventType {
    /// Event for an achievement record.
    pub fn badge_unlocked(achievement: &Achievement) -> Self {
        Self::BadgeUnlocked {
            badge_id: achievement.badge.id().to_string(),
            rarity: achievement.badge.info.rarity,
            xp: achievement.xp_awarded,
        }
    }

    /// Get the event name as a string.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Watched { .. } => "watched",
            Self::Practicing { .. } => "practicing",
            Self::Mastered { .. } => "mastered",
            Self::WatchTime { .. } => "watch_time",
            Self::NoteAdded { .. } => "note_added",
            Self::NoteRemoved { .. } => "note_removed",
            Self::PathStarted { .. } => "path_started",
            Self::ModuleCompleted { .. } => "module_completed",
            Self::PathCompleted { .. } => "path_completed",
            Self::LevelUp { .. } => "level_up",
            Self::BadgeUnlocked { .. } => "badge_unlocked",
        }
    }

    /// One-line human description.
    pub fn describe(&self) -> String {
        match self {
            Self::Watched { item_id, xp } => format!("watched {} (+{} XP)", item_id, xp),
            Self::Practicing { item_id } => format!("practicing {}", item_id),
            Self::Mastered { item_id, xp } => format!("mastered {} (+{} XP)", item_id, xp),
            Self::WatchTime {
                item_id,
                seconds,
                xp,
            } => format!("watched {} for {}s (+{} XP)", item_id, seconds, xp),
            Self::NoteAdded { item_id, index } => format!("added note #{} to {}", index, item_id),
            Self::NoteRemoved { item_id, index } => {
                format!("removed note #{} from {}", index, item_id)
            }
            Self::PathStarted { path_id, module_id } => {
                format!("started path {} at {}", path_id, module_id)
            }
            Self::ModuleCompleted {
                path_id,
                module_id,
                xp,
            } => format!("completed {} in {} (+{} XP)", module_id, path_id, xp),
            Self::PathCompleted { path_id, xp } => {
                format!("completed path {} (+{} XP)", path_id, xp)
            }
            Self::LevelUp { level } => format!("reached level {}", level),
            Self::BadgeUnlocked {
                badge_id,
                rarity,
                xp,
            } => format!("unlocked {} [{}] (+{} XP)", badge_id, rarity.as_str(), xp),
        }
    }
}

/// JSONL journal for one profile.
#[derive(Debug, Clone)]
pub struct ActivityJournal {
    path: PathBuf,
}

impl ActivityJournal {
    /// Create a journal at the given path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Journal for a profile under a Spindle home.
    pub fn for_profile(home: &Path, profile_id: &str) -> Self {
        Self::new(journal_path(home, profile_id))
    }

    /// Append several events with a single open.
    pub fn append_all(&self, events: &[ActivityEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SpindleError::storage(parent, e))?;
        }

        let mut buf = String::new();
        for event in events {
            buf.push_str(&serde_json::to_string(event)?);
            buf.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SpindleError::storage(&self.path, e))?;
        file.write_all(buf.as_bytes())
            .map_err(|e| SpindleError::storage(&self.path, e))?;

        Ok(())
    }

    /// Read every readable event, oldest first.
    ///
    /// Lines that fail to parse are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<ActivityEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| SpindleError::storage(&self.path, e))?;

        let mut events = Vec::new();
        for (line_num, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ActivityEvent>(line) {
                Ok(event) => events.push(event),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = line_num + 1,
                    "skipping unreadable journal line: {}",
                    e
                ),
            }
        }

        Ok(events)
    }

    /// The newest `limit` events, newest first.
    pub fn read_recent(&self, limit: usize) -> Result<Vec<ActivityEvent>> {
        let mut events = self.read_all()?;
        events.reverse();
        events.truncate(limit);
        Ok(events)
    }

    /// Get the path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
