//! Configuration loading for Spindle.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. User config (`~/.spindle/config.toml` or `$SPINDLE_HOME/config.toml`)
//! 3. Defaults (lowest priority)
//!
//! All configuration is optional. The engine runs with the stock reward table
//! and built-in badge catalog when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SpindleError};

/// Main configuration struct for Spindle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// XP rewards for progress events.
    pub rewards: RewardsConfig,
    /// Achievement feed and catalog configuration.
    pub achievements: AchievementsConfig,
    /// Active profile selection.
    pub profile: ProfileConfig,
}

/// XP rewards credited by the item and path trackers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RewardsConfig {
    /// First watch of a trick.
    pub watched: u64,
    /// First mastery of a trick.
    pub mastered: u64,
    /// Each complete 5-minute watch-time milestone.
    pub watch_milestone: u64,
    /// First completion of a path module.
    pub module_completed: u64,
    /// Completion of a whole path.
    pub path_completed: u64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            watched: 10,
            mastered: 50,
            watch_milestone: 5,
            module_completed: 25,
            path_completed: 200,
        }
    }
}

/// Achievement feed and catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AchievementsConfig {
    /// Length of the most-recent-first achievements feed.
    pub recent_limit: usize,
    /// Optional TOML badge catalog replacing the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

/// Minimum allowed value for `achievements.recent_limit`.
pub const MIN_RECENT_LIMIT: usize = 1;

impl AchievementsConfig {
    /// Check if a recent_limit value is valid.
    pub fn is_valid_recent_limit(value: usize) -> bool {
        value >= MIN_RECENT_LIMIT
    }
}

impl Default for AchievementsConfig {
    fn default() -> Self {
        Self {
            recent_limit: 10,
            catalog_path: None,
        }
    }
}

/// Active profile selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileConfig {
    /// Identifier of the local profile (used as the snapshot file name).
    pub id: String,
}

/// Name of the profile used when none is configured.
pub const DEFAULT_PROFILE_ID: &str = "default";

impl ProfileConfig {
    /// Profile ids become file names, so only `[A-Za-z0-9_-]` is accepted.
    pub fn is_valid_id(value: &str) -> bool {
        !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_PROFILE_ID.to_string(),
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match spindle_home() {
            Some(home) => Self::load_from_home(&home),
            None => {
                let mut config = Config::default();
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration using a specific Spindle home directory.
    pub fn load_from_home(home: &Path) -> Self {
        let mut config = Config::default();

        let config_path = home.join("config.toml");
        if config_path.exists() {
            match Self::load_from_file(&config_path) {
                Ok(user_config) => config = config.merge(user_config),
                Err(e) => tracing::warn!("ignoring user config: {}", e),
            }
        }

        config.apply_env_overrides();
        config
    }

    /// Load config from a specific file path.
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| SpindleError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| SpindleError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        override_from_env("SPINDLE_WATCHED_XP", &mut self.rewards.watched);
        override_from_env("SPINDLE_MASTERED_XP", &mut self.rewards.mastered);
        override_from_env("SPINDLE_MILESTONE_XP", &mut self.rewards.watch_milestone);
        override_from_env("SPINDLE_MODULE_XP", &mut self.rewards.module_completed);
        override_from_env("SPINDLE_PATH_XP", &mut self.rewards.path_completed);

        // SPINDLE_RECENT_LIMIT
        let mut limit = self.achievements.recent_limit;
        override_from_env("SPINDLE_RECENT_LIMIT", &mut limit);
        if AchievementsConfig::is_valid_recent_limit(limit) {
            self.achievements.recent_limit = limit;
        } else {
            tracing::warn!(
                "Invalid SPINDLE_RECENT_LIMIT value '{}'. Must be >= {}. Using '{}'.",
                limit,
                MIN_RECENT_LIMIT,
                self.achievements.recent_limit
            );
        }

        // SPINDLE_CATALOG
        if let Ok(val) = env::var("SPINDLE_CATALOG") {
            if val.is_empty() {
                self.achievements.catalog_path = None;
            } else {
                self.achievements.catalog_path = Some(PathBuf::from(val));
            }
        }

        // SPINDLE_PROFILE
        if let Ok(val) = env::var("SPINDLE_PROFILE") {
            if ProfileConfig::is_valid_id(&val) {
                self.profile.id = val;
            } else {
                tracing::warn!(
                    "Invalid SPINDLE_PROFILE value '{}'. Expected [A-Za-z0-9_-]+. Using '{}'.",
                    val,
                    self.profile.id
                );
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Field-by-field: every non-default value in `other` wins. A layer cannot
    /// set a value back to its default to undo a lower layer.
    fn merge(mut self, other: Config) -> Self {
        let default_rewards = RewardsConfig::default();
        if other.rewards.watched != default_rewards.watched {
            self.rewards.watched = other.rewards.watched;
        }
        if other.rewards.mastered != default_rewards.mastered {
            self.rewards.mastered = other.rewards.mastered;
        }
        if other.rewards.watch_milestone != default_rewards.watch_milestone {
            self.rewards.watch_milestone = other.rewards.watch_milestone;
        }
        if other.rewards.module_completed != default_rewards.module_completed {
            self.rewards.module_completed = other.rewards.module_completed;
        }
        if other.rewards.path_completed != default_rewards.path_completed {
            self.rewards.path_completed = other.rewards.path_completed;
        }

        let default_achievements = AchievementsConfig::default();
        if other.achievements.recent_limit != default_achievements.recent_limit {
            if AchievementsConfig::is_valid_recent_limit(other.achievements.recent_limit) {
                self.achievements.recent_limit = other.achievements.recent_limit;
            } else {
                tracing::warn!(
                    "Invalid achievements.recent_limit '{}' in config, keeping '{}'",
                    other.achievements.recent_limit,
                    self.achievements.recent_limit
                );
            }
        }
        if other.achievements.catalog_path.is_some() {
            self.achievements.catalog_path = other.achievements.catalog_path;
        }

        if other.profile.id != DEFAULT_PROFILE_ID {
            if ProfileConfig::is_valid_id(&other.profile.id) {
                self.profile.id = other.profile.id;
            } else {
                tracing::warn!(
                    "Invalid profile.id '{}' in config, keeping '{}'",
                    other.profile.id,
                    self.profile.id
                );
            }
        }

        self
    }
}

/// Parse an environment variable into `target`, warning on bad input.
fn override_from_env<T>(name: &str, target: &mut T)
where
    T: FromStr + std::fmt::Display,
{
    if let Ok(val) = env::var(name) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(
                "Invalid {} value '{}'. Expected a non-negative integer. Using '{}'.",
                name,
                val,
                target
            ),
        }
    }
}

/// Get the Spindle home directory.
///
/// Checks `SPINDLE_HOME` first, then falls back to `~/.spindle`.
pub fn spindle_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("SPINDLE_HOME") {
        if home.is_empty() {
            tracing::warn!("SPINDLE_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("SPINDLE_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".spindle"));
    }

    let fallback = env::temp_dir().join("spindle");
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback.display()
    );
    Some(fallback)
}

/// Directory holding one JSON snapshot per profile.
pub fn profiles_dir() -> Option<PathBuf> {
    spindle_home().map(|h| h.join("profiles"))
}

/// Journal file path for a profile inside a given home.
pub fn journal_path(home: &Path, profile_id: &str) -> PathBuf {
    home.join("journal").join(format!("{}.log", profile_id))
}
