//! CLI commands for Spindle.
//!
//! Commands are organized into:
//! - **Activity commands**: watch, practice, master, time, note, path
//! - **Query commands**: status, badges, history
//! - **Snapshot commands**: export, import
//!
//! Every mutating command goes through [`CommandEnv::mutate`]: hydrate the
//! profile, run the engine, evaluate badges, append to the journal, save.

pub mod activity;
pub mod badges;
pub mod history;
pub mod notes;
pub mod path;
pub mod snapshot;
pub mod status;

use std::path::PathBuf;

use chrono::Local;
use serde::Serialize;

use crate::config::{spindle_home, Config};
use crate::core::{Achievement, BadgeCatalog, ProfileState, Progression, Rarity};
use crate::error::{FailOpen, Result};
use crate::journal::{ActivityEvent, ActivityEventType, ActivityJournal};
use crate::storage::ProfileStore;

pub use activity::{ActivityCommand, ActivityKind};
pub use badges::BadgesCommand;
pub use history::HistoryCommand;
pub use notes::NotesCommand;
pub use path::PathCommand;
pub use snapshot::{ExportCommand, ImportCommand};
pub use status::StatusCommand;

/// Everything a command needs besides its arguments.
pub struct CommandEnv<S: ProfileStore> {
    pub store: S,
    pub config: Config,
    pub catalog: BadgeCatalog,
    /// Spindle home; the journal is disabled when unset.
    pub home: Option<PathBuf>,
}

impl<S: ProfileStore> CommandEnv<S> {
    /// Environment rooted at the configured Spindle home.
    pub fn new(store: S, config: Config) -> Self {
        let catalog = BadgeCatalog::from_config(&config);
        Self {
            store,
            config,
            catalog,
            home: spindle_home(),
        }
    }

    /// Environment with an explicit home (or none) and the built-in catalog.
    pub fn with_home(store: S, config: Config, home: Option<PathBuf>) -> Self {
        Self {
            store,
            config,
            catalog: BadgeCatalog::builtin(),
            home,
        }
    }

    /// Id of the active profile.
    pub fn profile_id(&self) -> &str {
        &self.config.profile.id
    }

    /// Hydrate the active profile (fresh on first use or on a bad snapshot).
    pub fn load_profile(&self) -> ProfileState {
        self.store.load_or_default(self.profile_id())
    }

    /// Journal of the active profile, if a home is known.
    pub fn journal(&self) -> Option<ActivityJournal> {
        self.home
            .as_deref()
            .map(|home| ActivityJournal::for_profile(home, self.profile_id()))
    }

    /// Run one engine action on the active profile and persist the result.
    ///
    /// `action` returns its own value plus the journal events it produced;
    /// badge and level-up events are added here. A snapshot that exists but
    /// cannot be hydrated fails the command and is left on disk as-is.
    pub fn mutate<T>(
        &self,
        action: impl FnOnce(&mut Progression<'_, Local>) -> (T, Vec<ActivityEventType>),
    ) -> Result<Mutation<T>> {
        let mut profile = self.store.load(self.profile_id())?;
        let level_before = profile.xp.level;

        let (value, mut events, unlocked, now) = {
            let mut engine = Progression::new(&mut profile, &self.config);
            let (value, events) = action(&mut engine);
            let unlocked = engine.check_achievements(&self.catalog);
            (value, events, unlocked, engine.now_utc())
        };

        events.extend(unlocked.iter().map(ActivityEventType::badge_unlocked));
        let new_level = (profile.xp.level > level_before).then_some(profile.xp.level);
        if let Some(level) = new_level {
            events.push(ActivityEventType::LevelUp { level });
        }

        if let Some(journal) = self.journal() {
            let events: Vec<ActivityEvent> = events
                .into_iter()
                .map(|data| ActivityEvent::with_timestamp(data, now))
                .collect();
            journal
                .append_all(&events)
                .fail_open_default("appending to activity journal");
        }

        self.store.put(&profile)?;

        Ok(Mutation {
            value,
            unlocked,
            new_level,
            profile,
        })
    }
}

/// Result of [`CommandEnv::mutate`].
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    /// Badges unlocked by the post-action evaluation.
    pub unlocked: Vec<Achievement>,
    /// Level reached, if the command leveled up (action or badge XP).
    pub new_level: Option<u32>,
    /// The saved profile.
    pub profile: ProfileState,
}

/// A badge unlock as reported by commands.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnlockedBadge {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub rarity: Rarity,
    pub xp_awarded: u64,
}

impl From<&Achievement> for UnlockedBadge {
    fn from(achievement: &Achievement) -> Self {
        Self {
            id: achievement.badge.info.id.clone(),
            name: achievement.badge.info.name.clone(),
            icon: achievement.badge.info.icon.clone(),
            rarity: achievement.badge.info.rarity,
            xp_awarded: achievement.xp_awarded,
        }
    }
}

/// Human-readable lines for level-ups and unlocks.
pub(crate) fn format_rewards(new_level: Option<u32>, badges: &[UnlockedBadge]) -> String {
    let mut out = String::new();
    for badge in badges {
        out.push_str(&format!(
            "{} Badge unlocked: {} [{}] (+{} XP)\n",
            badge.icon,
            badge.name,
            badge.rarity.as_str(),
            badge.xp_awarded
        ));
    }
    if let Some(level) = new_level {
        out.push_str(&format!("Level up! You are now level {}.\n", level));
    }
    out
}

/// Serialize command output, falling back to an empty object.
pub(crate) fn to_json<T: Serialize>(output: &T) -> String {
    serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
}


#[cfg(test)]
mod tests {
    use super::test_support::env;
    use super::*;

    #[test]
    fn test_mutate_saves_and_journals() {
        let (env, store, _home) = env();

        let mutation = env
            .mutate(|engine| {
                let outcome = engine.mark_watched("sleeper");
                (
                    outcome,
                    vec![ActivityEventType::Watched {
                        item_id: "sleeper".to_string(),
                        xp: outcome.xp_gained,
                    }],
                )
            })
            .unwrap();

        assert_eq!(mutation.value.xp_gained, 10);
        let ids: Vec<&str> = mutation.unlocked.iter().map(|a| a.badge.id()).collect();
        assert_eq!(ids, vec!["first_watch"]);
        assert!(mutation.new_level.is_none());

        let saved = store.get("default").unwrap().unwrap();
        assert_eq!(saved, mutation.profile);
        assert_eq!(saved.xp.xp, 35);

        let events = env.journal().unwrap().read_all().unwrap();
        let names: Vec<&str> = events.iter().map(|e| e.data.event_name()).collect();
        assert_eq!(names, vec!["watched", "badge_unlocked"]);
    }

    #[test]
    fn test_mutate_reports_level_up() {
        let (env, _store, _home) = env();
        let mutation = env
            .mutate(|engine| (engine.complete_path("none"), Vec::new()))
            .unwrap();
        assert!(mutation.new_level.is_none());

        let mutation = env
            .mutate(|engine| {
                engine.start_path("basics", "m1");
                (engine.complete_path("basics"), Vec::new())
            })
            .unwrap();
        // 200 path XP plus first_path (uncommon, 50)
        assert_eq!(mutation.new_level, Some(2));

        let events = env.journal().unwrap().read_all().unwrap();
        assert_eq!(events.last().unwrap().data.event_name(), "level_up");
    }

    #[test]
    fn test_mutate_without_home_skips_journal() {
        let store = crate::storage::MemoryProfileStore::new();
        let env = CommandEnv::with_home(store, Config::default(), None);
        assert!(env.journal().is_none());
        env.mutate(|engine| (engine.mark_practicing("t"), Vec::new()))
            .unwrap();
        assert!(env.store.exists("default").unwrap());
    }

    #[test]
    fn test_mutate_journal_uses_engine_clock() {
        let (env, store, _home) = env();
        env.mutate(|engine| (engine.mark_mastered("sleeper"), Vec::new()))
            .unwrap();

        let saved = store.get("default").unwrap().unwrap();
        let now = saved.updated_at.unwrap();
        assert!(saved.badges.iter().all(|b| b.unlocked_at == now));

        let events = env.journal().unwrap().read_all().unwrap();
        assert!(!events.is_empty());
        assert!(events.iter().all(|e| e.ts == now));
    }

    #[test]
    fn test_mutate_keeps_unreadable_snapshot() {
        use crate::storage::FileProfileStore;
        use std::fs;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::with_dir(dir.path()).unwrap();
        let path = dir.path().join("default.json");
        let truncated = r#"{"schema_version": 1, "tricks_mastered": 40, "xp": {"xp": 9000"#;
        fs::write(&path, truncated).unwrap();

        let env = CommandEnv::with_home(store, Config::default(), None);
        let result = env.mutate(|engine| (engine.add_note("t", "x"), Vec::new()));

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), truncated);
    }

    #[test]
    fn test_mutate_keeps_newer_schema_snapshot() {
        use crate::storage::FileProfileStore;
        use std::fs;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::with_dir(dir.path()).unwrap();
        let path = dir.path().join("default.json");
        let future = r#"{"schema_version": 99, "tricks_mastered": 40, "hologram": true}"#;
        fs::write(&path, future).unwrap();

        let env = CommandEnv::with_home(store, Config::default(), None);
        let result = env.mutate(|engine| (engine.mark_watched("t"), Vec::new()));

        assert!(matches!(
            result,
            Err(crate::error::SpindleError::UnsupportedSchema { found: 99, .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), future);
    }

    #[test]
    fn test_format_rewards() {
        let badge = UnlockedBadge {
            id: "streak_3".to_string(),
            name: "Warming Up".to_string(),
            icon: "🔥".to_string(),
            rarity: Rarity::Common,
            xp_awarded: 25,
        };
        let text = format_rewards(Some(4), &[badge]);
        assert!(text.contains("Badge unlocked: Warming Up [common] (+25 XP)"));
        assert!(text.contains("level 4"));
        assert!(format_rewards(None, &[]).is_empty());
    }
}
