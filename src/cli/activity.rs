//! Trick activity commands for Spindle.
//!
//! `watch`, `practice`, `master` and `time` all follow the same shape: one
//! engine call on a trick, then the shared save cycle.

use serde::Serialize;

use crate::cli::{format_rewards, to_json, CommandEnv, UnlockedBadge};
use crate::core::{ActivityOutcome, StreakUpdate};
use crate::journal::ActivityEventType;
use crate::storage::ProfileStore;

/// Options for activity commands.
#[derive(Debug, Clone, Default)]
pub struct ActivityOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Which trick transition to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Watch,
    Practice,
    Master,
    /// Add watch time in seconds.
    WatchTime(u64),
}

impl ActivityKind {
    /// Get the action name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Watch => "watch",
            Self::Practice => "practice",
            Self::Master => "master",
            Self::WatchTime(_) => "time",
        }
    }
}

/// Output format for activity commands.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityOutput {
    pub success: bool,
    pub action: String,
    pub item_id: String,
    /// XP from the action itself.
    pub xp_gained: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<StreakUpdate>,
    pub current_streak: u32,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<UnlockedBadge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActivityOutput {
    /// Create a failed output.
    pub fn failure(kind: ActivityKind, item_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: kind.as_str().to_string(),
            item_id: item_id.to_string(),
            xp_gained: 0,
            streak: None,
            current_streak: 0,
            level: 0,
            new_level: None,
            badges: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The activity command implementation.
pub struct ActivityCommand<S: ProfileStore> {
    env: CommandEnv<S>,
}

impl<S: ProfileStore> ActivityCommand<S> {
    /// Create a new activity command.
    pub fn new(env: CommandEnv<S>) -> Self {
        Self { env }
    }

    /// Run a transition on a trick.
    pub fn run(&self, kind: ActivityKind, item_id: &str) -> ActivityOutput {
        let result = self.env.mutate(|engine| {
            let outcome: ActivityOutcome = match kind {
                ActivityKind::Watch => engine.mark_watched(item_id),
                ActivityKind::Practice => engine.mark_practicing(item_id),
                ActivityKind::Master => engine.mark_mastered(item_id),
                ActivityKind::WatchTime(seconds) => engine.update_watch_time(item_id, seconds),
            };
            let events = journal_events(kind, item_id, &outcome);
            (outcome, events)
        });

        match result {
            Ok(mutation) => ActivityOutput {
                success: true,
                action: kind.as_str().to_string(),
                item_id: item_id.to_string(),
                xp_gained: mutation.value.xp_gained,
                streak: mutation.value.streak,
                current_streak: mutation.profile.streak.current_streak,
                level: mutation.profile.xp.level,
                new_level: mutation.new_level,
                badges: mutation.unlocked.iter().map(UnlockedBadge::from).collect(),
                error: None,
            },
            Err(e) => ActivityOutput::failure(kind, item_id, e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ActivityOutput, options: &ActivityOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &ActivityOutput) -> String {
        if !output.success {
            return format!(
                "{} failed: {}\n",
                output.action,
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let verb = match output.action.as_str() {
            "watch" => "Watched",
            "practice" => "Practicing",
            "master" => "Mastered",
            _ => "Logged watch time for",
        };
        let mut out = format!("{} {}", verb, output.item_id);
        if output.xp_gained > 0 {
            out.push_str(&format!(" (+{} XP)", output.xp_gained));
        }
        out.push('\n');

        match output.streak {
            Some(StreakUpdate::Started) => out.push_str("Streak started: 1 day\n"),
            Some(StreakUpdate::Extended) => {
                out.push_str(&format!("Streak: {} days\n", output.current_streak))
            }
            Some(StreakUpdate::Reset) => out.push_str("Streak reset: 1 day\n"),
            Some(StreakUpdate::Unchanged) | None => {}
        }

        out.push_str(&format_rewards(output.new_level, &output.badges));
        out
    }
}

/// Journal events for an activity; no-op transitions log nothing.
fn journal_events(
    kind: ActivityKind,
    item_id: &str,
    outcome: &ActivityOutcome,
) -> Vec<ActivityEventType> {
    let item_id = item_id.to_string();
    let xp = outcome.xp_gained;
    let event = match kind {
        ActivityKind::Watch => Some(ActivityEventType::Watched { item_id, xp }),
        ActivityKind::Practice => Some(ActivityEventType::Practicing { item_id }),
        ActivityKind::Master if outcome.streak.is_some() => {
            Some(ActivityEventType::Mastered { item_id, xp })
        }
        ActivityKind::Master => None,
        ActivityKind::WatchTime(0) => None,
        ActivityKind::WatchTime(seconds) => Some(ActivityEventType::WatchTime {
            item_id,
            seconds,
            xp,
        }),
    };
    event.into_iter().collect()
}
