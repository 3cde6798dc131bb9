//! Status command for Spindle.
//!
//! Read-only overview of the active profile: level, streak, counts and the
//! recent-achievements feed.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::cli::{to_json, CommandEnv, UnlockedBadge};
use crate::core::{level_title, selectors, XpProgress};
use crate::storage::ProfileStore;

/// Options for the status command.
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the status command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    pub profile_id: String,
    pub level: u32,
    pub title: String,
    pub max_level: bool,
    pub xp: u64,
    pub lifetime_xp: u64,
    pub progress: XpProgress,
    /// Current streak, or 0 once it has lapsed.
    pub streak: u32,
    pub longest_streak: u32,
    pub tricks_watched: usize,
    pub tricks_mastered: u32,
    pub total_watch_seconds: u64,
    pub paths_completed: usize,
    pub modules_completed: usize,
    pub badges_unlocked: usize,
    pub badges_total: usize,
    pub recent_achievements: Vec<RecentAchievement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One feed entry.
#[derive(Debug, Clone, Serialize)]
pub struct RecentAchievement {
    #[serde(flatten)]
    pub badge: UnlockedBadge,
    pub timestamp: DateTime<Utc>,
}

/// The status command implementation.
pub struct StatusCommand<S: ProfileStore> {
    env: CommandEnv<S>,
}

impl<S: ProfileStore> StatusCommand<S> {
    /// Create a new status command.
    pub fn new(env: CommandEnv<S>) -> Self {
        Self { env }
    }

    /// Build the status report as of now.
    pub fn run(&self) -> StatusOutput {
        self.run_at(Local::now())
    }

    /// Build the status report with an explicit clock.
    pub fn run_at(&self, now: DateTime<Local>) -> StatusOutput {
        let profile = self.env.load_profile();

        StatusOutput {
            profile_id: profile.profile_id.clone(),
            level: profile.xp.level,
            title: level_title(profile.xp.level).to_string(),
            max_level: profile.xp.is_max_level(),
            xp: profile.xp.xp,
            lifetime_xp: profile.xp.lifetime_xp,
            progress: selectors::xp_progress(&profile),
            streak: profile.streak.display_streak(&now),
            longest_streak: profile.streak.longest_streak,
            tricks_watched: selectors::tricks_watched(&profile),
            tricks_mastered: profile.tricks_mastered,
            total_watch_seconds: selectors::total_watch_seconds(&profile),
            paths_completed: selectors::paths_completed(&profile),
            modules_completed: selectors::modules_completed(&profile),
            badges_unlocked: profile.badges.len(),
            badges_total: self.env.catalog.len(),
            recent_achievements: profile
                .recent_achievements
                .iter()
                .map(|a| RecentAchievement {
                    badge: UnlockedBadge::from(a),
                    timestamp: a.timestamp,
                })
                .collect(),
            updated_at: profile.updated_at,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatusOutput, options: &StatusOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &StatusOutput) -> String {
        let mut out = format!("Profile: {}\n", output.profile_id);

        if output.max_level {
            out.push_str(&format!(
                "Level {} ({}), max level. {} XP\n",
                output.level, output.title, output.xp
            ));
        } else {
            out.push_str(&format!(
                "Level {} ({}), {}/{} XP to next level ({:.0}%)\n",
                output.level,
                output.title,
                output.progress.current,
                output.progress.required,
                output.progress.percentage
            ));
        }
        out.push_str(&format!(
            "Streak: {} day(s), best {}\n",
            output.streak, output.longest_streak
        ));
        out.push_str(&format!(
            "Tricks: {} watched, {} mastered, {} of tutorials\n",
            output.tricks_watched,
            output.tricks_mastered,
            format_duration(output.total_watch_seconds)
        ));
        out.push_str(&format!(
            "Paths: {} completed, {} module(s) done\n",
            output.paths_completed, output.modules_completed
        ));
        out.push_str(&format!(
            "Badges: {}/{}\n",
            output.badges_unlocked, output.badges_total
        ));

        if !output.recent_achievements.is_empty() {
            out.push_str("\nRecent achievements:\n");
            for entry in &output.recent_achievements {
                out.push_str(&format!(
                    "  {} {} [{}] {}\n",
                    entry.badge.icon,
                    entry.badge.name,
                    entry.badge.rarity.as_str(),
                    entry.timestamp.with_timezone(&Local).format("%Y-%m-%d")
                ));
            }
        }

        out
    }
}

/// `1h 05m`, `12m 30s`, `45s`.
fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
