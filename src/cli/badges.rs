//! Badges command for Spindle.
//!
//! Lists unlocked badges, optionally filtered by rarity or category. With
//! `--all` the whole catalog is shown with locked entries included.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::{to_json, CommandEnv};
use crate::core::{selectors, BadgeCategory, BadgeInfo, Rarity};
use crate::storage::ProfileStore;

/// Options for the badges command.
#[derive(Debug, Clone, Default)]
pub struct BadgesOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    pub rarity: Option<Rarity>,
    pub category: Option<BadgeCategory>,
    /// Include locked catalog badges.
    pub all: bool,
}

/// One badge row.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeEntry {
    #[serde(flatten)]
    pub info: BadgeInfo,
    pub xp_reward: u64,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Output format for the badges command.
#[derive(Debug, Clone, Serialize)]
pub struct BadgesOutput {
    pub badges: Vec<BadgeEntry>,
    pub unlocked: usize,
    pub total: usize,
}

/// The badges command implementation.
pub struct BadgesCommand<S: ProfileStore> {
    env: CommandEnv<S>,
}

impl<S: ProfileStore> BadgesCommand<S> {
    /// Create a new badges command.
    pub fn new(env: CommandEnv<S>) -> Self {
        Self { env }
    }

    /// List badges.
    pub fn run(&self, options: &BadgesOptions) -> BadgesOutput {
        let profile = self.env.load_profile();

        let mut unlocked = profile.badges.iter().collect::<Vec<_>>();
        if let Some(rarity) = options.rarity {
            unlocked = selectors::badges_by_rarity(&profile, rarity);
        }
        if let Some(category) = options.category {
            unlocked.retain(|b| b.info.category == category);
        }

        let mut badges: Vec<BadgeEntry> = unlocked
            .iter()
            .map(|b| BadgeEntry {
                info: b.info.clone(),
                xp_reward: b.info.rarity.xp_reward(),
                unlocked: true,
                unlocked_at: Some(b.unlocked_at),
            })
            .collect();

        if options.all {
            let locked = self
                .env
                .catalog
                .iter()
                .filter(|d| !selectors::is_unlocked(&profile, &d.info.id))
                .filter(|d| options.rarity.map_or(true, |r| d.info.rarity == r))
                .filter(|d| options.category.map_or(true, |c| d.info.category == c))
                .map(|d| BadgeEntry {
                    info: d.info.clone(),
                    xp_reward: d.info.rarity.xp_reward(),
                    unlocked: false,
                    unlocked_at: None,
                });
            badges.extend(locked);
        }

        BadgesOutput {
            unlocked: profile.badges.len(),
            total: self.env.catalog.len(),
            badges,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &BadgesOutput, options: &BadgesOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &BadgesOutput) -> String {
        let mut out = format!("Badges: {}/{} unlocked\n", output.unlocked, output.total);
        if output.badges.is_empty() {
            out.push_str("No badges to show.\n");
            return out;
        }

        for entry in &output.badges {
            let marker = if entry.unlocked { "✓" } else { " " };
            out.push_str(&format!(
                "[{}] {} {} ({}, {}, {} XP): {}\n",
                marker,
                entry.info.icon,
                entry.info.name,
                entry.info.category.as_str(),
                entry.info.rarity.as_str(),
                entry.xp_reward,
                entry.info.description
            ));
        }
        out
    }
}
