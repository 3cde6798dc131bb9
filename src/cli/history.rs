//! History command for Spindle.
//!
//! Shows the newest entries of the active profile's activity journal.

use chrono::Local;
use serde::Serialize;

use crate::cli::{to_json, CommandEnv};
use crate::error::FailOpen;
use crate::journal::ActivityEvent;
use crate::storage::ProfileStore;

/// Default number of entries shown.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Options for the history command.
#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of entries.
    pub limit: Option<usize>,
}

/// Output format for the history command.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryOutput {
    pub profile_id: String,
    /// Newest first.
    pub events: Vec<ActivityEvent>,
}

/// The history command implementation.
pub struct HistoryCommand<S: ProfileStore> {
    env: CommandEnv<S>,
}

impl<S: ProfileStore> HistoryCommand<S> {
    /// Create a new history command.
    pub fn new(env: CommandEnv<S>) -> Self {
        Self { env }
    }

    /// Read recent journal entries.
    pub fn run(&self, options: &HistoryOptions) -> HistoryOutput {
        let limit = options.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let events = match self.env.journal() {
            Some(journal) => journal
                .read_recent(limit)
                .fail_open_default("reading activity journal"),
            None => Vec::new(),
        };

        HistoryOutput {
            profile_id: self.env.profile_id().to_string(),
            events,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &HistoryOutput, options: &HistoryOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &HistoryOutput) -> String {
        if output.events.is_empty() {
            return format!("No activity recorded for {} yet.\n", output.profile_id);
        }

        let mut out = String::new();
        for event in &output.events {
            out.push_str(&format!(
                "{}  {}\n",
                event.ts.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                event.data.describe()
            ));
        }
        out
    }
}
