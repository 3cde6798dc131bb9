//! Learning path commands for Spindle.

use serde::Serialize;

use crate::cli::{format_rewards, to_json, CommandEnv, UnlockedBadge};
use crate::core::ActivityOutcome;
use crate::journal::ActivityEventType;
use crate::storage::ProfileStore;

/// Options for the path command.
#[derive(Debug, Clone, Default)]
pub struct PathOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Path action to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathAction {
    /// Start at the given first module.
    Start { first_module: String },
    /// Complete a module, optionally moving to the next one.
    Module {
        module: String,
        next: Option<String>,
    },
    Complete,
}

impl PathAction {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Module { .. } => "module",
            Self::Complete => "complete",
        }
    }
}

/// Output format for the path command.
#[derive(Debug, Clone, Serialize)]
pub struct PathOutput {
    pub success: bool,
    pub action: String,
    pub path_id: String,
    pub xp_gained: u64,
    /// Whether the path has been started at all.
    pub started: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_module: Option<String>,
    pub completed_modules: usize,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<UnlockedBadge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PathOutput {
    /// Create a failed output.
    pub fn failure(action: &str, path_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: action.to_string(),
            path_id: path_id.to_string(),
            xp_gained: 0,
            started: false,
            current_module: None,
            completed_modules: 0,
            completed: false,
            new_level: None,
            badges: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The path command implementation.
pub struct PathCommand<S: ProfileStore> {
    env: CommandEnv<S>,
}

impl<S: ProfileStore> PathCommand<S> {
    /// Create a new path command.
    pub fn new(env: CommandEnv<S>) -> Self {
        Self { env }
    }

    /// Run a path action.
    pub fn run(&self, path_id: &str, action: &PathAction) -> PathOutput {
        let result = self.env.mutate(|engine| {
            let (outcome, event): (ActivityOutcome, Option<ActivityEventType>) = match action {
                PathAction::Start { first_module } => (
                    engine.start_path(path_id, first_module),
                    Some(ActivityEventType::PathStarted {
                        path_id: path_id.to_string(),
                        module_id: first_module.clone(),
                    }),
                ),
                PathAction::Module { module, next } => {
                    let outcome = engine.complete_module(path_id, module, next.as_deref());
                    let event = outcome.streak.map(|_| ActivityEventType::ModuleCompleted {
                        path_id: path_id.to_string(),
                        module_id: module.clone(),
                        xp: outcome.xp_gained,
                    });
                    (outcome, event)
                }
                PathAction::Complete => {
                    let outcome = engine.complete_path(path_id);
                    let event = outcome.streak.map(|_| ActivityEventType::PathCompleted {
                        path_id: path_id.to_string(),
                        xp: outcome.xp_gained,
                    });
                    (outcome, event)
                }
            };
            (outcome, event.into_iter().collect())
        });

        match result {
            Ok(mutation) => {
                let progress = mutation.profile.path_progress.get(path_id);
                PathOutput {
                    success: true,
                    action: action.as_str().to_string(),
                    path_id: path_id.to_string(),
                    xp_gained: mutation.value.xp_gained,
                    started: progress.is_some(),
                    current_module: progress.and_then(|p| p.current_module_id.clone()),
                    completed_modules: progress.map(|p| p.completed_modules.len()).unwrap_or(0),
                    completed: progress.map(|p| p.is_completed()).unwrap_or(false),
                    new_level: mutation.new_level,
                    badges: mutation.unlocked.iter().map(UnlockedBadge::from).collect(),
                    error: None,
                }
            }
            Err(e) => PathOutput::failure(action.as_str(), path_id, e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &PathOutput, options: &PathOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &PathOutput) -> String {
        if !output.success {
            return format!(
                "Path {} failed: {}\n",
                output.action,
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if !output.started {
            return format!(
                "Path {} has not been started. Run `spindle path start` first.\n",
                output.path_id
            );
        }

        let mut out = if output.completed {
            format!("Path {} completed", output.path_id)
        } else {
            format!(
                "Path {}: {} module(s) done",
                output.path_id, output.completed_modules
            )
        };
        if output.xp_gained > 0 {
            out.push_str(&format!(" (+{} XP)", output.xp_gained));
        }
        out.push('\n');

        if let Some(module) = &output.current_module {
            out.push_str(&format!("Up next: {}\n", module));
        }

        out.push_str(&format_rewards(output.new_level, &output.badges));
        out
    }
}
