//! Note commands for Spindle.

use serde::Serialize;

use crate::cli::{to_json, CommandEnv};
use crate::core::selectors;
use crate::journal::ActivityEventType;
use crate::storage::ProfileStore;

/// Options for the note command.
#[derive(Debug, Clone, Default)]
pub struct NotesOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Note action to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteAction {
    Add(String),
    Remove(usize),
    List,
}

/// Output format for the note command.
#[derive(Debug, Clone, Serialize)]
pub struct NotesOutput {
    pub success: bool,
    pub item_id: String,
    /// Index of the added note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<usize>,
    /// Whether a remove request removed anything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<bool>,
    /// Notes after the action.
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotesOutput {
    fn success(item_id: &str, notes: Vec<String>) -> Self {
        Self {
            success: true,
            item_id: item_id.to_string(),
            added: None,
            removed: None,
            notes,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(item_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            item_id: item_id.to_string(),
            added: None,
            removed: None,
            notes: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The note command implementation.
pub struct NotesCommand<S: ProfileStore> {
    env: CommandEnv<S>,
}

impl<S: ProfileStore> NotesCommand<S> {
    /// Create a new note command.
    pub fn new(env: CommandEnv<S>) -> Self {
        Self { env }
    }

    /// Run a note action on a trick.
    pub fn run(&self, item_id: &str, action: &NoteAction) -> NotesOutput {
        match action {
            NoteAction::List => {
                let profile = self.env.load_profile();
                NotesOutput::success(item_id, selectors::item(&profile, item_id).notes)
            }
            NoteAction::Add(text) => {
                let result = self.env.mutate(|engine| {
                    let index = engine.add_note(item_id, text.as_str());
                    let event = ActivityEventType::NoteAdded {
                        item_id: item_id.to_string(),
                        index,
                    };
                    (index, vec![event])
                });
                match result {
                    Ok(mutation) => NotesOutput {
                        added: Some(mutation.value),
                        ..NotesOutput::success(
                            item_id,
                            selectors::item(&mutation.profile, item_id).notes,
                        )
                    },
                    Err(e) => NotesOutput::failure(item_id, e.to_string()),
                }
            }
            NoteAction::Remove(index) => {
                let index = *index;
                let result = self.env.mutate(|engine| {
                    let removed = engine.remove_note(item_id, index).is_some();
                    let events = if removed {
                        vec![ActivityEventType::NoteRemoved {
                            item_id: item_id.to_string(),
                            index,
                        }]
                    } else {
                        Vec::new()
                    };
                    (removed, events)
                });
                match result {
                    Ok(mutation) => NotesOutput {
                        removed: Some(mutation.value),
                        ..NotesOutput::success(
                            item_id,
                            selectors::item(&mutation.profile, item_id).notes,
                        )
                    },
                    Err(e) => NotesOutput::failure(item_id, e.to_string()),
                }
            }
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &NotesOutput, options: &NotesOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &NotesOutput) -> String {
        if !output.success {
            return format!(
                "Note failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut out = String::new();
        if let Some(index) = output.added {
            out.push_str(&format!("Added note #{} to {}\n", index, output.item_id));
        }
        if output.removed == Some(false) {
            out.push_str("No note at that index.\n");
        }

        if output.notes.is_empty() {
            out.push_str(&format!("No notes for {}.\n", output.item_id));
        } else {
            out.push_str(&format!("Notes for {}:\n", output.item_id));
            for (i, note) in output.notes.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i, note));
            }
        }
        out
    }
}
