//! Spindle - Progression Engine for yo-yo trick tutorials
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spindle::cli::activity::{ActivityKind, ActivityOptions};
use spindle::cli::badges::BadgesOptions;
use spindle::cli::history::HistoryOptions;
use spindle::cli::notes::{NoteAction, NotesOptions};
use spindle::cli::path::{PathAction, PathOptions};
use spindle::cli::snapshot::SnapshotOptions;
use spindle::cli::status::StatusOptions;
use spindle::cli::{
    ActivityCommand, BadgesCommand, CommandEnv, ExportCommand, HistoryCommand, ImportCommand,
    NotesCommand, PathCommand, StatusCommand,
};
use spindle::config::{spindle_home, Config, ProfileConfig};
use spindle::core::{BadgeCategory, Rarity};
use spindle::error::exit_codes;
use spindle::storage::FileProfileStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// Spindle - track yo-yo trick progress, streaks, XP and badges
#[derive(Parser)]
#[command(name = "spindle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Profile to use (overrides SPINDLE_PROFILE and config.toml)
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mark a trick tutorial as watched
    Watch {
        /// Trick id
        trick: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Mark a trick as being practiced
    Practice {
        /// Trick id
        trick: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Mark a trick as mastered
    Master {
        /// Trick id
        trick: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Add tutorial watch time to a trick
    Time {
        /// Trick id
        trick: String,
        /// Seconds watched
        seconds: u64,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Manage practice notes on a trick
    Note {
        #[command(subcommand)]
        action: NoteCommand,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },

    /// Work through a learning path
    Path {
        #[command(subcommand)]
        action: PathSubcommand,
        /// Output as JSON
        #[arg(long, short, global = true)]
        json: bool,
        /// Suppress output
        #[arg(long, short, global = true)]
        quiet: bool,
    },

    /// Show level, streak and recent achievements
    Status {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List badges
    Badges {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Only badges of this rarity
        #[arg(long, value_parser = parse_rarity)]
        rarity: Option<Rarity>,
        /// Only badges of this category
        #[arg(long, value_parser = parse_category)]
        category: Option<BadgeCategory>,
        /// Include locked badges from the catalog
        #[arg(long)]
        all: bool,
    },

    /// Show recent activity
    History {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Maximum number of entries
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Export the profile snapshot as JSON
    Export {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace the profile with an exported snapshot
    Import {
        /// Snapshot file
        file: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

#[derive(Subcommand)]
enum NoteCommand {
    /// Add a note
    Add {
        /// Trick id
        trick: String,
        /// Note text
        text: String,
    },
    /// Remove a note by index
    Remove {
        /// Trick id
        trick: String,
        /// Note index (see `note list`)
        index: usize,
    },
    /// List notes
    List {
        /// Trick id
        trick: String,
    },
}

#[derive(Subcommand)]
enum PathSubcommand {
    /// Start (or restart) a path
    Start {
        /// Path id
        path: String,
        /// First module id
        first_module: String,
    },
    /// Complete a module
    Module {
        /// Path id
        path: String,
        /// Module id
        module: String,
        /// Module to move to next
        #[arg(long)]
        next: Option<String>,
    },
    /// Complete the path
    Complete {
        /// Path id
        path: String,
    },
}

fn parse_rarity(s: &str) -> Result<Rarity, String> {
    Rarity::parse(&s.to_lowercase()).ok_or_else(|| {
        format!("unknown rarity '{}' (common, uncommon, rare, epic, legendary)", s)
    })
}

fn parse_category(s: &str) -> Result<BadgeCategory, String> {
    BadgeCategory::parse(&s.to_lowercase()).ok_or_else(|| {
        format!(
            "unknown category '{}' (mastery, streak, path, dedication, milestone)",
            s
        )
    })
}

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("spindle error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Log to stderr, filtered by `SPINDLE_LOG` (default `warn`).
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("SPINDLE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.spindle/crash.log and exits with the crash code.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("spindle panic: {}", info);

        if let Some(home) = spindle_home() {
            let _ = std::fs::create_dir_all(&home);
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(profile) = cli.profile {
        if !ProfileConfig::is_valid_id(&profile) {
            return Err(format!(
                "invalid profile id '{}' (use letters, digits, '-' and '_')",
                profile
            )
            .into());
        }
        config.profile.id = profile;
    }

    let store = FileProfileStore::new()?;
    let env = CommandEnv::new(store, config);

    match cli.command {
        Commands::Watch { trick, json, quiet } => {
            run_activity(env, ActivityKind::Watch, &trick, json, quiet)
        }
        Commands::Practice { trick, json, quiet } => {
            run_activity(env, ActivityKind::Practice, &trick, json, quiet)
        }
        Commands::Master { trick, json, quiet } => {
            run_activity(env, ActivityKind::Master, &trick, json, quiet)
        }
        Commands::Time {
            trick,
            seconds,
            json,
            quiet,
        } => run_activity(env, ActivityKind::WatchTime(seconds), &trick, json, quiet),
        Commands::Note {
            action,
            json,
            quiet,
        } => run_note(env, action, json, quiet),
        Commands::Path {
            action,
            json,
            quiet,
        } => run_path(env, action, json, quiet),
        Commands::Status { json, quiet } => {
            let cmd = StatusCommand::new(env);
            let output = cmd.run();
            emit(cmd.format_output(&output, &StatusOptions { json, quiet }));
            Ok(success_to_exit_code(true))
        }
        Commands::Badges {
            json,
            quiet,
            rarity,
            category,
            all,
        } => {
            let cmd = BadgesCommand::new(env);
            let options = BadgesOptions {
                json,
                quiet,
                rarity,
                category,
                all,
            };
            let output = cmd.run(&options);
            emit(cmd.format_output(&output, &options));
            Ok(success_to_exit_code(true))
        }
        Commands::History { json, quiet, limit } => {
            let cmd = HistoryCommand::new(env);
            let options = HistoryOptions { json, quiet, limit };
            let output = cmd.run(&options);
            emit(cmd.format_output(&output, &options));
            Ok(success_to_exit_code(true))
        }
        Commands::Export {
            json,
            quiet,
            output,
        } => {
            let cmd = ExportCommand::new(env);
            let result = cmd.run(output.as_deref());
            emit(cmd.format_output(&result, &SnapshotOptions { json, quiet }));
            Ok(success_to_exit_code(result.success))
        }
        Commands::Import { file, json, quiet } => {
            let cmd = ImportCommand::new(env);
            let output = cmd.run(&file);
            emit(cmd.format_output(&output, &SnapshotOptions { json, quiet }));
            Ok(success_to_exit_code(output.success))
        }
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Print formatted output, if any.
fn emit(formatted: String) {
    if !formatted.is_empty() {
        println!("{}", formatted.trim_end());
    }
}

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn run_activity(
    env: CommandEnv<FileProfileStore>,
    kind: ActivityKind,
    trick: &str,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = ActivityCommand::new(env);
    let output = cmd.run(kind, trick);
    emit(cmd.format_output(&output, &ActivityOptions { json, quiet }));
    Ok(success_to_exit_code(output.success))
}

fn run_note(
    env: CommandEnv<FileProfileStore>,
    action: NoteCommand,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (trick, action) = match action {
        NoteCommand::Add { trick, text } => (trick, NoteAction::Add(text)),
        NoteCommand::Remove { trick, index } => (trick, NoteAction::Remove(index)),
        NoteCommand::List { trick } => (trick, NoteAction::List),
    };

    let cmd = NotesCommand::new(env);
    let output = cmd.run(&trick, &action);
    emit(cmd.format_output(&output, &NotesOptions { json, quiet }));
    Ok(success_to_exit_code(output.success))
}

fn run_path(
    env: CommandEnv<FileProfileStore>,
    action: PathSubcommand,
    json: bool,
    quiet: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (path_id, action) = match action {
        PathSubcommand::Start { path, first_module } => (path, PathAction::Start { first_module }),
        PathSubcommand::Module { path, module, next } => {
            (path, PathAction::Module { module, next })
        }
        PathSubcommand::Complete { path } => (path, PathAction::Complete),
    };

    let cmd = PathCommand::new(env);
    let output = cmd.run(&path_id, &action);
    emit(cmd.format_output(&output, &PathOptions { json, quiet }));
    Ok(success_to_exit_code(output.success))
}

// =============================================================================
// Tests
// =============================================================================
