//! Export and import commands for Spindle.
//!
//! Export writes the active profile's snapshot as JSON. Import replaces the
//! active profile with a snapshot; it is hydration, so nothing is recomputed.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::{to_json, CommandEnv};
use crate::core::ProfileState;
use crate::error::{Result, SpindleError};
use crate::storage::ProfileStore;

/// Options for snapshot commands.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the export command.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutput {
    pub success: bool,
    pub profile_id: String,
    /// Destination file; `None` means the snapshot is in `snapshot`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip)]
    pub snapshot: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The export command implementation.
pub struct ExportCommand<S: ProfileStore> {
    env: CommandEnv<S>,
}

impl<S: ProfileStore> ExportCommand<S> {
    /// Create a new export command.
    pub fn new(env: CommandEnv<S>) -> Self {
        Self { env }
    }

    /// Export the active profile, to `output` if given.
    pub fn run(&self, output: Option<&Path>) -> ExportOutput {
        let profile_id = self.env.profile_id().to_string();
        match self.export(output) {
            Ok(snapshot) => ExportOutput {
                success: true,
                profile_id,
                path: output.map(Path::to_path_buf),
                snapshot,
                error: None,
            },
            Err(e) => ExportOutput {
                success: false,
                profile_id,
                path: output.map(Path::to_path_buf),
                snapshot: String::new(),
                error: Some(e.to_string()),
            },
        }
    }

    fn export(&self, output: Option<&Path>) -> Result<String> {
        let profile = self.env.store.load(self.env.profile_id())?;
        let snapshot = serde_json::to_string_pretty(&profile)?;
        if let Some(path) = output {
            fs::write(path, &snapshot).map_err(|e| SpindleError::storage(path, e))?;
        }
        Ok(snapshot)
    }

    /// Format output based on options.
    ///
    /// Without a destination file the snapshot itself is the output.
    pub fn format_output(&self, output: &ExportOutput, options: &SnapshotOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if output.success && output.path.is_none() {
            return output.snapshot.clone();
        }

        if options.json {
            return to_json(output);
        }

        match (&output.error, &output.path) {
            (Some(error), _) => format!("Export failed: {}\n", error),
            (None, Some(path)) => format!(
                "Exported profile {} to {}\n",
                output.profile_id,
                path.display()
            ),
            (None, None) => String::new(),
        }
    }
}

/// Output format for the import command.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutput {
    pub success: bool,
    pub profile_id: String,
    pub level: u32,
    pub badges: usize,
    pub tricks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The import command implementation.
pub struct ImportCommand<S: ProfileStore> {
    env: CommandEnv<S>,
}

impl<S: ProfileStore> ImportCommand<S> {
    /// Create a new import command.
    pub fn new(env: CommandEnv<S>) -> Self {
        Self { env }
    }

    /// Replace the active profile with the snapshot at `path`.
    pub fn run(&self, path: &Path) -> ImportOutput {
        let profile_id = self.env.profile_id().to_string();
        match self.import(path) {
            Ok(profile) => ImportOutput {
                success: true,
                profile_id,
                level: profile.xp.level,
                badges: profile.badges.len(),
                tricks: profile.item_progress.len(),
                error: None,
            },
            Err(e) => ImportOutput {
                success: false,
                profile_id,
                level: 0,
                badges: 0,
                tricks: 0,
                error: Some(e.to_string()),
            },
        }
    }

    fn import(&self, path: &Path) -> Result<ProfileState> {
        let content = fs::read_to_string(path).map_err(|e| SpindleError::storage(path, e))?;
        let mut profile: ProfileState = serde_json::from_str(&content)?;
        profile.check_schema()?;

        // Snapshots land in the active profile whatever id they were saved under
        profile.profile_id = self.env.profile_id().to_string();
        let limit = self.env.config.achievements.recent_limit.max(1);
        profile.recent_achievements.truncate(limit);
        self.env.store.put(&profile)?;

        tracing::info!(profile = %profile.profile_id, path = %path.display(), "profile imported");
        Ok(profile)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ImportOutput, options: &SnapshotOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return to_json(output);
        }

        match &output.error {
            Some(error) => format!("Import failed: {}\n", error),
            None => format!(
                "Imported profile {}: level {}, {} trick(s), {} badge(s)\n",
                output.profile_id, output.level, output.tricks, output.badges
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::env;
    use crate::config::Config;
    use crate::storage::traits::tests::populated_profile;
    use crate::core::Achievement;
    use crate::storage::{FileProfileStore, MemoryProfileStore};
    use tempfile::TempDir;

    #[test]
    fn test_export_to_stdout() {
        let (env, store, _home) = env();
        store.put(&populated_profile("default")).unwrap();

        let cmd = ExportCommand::new(env);
        let output = cmd.run(None);
        assert!(output.success);

        let text = cmd.format_output(&output, &SnapshotOptions::default());
        let parsed: ProfileState = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, store.get("default").unwrap().unwrap());
    }

    #[test]
    fn test_export_import_round_trip() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("backup.json");

        let (env, store, _home) = env();
        let original = populated_profile("default");
        store.put(&original).unwrap();
        let exported = ExportCommand::new(env).run(Some(&file));
        assert!(exported.success);
        assert!(file.exists());

        let mut config = Config::default();
        config.profile.id = "restored".to_string();
        let target = MemoryProfileStore::new();
        let cmd = ImportCommand::new(CommandEnv::with_home(target, config, None));
        let output = cmd.run(&file);
        assert!(output.success, "{:?}", output.error);
        assert_eq!(output.profile_id, "restored");

        let restored = cmd.env.store.get("restored").unwrap().unwrap();
        assert_eq!(
            ProfileState {
                profile_id: "default".to_string(),
                ..restored.clone()
            },
            original
        );
        // Hydration keeps the stored streak as-is
        assert_eq!(restored.streak, original.streak);
    }

    #[test]
    fn test_import_caps_recent_achievements() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("long-feed.json");

        let mut snapshot = populated_profile("default");
        let template = snapshot.recent_achievements[0].clone();
        snapshot.recent_achievements = (0..15)
            .map(|i| Achievement {
                id: format!("{}-{}", template.badge.id(), i),
                ..template.clone()
            })
            .collect();
        fs::write(&file, serde_json::to_string(&snapshot).unwrap()).unwrap();

        let (env, store, _home) = env();
        let limit = env.config.achievements.recent_limit;
        let output = ImportCommand::new(env).run(&file);
        assert!(output.success, "{:?}", output.error);

        let saved = store.get("default").unwrap().unwrap();
        assert_eq!(saved.recent_achievements.len(), limit);
        assert_eq!(saved.recent_achievements[0].id, snapshot.recent_achievements[0].id);
    }

    #[test]
    fn test_export_refuses_unreadable_profile() {
        let dir = TempDir::new().unwrap();
        let store = FileProfileStore::with_dir(dir.path()).unwrap();
        fs::write(dir.path().join("default.json"), "{ truncated").unwrap();

        let cmd = ExportCommand::new(CommandEnv::with_home(store, Config::default(), None));
        let output = cmd.run(None);
        assert!(!output.success);
        assert!(cmd
            .format_output(&output, &SnapshotOptions::default())
            .starts_with("Export failed"));
    }

    #[test]
    fn test_import_missing_file() {
        let (env, _store, _home) = env();
        let cmd = ImportCommand::new(env);
        let output = cmd.run(Path::new("/nonexistent/backup.json"));
        assert!(!output.success);
        assert!(cmd
            .format_output(&output, &SnapshotOptions::default())
            .starts_with("Import failed"));
    }

    #[test]
    fn test_import_rejects_invalid_and_future_snapshots() {
        let dir = TempDir::new().unwrap();
        let (env, store, _home) = env();
        let cmd = ImportCommand::new(env);

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "not json").unwrap();
        assert!(!cmd.run(&garbage).success);

        let future = dir.path().join("future.json");
        fs::write(&future, r#"{"schema_version": 99}"#).unwrap();
        let output = cmd.run(&future);
        assert!(!output.success);
        assert!(output.error.unwrap().contains("newer"));

        assert!(store.get("default").unwrap().is_none());
    }
}
