//! File-based profile storage for Spindle.
//!
//! Profiles are stored as JSON files in `~/.spindle/profiles/`.
//! Atomic writes are achieved via temp file + rename pattern, so concurrent
//! writers resolve to whichever snapshot landed last.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::profiles_dir;
use crate::core::ProfileState;
use crate::error::{Result, SpindleError};
use crate::storage::ProfileStore;

/// File-based profile storage.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    /// Directory where profile files are stored.
    profiles_dir: PathBuf,
}

impl FileProfileStore {
    /// Create a store in the default directory.
    ///
    /// Uses `~/.spindle/profiles/` or `$SPINDLE_HOME/profiles/`.
    pub fn new() -> Result<Self> {
        let dir = profiles_dir().ok_or_else(|| {
            SpindleError::config("Could not determine profiles directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a store in a custom directory.
    pub fn with_dir(profiles_dir: impl Into<PathBuf>) -> Result<Self> {
        let profiles_dir = profiles_dir.into();

        if !profiles_dir.exists() {
            fs::create_dir_all(&profiles_dir)
                .map_err(|e| SpindleError::storage(&profiles_dir, e))?;
        }

        Ok(Self { profiles_dir })
    }

    /// Directory holding the snapshots.
    pub fn dir(&self) -> &Path {
        &self.profiles_dir
    }

    fn profile_path(&self, id: &str) -> PathBuf {
        self.profiles_dir.join(format!("{}.json", id))
    }

    fn temp_path(&self, id: &str) -> PathBuf {
        self.profiles_dir.join(format!(".{}.json.tmp", id))
    }

    /// Write a profile atomically using temp file + rename.
    fn atomic_write(&self, profile: &ProfileState) -> Result<()> {
        let final_path = self.profile_path(&profile.profile_id);
        let temp_path = self.temp_path(&profile.profile_id);

        let json = serde_json::to_string_pretty(profile)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| SpindleError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| SpindleError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| SpindleError::storage(&temp_path, e))?;
        }

        // Atomic on POSIX
        fs::rename(&temp_path, &final_path).map_err(|e| SpindleError::storage(&final_path, e))?;

        tracing::debug!(profile = %profile.profile_id, path = %final_path.display(), "profile saved");
        Ok(())
    }
}

impl ProfileStore for FileProfileStore {
    fn get(&self, id: &str) -> Result<Option<ProfileState>> {
        let path = self.profile_path(id);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| SpindleError::storage(&path, e))?;
        let mut profile: ProfileState = serde_json::from_str(&content)?;

        // The file name is authoritative
        profile.profile_id = id.to_string();

        Ok(Some(profile))
    }

    fn put(&self, profile: &ProfileState) -> Result<()> {
        self.atomic_write(profile)
    }
}
