//! Unified error types for Spindle with fail-open philosophy.
//!
//! The progression engine itself never fails: unknown ids auto-create and
//! terminal states are no-ops. Errors only come from the layers around it
//! (storage, config, catalogs). Those layers log a warning and fall back to
//! safe defaults rather than losing a learner's practice session.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Spindle operations.
#[derive(Error, Debug)]
pub enum SpindleError {
    /// I/O errors from profile or journal file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Badge catalog loading or validation errors.
    #[error("catalog error: {message}")]
    Catalog { message: String },

    /// Snapshot written by a newer Spindle.
    #[error("profile schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: u8, supported: u8 },
}

/// Exit codes for the `spindle` binary.
pub mod exit_codes {
    /// Command succeeded.
    pub const SUCCESS: i32 = 0;
    /// Command ran but reported a failure (bad input, unwritable snapshot).
    pub const ERROR: i32 = 1;
    /// Panic; details are in `<home>/crash.log`.
    pub const CRASH: i32 = 2;
}

/// A specialized Result type for Spindle operations.
pub type Result<T> = std::result::Result<T, SpindleError>;

impl SpindleError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a catalog error.
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create an unsupported schema error.
    pub fn unsupported_schema(found: u8, supported: u8) -> Self {
        Self::UnsupportedSchema { found, supported }
    }
}

impl From<io::Error> for SpindleError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SpindleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and return a safe default instead of propagating it.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}
