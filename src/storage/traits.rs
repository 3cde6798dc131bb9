//! Profile storage traits for Spindle.
//!
//! This module defines the `ProfileStore` trait for snapshot persistence.

use std::sync::Arc;

use crate::core::ProfileState;
use crate::error::{FailOpen, Result};

/// Trait for profile storage backends.
///
/// A backend stores whole snapshots; the last `put` for an id wins.
pub trait ProfileStore: Send + Sync {
    /// Retrieve a profile by ID.
    ///
    /// Returns `Ok(None)` if the profile doesn't exist.
    fn get(&self, id: &str) -> Result<Option<ProfileState>>;

    /// Save a profile snapshot, replacing any previous one.
    fn put(&self, profile: &ProfileState) -> Result<()>;

    /// Check if a profile exists.
    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Hydrate a profile for writing.
    ///
    /// A missing snapshot yields a fresh profile. An unreadable snapshot or
    /// one from a newer schema is an error, so it is never saved over.
    fn load(&self, id: &str) -> Result<ProfileState> {
        match self.get(id)? {
            Some(profile) => {
                profile.check_schema()?;
                Ok(profile)
            }
            None => Ok(ProfileState::new(id)),
        }
    }

    /// Hydrate a profile for reading, falling back to a fresh one.
    fn load_or_default(&self, id: &str) -> ProfileState {
        self.load(id)
            .fail_open_with("loading profile", ProfileState::new(id))
    }
}

/// Blanket implementation of ProfileStore for Arc-wrapped stores.
///
/// Lets tests keep a handle on a store they hand to a command.
impl<T: ProfileStore + ?Sized> ProfileStore for Arc<T> {
    fn get(&self, id: &str) -> Result<Option<ProfileState>> {
        (**self).get(id)
    }

    fn put(&self, profile: &ProfileState) -> Result<()> {
        (**self).put(profile)
    }
}
