//! In-memory profile storage for testing.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::core::ProfileState;
use crate::error::Result;
use crate::storage::ProfileStore;

/// In-memory profile store.
///
/// Thread-safe implementation using `RwLock<HashMap>`. Profiles are lost
/// when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, ProfileState>>,
}

impl MemoryProfileStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of profiles in the store.
    pub fn len(&self) -> usize {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, id: &str) -> Result<Option<ProfileState>> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles.get(id).cloned())
    }

    fn put(&self, profile: &ProfileState) -> Result<()> {
        let mut profiles = self
            .profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        profiles.insert(profile.profile_id.clone(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::traits::tests::{
        test_profile_store_crud, test_profile_store_hydration,
        test_profile_store_rejects_newer_schema,
    };

    #[test]
    fn test_memory_store_crud() {
        let store = MemoryProfileStore::new();
        test_profile_store_crud(&store);
    }

    #[test]
    fn test_memory_store_hydration() {
        let store = MemoryProfileStore::new();
        test_profile_store_hydration(&store);
    }

    #[test]
    fn test_memory_store_rejects_newer_schema() {
        let store = MemoryProfileStore::new();
        test_profile_store_rejects_newer_schema(&store);
    }

    #[test]
    fn test_len_and_is_empty() {
        let store = MemoryProfileStore::new();
        assert!(store.is_empty());

        store.put(&ProfileState::new("p1")).unwrap();
        store.put(&ProfileState::new("p1")).unwrap();

        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryProfileStore::new());
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let id = format!("p{}", i);
                    store.put(&ProfileState::new(id.as_str())).unwrap();
                    store.get(&id).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 10);
    }
}
