//! Learning path transitions.
//!
//! A path is started explicitly; module and path completion on a path that
//! was never started are no-ops handled by [`crate::core::Progression`].

use chrono::{DateTime, Utc};

use crate::core::state::PathProgress;

impl PathProgress {
    /// Complete a module and move to `next_module_id`.
    ///
    /// XP is only granted the first time a module is completed; the current
    /// module pointer is updated either way, except on a completed path where
    /// it stays cleared.
    pub fn complete_module(
        &mut self,
        module_id: &str,
        next_module_id: Option<String>,
        reward: u64,
    ) -> u64 {
        let first_time = self.completed_modules.insert(module_id.to_string());
        if !self.is_completed() {
            self.current_module_id = next_module_id;
        }

        if first_time {
            reward
        } else {
            0
        }
    }

    /// Complete the path. Returns `None` if it was already completed.
    pub fn complete(&mut self, now: DateTime<Utc>, reward: u64) -> Option<u64> {
        if self.is_completed() {
            return None;
        }

        self.completed_at = Some(now);
        self.current_module_id = None;
        Some(reward)
    }
}
