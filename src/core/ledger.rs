//! XP ledger for Spindle.
//!
//! Credits XP and derives the level from the leveling table. A single large
//! credit may jump several levels; nothing ever lowers the level.

use serde::{Deserialize, Serialize};

use crate::core::leveling::{xp_for_level, MAX_LEVEL};
use crate::core::state::XpState;

/// Result of an XP credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelUp {
    /// Whether at least one level was gained.
    pub leveled_up: bool,
    /// Final level, present only when `leveled_up`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_level: Option<u32>,
}

impl LevelUp {
    /// No level change.
    pub fn none() -> Self {
        Self::default()
    }

    /// Leveled up to `level`.
    pub fn to(level: u32) -> Self {
        Self {
            leveled_up: true,
            new_level: Some(level),
        }
    }
}

/// Progress within the current level band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XpProgress {
    /// XP earned since the current level's threshold.
    pub current: u64,
    /// Width of the current band.
    pub required: u64,
    /// `current / required` as a percentage, clamped to 100.
    pub percentage: f64,
}

impl XpState {
    /// Credit `amount` XP and level up as far as the new total allows.
    pub fn add_xp(&mut self, amount: u64) -> LevelUp {
        self.xp = self.xp.saturating_add(amount);
        self.lifetime_xp = self.lifetime_xp.saturating_add(amount);

        let start = self.level;
        while self.level < MAX_LEVEL && self.xp >= xp_for_level(self.level + 1) {
            self.level += 1;
        }

        if self.level > start {
            tracing::debug!(from = start, to = self.level, xp = self.xp, "level up");
            LevelUp::to(self.level)
        } else {
            LevelUp::none()
        }
    }

    /// Progress through the current level band.
    ///
    /// At the cap the band is the last one (49 → 50) and the percentage is
    /// pinned to 100.
    pub fn xp_progress(&self) -> XpProgress {
        let level = self.level.clamp(1, MAX_LEVEL);

        if level >= MAX_LEVEL {
            let floor = xp_for_level(MAX_LEVEL);
            return XpProgress {
                current: self.xp.saturating_sub(floor),
                required: floor - xp_for_level(MAX_LEVEL - 1),
                percentage: 100.0,
            };
        }

        let floor = xp_for_level(level);
        let current = self.xp.saturating_sub(floor);
        let required = xp_for_level(level + 1) - floor;
        let percentage = (current as f64 / required as f64 * 100.0).min(100.0);

        XpProgress {
            current,
            required,
            percentage,
        }
    }

    /// Check if the level cap has been reached.
    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }
}
