//! Leveling table for Spindle.
//!
//! Cumulative XP thresholds follow `floor(100 * (level - 1)^1.5)`, precomputed
//! once for levels `0..=MAX_LEVEL`. Level 1 starts at 0 XP.

use std::sync::LazyLock;

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 50;

/// Precomputed cumulative thresholds, indexed by level.
static LEVEL_THRESHOLDS: LazyLock<[u64; MAX_LEVEL as usize + 1]> = LazyLock::new(|| {
    let mut table = [0u64; MAX_LEVEL as usize + 1];
    for (level, threshold) in table.iter_mut().enumerate().skip(2) {
        // n * sqrt(n) is exact for perfect squares, unlike powf(1.5)
        let n = (level - 1) as f64;
        *threshold = (100.0 * n * n.sqrt()).floor() as u64;
    }
    table
});

/// Cumulative XP required to reach `level`.
///
/// Levels at or below 1 need nothing; levels above the cap read the cap's
/// threshold.
pub fn xp_for_level(level: u32) -> u64 {
    if level <= 1 {
        return 0;
    }
    LEVEL_THRESHOLDS[level.min(MAX_LEVEL) as usize]
}

/// Level reached with `xp` cumulative XP.
pub fn level_for_xp(xp: u64) -> u32 {
    let mut level = 1;
    while level < MAX_LEVEL && xp >= xp_for_level(level + 1) {
        level += 1;
    }
    level
}

/// Display title for a level.
pub fn level_title(level: u32) -> &'static str {
    match level {
        0..=4 => "Beginner",
        5..=9 => "Novice",
        10..=19 => "Intermediate",
        20..=29 => "Advanced",
        30..=39 => "Expert",
        40..=49 => "Master",
        _ => "Legend",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_levels_are_free() {
        assert_eq!(xp_for_level(0), 0);
        assert_eq!(xp_for_level(1), 0);
    }

    #[test]
    fn test_known_thresholds() {
        assert_eq!(xp_for_level(2), 100);
        assert_eq!(xp_for_level(3), 282);
        assert_eq!(xp_for_level(4), 519);
        assert_eq!(xp_for_level(5), 800);
        assert_eq!(xp_for_level(10), 2700);
        assert_eq!(xp_for_level(50), 34300);
    }

    #[test]
    fn test_thresholds_above_cap_clamp() {
        assert_eq!(xp_for_level(51), xp_for_level(50));
        assert_eq!(xp_for_level(u32::MAX), xp_for_level(50));
    }

    #[test]
    fn test_thresholds_strictly_increase() {
        for level in 2..MAX_LEVEL {
            assert!(xp_for_level(level + 1) > xp_for_level(level));
        }
    }

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 2);
        assert_eq!(level_for_xp(282), 3);
        assert_eq!(level_for_xp(34_299), 49);
        assert_eq!(level_for_xp(34_300), 50);
        assert_eq!(level_for_xp(u64::MAX), 50);
    }

    #[test]
    fn test_level_titles() {
        assert_eq!(level_title(1), "Beginner");
        assert_eq!(level_title(5), "Novice");
        assert_eq!(level_title(10), "Intermediate");
        assert_eq!(level_title(49), "Master");
        assert_eq!(level_title(50), "Legend");
    }
}
