//! Daily practice streak calculator.
//!
//! Streaks count calendar days, not rolling 24h windows. Calendar days are
//! taken in the time zone of the `now` passed in, so callers decide the zone
//! (the engine uses the learner's local zone).
//!
//! Rule, with `d = day(now) - day(last)`:
//! - no previous activity: start at 1
//! - `d <= 0`: unchanged (already counted today, or the clock went backwards)
//! - `d == 1`: extend by one
//! - `d > 1`: reset to 1

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::state::StreakState;

/// What a streak recalculation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakUpdate {
    /// First activity ever.
    Started,
    /// Already counted for this day.
    Unchanged,
    /// Consecutive day.
    Extended,
    /// Gap of more than a day; back to 1.
    Reset,
}

impl StreakState {
    /// Record an activity happening at `now`.
    pub fn record_activity<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> StreakUpdate {
        let update = match self.last_activity_date {
            None => {
                self.current_streak = 1;
                StreakUpdate::Started
            }
            Some(last) => match days_between(&last, now) {
                d if d <= 0 => return StreakUpdate::Unchanged,
                1 => {
                    self.current_streak = self.current_streak.saturating_add(1);
                    StreakUpdate::Extended
                }
                _ => {
                    self.current_streak = 1;
                    StreakUpdate::Reset
                }
            },
        };

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_activity_date = Some(now.with_timezone(&Utc));

        tracing::debug!(
            ?update,
            current = self.current_streak,
            longest = self.longest_streak,
            "streak recalculated"
        );
        update
    }

    /// Whether the streak is still alive (activity today or yesterday).
    pub fn is_active<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        match self.last_activity_date {
            Some(last) => days_between(&last, now) <= 1,
            None => false,
        }
    }

    /// Streak to show the learner: the current streak, or 0 once lapsed.
    pub fn display_streak<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u32 {
        if self.is_active(now) {
            self.current_streak
        } else {
            0
        }
    }
}

/// Calendar-day difference between `last` and `now`, in `now`'s zone.
fn days_between<Tz: TimeZone>(last: &DateTime<Utc>, now: &DateTime<Tz>) -> i64 {
    let today: NaiveDate = now.date_naive();
    let last_day: NaiveDate = last.with_timezone(&now.timezone()).date_naive();
    (today - last_day).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_first_activity_starts_streak() {
        let mut streak = StreakState::default();
        let now = at(2026, 2, 19, 12, 0);

        assert_eq!(streak.record_activity(&now), StreakUpdate::Started);
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 1);
        assert_eq!(streak.last_activity_date, Some(now));
    }

    #[test]
    fn test_same_day_is_unchanged() {
        let mut streak = StreakState::default();
        let morning = at(2026, 2, 19, 8, 0);
        streak.record_activity(&morning);

        let evening = at(2026, 2, 19, 22, 0);
        assert_eq!(streak.record_activity(&evening), StreakUpdate::Unchanged);
        assert_eq!(streak.current_streak, 1);
        // The no-op branch leaves the stored timestamp untouched
        assert_eq!(streak.last_activity_date, Some(morning));
    }

    #[test]
    fn test_next_day_extends() {
        let mut streak = StreakState::default();
        streak.record_activity(&at(2026, 2, 18, 12, 0));
        assert_eq!(
            streak.record_activity(&at(2026, 2, 19, 12, 0)),
            StreakUpdate::Extended
        );
        assert_eq!(streak.current_streak, 2);
        assert_eq!(streak.longest_streak, 2);
    }

    #[test]
    fn test_just_across_midnight_extends() {
        let mut streak = StreakState::default();
        streak.record_activity(&at(2026, 2, 18, 23, 59));
        assert_eq!(
            streak.record_activity(&at(2026, 2, 19, 0, 1)),
            StreakUpdate::Extended
        );
        assert_eq!(streak.current_streak, 2);
    }

    #[test]
    fn test_two_calendar_days_resets() {
        // Only 26 hours apart, but the 18th was skipped
        let mut streak = StreakState::default();
        streak.record_activity(&at(2026, 2, 17, 23, 0));
        assert_eq!(
            streak.record_activity(&at(2026, 2, 19, 1, 0)),
            StreakUpdate::Reset
        );
        assert_eq!(streak.current_streak, 1);
    }

    #[test]
    fn test_gap_resets_but_keeps_longest() {
        let mut streak = StreakState::default();
        let start = at(2026, 2, 1, 12, 0);
        for day in 0..5 {
            streak.record_activity(&(start + Duration::days(day)));
        }
        assert_eq!(streak.current_streak, 5);

        let later = start + Duration::days(10);
        assert_eq!(streak.record_activity(&later), StreakUpdate::Reset);
        assert_eq!(streak.current_streak, 1);
        assert_eq!(streak.longest_streak, 5);
        assert_eq!(streak.last_activity_date, Some(later));
    }

    #[test]
    fn test_clock_backwards_is_unchanged() {
        let mut streak = StreakState::default();
        streak.record_activity(&at(2026, 2, 19, 12, 0));
        assert_eq!(
            streak.record_activity(&at(2026, 2, 17, 12, 0)),
            StreakUpdate::Unchanged
        );
        assert_eq!(streak.current_streak, 1);
    }

    #[test]
    fn test_calendar_day_uses_callers_zone() {
        // 23:30 UTC on the 18th is already the 19th at UTC+2
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let mut streak = StreakState::default();
        streak.record_activity(&at(2026, 2, 18, 23, 30).with_timezone(&plus_two));

        let next = at(2026, 2, 19, 8, 0).with_timezone(&plus_two);
        assert_eq!(streak.record_activity(&next), StreakUpdate::Unchanged);

        let mut utc_streak = StreakState::default();
        utc_streak.record_activity(&at(2026, 2, 18, 23, 30));
        assert_eq!(
            utc_streak.record_activity(&at(2026, 2, 19, 8, 0)),
            StreakUpdate::Extended
        );
    }

    #[test]
    fn test_is_active_and_display() {
        let mut streak = StreakState::default();
        let now = at(2026, 2, 19, 12, 0);
        assert!(!streak.is_active(&now));
        assert_eq!(streak.display_streak(&now), 0);

        streak.record_activity(&at(2026, 2, 18, 9, 0));
        assert!(streak.is_active(&now));
        assert_eq!(streak.display_streak(&now), 1);

        let lapsed = at(2026, 2, 21, 12, 0);
        assert!(!streak.is_active(&lapsed));
        assert_eq!(streak.display_streak(&lapsed), 0);
        // Selectors never mutate
        assert_eq!(streak.current_streak, 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: longest >= current after any sequence of activities
            #[test]
            fn prop_longest_covers_current(
                offsets in prop::collection::vec(-2i64..96, 1..60),
            ) {
                let mut streak = StreakState::default();
                let mut now = at(2026, 1, 1, 0, 0);
                for hours in offsets {
                    now += Duration::hours(hours);
                    streak.record_activity(&now);
                    prop_assert!(streak.longest_streak >= streak.current_streak);
                    prop_assert!(streak.current_streak >= 1);
                }
            }

            // Property: one activity per day for n days gives a streak of n
            #[test]
            fn prop_daily_activity_counts_days(days in 1i64..60, hour in 0u32..24) {
                let mut streak = StreakState::default();
                let start = at(2026, 3, 1, hour, 0);
                for day in 0..days {
                    streak.record_activity(&(start + Duration::days(day)));
                }
                prop_assert_eq!(streak.current_streak as i64, days);
                prop_assert_eq!(streak.longest_streak as i64, days);
            }
        }
    }
}
