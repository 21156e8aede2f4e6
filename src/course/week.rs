//! Week Resolution
//!
//! Maps calendar time to 1-based course-week indices and back. Week `w`
//! covers the seven days starting at `start + 7*(w-1)`, so the start date
//! itself is week 1 and boundary days always resolve to the week they open.
//!
//! `resolve_week` and `date_for_week` are inverse-consistent:
//! `resolve_week(start, date_for_week(start, w)) == w` for every `w >= 1`.

use chrono::{Days, NaiveDate};

use crate::types::{Result, ScribeError};

/// Compute the course week containing `today`.
///
/// Dates before the course start fail with `OutOfRangeWeek` rather than
/// clamping to week 1, which would mask a misconfigured start date.
pub fn resolve_week(start: NaiveDate, today: NaiveDate) -> Result<u32> {
    let elapsed_days = (today - start).num_days();
    if elapsed_days < 0 {
        return Err(ScribeError::OutOfRangeWeek { start, today });
    }
    Ok((elapsed_days / 7) as u32 + 1)
}

/// Compute the calendar date on which `week` begins.
///
/// `week` must be >= 1; week numbers below 1 are unrepresentable in the
/// course model and are saturated here.
pub fn date_for_week(start: NaiveDate, week: u32) -> NaiveDate {
    start + Days::new(7 * u64::from(week.saturating_sub(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_start_date_is_week_one() {
        let start = date("2025-09-02");
        assert_eq!(resolve_week(start, date("2025-09-02")).unwrap(), 1);
    }

    #[test]
    fn test_week_boundaries() {
        let start = date("2025-09-02");
        // Last day of week 1
        assert_eq!(resolve_week(start, date("2025-09-08")).unwrap(), 1);
        // First day of week 2
        assert_eq!(resolve_week(start, date("2025-09-09")).unwrap(), 2);
    }

    #[test]
    fn test_before_start_is_an_error() {
        let start = date("2025-09-02");
        assert!(matches!(
            resolve_week(start, date("2025-09-01")),
            Err(ScribeError::OutOfRangeWeek { .. })
        ));
        assert!(matches!(
            resolve_week(start, date("2024-01-01")),
            Err(ScribeError::OutOfRangeWeek { .. })
        ));
    }

    #[test]
    fn test_date_for_week() {
        let start = date("2025-09-02");
        assert_eq!(date_for_week(start, 1), start);
        assert_eq!(date_for_week(start, 2), date("2025-09-09"));
        assert_eq!(date_for_week(start, 8), date("2025-10-21"));
    }

    proptest! {
        #[test]
        fn prop_week_round_trip(offset_days in 0i64..20_000, week in 1u32..=520) {
            let start = date("2000-01-01") + Days::new(offset_days as u64);
            let day = date_for_week(start, week);
            prop_assert_eq!(resolve_week(start, day).unwrap(), week);
        }

        #[test]
        fn prop_whole_week_resolves_same(week in 1u32..=520, day_in_week in 0u64..7) {
            let start = date("2025-09-02");
            let day = date_for_week(start, week) + Days::new(day_in_week);
            prop_assert_eq!(resolve_week(start, day).unwrap(), week);
        }
    }
}
