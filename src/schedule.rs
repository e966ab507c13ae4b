//! Watering schedule arithmetic.
//!
//! The next watering date is always derived from the last watered date and
//! the watering frequency; it is never accepted from clients. All arithmetic
//! is plain calendar-day addition on `NaiveDate` - no timezones.

use chrono::{Days, NaiveDate};

/// Compute the next watering date: `last_watered + frequency_days` calendar days.
///
/// `frequency_days` must already be validated to be >= 1 (the API layer
/// rejects anything lower and the database carries a CHECK constraint).
/// Saturates at `NaiveDate::MAX` instead of overflowing.
pub fn next_watering_date(last_watered: NaiveDate, frequency_days: u32) -> NaiveDate {
    last_watered
        .checked_add_days(Days::new(u64::from(frequency_days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Resolved schedule values after applying a partial update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchedule {
    pub last_watered_date: NaiveDate,
    pub watering_frequency_days: i32,
    pub next_watering_date: NaiveDate,
}

/// Resolve the effective schedule for a partial update.
///
/// Effective values fall back to the stored record for any schedule input the
/// patch leaves out. Returns `None` when the patch touches neither schedule
/// input, in which case the stored `next_watering_date` must be left as-is.
pub fn resolve_patch(
    stored_last: NaiveDate,
    stored_frequency: i32,
    patch_last: Option<NaiveDate>,
    patch_frequency: Option<i32>,
) -> Option<ResolvedSchedule> {
    if patch_last.is_none() && patch_frequency.is_none() {
        return None;
    }

    let last_watered_date = patch_last.unwrap_or(stored_last);
    let watering_frequency_days = patch_frequency.unwrap_or(stored_frequency);
    // The frequency invariant (>= 1) holds for both branches: stored values
    // are constrained by the database, patch values by API validation.
    debug_assert!(
        watering_frequency_days >= 1,
        "watering frequency must be >= 1, got {watering_frequency_days}"
    );
    let frequency_days = u32::try_from(watering_frequency_days).unwrap_or(0);
    let next_watering_date = next_watering_date(last_watered_date, frequency_days);

    Some(ResolvedSchedule {
        last_watered_date,
        watering_frequency_days,
        next_watering_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_simple_addition() {
        assert_eq!(next_watering_date(date(2024, 3, 1), 7), date(2024, 3, 8));
        assert_eq!(next_watering_date(date(2024, 3, 1), 1), date(2024, 3, 2));
    }

    #[test]
    fn test_month_rollover_leap_year() {
        // February 2024 has 29 days
        assert_eq!(next_watering_date(date(2024, 2, 20), 10), date(2024, 3, 1));
        assert_eq!(next_watering_date(date(2023, 2, 20), 10), date(2023, 3, 2));
    }

    #[test]
    fn test_year_rollover() {
        assert_eq!(next_watering_date(date(2023, 12, 25), 10), date(2024, 1, 4));
    }

    #[test]
    fn test_large_frequency() {
        assert_eq!(next_watering_date(date(2024, 1, 1), 365), date(2024, 12, 31));
    }

    #[test]
    fn test_overflow_saturates() {
        assert_eq!(next_watering_date(NaiveDate::MAX, 1), NaiveDate::MAX);
    }

    #[test]
    fn test_patch_with_no_schedule_inputs_does_not_recompute() {
        assert_eq!(resolve_patch(date(2024, 3, 1), 7, None, None), None);
    }

    #[test]
    fn test_patch_with_new_last_watered_date() {
        let resolved = resolve_patch(date(2024, 3, 1), 7, Some(date(2024, 3, 10)), None).unwrap();
        assert_eq!(resolved.last_watered_date, date(2024, 3, 10));
        assert_eq!(resolved.watering_frequency_days, 7);
        assert_eq!(resolved.next_watering_date, date(2024, 3, 17));
    }

    #[test]
    fn test_patch_with_new_frequency() {
        let resolved = resolve_patch(date(2024, 3, 1), 7, None, Some(3)).unwrap();
        assert_eq!(resolved.last_watered_date, date(2024, 3, 1));
        assert_eq!(resolved.watering_frequency_days, 3);
        assert_eq!(resolved.next_watering_date, date(2024, 3, 4));
    }

    #[test]
    #[should_panic(expected = "watering frequency must be >= 1")]
    fn test_patch_with_negative_frequency_is_rejected() {
        resolve_patch(date(2024, 3, 1), 7, None, Some(-3));
    }

    #[test]
    fn test_patch_with_both_schedule_inputs() {
        let resolved = resolve_patch(date(2024, 3, 1), 7, Some(date(2024, 2, 20)), Some(10)).unwrap();
        assert_eq!(resolved.next_watering_date, date(2024, 3, 1));
    }
}
