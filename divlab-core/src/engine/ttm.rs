//! Trailing-twelve-month cash dividend aggregation.
//!
//! Window: `[reference - 365 days, reference]`, inclusive at both ends.
//! Order-independent: the input does not need to be sorted.

use chrono::{Duration, NaiveDate};

use crate::domain::DividendEvent;

/// Length of the trailing window in days.
pub const TTM_WINDOW_DAYS: i64 = 365;

/// First day of the trailing window ending at `reference`, clamped to the
/// earliest representable date.
pub fn window_start(reference: NaiveDate) -> NaiveDate {
    reference
        .checked_sub_signed(Duration::days(TTM_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

/// True if `date` falls inside the trailing window ending at `reference`.
pub fn in_window(date: NaiveDate, reference: NaiveDate) -> bool {
    date >= window_start(reference) && date <= reference
}

/// Sum of amounts inside the window. Zero (not an error) when nothing matches.
pub fn ttm_dividend(events: &[DividendEvent], reference: NaiveDate) -> f64 {
    events
        .iter()
        .filter(|e| in_window(e.ex_date, reference))
        .fold(0.0, |acc, e| acc + e.amount)
}

/// Number of payments inside the window.
pub fn ttm_payment_count(events: &[DividendEvent], reference: NaiveDate) -> usize {
    events.iter().filter(|e| in_window(e.ex_date, reference)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_history_sums_to_zero() {
        assert_eq!(ttm_dividend(&[], d(2024, 1, 1)), 0.0);
        assert_eq!(ttm_payment_count(&[], d(2024, 1, 1)), 0);
    }

    #[test]
    fn window_start_clamps_at_min_date() {
        let reference = NaiveDate::MIN + Duration::days(10);
        assert_eq!(window_start(reference), NaiveDate::MIN);
        let events = vec![DividendEvent::new(NaiveDate::MIN, 1.0)];
        assert_eq!(ttm_dividend(&events, reference), 1.0);
    }

    #[test]
    fn boundaries_are_inclusive() {
        let reference = d(2024, 1, 1);
        let events = vec![
            DividendEvent::new(window_start(reference), 1.0),
            DividendEvent::new(reference, 2.0),
        ];
        assert_eq!(window_start(reference), d(2023, 1, 1));
        assert_eq!(ttm_dividend(&events, reference), 3.0);
    }

    #[test]
    fn excludes_events_outside_window() {
        let reference = d(2024, 1, 1);
        let events = vec![
            DividendEvent::new(d(2022, 12, 31), 10.0),
            DividendEvent::new(d(2023, 6, 1), 1.0),
            DividendEvent::new(d(2024, 1, 2), 10.0),
        ];
        assert_eq!(ttm_dividend(&events, reference), 1.0);
        assert_eq!(ttm_payment_count(&events, reference), 1);
    }

    #[test]
    fn stale_history_sums_to_zero() {
        let events = vec![DividendEvent::new(d(2015, 3, 1), 0.8)];
        assert_eq!(ttm_dividend(&events, d(2024, 1, 1)), 0.0);
    }

    #[test]
    fn leap_year_window_is_365_days() {
        // 2024 is a leap year: 2024-12-31 minus 365 days is 2024-01-01.
        assert_eq!(window_start(d(2024, 12, 31)), d(2024, 1, 1));
    }
}
