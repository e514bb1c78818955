//! Event canonicalization: sort, merge same-day payments, drop zero rows.
//!
//! Invalid amounts (negative, NaN, infinite) are deliberately kept so the
//! metrics engine can reject the symbol instead of silently dropping them.

use crate::domain::DividendEvent;

/// Canonicalize an event list.
///
/// - sorted ascending by ex-date (stable)
/// - one event per date; amounts on the same date are summed
/// - zero-amount events removed
///
/// When an invalid amount meets a valid one on the same date the invalid
/// amount wins, so it cannot be masked by the sum.
pub fn canonicalize_events(mut events: Vec<DividendEvent>) -> Vec<DividendEvent> {
    events.sort_by_key(|e| e.ex_date);

    let mut merged: Vec<DividendEvent> = Vec::with_capacity(events.len());
    for event in events {
        match merged.last_mut() {
            Some(prev) if prev.ex_date == event.ex_date => {
                prev.amount = merge_amounts(prev.amount, event.amount);
            }
            _ => merged.push(event),
        }
    }

    merged.retain(|e| e.amount != 0.0);
    merged
}

fn merge_amounts(a: f64, b: f64) -> f64 {
    let valid = |x: f64| x.is_finite() && x >= 0.0;
    match (valid(a), valid(b)) {
        (true, true) => a + b,
        (false, _) => a,
        (true, false) => b,
    }
}

/// True if `events` is strictly ascending by ex-date.
pub fn is_canonical(events: &[DividendEvent]) -> bool {
    events.windows(2).all(|w| w[0].ex_date < w[1].ex_date)
}
