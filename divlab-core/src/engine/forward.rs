//! Forward projection: annual dividend, yields, and the next ex-date.

use chrono::{Duration, NaiveDate};

use crate::domain::{CalendarHint, PayoutFrequency};

/// Projected forward figures for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub forward_annual_dividend: f64,
    pub forward_yield: Option<f64>,
}

/// Project the forward annual dividend.
///
/// Regular cadences annualize the most recent payment; `Irregular` falls
/// back to the TTM sum; `Unknown` is zero.
pub fn forward_annual_dividend(
    frequency: PayoutFrequency,
    last_amount: Option<f64>,
    ttm_dividend: f64,
) -> f64 {
    match (frequency, frequency.occurrences_per_year()) {
        (_, Some(n)) => last_amount.unwrap_or(0.0) * n as f64,
        (PayoutFrequency::Irregular, None) => ttm_dividend,
        _ => 0.0,
    }
}

/// `amount / price`, or `None` when the price is missing, non-finite, or ≤ 0.
///
/// `None` means "cannot be determined" and is distinct from a zero yield.
pub fn yield_on_price(amount: f64, price: Option<f64>) -> Option<f64> {
    price
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(|p| amount / p)
}

/// Full projection from the classified frequency and payment history.
///
/// An `Unknown` cadence (no payments at all) has no determinable yield, so
/// `forward_yield` is `None` whatever the price.
pub fn project(
    frequency: PayoutFrequency,
    last_amount: Option<f64>,
    ttm_dividend: f64,
    price: Option<f64>,
) -> Projection {
    let forward = forward_annual_dividend(frequency, last_amount, ttm_dividend);
    let forward_yield = match frequency {
        PayoutFrequency::Unknown => None,
        _ => yield_on_price(forward, price),
    };
    Projection {
        forward_annual_dividend: forward,
        forward_yield,
    }
}

/// Next expected ex-date on or after `reference`.
///
/// Uses the calendar hint when it is not in the past; otherwise steps the
/// last ex-date forward by the nominal period of a regular cadence. Returns
/// `None` if stepping would leave the representable date range.
pub fn next_ex_date(
    frequency: PayoutFrequency,
    last_ex_date: Option<NaiveDate>,
    calendar: Option<&CalendarHint>,
    reference: NaiveDate,
) -> Option<NaiveDate> {
    if let Some(hinted) = calendar.and_then(|c| c.ex_dividend_date) {
        if hinted >= reference {
            return Some(hinted);
        }
    }

    let step = Duration::days(frequency.nominal_period_days()?);
    let mut next = last_ex_date?.checked_add_signed(step)?;
    while next < reference {
        next = next.checked_add_signed(step)?;
    }
    Some(next)
}
