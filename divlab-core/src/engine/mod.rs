//! Derived-metrics engine — frequency, TTM, and forward projection.
//!
//! `compute_metrics` is the single entry point. It only looks at events on or
//! before the reference date, so re-running with a historical reference date
//! reproduces what the dataset would have shown on that day.

pub mod forward;
pub mod frequency;
pub mod ttm;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{DerivedMetrics, PayoutFrequency, SymbolRecord};

pub use forward::{forward_annual_dividend, next_ex_date, project, yield_on_price, Projection};
pub use frequency::{classify_frequency, nearest_band, FrequencyBand, FREQUENCY_BANDS};
pub use ttm::{ttm_dividend, ttm_payment_count, TTM_WINDOW_DAYS};

/// The record's data cannot produce meaningful metrics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("invalid dividend amount {amount} on {ex_date} for '{symbol}'")]
    InvalidAmount {
        symbol: String,
        ex_date: NaiveDate,
        amount: f64,
    },
}

/// Compute all derived metrics for one symbol as of `reference`.
pub fn compute_metrics(
    record: &SymbolRecord,
    reference: NaiveDate,
) -> Result<DerivedMetrics, ComputationError> {
    if let Some(bad) = record.events().iter().find(|e| !e.is_valid()) {
        return Err(ComputationError::InvalidAmount {
            symbol: record.symbol.clone(),
            ex_date: bad.ex_date,
            amount: bad.amount,
        });
    }

    let history = record.events_through(reference);
    let last = history.last();

    let frequency = classify_frequency(history);
    let ttm = ttm_dividend(history, reference);
    let projection = project(frequency, last.map(|e| e.amount), ttm, record.price);
    let ttm_yield = match frequency {
        PayoutFrequency::Unknown => None,
        _ => yield_on_price(ttm, record.price),
    };

    Ok(DerivedMetrics {
        symbol: record.symbol.clone(),
        price: record.price,
        ttm_dividend: ttm,
        inferred_frequency: frequency,
        forward_annual_dividend: projection.forward_annual_dividend,
        forward_yield: projection.forward_yield,
        ttm_yield,
        dividend_count: history.len(),
        ttm_payment_count: ttm_payment_count(history, reference),
        last_ex_date: last.map(|e| e.ex_date),
        last_amount: last.map(|e| e.amount),
        next_ex_date: next_ex_date(
            frequency,
            last.map(|e| e.ex_date),
            record.calendar.as_ref(),
            reference,
        ),
    })
}
