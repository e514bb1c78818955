//! DividendEvent — one recorded cash payment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single dividend payment keyed by its ex-dividend date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub ex_date: NaiveDate,
    pub amount: f64,
}

impl DividendEvent {
    pub fn new(ex_date: NaiveDate, amount: f64) -> Self {
        Self { ex_date, amount }
    }

    /// True if the amount is a usable cash payment (finite and non-negative).
    pub fn is_valid(&self) -> bool {
        self.amount.is_finite() && self.amount >= 0.0
    }
}
