//! Derived per-symbol metrics and the payout-frequency classification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inferred payout cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutFrequency {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    /// Too little history, or gaps that match no regular cadence.
    Irregular,
    /// No payment history at all.
    Unknown,
}

impl PayoutFrequency {
    /// Payments per year for regular cadences, `None` for irregular/unknown.
    pub fn occurrences_per_year(&self) -> Option<u32> {
        match self {
            Self::Monthly => Some(12),
            Self::Quarterly => Some(4),
            Self::SemiAnnual => Some(2),
            Self::Annual => Some(1),
            Self::Irregular | Self::Unknown => None,
        }
    }

    /// Nominal spacing between payments in days, used to estimate the next ex-date.
    pub fn nominal_period_days(&self) -> Option<i64> {
        self.occurrences_per_year().map(|n| (365.0 / n as f64).round() as i64)
    }

    pub fn is_regular(&self) -> bool {
        self.occurrences_per_year().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::SemiAnnual => "semiannual",
            Self::Annual => "annual",
            Self::Irregular => "irregular",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PayoutFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics computed fresh for one symbol in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub symbol: String,
    pub price: Option<f64>,
    pub ttm_dividend: f64,
    pub inferred_frequency: PayoutFrequency,
    pub forward_annual_dividend: f64,
    /// `None` when the price is missing or not positive.
    pub forward_yield: Option<f64>,
    pub ttm_yield: Option<f64>,
    /// Distinct payment dates on or before the reference date.
    pub dividend_count: usize,
    pub ttm_payment_count: usize,
    pub last_ex_date: Option<NaiveDate>,
    pub last_amount: Option<f64>,
    pub next_ex_date: Option<NaiveDate>,
}
