//! Dataset assembly — one flat row per symbol, ready for export.
//!
//! Rows follow the input symbol order unless a [`SortKey`] is requested.
//! Symbols whose metrics could not be computed still get a row, marked
//! `degraded`, with descriptive fields filled and every derived field null.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use divlab_core::data::Universe;
use divlab_core::{CalendarHint, DerivedMetrics, DividendEvent, PayoutFrequency, SymbolRecord};
use serde::{Deserialize, Serialize};

use crate::batch::{BatchReport, SymbolOutcome};
use crate::config::ConfigError;

/// Whether a row's derived fields are populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    #[default]
    Ok,
    Degraded,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Degraded => "degraded",
        }
    }
}

/// One output row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    #[serde(default)]
    pub indices: Vec<String>,
    pub price: Option<f64>,
    pub ttm_dividend: Option<f64>,
    pub inferred_frequency: Option<PayoutFrequency>,
    pub forward_annual_dividend: Option<f64>,
    pub forward_yield: Option<f64>,
    pub ttm_yield: Option<f64>,
    pub dividend_count: Option<usize>,
    pub ttm_payment_count: Option<usize>,
    pub last_ex_date: Option<NaiveDate>,
    pub last_amount: Option<f64>,
    pub next_ex_date: Option<NaiveDate>,
    /// Announced payment date from the calendar snapshot.
    pub dividend_date: Option<NaiveDate>,
    pub status: RowStatus,
    /// Calendar snapshot as loaded (earnings and revenue estimates included).
    #[serde(default)]
    pub calendar: Option<CalendarHint>,
    /// Every recorded payment, ascending by ex-date.
    #[serde(default)]
    pub history: Vec<DividendEvent>,
}

impl DatasetRow {
    /// Row from computed metrics alone (no descriptive profile).
    pub fn from_metrics(metrics: &DerivedMetrics) -> Self {
        Self {
            symbol: metrics.symbol.clone(),
            price: metrics.price,
            ttm_dividend: Some(metrics.ttm_dividend),
            inferred_frequency: Some(metrics.inferred_frequency),
            forward_annual_dividend: Some(metrics.forward_annual_dividend),
            forward_yield: metrics.forward_yield,
            ttm_yield: metrics.ttm_yield,
            dividend_count: Some(metrics.dividend_count),
            ttm_payment_count: Some(metrics.ttm_payment_count),
            last_ex_date: metrics.last_ex_date,
            last_amount: metrics.last_amount,
            next_ex_date: metrics.next_ex_date,
            status: RowStatus::Ok,
            ..Default::default()
        }
    }

    /// Row for a computed symbol, including its profile, calendar, and history.
    pub fn computed(record: &SymbolRecord, metrics: &DerivedMetrics) -> Self {
        Self::from_metrics(metrics).with_record(record)
    }

    /// Row for a symbol whose metrics failed: raw fields only.
    pub fn degraded(record: &SymbolRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            price: record.price,
            status: RowStatus::Degraded,
            ..Default::default()
        }
        .with_record(record)
    }

    fn with_record(mut self, record: &SymbolRecord) -> Self {
        let profile = &record.profile;
        self.name = profile.name.clone();
        self.sector = profile.sector.clone();
        self.industry = profile.industry.clone();
        self.country = profile.country.clone();
        self.currency = profile.currency.clone();
        self.dividend_date = record.calendar.as_ref().and_then(|c| c.dividend_date);
        self.calendar = record.calendar.clone();
        self.history = record.events().to_vec();
        self
    }
}

// ─── Sorting ────────────────────────────────────────────────────────

/// Optional row ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Ascending by symbol.
    Symbol,
    ForwardYield,
    TtmDividend,
    ForwardAnnualDividend,
    TtmYield,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        Self::Symbol,
        Self::ForwardYield,
        Self::TtmDividend,
        Self::ForwardAnnualDividend,
        Self::TtmYield,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Symbol => "symbol",
            Self::ForwardYield => "forward_yield",
            Self::TtmDividend => "ttm_dividend",
            Self::ForwardAnnualDividend => "forward_annual_dividend",
            Self::TtmYield => "ttm_yield",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(SortKey::as_str).collect()
    }

    /// The numeric value this key sorts on; `None` for `Symbol`.
    pub fn extract(&self, row: &DatasetRow) -> Option<f64> {
        match self {
            Self::Symbol => None,
            Self::ForwardYield => row.forward_yield,
            Self::TtmDividend => row.ttm_dividend,
            Self::ForwardAnnualDividend => row.forward_annual_dividend,
            Self::TtmYield => row.ttm_yield,
        }
    }

    /// Ordering between two rows: numeric keys descending with nulls last,
    /// ties broken by symbol.
    pub fn compare(&self, a: &DatasetRow, b: &DatasetRow) -> Ordering {
        let by_value = match (self.extract(a), self.extract(b)) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_value.then_with(|| a.symbol.cmp(&b.symbol))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| ConfigError::UnknownSortKey(s.to_string()))
    }
}

/// Stable sort in place.
pub fn sort_rows(rows: &mut [DatasetRow], key: SortKey) {
    rows.sort_by(|a, b| key.compare(a, b));
}

// ─── Assembly ───────────────────────────────────────────────────────

/// One row per metrics entry, in input order.
pub fn assemble(metrics: &[DerivedMetrics]) -> Vec<DatasetRow> {
    metrics.iter().map(DatasetRow::from_metrics).collect()
}

/// Rows for every computed or degraded symbol of a batch. Skipped symbols
/// produce no row.
pub fn assemble_report(report: &BatchReport, sort: Option<SortKey>) -> Vec<DatasetRow> {
    let mut rows: Vec<DatasetRow> = report
        .outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            SymbolOutcome::Computed { record, metrics } => {
                Some(DatasetRow::computed(record, metrics))
            }
            SymbolOutcome::Degraded { record, .. } => Some(DatasetRow::degraded(record)),
            SymbolOutcome::Skipped { .. } => None,
        })
        .collect();
    if let Some(key) = sort {
        sort_rows(&mut rows, key);
    }
    rows
}

/// Fill each row's `indices` from a universe.
pub fn annotate_indices(rows: &mut [DatasetRow], universe: &Universe) {
    for row in rows {
        row.indices = universe.memberships(&row.symbol);
    }
}
