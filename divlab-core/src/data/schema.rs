//! Wire schemas for the three per-symbol snapshot documents.
//!
//! Snapshots come from a market-data provider and are loosely typed: every
//! field is optional and unknown keys are ignored. Each document type is
//! converted into the strongly typed domain model here.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::domain::{CalendarHint, DividendEvent, TickerProfile};

// ─── Dates ──────────────────────────────────────────────────────────

/// Parse the date formats seen in provider snapshots.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (the calendar date in the
/// timestamp's own offset is used) and naive `YYYY-MM-DDTHH:MM:SS[.f]`.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// A date field that accepts any of the formats in [`parse_flexible_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlexDate(pub NaiveDate);

impl<'de> Deserialize<'de> for FlexDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_flexible_date(&raw)
            .map(FlexDate)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{raw}'")))
    }
}

// ─── Ticker info: `{symbol}.json` ───────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickerInfoDoc {
    pub symbol: Option<String>,
    #[serde(rename = "longName", alias = "name")]
    pub long_name: Option<String>,
    #[serde(rename = "shortName")]
    pub short_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
    #[serde(rename = "currentPrice", alias = "current_price")]
    pub current_price: Option<f64>,
}

impl TickerInfoDoc {
    /// Regular market price, falling back to the current price.
    pub fn price(&self) -> Option<f64> {
        self.regular_market_price.or(self.current_price)
    }

    pub fn profile(&self) -> TickerProfile {
        TickerProfile {
            name: self.long_name.clone().or_else(|| self.short_name.clone()),
            sector: non_empty(&self.sector),
            industry: non_empty(&self.industry),
            country: non_empty(&self.country),
            currency: non_empty(&self.currency),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

// ─── Calendar: `{symbol}_calendar.json` ─────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarDoc {
    #[serde(rename = "Ex-Dividend Date", alias = "exdividend_date")]
    pub ex_dividend_date: Option<FlexDate>,
    #[serde(rename = "Dividend Date", alias = "dividend_date")]
    pub dividend_date: Option<FlexDate>,
    #[serde(rename = "Earnings Date", alias = "earnings_date", default)]
    pub earnings_date: Option<Vec<FlexDate>>,
    #[serde(rename = "Earnings High", alias = "earnings_high")]
    pub earnings_high: Option<f64>,
    #[serde(rename = "Earnings Low", alias = "earnings_low")]
    pub earnings_low: Option<f64>,
    #[serde(rename = "Earnings Average", alias = "earnings_average")]
    pub earnings_average: Option<f64>,
    #[serde(rename = "Revenue High", alias = "revenue_high")]
    pub revenue_high: Option<f64>,
    #[serde(rename = "Revenue Low", alias = "revenue_low")]
    pub revenue_low: Option<f64>,
    #[serde(rename = "Revenue Average", alias = "revenue_average")]
    pub revenue_average: Option<f64>,
}

impl From<CalendarDoc> for CalendarHint {
    fn from(doc: CalendarDoc) -> Self {
        let mut earnings_dates: Vec<NaiveDate> = doc
            .earnings_date
            .unwrap_or_default()
            .into_iter()
            .map(|d| d.0)
            .collect();
        earnings_dates.sort();
        Self {
            ex_dividend_date: doc.ex_dividend_date.map(|d| d.0),
            dividend_date: doc.dividend_date.map(|d| d.0),
            earnings_dates,
            earnings_high: doc.earnings_high,
            earnings_low: doc.earnings_low,
            earnings_average: doc.earnings_average,
            revenue_high: doc.revenue_high,
            revenue_low: doc.revenue_low,
            revenue_average: doc.revenue_average,
        }
    }
}

// ─── Dividend history: `{symbol}_dividends.json` ────────────────────

/// One row of a dividend-history document.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDividend {
    pub date: FlexDate,
    pub amount: f64,
}

/// Accepted shapes of a dividend-history document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DividendHistoryDoc {
    /// `[{"date": ..., "amount": ...}, ...]`
    Rows(Vec<RawDividend>),
    /// `{"history": [{"date": ..., "amount": ...}, ...]}`
    Wrapped { history: Vec<RawDividend> },
    /// `{"2024-01-15T00:00:00-05:00": 0.5, ...}` (a date-indexed series)
    ByDate(BTreeMap<String, f64>),
}

impl DividendHistoryDoc {
    /// Convert to domain events (unsorted; the record constructor canonicalizes).
    pub fn into_events(self) -> Result<Vec<DividendEvent>, String> {
        match self {
            Self::Rows(rows) | Self::Wrapped { history: rows } => Ok(rows
                .into_iter()
                .map(|r| DividendEvent::new(r.date.0, r.amount))
                .collect()),
            Self::ByDate(series) => series
                .into_iter()
                .map(|(key, amount)| {
                    parse_flexible_date(&key)
                        .map(|date| DividendEvent::new(date, amount))
                        .ok_or_else(|| format!("invalid date key '{key}'"))
                })
                .collect(),
        }
    }
}
