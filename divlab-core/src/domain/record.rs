//! SymbolRecord — everything known about one symbol for a single run.
//!
//! The constructor canonicalizes the event history (ascending by ex-date,
//! same-day payments summed, zero-amount rows dropped), so every consumer of
//! [`SymbolRecord::events`] can rely on chronological order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::event::DividendEvent;
use crate::data::canonicalize::canonicalize_events;

/// Descriptive fields from the ticker-info snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerProfile {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
}

/// Upcoming-event hints from the calendar snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarHint {
    pub ex_dividend_date: Option<NaiveDate>,
    pub dividend_date: Option<NaiveDate>,
    pub earnings_dates: Vec<NaiveDate>,
    pub earnings_high: Option<f64>,
    pub earnings_low: Option<f64>,
    pub earnings_average: Option<f64>,
    pub revenue_high: Option<f64>,
    pub revenue_low: Option<f64>,
    pub revenue_average: Option<f64>,
}

impl CalendarHint {
    /// True if the hint carries no information at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Normalized per-symbol input to the metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolRecord {
    pub symbol: String,
    pub price: Option<f64>,
    events: Vec<DividendEvent>,
    pub calendar: Option<CalendarHint>,
    pub profile: TickerProfile,
}

impl SymbolRecord {
    /// Build a record from events in any order.
    pub fn new(symbol: impl Into<String>, price: Option<f64>, events: Vec<DividendEvent>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            events: canonicalize_events(events),
            calendar: None,
            profile: TickerProfile::default(),
        }
    }

    pub fn with_calendar(mut self, calendar: Option<CalendarHint>) -> Self {
        self.calendar = calendar.filter(|c| !c.is_empty());
        self
    }

    pub fn with_profile(mut self, profile: TickerProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Events in ascending ex-date order, one per distinct date.
    pub fn events(&self) -> &[DividendEvent] {
        &self.events
    }

    /// Events with `ex_date <= as_of`.
    pub fn events_through(&self, as_of: NaiveDate) -> &[DividendEvent] {
        let end = self.events.partition_point(|e| e.ex_date <= as_of);
        &self.events[..end]
    }

    /// Most recent event, if any.
    pub fn last_event(&self) -> Option<&DividendEvent> {
        self.events.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn constructor_sorts_events() {
        let record = SymbolRecord::new(
            "KO",
            Some(60.0),
            vec![
                DividendEvent::new(d(2023, 9, 14), 0.46),
                DividendEvent::new(d(2023, 3, 14), 0.46),
                DividendEvent::new(d(2023, 6, 15), 0.46),
            ],
        );
        let dates: Vec<NaiveDate> = record.events().iter().map(|e| e.ex_date).collect();
        assert_eq!(dates, vec![d(2023, 3, 14), d(2023, 6, 15), d(2023, 9, 14)]);
    }

    #[test]
    fn events_through_is_inclusive() {
        let record = SymbolRecord::new(
            "KO",
            None,
            vec![
                DividendEvent::new(d(2023, 3, 14), 0.46),
                DividendEvent::new(d(2023, 6, 15), 0.46),
                DividendEvent::new(d(2023, 9, 14), 0.46),
            ],
        );
        assert_eq!(record.events_through(d(2023, 6, 15)).len(), 2);
        assert_eq!(record.events_through(d(2023, 1, 1)).len(), 0);
        assert_eq!(record.events_through(d(2030, 1, 1)).len(), 3);
    }

    #[test]
    fn empty_calendar_hint_is_dropped() {
        let record = SymbolRecord::new("KO", None, vec![]).with_calendar(Some(CalendarHint::default()));
        assert!(record.calendar.is_none());

        let hint = CalendarHint {
            ex_dividend_date: Some(d(2024, 3, 14)),
            ..Default::default()
        };
        let record = SymbolRecord::new("KO", None, vec![]).with_calendar(Some(hint.clone()));
        assert_eq!(record.calendar, Some(hint));
    }
}
