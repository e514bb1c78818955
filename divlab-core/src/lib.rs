//! divlab core — dividend domain types, snapshot loading, derived metrics.
//!
//! This crate contains the metrics engine and everything it needs:
//! - Domain types (dividend events, symbol records, derived metrics)
//! - Snapshot sources and the record loader (ticker info, calendar, history)
//! - Payout-frequency classification over trailing ex-date gaps
//! - Trailing-twelve-month aggregation
//! - Forward annual dividend and yield projection
//! - Index universe (named symbol lists)

pub mod data;
pub mod domain;
pub mod engine;

pub use data::{load_record, DataError, DirectorySource, MemorySource, SnapshotKind, SnapshotSource};
pub use domain::{CalendarHint, DerivedMetrics, DividendEvent, PayoutFrequency, SymbolRecord, TickerProfile};
pub use engine::{compute_metrics, ComputationError};
