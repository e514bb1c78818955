//! Domain types for divlab

pub mod event;
pub mod metrics;
pub mod record;

pub use event::DividendEvent;
pub use metrics::{DerivedMetrics, PayoutFrequency};
pub use record::{CalendarHint, SymbolRecord, TickerProfile};
