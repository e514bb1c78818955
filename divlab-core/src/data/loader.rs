//! Record loading: three snapshot documents in, one `SymbolRecord` out.
//!
//! Policy:
//! 1. Dividend history is required → `DataError::MissingData` if absent
//! 2. Ticker info is optional → price `None`, empty profile
//! 3. Calendar is optional → no calendar hint
//! 4. Any present document that fails to parse → `DataError::Parse`

use serde::de::DeserializeOwned;
use tracing::debug;

use super::provider::{DataError, SnapshotKind, SnapshotSource};
use super::schema::{CalendarDoc, DividendHistoryDoc, TickerInfoDoc};
use crate::domain::{CalendarHint, SymbolRecord};

/// Load and normalize one symbol.
pub fn load_record(source: &dyn SnapshotSource, symbol: &str) -> Result<SymbolRecord, DataError> {
    let history: DividendHistoryDoc =
        read_doc(source, symbol, SnapshotKind::Dividends)?.ok_or_else(|| {
            DataError::MissingData {
                symbol: symbol.to_string(),
                kind: SnapshotKind::Dividends,
                location: source.location(symbol, SnapshotKind::Dividends),
            }
        })?;
    let events = history.into_events().map_err(|detail| DataError::Parse {
        symbol: symbol.to_string(),
        kind: SnapshotKind::Dividends,
        location: source.location(symbol, SnapshotKind::Dividends),
        detail,
    })?;

    let info: Option<TickerInfoDoc> = read_doc(source, symbol, SnapshotKind::TickerInfo)?;
    let calendar: Option<CalendarDoc> = read_doc(source, symbol, SnapshotKind::Calendar)?;

    if info.is_none() {
        debug!(symbol, "no ticker info snapshot; price unavailable");
    }

    let price = info.as_ref().and_then(TickerInfoDoc::price);
    let profile = info.as_ref().map(TickerInfoDoc::profile).unwrap_or_default();

    Ok(SymbolRecord::new(symbol, price, events)
        .with_profile(profile)
        .with_calendar(calendar.map(CalendarHint::from)))
}

/// Read and deserialize one document; `Ok(None)` if it does not exist.
fn read_doc<T: DeserializeOwned>(
    source: &dyn SnapshotSource,
    symbol: &str,
    kind: SnapshotKind,
) -> Result<Option<T>, DataError> {
    let Some(content) = source.read(symbol, kind)? else {
        return Ok(None);
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| DataError::Parse {
            symbol: symbol.to_string(),
            kind,
            location: source.location(symbol, kind),
            detail: e.to_string(),
        })
}
