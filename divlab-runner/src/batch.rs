//! Batch processing — load and compute every requested symbol.
//!
//! Failures never cross symbol boundaries:
//! - load errors (missing, malformed, unreadable input) skip the symbol
//! - computation errors keep the symbol as a degraded row
//!
//! The batch itself only fails when the symbol list cannot be resolved.

use std::collections::HashSet;
use std::time::Instant;

use chrono::NaiveDate;
use divlab_core::{
    compute_metrics, load_record, ComputationError, DataError, DerivedMetrics, SnapshotSource,
    SymbolRecord,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What happened to one symbol.
#[derive(Debug)]
pub enum SymbolOutcome {
    Computed {
        record: SymbolRecord,
        metrics: DerivedMetrics,
    },
    Degraded {
        record: SymbolRecord,
        error: ComputationError,
    },
    Skipped {
        symbol: String,
        error: DataError,
    },
}

impl SymbolOutcome {
    pub fn symbol(&self) -> &str {
        match self {
            Self::Computed { record, .. } | Self::Degraded { record, .. } => &record.symbol,
            Self::Skipped { symbol, .. } => symbol,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Computed { .. } => "computed",
            Self::Degraded { .. } => "degraded",
            Self::Skipped { .. } => "skipped",
        }
    }
}

/// Why a symbol produced no row (or a degraded one), in serializable form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolIssue {
    pub symbol: String,
    pub category: String,
    pub message: String,
}

/// Every outcome of one batch, in input order.
#[derive(Debug)]
pub struct BatchReport {
    pub reference_date: NaiveDate,
    pub outcomes: Vec<SymbolOutcome>,
    pub elapsed_secs: f64,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn computed_count(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Computed { .. }))
    }

    pub fn degraded_count(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Degraded { .. }))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, SymbolOutcome::Skipped { .. }))
    }

    fn count(&self, pred: impl Fn(&SymbolOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(*o)).count()
    }

    /// Skipped symbols with their reasons.
    pub fn skipped(&self) -> Vec<SymbolIssue> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SymbolOutcome::Skipped { symbol, error } => Some(SymbolIssue {
                    symbol: symbol.clone(),
                    category: error.category().to_string(),
                    message: error.to_string(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Degraded symbols with their reasons.
    pub fn degraded(&self) -> Vec<SymbolIssue> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SymbolOutcome::Degraded { record, error } => Some(SymbolIssue {
                    symbol: record.symbol.clone(),
                    category: "computation".to_string(),
                    message: error.to_string(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Metrics of the computed symbols, in input order.
    pub fn metrics(&self) -> Vec<&DerivedMetrics> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SymbolOutcome::Computed { metrics, .. } => Some(metrics),
                _ => None,
            })
            .collect()
    }
}

// ─── Progress ───────────────────────────────────────────────────────

/// Progress callbacks for a running batch.
pub trait BatchProgress {
    fn on_start(&self, _total: usize) {}

    /// Called after each symbol; `index` is zero-based.
    fn on_symbol(&self, index: usize, total: usize, outcome: &SymbolOutcome);

    fn on_finish(&self, _report: &BatchReport) {}
}

/// Reports progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl BatchProgress for LogProgress {
    fn on_start(&self, total: usize) {
        info!(total, "processing symbols");
    }

    fn on_symbol(&self, index: usize, total: usize, outcome: &SymbolOutcome) {
        match outcome {
            SymbolOutcome::Computed { metrics, .. } => debug!(
                symbol = %metrics.symbol,
                n = index + 1,
                total,
                frequency = %metrics.inferred_frequency,
                ttm = metrics.ttm_dividend,
                "computed"
            ),
            SymbolOutcome::Degraded { record, error } => warn!(
                symbol = %record.symbol,
                %error,
                "metrics unavailable; writing degraded row"
            ),
            SymbolOutcome::Skipped { symbol, error } => warn!(
                symbol = %symbol,
                category = error.category(),
                %error,
                "skipping symbol"
            ),
        }
    }

    fn on_finish(&self, report: &BatchReport) {
        info!(
            computed = report.computed_count(),
            degraded = report.degraded_count(),
            skipped = report.skipped_count(),
            elapsed_secs = report.elapsed_secs,
            "batch complete"
        );
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl BatchProgress for NoProgress {
    fn on_symbol(&self, _index: usize, _total: usize, _outcome: &SymbolOutcome) {}
}

// ─── Running ────────────────────────────────────────────────────────

/// The symbols to process: the explicit list in its given order (first
/// occurrence wins on repeats), or every symbol the source can discover.
pub fn resolve_symbols(
    source: &dyn SnapshotSource,
    explicit: &[String],
) -> Result<Vec<String>, DataError> {
    if explicit.is_empty() {
        return source.symbols();
    }
    Ok(normalize_symbols(explicit))
}

/// Trim, drop blanks, and keep the first occurrence of each symbol.
pub fn normalize_symbols(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            continue;
        }
        if seen.insert(symbol.to_string()) {
            out.push(symbol.to_string());
        } else {
            debug!(symbol, "duplicate symbol ignored");
        }
    }
    out
}

/// Load and compute one symbol.
pub fn process_symbol(
    source: &dyn SnapshotSource,
    symbol: &str,
    reference: NaiveDate,
) -> SymbolOutcome {
    let record = match load_record(source, symbol) {
        Ok(record) => record,
        Err(error) => {
            return SymbolOutcome::Skipped {
                symbol: symbol.to_string(),
                error,
            }
        }
    };
    match compute_metrics(&record, reference) {
        Ok(metrics) => SymbolOutcome::Computed { record, metrics },
        Err(error) => SymbolOutcome::Degraded { record, error },
    }
}

/// Process every symbol in order.
pub fn run_batch(
    source: &dyn SnapshotSource,
    symbols: &[String],
    reference: NaiveDate,
    progress: &dyn BatchProgress,
) -> BatchReport {
    let start = Instant::now();
    let total = symbols.len();
    debug!(source = %source.describe(), total, %reference, "batch started");
    progress.on_start(total);

    let mut outcomes = Vec::with_capacity(total);
    for (index, symbol) in symbols.iter().enumerate() {
        let outcome = process_symbol(source, symbol, reference);
        progress.on_symbol(index, total, &outcome);
        outcomes.push(outcome);
    }

    let report = BatchReport {
        reference_date: reference,
        outcomes,
        elapsed_secs: start.elapsed().as_secs_f64(),
    };
    progress.on_finish(&report);
    report
}
