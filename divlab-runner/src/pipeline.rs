//! Pipeline — wires batch, assembly, and export into one dataset build.
//!
//! Two entry points:
//! - `build_dataset()`: one output file for a list of symbols. Used by `divlab build`.
//! - `plan_indices()` + `build_dataset()` per job: one file per universe index.
//!   Used by `divlab indices`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use divlab_core::data::Universe;
use divlab_core::SnapshotSource;
use tracing::info;

use crate::batch::{normalize_symbols, run_batch, BatchProgress, BatchReport};
use crate::config::{ConfigError, OutputFormat};
use crate::dataset::{annotate_indices, assemble_report, SortKey};
use crate::export::{write_dataset, DatasetMeta};

/// Options shared by every dataset build in a run.
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    pub reference_date: NaiveDate,
    pub sort_by: Option<SortKey>,
    pub format: OutputFormat,
    /// Fills the `indices` column when present.
    pub universe: Option<Universe>,
}

/// Result of one written dataset.
#[derive(Debug)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub report: BatchReport,
    pub meta: DatasetMeta,
}

/// Process `symbols`, assemble rows, and write `output` (plus sidecar).
///
/// Per-symbol problems end up in the report; only output failures are errors.
pub fn build_dataset(
    source: &dyn SnapshotSource,
    symbols: &[String],
    output: &Path,
    opts: &DatasetOptions,
    progress: &dyn BatchProgress,
) -> Result<BuildSummary> {
    let report = run_batch(source, symbols, opts.reference_date, progress);

    let mut rows = assemble_report(&report, opts.sort_by);
    if let Some(universe) = &opts.universe {
        annotate_indices(&mut rows, universe);
    }

    let meta = write_dataset(output, &rows, opts.format, &report)?;
    info!(
        output = %output.display(),
        rows = meta.row_count,
        hash = %meta.dataset_hash,
        "dataset written"
    );

    Ok(BuildSummary {
        output: output.to_path_buf(),
        report,
        meta,
    })
}

// ─── Index mode ─────────────────────────────────────────────────────

/// One index to build in index mode.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexJob {
    pub index: String,
    pub symbols: Vec<String>,
    pub output: PathBuf,
    /// The output already exists and `force` was not given.
    pub skip_existing: bool,
}

/// `{dir}/{INDEX}_dividends.{ext}`
pub fn index_output_path(dir: &Path, index: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{index}_dividends.{}", format.extension()))
}

/// Resolve a comma-separated index selection into jobs. Unknown index
/// names fail the whole plan before anything is processed.
pub fn plan_indices(
    universe: &Universe,
    selection: Option<&str>,
    output_dir: &Path,
    format: OutputFormat,
    force: bool,
) -> Result<Vec<IndexJob>, ConfigError> {
    let names = universe.select(selection)?;
    Ok(names
        .into_iter()
        .map(|index| {
            let output = index_output_path(output_dir, &index, format);
            let symbols = normalize_symbols(universe.index_symbols(&index).unwrap_or_default());
            IndexJob {
                skip_existing: !force && output.exists(),
                index,
                symbols,
                output,
            }
        })
        .collect())
}
