//! Dataset export — JSON and CSV rendering, atomic file replacement, and the
//! metadata sidecar.
//!
//! Writes go to a temporary file in the destination directory and are then
//! renamed over the target, so readers see either the previous dataset or
//! the new one, never a partial file. The sidecar `<stem>.meta.json` records
//! what was written, including a BLAKE3 hash of the dataset bytes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::batch::{BatchReport, SymbolIssue};
use crate::config::OutputFormat;
use crate::dataset::DatasetRow;

/// Current schema version of the metadata sidecar.
pub const SCHEMA_VERSION: u32 = 1;

// ─── JSON ───────────────────────────────────────────────────────────

/// Serialize rows to a pretty JSON array.
pub fn export_json(rows: &[DatasetRow]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("failed to serialize dataset to JSON")
}

/// Parse a JSON dataset back into rows.
pub fn import_json(json: &str) -> Result<Vec<DatasetRow>> {
    serde_json::from_str(json).context("failed to deserialize dataset JSON")
}

// ─── CSV ────────────────────────────────────────────────────────────

pub const CSV_COLUMNS: [&str; 20] = [
    "symbol",
    "name",
    "sector",
    "industry",
    "country",
    "currency",
    "indices",
    "price",
    "ttm_dividend",
    "inferred_frequency",
    "forward_annual_dividend",
    "forward_yield",
    "ttm_yield",
    "dividend_count",
    "ttm_payment_count",
    "last_ex_date",
    "last_amount",
    "next_ex_date",
    "dividend_date",
    "status",
];

/// Serialize rows to CSV. Nulls become empty cells; `indices` is
/// `;`-separated. The nested `calendar` and `history` are JSON-only.
pub fn export_csv(rows: &[DatasetRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_COLUMNS)?;

    for r in rows {
        wtr.write_record([
            r.symbol.clone(),
            text(&r.name),
            text(&r.sector),
            text(&r.industry),
            text(&r.country),
            text(&r.currency),
            r.indices.join(";"),
            cell(r.price),
            cell(r.ttm_dividend),
            cell(r.inferred_frequency),
            cell(r.forward_annual_dividend),
            cell(r.forward_yield),
            cell(r.ttm_yield),
            cell(r.dividend_count),
            cell(r.ttm_payment_count),
            cell(r.last_ex_date),
            cell(r.last_amount),
            cell(r.next_ex_date),
            cell(r.dividend_date),
            r.status.as_str().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render rows in the requested format.
pub fn render(rows: &[DatasetRow], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => export_json(rows),
        OutputFormat::Csv => export_csv(rows),
    }
}

// ─── Atomic writes ──────────────────────────────────────────────────

/// Replace `path` with `contents` all-or-nothing.
///
/// The parent directory is created if needed. On failure the temporary file
/// is removed and any existing file at `path` is left untouched.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("output path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output dir: {}", dir.display()))?;

    let tmp_path = dir.join(format!(".{}.tmp", file_name.to_string_lossy()));
    let result = fs::write(&tmp_path, contents)
        .with_context(|| format!("failed to write {}", tmp_path.display()))
        .and_then(|()| {
            fs::rename(&tmp_path, path)
                .with_context(|| format!("atomic rename to {} failed", path.display()))
        });
    if result.is_err() && tmp_path.is_file() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

// ─── Metadata sidecar ───────────────────────────────────────────────

/// Description of one written dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub schema_version: u32,
    pub generated_at: NaiveDateTime,
    pub reference_date: NaiveDate,
    pub format: OutputFormat,
    pub row_count: usize,
    pub computed_count: usize,
    pub degraded_count: usize,
    pub skipped_count: usize,
    pub skipped: Vec<SymbolIssue>,
    pub degraded: Vec<SymbolIssue>,
    /// BLAKE3 hex digest of the dataset file bytes.
    pub dataset_hash: String,
}

/// `<dir>/<stem>.meta.json` next to the dataset.
pub fn meta_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    output.with_file_name(format!("{stem}.meta.json"))
}

/// Hex BLAKE3 digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Read a sidecar, rejecting unknown schema versions.
pub fn read_meta(path: &Path) -> Result<DatasetMeta> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let meta: DatasetMeta =
        serde_json::from_str(&json).context("failed to deserialize dataset metadata")?;
    if meta.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            meta.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(meta)
}

/// Write the dataset, then its sidecar. Both writes are atomic.
pub fn write_dataset(
    output: &Path,
    rows: &[DatasetRow],
    format: OutputFormat,
    report: &BatchReport,
) -> Result<DatasetMeta> {
    let body = render(rows, format)?;
    write_atomic(output, body.as_bytes())?;

    let meta = DatasetMeta {
        schema_version: SCHEMA_VERSION,
        generated_at: chrono::Local::now().naive_local(),
        reference_date: report.reference_date,
        format,
        row_count: rows.len(),
        computed_count: report.computed_count(),
        degraded_count: report.degraded_count(),
        skipped_count: report.skipped_count(),
        skipped: report.skipped(),
        degraded: report.degraded(),
        dataset_hash: content_hash(body.as_bytes()),
    };
    let meta_json =
        serde_json::to_string_pretty(&meta).context("failed to serialize dataset metadata")?;
    write_atomic(&meta_path(output), meta_json.as_bytes())?;

    Ok(meta)
}
