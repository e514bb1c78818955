//! divlab runner — batch orchestration, dataset assembly, export.
//!
//! This crate builds on `divlab-core` to provide:
//! - Build configuration (TOML file + CLI overrides)
//! - Per-symbol batch processing with skip/degrade outcomes
//! - Dataset rows, sort keys, and index memberships
//! - JSON/CSV export with atomic replacement and a hashed metadata sidecar
//! - Single-dataset and per-index build pipelines

pub mod batch;
pub mod config;
pub mod dataset;
pub mod export;
pub mod pipeline;

pub use batch::{
    normalize_symbols, process_symbol, resolve_symbols, run_batch, BatchProgress, BatchReport,
    LogProgress, NoProgress, SymbolIssue, SymbolOutcome,
};
pub use config::{parse_reference_date, BuildConfig, BuildOverrides, ConfigError, OutputFormat};
pub use dataset::{annotate_indices, assemble, assemble_report, sort_rows, DatasetRow, RowStatus, SortKey};
pub use export::{
    export_csv, export_json, import_json, meta_path, read_meta, write_atomic, write_dataset,
    DatasetMeta, SCHEMA_VERSION,
};
pub use pipeline::{build_dataset, index_output_path, plan_indices, BuildSummary, DatasetOptions, IndexJob};
