//! divlab CLI — build dividend datasets from per-symbol snapshots.
//!
//! Commands:
//! - `build` — one dataset for explicit symbols or every discovered symbol
//! - `indices` — one `{INDEX}_dividends.json` per index of a universe file
//! - `show` — print one symbol's metrics
//!
//! Per-symbol problems are reported in the run summary and never change the
//! exit code. Configuration and output errors are fatal.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use divlab_core::data::Universe;
use divlab_core::{compute_metrics, load_record, DirectorySource};
use divlab_runner::config::DEFAULT_INPUT_DIR;
use divlab_runner::{
    build_dataset, parse_reference_date, plan_indices, resolve_symbols, BuildConfig,
    BuildOverrides, BuildSummary, DatasetOptions, DatasetRow, LogProgress, OutputFormat, SortKey,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "divlab",
    about = "divlab — dividend metrics datasets from ticker snapshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one dataset from explicit symbols or every symbol in the input dir.
    Build {
        /// Path to a TOML build config. Flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Snapshot directory. Defaults to ./data.
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Output dataset file. Defaults to ./dividends.json.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Symbols in output order (e.g., KO SAP.DE O). Defaults to all discovered.
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        symbols: Vec<String>,

        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        reference_date: Option<String>,

        /// Sort key: symbol, forward_yield, ttm_dividend, forward_annual_dividend, ttm_yield.
        #[arg(long)]
        sort_by: Option<String>,

        /// Output format: json or csv.
        #[arg(long)]
        format: Option<String>,

        /// Universe TOML used to fill each row's index memberships.
        #[arg(long)]
        universe: Option<PathBuf>,
    },
    /// Build one dataset per index of a universe file.
    Indices {
        /// Universe TOML with an [indices] table.
        #[arg(long)]
        universe: PathBuf,

        /// Comma-separated index names (e.g., DE_DAX,US_DOW). Defaults to all.
        #[arg(long)]
        index: Option<String>,

        /// Snapshot directory. Defaults to ./data.
        #[arg(long, default_value = DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,

        /// Directory for the per-index datasets.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Rebuild datasets that already exist.
        #[arg(long, default_value_t = false)]
        force: bool,

        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        reference_date: Option<String>,

        /// Sort key (see `build --help`).
        #[arg(long)]
        sort_by: Option<String>,

        /// Output format: json or csv.
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Print one symbol's metrics.
    Show {
        /// Symbol to inspect (e.g., KO).
        symbol: String,

        /// Snapshot directory. Defaults to ./data.
        #[arg(long, default_value = DEFAULT_INPUT_DIR)]
        input_dir: PathBuf,

        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        reference_date: Option<String>,

        /// Print the metrics as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            input_dir,
            output,
            symbols,
            reference_date,
            sort_by,
            format,
            universe,
        } => {
            let overrides = BuildOverrides {
                input_dir,
                output,
                reference_date,
                sort_by,
                format,
                symbols,
                universe,
            };
            run_build(config, overrides)
        }
        Commands::Indices {
            universe,
            index,
            input_dir,
            output_dir,
            force,
            reference_date,
            sort_by,
            format,
        } => run_indices(
            universe,
            index,
            input_dir,
            output_dir,
            force,
            reference_date,
            sort_by,
            format,
        ),
        Commands::Show {
            symbol,
            input_dir,
            reference_date,
            json,
        } => run_show(&symbol, input_dir, reference_date, json),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn reference_or_today(raw: Option<String>) -> Result<NaiveDate> {
    Ok(raw
        .as_deref()
        .map(parse_reference_date)
        .transpose()?
        .unwrap_or_else(today))
}

fn run_build(config_path: Option<PathBuf>, overrides: BuildOverrides) -> Result<()> {
    let config = match &config_path {
        Some(path) => BuildConfig::from_file(path)?,
        None => BuildConfig::default(),
    }
    .with_overrides(overrides)?;

    let universe = config
        .universe
        .as_deref()
        .map(Universe::from_file)
        .transpose()?;

    let source = DirectorySource::new(&config.input_dir);
    let symbols = resolve_symbols(&source, &config.symbols)
        .with_context(|| format!("cannot list symbols in {}", config.input_dir.display()))?;
    if symbols.is_empty() {
        info!(input_dir = %config.input_dir.display(), "no symbols found; writing an empty dataset");
    }

    let opts = DatasetOptions {
        reference_date: config.reference_date_or(today()),
        sort_by: config.sort_by,
        format: config.format,
        universe,
    };
    let summary = build_dataset(&source, &symbols, &config.output, &opts, &LogProgress)?;
    print_summary(&summary);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_indices(
    universe_path: PathBuf,
    selection: Option<String>,
    input_dir: PathBuf,
    output_dir: PathBuf,
    force: bool,
    reference_date: Option<String>,
    sort_by: Option<String>,
    format: String,
) -> Result<()> {
    let reference_date = reference_or_today(reference_date)?;
    let sort_by = sort_by.as_deref().map(str::parse::<SortKey>).transpose()?;
    let format: OutputFormat = format.parse()?;
    let universe = Universe::from_file(&universe_path)?;

    let jobs = plan_indices(&universe, selection.as_deref(), &output_dir, format, force)?;
    let source = DirectorySource::new(&input_dir);
    let opts = DatasetOptions {
        reference_date,
        sort_by,
        format,
        universe: Some(universe),
    };

    let mut built = 0;
    for job in &jobs {
        if job.skip_existing {
            println!(
                "{}: {} exists, skipping (use --force to rebuild)",
                job.index,
                job.output.display()
            );
            continue;
        }
        info!(index = %job.index, symbols = job.symbols.len(), "building index dataset");
        let summary = build_dataset(&source, &job.symbols, &job.output, &opts, &LogProgress)
            .with_context(|| format!("index {}", job.index))?;
        println!("== {} ==", job.index);
        print_summary(&summary);
        built += 1;
    }

    println!();
    println!("Indices built: {built}/{}", jobs.len());
    Ok(())
}

fn run_show(
    symbol: &str,
    input_dir: PathBuf,
    reference_date: Option<String>,
    json: bool,
) -> Result<()> {
    let reference_date = reference_or_today(reference_date)?;
    let source = DirectorySource::new(input_dir);
    let record = load_record(&source, symbol)?;
    let metrics = compute_metrics(&record, reference_date)?;

    if json {
        let row = DatasetRow::computed(&record, &metrics);
        println!("{}", serde_json::to_string_pretty(&row)?);
        return Ok(());
    }

    println!("=== {} ===", metrics.symbol);
    if let Some(name) = &record.profile.name {
        println!("Name:           {name}");
    }
    println!("As of:          {reference_date}");
    println!("Price:          {}", opt_num(metrics.price, 2));
    println!("Frequency:      {}", metrics.inferred_frequency);
    println!(
        "Payments:       {} total, {} in trailing 12 months",
        metrics.dividend_count, metrics.ttm_payment_count
    );
    println!("TTM dividend:   {:.4}", metrics.ttm_dividend);
    println!("Forward annual: {:.4}", metrics.forward_annual_dividend);
    println!("Forward yield:  {}", opt_pct(metrics.forward_yield));
    println!("TTM yield:      {}", opt_pct(metrics.ttm_yield));
    println!(
        "Last payment:   {}",
        match (metrics.last_ex_date, metrics.last_amount) {
            (Some(date), Some(amount)) => format!("{date} ({amount:.4})"),
            _ => "-".to_string(),
        }
    );
    println!("Next ex-date:   {}", opt_display(metrics.next_ex_date));
    Ok(())
}

fn print_summary(summary: &BuildSummary) {
    let report = &summary.report;
    println!("Reference date: {}", report.reference_date);
    println!(
        "Symbols: {} computed, {} degraded, {} skipped ({} total)",
        report.computed_count(),
        report.degraded_count(),
        report.skipped_count(),
        report.total()
    );
    for issue in report.degraded() {
        println!("  degraded {}: {}", issue.symbol, issue.message);
    }
    for issue in report.skipped() {
        println!("  skipped  {} [{}]: {}", issue.symbol, issue.category, issue.message);
    }
    println!(
        "Wrote {} rows to {} ({:.2}s)",
        summary.meta.row_count,
        summary.output.display(),
        report.elapsed_secs
    );
}

fn opt_num(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| "-".to_string())
}

fn opt_pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}%", v * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

fn opt_display<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}
