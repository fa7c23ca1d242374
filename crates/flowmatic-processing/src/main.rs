//! CLI entry point for time-series inspection and cleaning.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use flowmatic_processing::export::{cleaned_file_name, write_csv, write_json};
use flowmatic_processing::{
    Cleaner, CleaningConfig, CleaningStats, ImputationStrategy, QualityReport, QualitySummary,
    ingest,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// CLI-compatible imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliStrategy {
    /// Interpolate against the timestamp index
    Time,
    /// Forward fill then backward fill
    Ffill,
}

impl From<CliStrategy> for ImputationStrategy {
    fn from(cli: CliStrategy) -> Self {
        match cli {
            CliStrategy::Time => ImputationStrategy::Time,
            CliStrategy::Ffill => ImputationStrategy::Ffill,
        }
    }
}

/// File format for the cleaned table
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliFormat {
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    author = "Flowmatic Team",
    version,
    about = "Time-series quality inspection and cleaning",
    long_about = "Reports missing values, duplicate rows and Z-score outliers in a \
                  time-indexed CSV or JSON file, then deduplicates, imputes and caps it.\n\n\
                  EXAMPLES:\n  \
                  # Inspect and clean with the defaults\n  \
                  flowmatic -i data/raw/traffic.csv\n\n  \
                  # Only print the quality report\n  \
                  flowmatic -i data/raw/traffic.csv --report-only\n\n  \
                  # Forward fill and wider capping, JSON summary on stdout\n  \
                  flowmatic -i traffic.json --strategy ffill --lower-quantile 0.05 --upper-quantile 0.95 --json"
)]
struct Args {
    /// Path to the CSV or JSON file to process
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned file
    #[arg(short, long, default_value = "./data/cleaned")]
    output: String,

    /// Strategy for imputing missing numeric values
    #[arg(long, value_enum)]
    strategy: Option<CliStrategy>,

    /// Lower capping quantile (0.0 - 1.0)
    #[arg(long)]
    lower_quantile: Option<f64>,

    /// Upper capping quantile (0.0 - 1.0)
    #[arg(long)]
    upper_quantile: Option<f64>,

    /// Absolute Z-score above which a row is reported as an outlier
    #[arg(long)]
    zscore_threshold: Option<f64>,

    /// JSON configuration file; command line flags override its values
    #[arg(long)]
    config: Option<String>,

    /// Print the quality report and stop without cleaning
    #[arg(long)]
    report_only: bool,

    /// Format of the cleaned output file
    #[arg(long, value_enum, default_value = "csv")]
    format: CliFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs so stdout holds only the JSON document.
    #[arg(long)]
    json: bool,

    /// Write the JSON summary to <input_name>_report.json in the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Everything the CLI reports about one run.
#[derive(Debug, Serialize)]
struct RunReport {
    input: String,
    rows: usize,
    columns: Vec<String>,
    quality: QualitySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    cleaning: Option<CleaningStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_path: Option<String>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let cleaner = build_cleaner(&args)?;

    info!("Loading dataset from: {}", args.input);
    let table = ingest::load_local(&args.input)?;

    let report = cleaner.inspect(&table)?;
    let mut run = RunReport {
        input: args.input.clone(),
        rows: table.height(),
        columns: table.column_names(),
        quality: report.summary(),
        cleaning: None,
        output_path: None,
    };

    if !args.json {
        print_quality_report(&report);
    }

    if !args.report_only {
        let outcome = cleaner.clean_with_stats(&table)?;

        let output_path = output_path(&args);
        match args.format {
            CliFormat::Csv => write_csv(&outcome.table, &output_path)?,
            CliFormat::Json => write_json(&outcome.table, &output_path)?,
        }

        run.cleaning = Some(outcome.stats);
        run.output_path = Some(output_path.display().to_string());
    }

    if args.emit_report {
        let report_path = Path::new(&args.output).join(format!("{}_report.json", file_stem(&args.input)));
        std::fs::create_dir_all(&args.output)?;
        std::fs::write(&report_path, serde_json::to_string_pretty(&run)?)?;
        info!("Report saved: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else if let Some(stats) = &run.cleaning {
        print_cleaning_summary(stats, run.output_path.as_deref().unwrap_or_default());
    }

    Ok(())
}

/// Config file first, then any flags given on the command line.
fn build_cleaner(args: &Args) -> Result<Cleaner> {
    let base = match &args.config {
        Some(path) => CleaningConfig::from_json_file(path)?,
        None => CleaningConfig::default(),
    };

    let lower = args.lower_quantile.unwrap_or(base.lower_quantile);
    let upper = args.upper_quantile.unwrap_or(base.upper_quantile);

    let mut builder = Cleaner::builder().config(base).quantiles(lower, upper);
    if let Some(strategy) = args.strategy {
        builder = builder.imputation_strategy(strategy.into());
    }
    if let Some(threshold) = args.zscore_threshold {
        builder = builder.zscore_threshold(threshold);
    }

    Ok(builder.build()?)
}

fn output_path(args: &Args) -> PathBuf {
    let name = PathBuf::from(cleaned_file_name(&args.input));
    let name = match args.format {
        CliFormat::Csv => name,
        CliFormat::Json => name.with_extension("json"),
    };
    Path::new(&args.output).join(name)
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

/// Print the quality report.
///
/// Uses `println!` rather than logging: this is the command's output and
/// must show regardless of log level.
fn print_quality_report(report: &QualityReport) {
    println!();
    println!("{}", "=".repeat(80));
    println!("QUALITY REPORT");
    println!("{}", "=".repeat(80));
    println!();

    println!("Missing Values:");
    for entry in &report.missing {
        println!("  {:<30} {}", truncate_str(&entry.column, 29), entry.count);
    }
    println!();

    println!("Duplicate Rows: {}", report.duplicates);
    println!("Duplicate Timestamps: {}", report.duplicate_index);
    println!(
        "Outliers (|z| > {}): {} rows",
        report.zscore_threshold,
        report.outlier_count()
    );
    println!();
}

fn print_cleaning_summary(stats: &CleaningStats, output_path: &str) {
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!("  Duration: {}ms", stats.duration_ms);
    println!(
        "  Rows: {} -> {} ({} duplicate timestamps removed, {:.1}%)",
        stats.rows_before,
        stats.rows_after,
        stats.duplicates_removed,
        stats.rows_removed_percentage()
    );
    println!(
        "  Values imputed: {} (strategy: {})",
        stats.values_imputed, stats.strategy
    );
    println!("  Values capped: {}", stats.values_capped);
    println!();
    println!("Saved cleaned data to {}", output_path);
    println!("{}", "=".repeat(80));
}

/// Truncate a string to a maximum length, adding "..." if truncated
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
