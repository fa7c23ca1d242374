//! Time-Series Quality Inspection and Cleaning Library
//!
//! Quality reports and a fixed cleaning pipeline for time-indexed tables,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! - **Table**: [`TimeSeriesTable`] pairs a polars `DataFrame` with a
//!   timestamp index and keeps column order stable through every stage
//! - **Quality Inspection**: missing values per column, duplicate rows and
//!   Z-score outlier rows, without touching the input
//! - **Cleaning**: deduplicate by index, impute missing numeric values
//!   (time interpolation or forward/backward fill), cap numeric values at
//!   their 1st/99th percentiles
//! - **Collaborators**: CSV/JSON loading, CSV/JSON export, SQL schema
//!   inference, and a thread-safe store for cleaned results
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use flowmatic_processing::{clean, ingest, quality_report};
//!
//! let table = ingest::load_local("data/raw/traffic.csv")?;
//!
//! let report = quality_report(&table)?;
//! println!("{} missing values, {} duplicate rows", report.total_missing(), report.duplicates);
//!
//! let cleaned = clean(&table)?;
//! flowmatic_processing::export::write_csv(&cleaned, "data/cleaned/traffic_cleaned.csv")?;
//! ```
//!
//! # Configuration
//!
//! Use [`CleaningConfig`] or [`Cleaner::builder()`] to change the defaults:
//!
//! ```rust,ignore
//! use flowmatic_processing::{Cleaner, ImputationStrategy};
//!
//! let outcome = Cleaner::builder()
//!     .imputation_strategy(ImputationStrategy::Ffill)
//!     .quantiles(0.05, 0.95)
//!     .zscore_threshold(2.5)
//!     .build()?
//!     .clean_with_stats(&table)?;
//!
//! println!("imputed {} values", outcome.stats.values_imputed);
//! ```
//!
//! # Errors
//!
//! Cleaning fails only for an unknown imputation strategy name or, with the
//! `time` strategy, an index that cannot be read as timestamps. See
//! [`ProcessingError`].

pub mod cleaner;
pub mod config;
pub mod error;
pub mod export;
pub mod imputers;
pub mod ingest;
pub mod pipeline;
pub mod quality;
pub mod stats;
pub mod store;
pub mod table;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::deduplicate;
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError, ImputationStrategy};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use imputers::{impute_missing, impute_missing_by_name};
pub use pipeline::{
    Cleaner, CleanerBuilder, CleaningOutcome, CleaningStats, OutlierCapper, cap_outliers, clean,
};
pub use quality::{
    ColumnMissing, QualityInspector, QualityReport, QualitySummary, detect_outliers,
    duplicate_count, missing_counts, quality_report,
};
pub use store::TableStore;
pub use table::TimeSeriesTable;
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype};
