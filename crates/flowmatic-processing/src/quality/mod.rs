//! Data quality inspection.
//!
//! This module computes missing-value counts, duplicate-row counts and
//! Z-score outliers for a [`crate::TimeSeriesTable`] without modifying it.

mod inspector;
mod report;

pub use inspector::{
    QualityInspector, detect_outliers, duplicate_count, missing_counts, quality_report,
};
pub use report::{ColumnMissing, QualityReport, QualitySummary};
