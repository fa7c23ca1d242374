//! Quality report types.

use crate::table::TimeSeriesTable;
use serde::{Deserialize, Serialize};

/// Missing-value count for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub column: String,
    pub count: usize,
}

/// Snapshot of a table's quality at one point in time.
///
/// Built by [`super::QualityInspector::report`]; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct QualityReport {
    /// Missing values per column, in table column order.
    pub missing: Vec<ColumnMissing>,

    /// Rows whose data values repeat an earlier row exactly (index ignored).
    pub duplicates: usize,

    /// Rows whose index value repeats an earlier row's index value.
    pub duplicate_index: usize,

    /// Rows with at least one numeric Z-score above the threshold,
    /// with every original column and in original row order.
    pub outliers: TimeSeriesTable,

    /// Threshold the outliers were selected with.
    pub zscore_threshold: f64,
}

impl QualityReport {
    /// Missing count for a column, if the column exists.
    pub fn missing_count(&self, column: &str) -> Option<usize> {
        self.missing
            .iter()
            .find(|entry| entry.column == column)
            .map(|entry| entry.count)
    }

    /// Missing values summed over all columns.
    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|entry| entry.count).sum()
    }

    pub fn outlier_count(&self) -> usize {
        self.outliers.height()
    }

    /// True when nothing was found: no missing values, duplicates or outliers.
    pub fn is_clean(&self) -> bool {
        self.total_missing() == 0
            && self.duplicates == 0
            && self.duplicate_index == 0
            && self.outlier_count() == 0
    }

    /// Serializable counts-only view of the report.
    pub fn summary(&self) -> QualitySummary {
        QualitySummary {
            missing: self.missing.clone(),
            duplicates: self.duplicates,
            duplicate_index: self.duplicate_index,
            outliers: self.outlier_count(),
            zscore_threshold: self.zscore_threshold,
        }
    }
}

/// Counts extracted from a [`QualityReport`], safe to store or send as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    pub missing: Vec<ColumnMissing>,
    pub duplicates: usize,
    pub duplicate_index: usize,
    pub outliers: usize,
    pub zscore_threshold: f64,
}
