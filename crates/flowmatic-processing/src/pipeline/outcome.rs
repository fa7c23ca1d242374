use crate::config::ImputationStrategy;
use crate::table::TimeSeriesTable;
use serde::{Deserialize, Serialize};

/// Per-stage counts from one cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningStats {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns: usize,
    /// Rows dropped because their timestamp repeated an earlier row's.
    pub duplicates_removed: usize,
    pub values_imputed: usize,
    /// Values moved onto a quantile bound.
    pub values_capped: usize,
    pub strategy: ImputationStrategy,
    pub duration_ms: u64,
}

impl CleaningStats {
    /// Percentage of input rows dropped by deduplication.
    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.duplicates_removed as f32 / self.rows_before as f32) * 100.0
        }
    }
}

/// A cleaned table together with what the pipeline did to it.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub table: TimeSeriesTable,
    pub stats: CleaningStats,
}

impl CleaningOutcome {
    pub fn into_table(self) -> TimeSeriesTable {
        self.table
    }
}
