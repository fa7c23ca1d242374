use super::report::{ColumnMissing, QualityReport};
use crate::config::{CleaningConfig, DEFAULT_ZSCORE_THRESHOLD};
use crate::error::Result;
use crate::stats;
use crate::table::TimeSeriesTable;
use crate::utils::{is_temporal_dtype, missing_in_series, numeric_values};
use polars::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Computes quality reports. Holds only the outlier threshold, so one
/// inspector can be shared freely between callers.
#[derive(Debug, Clone, Copy)]
pub struct QualityInspector {
    zscore_threshold: f64,
}

impl Default for QualityInspector {
    fn default() -> Self {
        Self::new(DEFAULT_ZSCORE_THRESHOLD)
    }
}

impl QualityInspector {
    pub fn new(zscore_threshold: f64) -> Self {
        Self { zscore_threshold }
    }

    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(config.zscore_threshold)
    }

    pub fn zscore_threshold(&self) -> f64 {
        self.zscore_threshold
    }

    /// Build a full report for `table`.
    pub fn report(&self, table: &TimeSeriesTable) -> Result<QualityReport> {
        let missing = missing_counts(table)?;
        let duplicates = duplicate_count(table)?;
        let duplicate_index = table.duplicate_index_count()?;
        let outliers = detect_outliers(table, self.zscore_threshold)?;

        debug!(
            "Quality report: {} missing values, {} duplicate rows, {} duplicate index entries, {} outlier rows",
            missing.iter().map(|m| m.count).sum::<usize>(),
            duplicates,
            duplicate_index,
            outliers.height()
        );

        Ok(QualityReport {
            missing,
            duplicates,
            duplicate_index,
            outliers,
            zscore_threshold: self.zscore_threshold,
        })
    }
}

/// Report for `table` using the default Z-score threshold of 3.
pub fn quality_report(table: &TimeSeriesTable) -> Result<QualityReport> {
    QualityInspector::default().report(table)
}

/// Count of absent values for every column, in column order.
///
/// Nulls count as missing, and so does NaN in float columns.
pub fn missing_counts(table: &TimeSeriesTable) -> Result<Vec<ColumnMissing>> {
    table
        .data()
        .get_columns()
        .iter()
        .map(|col| -> Result<ColumnMissing> {
            Ok(ColumnMissing {
                column: col.name().to_string(),
                count: missing_in_series(col.as_materialized_series())?,
            })
        })
        .collect()
}

/// Number of rows that repeat an earlier row across all data columns.
///
/// The index takes no part in the comparison. Missing values compare equal
/// to each other.
pub fn duplicate_count(table: &TimeSeriesTable) -> Result<usize> {
    if table.is_empty() || table.width() == 0 {
        return Ok(0);
    }

    let keyed = table
        .data()
        .get_columns()
        .iter()
        .map(|col| row_key_series(col.as_materialized_series()))
        .collect::<PolarsResult<Vec<Series>>>()?;
    let keys = keyed
        .iter()
        .map(|series| series.str())
        .collect::<PolarsResult<Vec<&StringChunked>>>()?;

    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(table.height());
    let mut duplicates = 0;
    for row in 0..table.height() {
        let key: Vec<Option<&str>> = keys.iter().map(|column| column.get(row)).collect();
        if !seen.insert(key) {
            duplicates += 1;
        }
    }

    Ok(duplicates)
}

/// String rendering of a column used to compare whole rows.
///
/// Float NaN renders as null so it matches a null in the same column.
fn row_key_series(series: &Series) -> PolarsResult<Series> {
    let dtype = series.dtype();
    if matches!(dtype, DataType::Float32 | DataType::Float64) {
        let keys: Vec<Option<String>> = numeric_values(series)?
            .into_iter()
            .map(|v| v.map(|x| x.to_string()))
            .collect();
        Ok(Series::new(series.name().clone(), keys))
    } else if is_temporal_dtype(dtype) {
        series.cast(&DataType::Int64)?.cast(&DataType::String)
    } else {
        series.cast(&DataType::String)
    }
}

/// Rows where any numeric column's absolute Z-score exceeds `threshold`.
///
/// Mean and standard deviation (population) are taken over present values
/// only. Missing values never flag a row, and a column whose present values
/// are all equal contributes nothing.
pub fn detect_outliers(table: &TimeSeriesTable, threshold: f64) -> Result<TimeSeriesTable> {
    let mask = zscore_mask(table, threshold)?;
    table.filter(&mask)
}

fn zscore_mask(table: &TimeSeriesTable, threshold: f64) -> Result<BooleanChunked> {
    let mut flagged = vec![false; table.height()];

    for name in table.numeric_column_names() {
        let values = numeric_values(table.column(&name)?.as_materialized_series())?;
        if is_constant(&values) {
            continue;
        }
        let (Some(mean), Some(std)) = (stats::mean(&values), stats::population_std(&values)) else {
            continue;
        };
        if !std.is_finite() || std <= 0.0 {
            continue;
        }

        for (row, value) in values.iter().enumerate() {
            if let Some(value) = value
                && ((value - mean) / std).abs() > threshold
            {
                flagged[row] = true;
            }
        }
    }

    Ok(BooleanChunked::from_slice("outlier".into(), &flagged))
}

/// True when the column has no two different present values.
fn is_constant(values: &[Option<f64>]) -> bool {
    let mut present = values.iter().flatten();
    match present.next() {
        Some(first) => present.all(|v| v == first),
        None => true,
    }
}
