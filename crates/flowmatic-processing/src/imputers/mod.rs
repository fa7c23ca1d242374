//! Missing-value imputation for numeric columns.
//!
//! Two strategies are supported:
//! - `time`: linear interpolation against the temporal index, falling back
//!   to forward/backward fill for any column interpolation cannot handle
//! - `ffill`: forward fill followed by backward fill
//!
//! Non-numeric columns are never touched.

mod fill;
mod time;

pub use fill::forward_backward_fill;
pub use time::{InterpolationError, interpolate_by_time};

use crate::config::ImputationStrategy;
use crate::error::Result;
use crate::table::{TimeSeriesTable, temporal_index_values};
use crate::utils::{float_series, missing_in_series, numeric_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Fill missing numeric values in `table` using `strategy`.
///
/// Fails only when `strategy` is [`ImputationStrategy::Time`] and the index
/// cannot be read as timestamps.
pub fn impute_missing(table: &TimeSeriesTable, strategy: ImputationStrategy) -> Result<TimeSeriesTable> {
    impute_with_count(table, strategy).map(|(table, _)| table)
}

/// Same as [`impute_missing`], taking the strategy by name (`"time"` or `"ffill"`).
pub fn impute_missing_by_name(table: &TimeSeriesTable, strategy: &str) -> Result<TimeSeriesTable> {
    impute_missing(table, strategy.parse()?)
}

/// Impute and report how many values were filled.
pub(crate) fn impute_with_count(
    table: &TimeSeriesTable,
    strategy: ImputationStrategy,
) -> Result<(TimeSeriesTable, usize)> {
    let timestamps = match strategy {
        ImputationStrategy::Time => Some(temporal_index_values(table.index())?),
        ImputationStrategy::Ffill => None,
    };

    let (mut numeric, other) = table.split_by_type()?;
    let mut imputed = 0;
    let mut columns_touched = 0;

    for name in table.numeric_column_names() {
        let series = numeric.column(&name)?.as_materialized_series().clone();
        let before = missing_in_series(&series)?;
        if before == 0 {
            continue;
        }

        let filled = impute_column(&series, timestamps.as_deref())?;
        let after = missing_in_series(&filled)?;
        if after > 0 {
            debug!("Column '{}' has no known values, {} left missing", name, after);
        }

        imputed += before - after;
        columns_touched += 1;
        numeric.replace(&name, filled)?;
    }

    let data = TimeSeriesTable::recombine(&numeric, &other, &table.column_names())?;

    info!(
        "Imputed {} missing values in {} columns using '{}' strategy",
        imputed, columns_touched, strategy
    );

    Ok((table.with_data(data)?, imputed))
}

/// Interpolate when timestamps are given, otherwise (or when interpolation
/// gives up) forward/backward fill.
fn impute_column(series: &Series, timestamps: Option<&[i64]>) -> Result<Series> {
    if let Some(timestamps) = timestamps {
        let values = numeric_values(series)?;
        if let Ok(filled) = interpolate_by_time(&values, timestamps) {
            return Ok(float_series(series.name().clone(), filled));
        }
    }
    Ok(forward_backward_fill(series)?)
}
