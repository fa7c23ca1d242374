//! Forward/backward fill.

use crate::utils::{float_series, numeric_values};
use polars::prelude::*;

/// Propagate the last known value forward, then fill any leading gap with
/// the first known value.
///
/// The result is `Float64`. A column with no known values comes back
/// entirely missing.
pub fn forward_backward_fill(series: &Series) -> PolarsResult<Series> {
    let floats = float_series(series.name().clone(), numeric_values(series)?);
    floats
        .fill_null(FillNullStrategy::Forward(None))?
        .fill_null(FillNullStrategy::Backward(None))
}
