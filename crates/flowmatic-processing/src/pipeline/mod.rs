//! Pipeline module.
//!
//! This module provides the cleaning pipeline: deduplication, imputation
//! and outlier capping run in that fixed order.

mod builder;
mod outcome;
pub mod outliers;

pub use builder::{Cleaner, CleanerBuilder};
pub use outcome::{CleaningOutcome, CleaningStats};
pub use outliers::{OutlierCapper, cap_outliers};

use crate::error::Result;
use crate::table::TimeSeriesTable;

/// Clean `table` with the default configuration: time interpolation and
/// capping at the 1st/99th percentiles.
pub fn clean(table: &TimeSeriesTable) -> Result<TimeSeriesTable> {
    Cleaner::default().clean(table)
}
