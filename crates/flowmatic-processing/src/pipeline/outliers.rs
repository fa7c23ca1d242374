//! Outlier capping.
//!
//! Every numeric column is clipped into the range between two of its own
//! quantiles. Missing values are ignored when computing the quantiles and
//! stay missing.

use crate::config::{CleaningConfig, DEFAULT_LOWER_QUANTILE, DEFAULT_UPPER_QUANTILE};
use crate::error::Result;
use crate::stats;
use crate::table::TimeSeriesTable;
use crate::utils::{float_series, numeric_values};
use tracing::{debug, info};

/// Clips numeric columns to their `[lower, upper]` quantile range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierCapper {
    lower_quantile: f64,
    upper_quantile: f64,
}

impl Default for OutlierCapper {
    fn default() -> Self {
        Self::new(DEFAULT_LOWER_QUANTILE, DEFAULT_UPPER_QUANTILE)
    }
}

impl OutlierCapper {
    pub fn new(lower_quantile: f64, upper_quantile: f64) -> Self {
        Self {
            lower_quantile,
            upper_quantile,
        }
    }

    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(config.lower_quantile, config.upper_quantile)
    }

    /// Cap every numeric column of `table`.
    pub fn cap(&self, table: &TimeSeriesTable) -> Result<TimeSeriesTable> {
        self.cap_with_count(table).map(|(table, _)| table)
    }

    /// Cap and report how many values were moved onto a bound.
    pub(crate) fn cap_with_count(&self, table: &TimeSeriesTable) -> Result<(TimeSeriesTable, usize)> {
        let (mut numeric, other) = table.split_by_type()?;
        let mut capped_total = 0;

        for name in table.numeric_column_names() {
            let values = numeric_values(numeric.column(&name)?.as_materialized_series())?;
            let Some((lower, upper)) = self.bounds(&values) else {
                debug!("Column '{}' has no values to cap", name);
                continue;
            };

            let mut capped = 0;
            let clipped: Vec<Option<f64>> = values
                .iter()
                .map(|value| {
                    value.map(|v| {
                        let bounded = v.max(lower).min(upper);
                        if bounded != v {
                            capped += 1;
                        }
                        bounded
                    })
                })
                .collect();

            if capped > 0 {
                debug!(
                    "Capped {} values in '{}' to [{:.4}, {:.4}]",
                    capped, name, lower, upper
                );
            }
            capped_total += capped;
            numeric.replace(&name, float_series(name.as_str().into(), clipped))?;
        }

        let data = TimeSeriesTable::recombine(&numeric, &other, &table.column_names())?;

        info!(
            "Capped {} values at the {}/{} quantiles",
            capped_total, self.lower_quantile, self.upper_quantile
        );

        Ok((table.with_data(data)?, capped_total))
    }

    /// Lower and upper clip bounds, or `None` for a column with no values.
    fn bounds(&self, values: &[Option<f64>]) -> Option<(f64, f64)> {
        let lower = stats::quantile(values, self.lower_quantile)?;
        let upper = stats::quantile(values, self.upper_quantile)?;
        Some((lower, upper))
    }
}

/// Clip each numeric column of `table` into its `[lower_quantile, upper_quantile]` range.
pub fn cap_outliers(table: &TimeSeriesTable, lower_quantile: f64, upper_quantile: f64) -> Result<TimeSeriesTable> {
    OutlierCapper::new(lower_quantile, upper_quantile).cap(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::datetime_index;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn table(data: DataFrame) -> TimeSeriesTable {
        let n = data.height() as i64;
        let index = datetime_index("timestamp", (0..n).map(|h| h * 3_600_000).collect()).unwrap();
        TimeSeriesTable::new(index, data).unwrap()
    }

    fn floats(table: &TimeSeriesTable, name: &str) -> Vec<Option<f64>> {
        table.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_extremes_pulled_to_quantiles() {
        let t = table(df!["v" => [1.0, 2.0, 3.0, 4.0, 100.0]].unwrap());
        let (out, capped) = OutlierCapper::default().cap_with_count(&t).unwrap();

        let values = floats(&out, "v");
        // q01 = 1.04, q99 = 96.16
        assert!((values[0].unwrap() - 1.04).abs() < 1e-9);
        assert!((values[4].unwrap() - 96.16).abs() < 1e-9);
        assert_eq!(&values[1..4], &[Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(capped, 2);
    }

    #[test]
    fn test_full_range_is_noop() {
        let t = table(df!["v" => [5.0, -3.0, 8.0]].unwrap());
        let (out, capped) = OutlierCapper::new(0.0, 1.0).cap_with_count(&t).unwrap();
        assert_eq!(floats(&out, "v"), vec![Some(5.0), Some(-3.0), Some(8.0)]);
        assert_eq!(capped, 0);
    }

    #[test]
    fn test_missing_values_stay_missing() {
        let t = table(df!["v" => [Some(0.0), None, Some(10.0)]].unwrap());
        let out = cap_outliers(&t, 0.1, 0.9).unwrap();
        assert_eq!(floats(&out, "v"), vec![Some(1.0), None, Some(9.0)]);
    }

    #[test]
    fn test_all_missing_column_untouched() {
        let t = table(df!["v" => [None::<f64>, None], "w" => [1.0, 2.0]].unwrap());
        let out = cap_outliers(&t, 0.01, 0.99).unwrap();
        assert_eq!(out.column("v").unwrap().null_count(), 2);
    }

    #[test]
    fn test_integers_become_floats_and_others_pass_through() {
        let t = table(
            df![
                "label" => ["a", "b", "c"],
                "count" => [1i64, 2, 3],
                "open" => [true, false, true],
            ]
            .unwrap(),
        );
        let out = cap_outliers(&t, 0.5, 0.5).unwrap();

        assert_eq!(out.column_names(), t.column_names());
        assert_eq!(floats(&out, "count"), vec![Some(2.0), Some(2.0), Some(2.0)]);
        assert!(
            out.column("label").unwrap().as_materialized_series()
                .equals(t.column("label").unwrap().as_materialized_series())
        );
        assert!(
            out.column("open").unwrap().as_materialized_series()
                .equals(t.column("open").unwrap().as_materialized_series())
        );
    }
}
