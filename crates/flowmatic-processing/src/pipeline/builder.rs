//! The cleaning pipeline and its builder.

use super::outcome::{CleaningOutcome, CleaningStats};
use super::outliers::OutlierCapper;
use crate::cleaner::remove_duplicates;
use crate::config::{CleaningConfig, ImputationStrategy};
use crate::error::{ProcessingError, Result};
use crate::imputers::impute_with_count;
use crate::quality::{QualityInspector, QualityReport};
use crate::table::TimeSeriesTable;
use std::time::Instant;
use tracing::{error, info};

/// Runs the fixed cleaning sequence: deduplicate by index, impute missing
/// numeric values, cap numeric outliers.
///
/// Use [`Cleaner::builder()`] to override the defaults.
///
/// # Example
///
/// ```rust,ignore
/// use flowmatic_processing::{Cleaner, ImputationStrategy};
///
/// let outcome = Cleaner::builder()
///     .imputation_strategy(ImputationStrategy::Ffill)
///     .quantiles(0.05, 0.95)
///     .build()?
///     .clean_with_stats(&table)?;
///
/// println!("dropped {} duplicate rows", outcome.stats.duplicates_removed);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleaningConfig,
}

static_assertions::assert_impl_all!(Cleaner: Send, Sync);

impl Cleaner {
    /// Create a new cleaner builder.
    pub fn builder() -> CleanerBuilder {
        CleanerBuilder::default()
    }

    /// Create a cleaner from an already validated configuration.
    pub fn with_config(config: CleaningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Quality report for `table` using this cleaner's Z-score threshold.
    pub fn inspect(&self, table: &TimeSeriesTable) -> Result<QualityReport> {
        QualityInspector::from_config(&self.config).report(table)
    }

    /// Clean `table`, returning only the cleaned table.
    pub fn clean(&self, table: &TimeSeriesTable) -> Result<TimeSeriesTable> {
        self.clean_with_stats(table).map(CleaningOutcome::into_table)
    }

    /// Clean `table` and report what each stage did.
    ///
    /// # Errors
    ///
    /// Returns `Err(ProcessingError::IndexCoercionFailure)` when the `time`
    /// strategy is configured and the index cannot be read as timestamps.
    pub fn clean_with_stats(&self, table: &TimeSeriesTable) -> Result<CleaningOutcome> {
        match self.run(table) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Cleaning failed: {}", e);
                Err(e)
            }
        }
    }

    fn run(&self, table: &TimeSeriesTable) -> Result<CleaningOutcome> {
        let start_time = Instant::now();
        info!(
            "Cleaning table with {} rows and {} columns",
            table.height(),
            table.width()
        );

        let (deduped, duplicates_removed) = remove_duplicates(table)?;
        let (imputed, values_imputed) = impute_with_count(&deduped, self.config.imputation_strategy)?;
        let (capped, values_capped) = OutlierCapper::from_config(&self.config).cap_with_count(&imputed)?;

        let stats = CleaningStats {
            rows_before: table.height(),
            rows_after: capped.height(),
            columns: capped.width(),
            duplicates_removed,
            values_imputed,
            values_capped,
            strategy: self.config.imputation_strategy,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Cleaning complete in {}ms: {} -> {} rows",
            stats.duration_ms, stats.rows_before, stats.rows_after
        );

        Ok(CleaningOutcome {
            table: capped,
            stats,
        })
    }
}

/// Builder for [`Cleaner`].
#[derive(Debug, Default)]
pub struct CleanerBuilder {
    config: Option<CleaningConfig>,
    imputation_strategy: Option<ImputationStrategy>,
    quantiles: Option<(f64, f64)>,
    zscore_threshold: Option<f64>,
}

impl CleanerBuilder {
    /// Start from a full configuration. Individual setters still override it.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn imputation_strategy(mut self, strategy: ImputationStrategy) -> Self {
        self.imputation_strategy = Some(strategy);
        self
    }

    /// Set the imputation strategy by name (`"time"` or `"ffill"`).
    pub fn strategy_name(self, name: &str) -> Result<Self> {
        let strategy = name.parse()?;
        Ok(self.imputation_strategy(strategy))
    }

    pub fn quantiles(mut self, lower: f64, upper: f64) -> Self {
        self.quantiles = Some((lower, upper));
        self
    }

    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    /// Build the cleaner, validating the resulting configuration.
    pub fn build(self) -> Result<Cleaner> {
        let mut config = self.config.unwrap_or_default();
        if let Some(strategy) = self.imputation_strategy {
            config.imputation_strategy = strategy;
        }
        if let Some((lower, upper)) = self.quantiles {
            config.lower_quantile = lower;
            config.upper_quantile = upper;
        }
        if let Some(threshold) = self.zscore_threshold {
            config.zscore_threshold = threshold;
        }

        config
            .validate()
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;
        Ok(Cleaner { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::datetime_index;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    const HOUR: i64 = 3_600_000;

    fn table(hours: &[i64], data: DataFrame) -> TimeSeriesTable {
        let index = datetime_index("timestamp", hours.iter().map(|h| h * HOUR).collect()).unwrap();
        TimeSeriesTable::new(index, data).unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let cleaner = Cleaner::builder().build().unwrap();
        assert_eq!(cleaner.config(), &CleaningConfig::default());
    }

    #[test]
    fn test_builder_overrides_config() {
        let base = CleaningConfig::builder().zscore_threshold(2.0).build().unwrap();
        let cleaner = Cleaner::builder()
            .config(base)
            .imputation_strategy(ImputationStrategy::Ffill)
            .build()
            .unwrap();

        assert_eq!(cleaner.config().zscore_threshold, 2.0);
        assert_eq!(cleaner.config().imputation_strategy, ImputationStrategy::Ffill);
    }

    #[test]
    fn test_builder_rejects_bad_quantiles() {
        let err = Cleaner::builder().quantiles(0.9, 0.1).build().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_builder_rejects_unknown_strategy_name() {
        let err = Cleaner::builder().strategy_name("median").unwrap_err();
        assert!(matches!(err, ProcessingError::UnsupportedStrategy(_)));
    }

    #[test]
    fn test_stats_count_each_stage() {
        let t = table(
            &[0, 1, 1, 2, 3, 4],
            df!["v" => [Some(1.0), Some(2.0), Some(2.0), None, Some(4.0), Some(100.0)]].unwrap(),
        );
        let outcome = Cleaner::default().clean_with_stats(&t).unwrap();

        assert_eq!(outcome.stats.rows_before, 6);
        assert_eq!(outcome.stats.rows_after, 5);
        assert_eq!(outcome.stats.duplicates_removed, 1);
        assert_eq!(outcome.stats.values_imputed, 1);
        // both extremes move onto their bounds
        assert_eq!(outcome.stats.values_capped, 2);
        assert_eq!(outcome.table.height(), 5);
    }

    #[test]
    fn test_inspect_uses_configured_threshold() {
        let t = table(&[0, 1, 2, 3], df!["v" => [1.0, 2.0, 3.0, 10.0]].unwrap());
        let strict = Cleaner::builder().zscore_threshold(1.0).build().unwrap();
        let lenient = Cleaner::default();

        assert_eq!(strict.inspect(&t).unwrap().outlier_count(), 1);
        assert_eq!(lenient.inspect(&t).unwrap().outlier_count(), 0);
    }
}
