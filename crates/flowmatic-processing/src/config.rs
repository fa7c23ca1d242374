//! Configuration types for quality inspection and cleaning.
//!
//! This module provides configuration options using the builder pattern.
//! The defaults reproduce the fixed pipeline: time interpolation, capping at
//! the 1st/99th percentiles, and a Z-score threshold of 3.

use crate::error::ProcessingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default lower quantile used by outlier capping.
pub const DEFAULT_LOWER_QUANTILE: f64 = 0.01;

/// Default upper quantile used by outlier capping.
pub const DEFAULT_UPPER_QUANTILE: f64 = 0.99;

/// Default absolute Z-score above which a row is reported as an outlier.
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

/// Strategy for imputing missing numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImputationStrategy {
    /// Linear interpolation over elapsed time, falling back to fills
    #[default]
    Time,
    /// Forward-fill then backward-fill
    Ffill,
}

impl ImputationStrategy {
    /// Name used on the command line and in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Ffill => "ffill",
        }
    }
}

impl fmt::Display for ImputationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImputationStrategy {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(Self::Time),
            "ffill" => Ok(Self::Ffill),
            other => Err(ProcessingError::UnsupportedStrategy(other.to_string())),
        }
    }
}

/// Configuration for the cleaning pipeline and quality inspector.
///
/// Use [`CleaningConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use flowmatic_processing::config::{CleaningConfig, ImputationStrategy};
///
/// let config = CleaningConfig::builder()
///     .imputation_strategy(ImputationStrategy::Ffill)
///     .quantiles(0.05, 0.95)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// How missing numeric values are filled.
    /// Default: Time
    pub imputation_strategy: ImputationStrategy,

    /// Quantile used as the lower clipping bound (0.0 - 1.0).
    /// Default: 0.01
    pub lower_quantile: f64,

    /// Quantile used as the upper clipping bound (0.0 - 1.0).
    /// Default: 0.99
    pub upper_quantile: f64,

    /// Absolute Z-score a value must exceed to flag its row as an outlier.
    /// Default: 3.0
    pub zscore_threshold: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            imputation_strategy: ImputationStrategy::default(),
            lower_quantile: DEFAULT_LOWER_QUANTILE,
            upper_quantile: DEFAULT_UPPER_QUANTILE,
            zscore_threshold: DEFAULT_ZSCORE_THRESHOLD,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Read a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: CleaningConfig = serde_json::from_str(&contents)?;
        config
            .validate()
            .map_err(|e| ProcessingError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("lower_quantile", self.lower_quantile),
            ("upper_quantile", self.upper_quantile),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidQuantile {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.lower_quantile > self.upper_quantile {
            return Err(ConfigValidationError::InvertedQuantiles {
                lower: self.lower_quantile,
                upper: self.upper_quantile,
            });
        }

        if !self.zscore_threshold.is_finite() || self.zscore_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(
                self.zscore_threshold,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid quantile for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidQuantile { field: String, value: f64 },

    #[error("Lower quantile {lower} is above upper quantile {upper}")]
    InvertedQuantiles { lower: f64, upper: f64 },

    #[error("Invalid Z-score threshold: {0} (must be a positive number)")]
    InvalidThreshold(f64),
}

impl From<ConfigValidationError> for ProcessingError {
    fn from(err: ConfigValidationError) -> Self {
        ProcessingError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    imputation_strategy: Option<ImputationStrategy>,
    lower_quantile: Option<f64>,
    upper_quantile: Option<f64>,
    zscore_threshold: Option<f64>,
}

impl CleaningConfigBuilder {
    /// Set the imputation strategy.
    pub fn imputation_strategy(mut self, strategy: ImputationStrategy) -> Self {
        self.imputation_strategy = Some(strategy);
        self
    }

    /// Set the lower clipping quantile.
    pub fn lower_quantile(mut self, quantile: f64) -> Self {
        self.lower_quantile = Some(quantile);
        self
    }

    /// Set the upper clipping quantile.
    pub fn upper_quantile(mut self, quantile: f64) -> Self {
        self.upper_quantile = Some(quantile);
        self
    }

    /// Set both clipping quantiles at once.
    pub fn quantiles(self, lower: f64, upper: f64) -> Self {
        self.lower_quantile(lower).upper_quantile(upper)
    }

    /// Set the Z-score threshold for outlier detection.
    ///
    /// # Arguments
    /// * `threshold` - Positive number of standard deviations (e.g., 3.0)
    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            imputation_strategy: self.imputation_strategy.unwrap_or_default(),
            lower_quantile: self.lower_quantile.unwrap_or(DEFAULT_LOWER_QUANTILE),
            upper_quantile: self.upper_quantile.unwrap_or(DEFAULT_UPPER_QUANTILE),
            zscore_threshold: self.zscore_threshold.unwrap_or(DEFAULT_ZSCORE_THRESHOLD),
        };

        config.validate()?;
        Ok(config)
    }
}
