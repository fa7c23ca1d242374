//! Error types for table inspection and cleaning.
//!
//! Core failures (`UnsupportedStrategy`, `IndexCoercionFailure`) surface
//! immediately to the caller. `UnsupportedFormat` and `MissingTemporalColumn`
//! only come out of the ingestion helpers.
//!
//! Errors serialize as `{code, message}` so a front end can hand them
//! straight to its client.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the processing library.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Imputation was asked for a strategy other than `time` or `ffill`.
    #[error("Unsupported imputation strategy '{0}' (expected 'time' or 'ffill')")]
    UnsupportedStrategy(String),

    /// The row index could not be interpreted as timestamps.
    #[error("Failed to interpret index as temporal: {reason}")]
    IndexCoercionFailure { reason: String },

    /// Input file extension is not one the loader understands.
    #[error("Unsupported file type: '{0}'")]
    UnsupportedFormat(String),

    /// No column looked like a date/time column.
    #[error("No column containing 'date' or 'time' found")]
    MissingTemporalColumn,

    /// A column (or the index) does not have the table's row count.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for an index coercion failure.
    pub fn index_coercion(reason: impl Into<String>) -> Self {
        ProcessingError::IndexCoercionFailure {
            reason: reason.into(),
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedStrategy(_) => "UNSUPPORTED_STRATEGY",
            Self::IndexCoercionFailure { .. } => "INDEX_COERCION_FAILURE",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::MissingTemporalColumn => "MISSING_TEMPORAL_COLUMN",
            Self::LengthMismatch { .. } => "LENGTH_MISMATCH",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the error was raised by the ingestion boundary rather than
    /// the cleaning core.
    pub fn is_ingestion_error(&self) -> bool {
        match self {
            Self::UnsupportedFormat(_) | Self::MissingTemporalColumn => true,
            Self::WithContext { source, .. } => source.is_ingestion_error(),
            _ => false,
        }
    }
}

impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Io(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ProcessingError::UnsupportedStrategy("mean".to_string()).error_code(),
            "UNSUPPORTED_STRATEGY"
        );
        assert_eq!(
            ProcessingError::index_coercion("bad").error_code(),
            "INDEX_COERCION_FAILURE"
        );
    }

    #[test]
    fn test_is_ingestion_error() {
        assert!(ProcessingError::MissingTemporalColumn.is_ingestion_error());
        assert!(
            ProcessingError::UnsupportedFormat(".xlsx".to_string())
                .with_context("Loading data.xlsx")
                .is_ingestion_error()
        );
        assert!(!ProcessingError::UnsupportedStrategy("mean".to_string()).is_ingestion_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = ProcessingError::UnsupportedStrategy("mean".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNSUPPORTED_STRATEGY"));
        assert!(json.contains("mean"));
    }

    #[test]
    fn test_with_context() {
        let error = ProcessingError::ColumnNotFound("speed".to_string())
            .with_context("During recombination");
        assert!(error.to_string().contains("During recombination"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND"); // Preserves original code
    }

    #[test]
    fn test_io_result_context() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let error = result.context("Failed to open 'traffic.json'").unwrap_err();
        assert_eq!(error.error_code(), "IO_ERROR");
        assert!(error.to_string().contains("traffic.json"));
    }
}
