//! Time-indexed table abstraction.
//!
//! A [`TimeSeriesTable`] pairs a polars `DataFrame` with a row index Series
//! of the same length. Column order is part of the table's identity: every
//! operation that splits the columns apart puts them back in the original
//! order through [`TimeSeriesTable::recombine`].

pub mod index;

use crate::error::{ProcessingError, Result};
use crate::utils::{is_numeric_dtype, is_temporal_dtype};
use polars::prelude::*;
use std::collections::HashSet;

pub use index::{coerce_index, datetime_index, parse_timestamp, temporal_index_values};

/// An in-memory table of typed columns sharing one row index.
///
/// The index is nominally unique, but uniqueness is not enforced here;
/// [`TimeSeriesTable::dedup_by_index`] is the only place duplicates are dropped.
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    index: Series,
    data: DataFrame,
}

static_assertions::assert_impl_all!(TimeSeriesTable: Send, Sync);

impl TimeSeriesTable {
    /// Create a table, checking that the data has one row per index entry.
    pub fn new(index: Series, data: DataFrame) -> Result<Self> {
        if data.width() > 0 && data.height() != index.len() {
            let column = data
                .get_column_names()
                .first()
                .map(|name| name.to_string())
                .unwrap_or_default();
            return Err(ProcessingError::LengthMismatch {
                column,
                expected: index.len(),
                actual: data.height(),
            });
        }
        Ok(Self { index, data })
    }

    /// Create a table from an index and a list of column Series.
    pub fn from_series(index: Series, columns: Vec<Series>) -> Result<Self> {
        for series in &columns {
            if series.len() != index.len() {
                return Err(ProcessingError::LengthMismatch {
                    column: series.name().to_string(),
                    expected: index.len(),
                    actual: series.len(),
                });
            }
        }
        let data = DataFrame::new(columns.into_iter().map(Column::from).collect())?;
        Self::new(index, data)
    }

    /// The row index.
    pub fn index(&self) -> &Series {
        &self.index
    }

    /// The data columns, without the index.
    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Split the table into its index and data.
    pub fn into_parts(self) -> (Series, DataFrame) {
        (self.index, self.data)
    }

    /// Number of rows (the index length).
    pub fn height(&self) -> usize {
        self.index.len()
    }

    /// Number of data columns.
    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.data
            .column(name)
            .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))
    }

    /// Names of integer and floating-point columns, in table order.
    pub fn numeric_column_names(&self) -> Vec<String> {
        self.data
            .get_columns()
            .iter()
            .filter(|col| is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Names of every column that is not numeric, in table order.
    pub fn other_column_names(&self) -> Vec<String> {
        self.data
            .get_columns()
            .iter()
            .filter(|col| !is_numeric_dtype(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    /// Split the data into a numeric frame and a frame holding everything else.
    ///
    /// The two frames partition the columns: each column lands in exactly one.
    pub fn split_by_type(&self) -> Result<(DataFrame, DataFrame)> {
        let numeric = self.data.select(self.numeric_column_names())?;
        let other = self.data.select(self.other_column_names())?;
        Ok((numeric, other))
    }

    /// Put separately processed column groups back together in `order`.
    ///
    /// Every name in `order` must be present in one of the frames; a name
    /// present in both is taken from `numeric`.
    pub fn recombine(numeric: &DataFrame, other: &DataFrame, order: &[String]) -> Result<DataFrame> {
        let columns = order
            .iter()
            .map(|name| {
                numeric
                    .column(name)
                    .or_else(|_| other.column(name))
                    .cloned()
                    .map_err(|_| ProcessingError::ColumnNotFound(name.clone()))
            })
            .collect::<Result<Vec<Column>>>()?;
        Ok(DataFrame::new(columns)?)
    }

    /// Replace the data columns, keeping the index.
    pub fn with_data(&self, data: DataFrame) -> Result<Self> {
        Self::new(self.index.clone(), data)
    }

    /// Replace the index, keeping the data.
    pub fn with_index(self, index: Series) -> Result<Self> {
        Self::new(index, self.data)
    }

    /// Keep the rows where `mask` is true, in their original order.
    pub fn filter(&self, mask: &BooleanChunked) -> Result<Self> {
        if mask.len() != self.height() {
            return Err(ProcessingError::LengthMismatch {
                column: mask.name().to_string(),
                expected: self.height(),
                actual: mask.len(),
            });
        }

        let index = self.index.filter(mask)?;
        let data = if self.width() == 0 {
            DataFrame::empty()
        } else {
            self.data.filter(mask)?
        };
        Self::new(index, data)
    }

    /// Flags that are true for the first row of every distinct index value.
    fn first_occurrence_flags(&self) -> Result<Vec<bool>> {
        let dtype = self.index.dtype();
        if is_temporal_dtype(dtype) || dtype.is_integer() {
            let keys = self.index.cast(&DataType::Int64)?;
            let mut seen = HashSet::with_capacity(keys.len());
            Ok(keys.i64()?.into_iter().map(|key| seen.insert(key)).collect())
        } else {
            let keys = self.index.cast(&DataType::String)?;
            let mut seen = HashSet::with_capacity(keys.len());
            Ok(keys.str()?.into_iter().map(|key| seen.insert(key)).collect())
        }
    }

    /// Mask that is true for the first row of every distinct index value.
    pub fn first_occurrence_mask(&self) -> Result<BooleanChunked> {
        let keep = self.first_occurrence_flags()?;
        Ok(BooleanChunked::from_slice("first_occurrence".into(), &keep))
    }

    /// Number of rows whose index value already appeared on an earlier row.
    pub fn duplicate_index_count(&self) -> Result<usize> {
        let keep = self.first_occurrence_flags()?;
        Ok(keep.iter().filter(|first| !**first).count())
    }

    /// Keep only the first row for each distinct index value.
    pub fn dedup_by_index(&self) -> Result<Self> {
        let mask = self.first_occurrence_mask()?;
        self.filter(&mask)
    }

    /// Replace the index with its `Datetime(ms)` reading.
    pub fn coerce_index(self) -> Result<Self> {
        let index = index::coerce_index(&self.index)?;
        self.with_index(index)
    }
}

/// Two tables are equal when their indexes and data are equal, nulls included.
impl PartialEq for TimeSeriesTable {
    fn eq(&self, other: &Self) -> bool {
        self.index.equals_missing(&other.index) && self.data.equals_missing(&other.data)
    }
}
