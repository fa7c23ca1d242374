//! Loading tables from local files.
//!
//! CSV files use their first column as the index. JSON files must be an
//! array of records; the first field whose name mentions "date" or "time"
//! becomes the index. Either way the index is coerced to `Datetime(ms)`.

use crate::error::{ProcessingError, Result, ResultExt};
use crate::table::TimeSeriesTable;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Rows sampled by the CSV reader when inferring column types.
const INFER_SCHEMA_ROWS: usize = 1000;

/// Load a CSV or JSON file, picking the reader from the extension.
pub fn load_local(path: impl AsRef<Path>) -> Result<TimeSeriesTable> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        _ => Err(ProcessingError::UnsupportedFormat(format!(".{ext}"))),
    }
}

/// Load a CSV file whose first column holds the timestamps.
pub fn load_csv(path: impl AsRef<Path>) -> Result<TimeSeriesTable> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .context(format!("Failed to read CSV '{}'", path.display()))?;

    let index_name = df
        .get_column_names()
        .first()
        .map(|name| name.to_string())
        .ok_or_else(|| ProcessingError::index_coercion("file has no columns"))?;

    let table = split_index(df, &index_name)?;
    info!(
        "Loaded {} rows and {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    Ok(table)
}

/// Load a JSON array of records, indexed by its first date/time-like field.
pub fn load_json(path: impl AsRef<Path>) -> Result<TimeSeriesTable> {
    let path = path.as_ref();
    let file = File::open(path).context(format!("Failed to open '{}'", path.display()))?;
    let df = JsonReader::new(file)
        .with_json_format(JsonFormat::Json)
        .finish()
        .context(format!("Failed to read JSON '{}'", path.display()))?;

    let index_name = find_temporal_column(&df).ok_or(ProcessingError::MissingTemporalColumn)?;
    debug!("Using '{}' as the index", index_name);

    let table = split_index(df, &index_name)?;
    info!(
        "Loaded {} rows and {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    Ok(table)
}

/// First column whose name contains "date" or "time", ignoring case.
pub fn find_temporal_column(df: &DataFrame) -> Option<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .find(|name| {
            let lower = name.to_lowercase();
            lower.contains("date") || lower.contains("time")
        })
}

/// Move `index_name` out of the frame and use it as the coerced index.
fn split_index(mut df: DataFrame, index_name: &str) -> Result<TimeSeriesTable> {
    let index = df.drop_in_place(index_name)?.take_materialized_series();
    TimeSeriesTable::new(index, df)?.coerce_index()
}
