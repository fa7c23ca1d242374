//! Row index coercion.
//!
//! Every index is normalised to Unix epoch milliseconds. The accepted inputs
//! are datetime/date columns, integers (already epoch milliseconds) and
//! strings in the layouts listed in [`parse_timestamp`].

use crate::error::{ProcessingError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Time unit of every coerced index.
pub const INDEX_TIME_UNIT: TimeUnit = TimeUnit::Milliseconds;

const MILLIS_PER_DAY: i64 = 86_400_000;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Parse a single timestamp string into epoch milliseconds.
///
/// Tries RFC 3339 first, then offset-qualified layouts, then naive
/// datetimes (read as UTC), then plain dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.timestamp_millis());
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(s, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis())
    })
}

/// Interpret an index Series as epoch milliseconds, one per row.
///
/// Fails with `IndexCoercionFailure` on null entries, unparseable strings
/// or a dtype that has no temporal reading.
pub fn temporal_index_values(index: &Series) -> Result<Vec<i64>> {
    if index.null_count() > 0 {
        return Err(ProcessingError::index_coercion(format!(
            "index '{}' contains {} null entries",
            index.name(),
            index.null_count()
        )));
    }

    let values: Vec<Option<i64>> = match index.dtype() {
        DataType::Datetime(unit, _) => {
            let divisor = match unit {
                TimeUnit::Nanoseconds => 1_000_000,
                TimeUnit::Microseconds => 1_000,
                TimeUnit::Milliseconds => 1,
            };
            let physical = index.cast(&DataType::Int64)?;
            physical
                .i64()?
                .into_iter()
                .map(|v| v.map(|x| x.div_euclid(divisor)))
                .collect()
        }
        DataType::Date => {
            let days = index.cast(&DataType::Int32)?;
            days.i32()?
                .into_iter()
                .map(|v| v.map(|d| d as i64 * MILLIS_PER_DAY))
                .collect()
        }
        dtype if dtype.is_integer() => index.cast(&DataType::Int64)?.i64()?.into_iter().collect(),
        DataType::String => {
            let strings = index.str()?;
            let mut parsed = Vec::with_capacity(strings.len());
            for (row, value) in strings.into_iter().enumerate() {
                let value = value.unwrap_or_default();
                match parse_timestamp(value) {
                    Some(ms) => parsed.push(Some(ms)),
                    None => {
                        return Err(ProcessingError::index_coercion(format!(
                            "row {row}: '{value}' is not a recognised date/time"
                        )));
                    }
                }
            }
            parsed
        }
        other => {
            return Err(ProcessingError::index_coercion(format!(
                "index '{}' has type {other}, which has no temporal reading",
                index.name()
            )));
        }
    };

    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| ProcessingError::index_coercion(format!("row {row} has no timestamp")))
        })
        .collect()
}

/// Build a `Datetime(ms)` Series from epoch milliseconds.
pub fn datetime_index(name: impl Into<PlSmallStr>, millis: Vec<i64>) -> Result<Series> {
    let physical = Series::new(name.into(), millis);
    Ok(physical.cast(&DataType::Datetime(INDEX_TIME_UNIT, None))?)
}

/// Coerce any supported index to a `Datetime(ms)` Series with the same name.
pub fn coerce_index(index: &Series) -> Result<Series> {
    if matches!(index.dtype(), DataType::Datetime(TimeUnit::Milliseconds, None))
        && index.null_count() == 0
    {
        return Ok(index.clone());
    }
    let millis = temporal_index_values(index)?;
    datetime_index(index.name().clone(), millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAN_1_2024: i64 = 1_704_067_200_000;

    #[test]
    fn test_parse_timestamp_layouts() {
        assert_eq!(parse_timestamp("2024-01-01T00:00:00Z"), Some(JAN_1_2024));
        assert_eq!(parse_timestamp("2024-01-01 00:00:00"), Some(JAN_1_2024));
        assert_eq!(parse_timestamp("2024-01-01 00:00:00.250"), Some(JAN_1_2024 + 250));
        assert_eq!(parse_timestamp("2024-01-01T01:00"), Some(JAN_1_2024 + 3_600_000));
        assert_eq!(parse_timestamp("2024-01-01"), Some(JAN_1_2024));
        assert_eq!(parse_timestamp("2024-01-01 02:00:00+02:00"), Some(JAN_1_2024));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("   "), None);
    }

    #[test]
    fn test_temporal_values_from_strings() {
        let index = Series::new("ts".into(), &["2024-01-01", "2024-01-02"]);
        let values = temporal_index_values(&index).unwrap();
        assert_eq!(values, vec![JAN_1_2024, JAN_1_2024 + MILLIS_PER_DAY]);
    }

    #[test]
    fn test_temporal_values_from_datetime_units() {
        let nanos = Series::new("ts".into(), &[JAN_1_2024 * 1_000_000])
            .cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))
            .unwrap();
        assert_eq!(temporal_index_values(&nanos).unwrap(), vec![JAN_1_2024]);

        let dates = Series::new("d".into(), &[19_723i32]).cast(&DataType::Date).unwrap();
        assert_eq!(temporal_index_values(&dates).unwrap(), vec![JAN_1_2024]);
    }

    #[test]
    fn test_temporal_values_from_integers() {
        let index = Series::new("ts".into(), &[0i64, 1_000]);
        assert_eq!(temporal_index_values(&index).unwrap(), vec![0, 1_000]);
    }

    #[test]
    fn test_coercion_failures() {
        let bad = Series::new("ts".into(), &["2024-01-01", "not a date"]);
        let err = temporal_index_values(&bad).unwrap_err();
        assert!(matches!(err, ProcessingError::IndexCoercionFailure { .. }));
        assert!(err.to_string().contains("not a date"));

        let with_null = Series::new("ts".into(), &[Some(1i64), None]);
        assert!(temporal_index_values(&with_null).is_err());

        let floats = Series::new("ts".into(), &[1.5f64]);
        assert!(temporal_index_values(&floats).is_err());
    }

    #[test]
    fn test_coerce_index_keeps_name() {
        let index = Series::new("when".into(), &["2024-01-01"]);
        let coerced = coerce_index(&index).unwrap();
        assert_eq!(coerced.name().as_str(), "when");
        assert_eq!(
            coerced.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
    }
}
