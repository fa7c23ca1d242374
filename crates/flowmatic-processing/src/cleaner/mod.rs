//! Row deduplication, the first cleaning stage.
//!
//! Rows are keyed by their index value: the first row for every timestamp
//! is kept and later rows with the same timestamp are dropped, whatever
//! their data values.

use crate::error::Result;
use crate::table::TimeSeriesTable;
use tracing::{debug, info};

/// Keep only the first row for each distinct index value, in original order.
pub fn deduplicate(table: &TimeSeriesTable) -> Result<TimeSeriesTable> {
    remove_duplicates(table).map(|(table, _)| table)
}

/// Deduplicate and report how many rows were dropped.
pub(crate) fn remove_duplicates(table: &TimeSeriesTable) -> Result<(TimeSeriesTable, usize)> {
    let before = table.height();
    let deduped = table.dedup_by_index()?;
    let removed = before - deduped.height();

    if removed > 0 {
        let pct = (removed as f64 / before as f64) * 100.0;
        info!("Removed {} duplicate index rows ({:.1}%)", removed, pct);
    } else {
        debug!("No duplicate index rows found");
    }

    Ok((deduped, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::datetime_index;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn table(millis: Vec<i64>, values: Vec<f64>) -> TimeSeriesTable {
        let index = datetime_index("timestamp", millis).unwrap();
        TimeSeriesTable::new(index, df!["v" => values].unwrap()).unwrap()
    }

    #[test]
    fn test_first_row_per_timestamp_wins() {
        let t = table(vec![0, 0, 1, 1, 2], vec![1.0, 9.0, 2.0, 9.0, 3.0]);
        let (out, removed) = remove_duplicates(&t).unwrap();

        assert_eq!(removed, 2);
        let values: Vec<Option<f64>> = out.column("v").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_identical_rows_at_different_times_are_kept() {
        let t = table(vec![0, 1, 2], vec![5.0, 5.0, 5.0]);
        assert_eq!(deduplicate(&t).unwrap().height(), 3);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let t = table(vec![3, 1, 3, 2, 1], vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let once = deduplicate(&t).unwrap();
        let twice = deduplicate(&once).unwrap();
        assert!(once == twice);
    }

    #[test]
    fn test_empty_table() {
        let t = table(vec![], vec![]);
        let (out, removed) = remove_duplicates(&t).unwrap();
        assert_eq!(removed, 0);
        assert!(out.is_empty());
    }
}
