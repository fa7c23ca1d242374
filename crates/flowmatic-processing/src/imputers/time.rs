//! Linear interpolation over elapsed time.

use thiserror::Error;

/// Reasons an interpolation attempt is abandoned.
///
/// These never reach the caller of the cleaning pipeline: the imputer
/// answers every one of them by filling instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("need at least two known points, found {known}")]
    TooFewPoints { known: usize },

    #[error("interpolated value at row {row} is not finite")]
    NonFinite { row: usize },

    #[error("{values} values but {timestamps} timestamps")]
    LengthMismatch { values: usize, timestamps: usize },
}

/// A known value and the time it was observed.
#[derive(Debug, Clone, Copy)]
struct Known {
    at: i64,
    value: f64,
}

/// Fill the gaps in `values` by linear interpolation against `timestamps`.
///
/// Rows need not be in time order. Each gap lies on the straight line
/// between the known points immediately before and after it in time,
/// weighted by elapsed time. Gaps later than every known point take the
/// latest known value; gaps earlier than every known point take the
/// earliest. Row order is never changed.
pub fn interpolate_by_time(
    values: &[Option<f64>],
    timestamps: &[i64],
) -> Result<Vec<Option<f64>>, InterpolationError> {
    if values.len() != timestamps.len() {
        return Err(InterpolationError::LengthMismatch {
            values: values.len(),
            timestamps: timestamps.len(),
        });
    }

    let mut known: Vec<Known> = values
        .iter()
        .zip(timestamps)
        .filter_map(|(v, &at)| v.map(|value| Known { at, value }))
        .collect();

    if known.len() == values.len() {
        return Ok(values.to_vec());
    }
    if known.len() < 2 {
        return Err(InterpolationError::TooFewPoints { known: known.len() });
    }

    // stable: among equal timestamps the earlier row stays first
    known.sort_by_key(|k| k.at);

    let mut filled = values.to_vec();
    for (row, slot) in filled.iter_mut().enumerate() {
        if slot.is_some() {
            continue;
        }

        let t = timestamps[row];
        // first known point strictly later than this row
        let next = known.partition_point(|k| k.at <= t);
        let before = next.checked_sub(1).map(|p| known[p]);
        let after = known.get(next).copied();

        let value = match (before, after) {
            (Some(b), Some(a)) => between(b, a, t),
            (Some(b), None) => b.value,
            (None, Some(a)) => a.value,
            (None, None) => return Err(InterpolationError::TooFewPoints { known: known.len() }),
        };

        if !value.is_finite() {
            return Err(InterpolationError::NonFinite { row });
        }
        *slot = Some(value);
    }

    Ok(filled)
}

fn between(before: Known, after: Known, t: i64) -> f64 {
    if after.at == before.at {
        return before.value;
    }
    // widened so raw epoch integers at the extremes cannot overflow
    let elapsed = i128::from(t) - i128::from(before.at);
    let span = i128::from(after.at) - i128::from(before.at);
    let weight = elapsed as f64 / span as f64;
    before.value + (after.value - before.value) * weight
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_gap_weighted_by_time() {
        // gap sits one quarter of the way from t=0 to t=4000
        let values = [Some(0.0), None, Some(8.0)];
        let times = [0, 1_000, 4_000];
        let filled = interpolate_by_time(&values, &times).unwrap();
        assert_eq!(filled, vec![Some(0.0), Some(2.0), Some(8.0)]);
    }

    #[test]
    fn test_consecutive_gaps() {
        let values = [Some(0.0), None, None, Some(8.0)];
        let times = [0, 1, 3, 4];
        let filled = interpolate_by_time(&values, &times).unwrap();
        assert_eq!(filled, vec![Some(0.0), Some(2.0), Some(6.0), Some(8.0)]);
    }

    #[test]
    fn test_edges_take_nearest_known_value() {
        let values = [None, Some(2.0), Some(4.0), None];
        let times = [0, 1, 2, 3];
        let filled = interpolate_by_time(&values, &times).unwrap();
        assert_eq!(filled, vec![Some(2.0), Some(2.0), Some(4.0), Some(4.0)]);
    }

    #[test]
    fn test_too_few_points() {
        let err = interpolate_by_time(&[None, Some(1.0), None], &[0, 1, 2]).unwrap_err();
        assert_eq!(err, InterpolationError::TooFewPoints { known: 1 });
    }

    #[test]
    fn test_rows_out_of_time_order() {
        // hour 1 sits between hours 0 and 4 even though it is the last row
        let values = [Some(0.0), Some(8.0), None];
        let times = [0, 4, 1];
        let filled = interpolate_by_time(&values, &times).unwrap();
        assert_eq!(filled, vec![Some(0.0), Some(8.0), Some(2.0)]);
    }

    #[test]
    fn test_reversed_rows_use_time_neighbours() {
        let values = [Some(1.0), None, Some(3.0)];
        let filled = interpolate_by_time(&values, &[2, 1, 0]).unwrap();
        assert_eq!(filled, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_edges_follow_time_not_row_position() {
        // the first row is the latest in time, so it takes the latest known value
        let values = [None, Some(2.0), Some(4.0)];
        let filled = interpolate_by_time(&values, &[9, 0, 5]).unwrap();
        assert_eq!(filled, vec![Some(4.0), Some(2.0), Some(4.0)]);
    }

    #[test]
    fn test_extreme_integer_timestamps_do_not_overflow() {
        let values = [Some(0.0), None, Some(10.0)];
        let filled = interpolate_by_time(&values, &[i64::MIN, 0, i64::MAX]).unwrap();
        assert!((filled[1].unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_result() {
        let err = interpolate_by_time(&[Some(f64::MAX), None, Some(-f64::MAX)], &[0, 1, 2]);
        assert!(matches!(err, Err(InterpolationError::NonFinite { row: 1 })));
    }

    #[test]
    fn test_complete_column_untouched() {
        let values = [Some(3.0), Some(1.0)];
        // unsorted timestamps do not matter when there is nothing to fill
        assert_eq!(interpolate_by_time(&values, &[5, 0]).unwrap(), values.to_vec());
    }
}
