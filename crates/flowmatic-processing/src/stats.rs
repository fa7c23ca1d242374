//! Summary statistics over columns with missing entries.
//!
//! All functions skip `None` values. Results are `None` when there is
//! nothing left to summarize.

/// Mean of the present values.
pub fn mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Population standard deviation (divides by `n`) of the present values.
pub fn population_std(values: &[Option<f64>]) -> Option<f64> {
    let mean = mean(values)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / present.len() as f64;
    Some(variance.sqrt())
}

/// Quantile of the present values using linear interpolation between the
/// two closest ranks. `q` is clamped into `[0, 1]`.
pub fn quantile(values: &[Option<f64>], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_mean_skips_missing() {
        assert_eq!(mean(&[Some(1.0), None, Some(3.0)]), Some(2.0));
        assert_eq!(mean(&[None, None]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_population_std() {
        let values = present(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(population_std(&values), Some(2.0));
        assert_eq!(population_std(&present(&[5.0, 5.0])), Some(0.0));
        assert_eq!(population_std(&[None]), None);
    }

    #[test]
    fn test_quantile_linear_interpolation() {
        let values = present(&[1.0, 2.0, 3.0, 4.0, 100.0]);
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 0.5), Some(3.0));
        assert_eq!(quantile(&values, 1.0), Some(100.0));

        // position 3.96 -> 4 + 0.96 * 96
        let q99 = quantile(&values, 0.99).unwrap();
        assert!((q99 - 96.16).abs() < 1e-9);
    }

    #[test]
    fn test_quantile_ignores_order_and_missing() {
        let values = vec![Some(10.0), None, Some(0.0), Some(5.0)];
        assert_eq!(quantile(&values, 0.5), Some(5.0));
        assert_eq!(quantile(&[None, None], 0.5), None);
    }
}
