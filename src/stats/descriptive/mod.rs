// Descriptive statistics module
//
// Shared primitives for every other component. All of them return 0.0
// instead of NaN on empty or degenerate input.

use crate::stats::DescriptiveStats;

/// Arithmetic mean (0 for an empty slice)
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance with n-1 denominator (0 when n < 2)
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Sample standard deviation
pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Coefficient of variation in percent: std / |mean| * 100
pub fn coefficient_of_variation(data: &[f64]) -> f64 {
    let m = mean(data);
    if m == 0.0 {
        return 0.0;
    }
    std_dev(data) / m.abs() * 100.0
}

/// Median of the data (0 for an empty slice)
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sorted = sorted_copy(data);
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Pearson correlation coefficient (0 when either side has no variance)
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mean_x = mean(x);
    let mean_y = mean(y);

    // Σ(xi - x̄)(yi - ȳ)
    let numerator = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (xi - mean_x) * (yi - mean_y))
        .sum::<f64>();

    let ssx = x.iter().map(|&xi| (xi - mean_x).powi(2)).sum::<f64>();
    let ssy = y.iter().map(|&yi| (yi - mean_y).powi(2)).sum::<f64>();
    let denominator = (ssx * ssy).sqrt();

    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// Copy and sort ascending; NaN compares as equal so it never panics
pub(crate) fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

/// Linear-interpolated percentile of already sorted data
fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }

    let n = sorted_data.len();
    let idx = p * (n - 1) as f64;
    let idx_floor = idx.floor() as usize;
    let idx_ceil = idx.ceil() as usize;

    if idx_floor == idx_ceil {
        return sorted_data[idx_floor];
    }

    let weight_ceil = idx - idx_floor as f64;
    let weight_floor = 1.0 - weight_ceil;

    sorted_data[idx_floor] * weight_floor + sorted_data[idx_ceil] * weight_ceil
}

pub(crate) fn describe_impl(data: &[f64]) -> DescriptiveStats {
    if data.is_empty() {
        return DescriptiveStats::default();
    }

    let sorted = sorted_copy(data);
    let count = sorted.len();

    DescriptiveStats {
        count,
        mean: mean(data),
        std: std_dev(data),
        min: sorted[0],
        q1: percentile(&sorted, 0.25),
        median: median(data),
        q3: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_basic() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = describe_impl(&data);

        assert_eq!(stats.count, 5);
        assert!((stats.mean - 3.0).abs() < 1e-10);
        assert!((stats.std - 1.5811388300841898).abs() < 1e-10);
        assert!((stats.min - 1.0).abs() < 1e-10);
        assert!((stats.max - 5.0).abs() < 1e-10);
        assert!((stats.median - 3.0).abs() < 1e-10);
        assert!((stats.q1 - 2.0).abs() < 1e-10);
        assert!((stats.q3 - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_describe_empty() {
        let stats = describe_impl(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.mean, 0.0);
    }

    #[test]
    fn test_degenerate_inputs_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(variance(&[3.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[-1.0, 1.0]), 0.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_cv_uses_absolute_mean() {
        let cv_pos = coefficient_of_variation(&[9.0, 10.0, 11.0]);
        let cv_neg = coefficient_of_variation(&[-9.0, -10.0, -11.0]);
        assert!((cv_pos - 10.0).abs() < 1e-10);
        assert!((cv_pos - cv_neg).abs() < 1e-12);
    }

    #[test]
    fn test_correlation() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((pearson_correlation(&x, &x) - 1.0).abs() < 1e-10);

        let y_neg = vec![5.0, 4.0, 3.0, 2.0, 1.0];
        assert!((pearson_correlation(&x, &y_neg) + 1.0).abs() < 1e-10);

        let y_flat = vec![3.0, 3.0, 3.0, 3.0, 3.0];
        assert_eq!(pearson_correlation(&x, &y_flat), 0.0);
    }
}
