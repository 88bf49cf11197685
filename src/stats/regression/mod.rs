// Regression analysis module

use crate::error::{Error, Result};
use crate::stats::descriptive::mean;
use crate::stats::inference::t_two_tailed_p;
use crate::stats::RegressionResult;

/// Ordinary least-squares fit of y on x
pub(crate) fn fit_impl(x: &[f64], y: &[f64]) -> Result<RegressionResult> {
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch(format!(
            "regression needs paired samples: x has {} values, y has {}",
            x.len(),
            y.len()
        )));
    }

    let n = x.len();
    if n < 2 {
        return Ok(RegressionResult {
            predictions: y.to_vec(),
            p_value: 1.0,
            ..RegressionResult::default()
        });
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    // Centered sums of squares and cross-products
    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    let intercept = mean_y - slope * mean_x;

    let predictions: Vec<f64> = x.iter().map(|&xi| slope * xi + intercept).collect();

    let denominator = (sxx * syy).sqrt();
    let r = if denominator == 0.0 {
        0.0
    } else {
        (sxy / denominator).clamp(-1.0, 1.0)
    };
    let r_squared = r * r;

    let ss_residual: f64 = y
        .iter()
        .zip(predictions.iter())
        .map(|(&yi, &y_hat)| (yi - y_hat).powi(2))
        .sum();

    // SE(slope) = sqrt(RSS / (n - 2) / Sxx), undefined below three points
    let standard_error = if n > 2 && sxx > 0.0 {
        (ss_residual / (n - 2) as f64 / sxx).sqrt()
    } else {
        0.0
    };

    let p_value = if standard_error > 0.0 {
        t_two_tailed_p(slope / standard_error, (n - 2) as f64)
    } else if n > 2 && slope != 0.0 {
        // residuals vanish: the line is exact
        0.0
    } else {
        1.0
    };

    Ok(RegressionResult {
        slope,
        intercept,
        r_squared,
        r,
        p_value,
        standard_error,
        predictions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_regression() {
        let result = fit_impl(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();

        // y = 2x, so intercept 0 and slope 2
        assert!((result.intercept - 0.0).abs() < 1e-10);
        assert!((result.slope - 2.0).abs() < 1e-10);
        assert!((result.r_squared - 1.0).abs() < 1e-10);
        assert_eq!(result.predictions.len(), 3);
        assert_eq!(result.p_value, 0.0);
    }

    #[test]
    fn test_noisy_regression() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let y = vec![2.1, 3.9, 6.2, 7.8, 10.1, 12.2, 13.8, 16.1];
        let result = fit_impl(&x, &y).unwrap();

        assert!((result.slope - 2.0).abs() < 0.1);
        assert!(result.standard_error > 0.0);
        assert!(result.p_value < 0.05);
        assert_eq!(result.r_squared, result.r * result.r);
    }

    #[test]
    fn test_degenerate_single_point() {
        let result = fit_impl(&[1.0], &[5.0]).unwrap();
        assert_eq!(result.slope, 0.0);
        assert_eq!(result.r_squared, 0.0);
        assert_eq!(result.predictions, vec![5.0]);
    }

    #[test]
    fn test_zero_x_variance() {
        let result = fit_impl(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(result.slope, 0.0);
        assert!((result.intercept - 2.0).abs() < 1e-12);
        assert_eq!(result.r, 0.0);
        assert_eq!(result.standard_error, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_two_points_have_no_standard_error() {
        let result = fit_impl(&[0.0, 1.0], &[1.0, 3.0]).unwrap();
        assert!((result.slope - 2.0).abs() < 1e-12);
        assert_eq!(result.standard_error, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        let result = fit_impl(&[1.0, 2.0], &[1.0]);
        assert!(matches!(result, Err(Error::DimensionMismatch(_))));
    }
}
