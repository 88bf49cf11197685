//! Statistics module
//!
//! Descriptive statistics, least-squares regression, outlier detection,
//! two-sample hypothesis tests and replicate quality assessment.
//!
//! Every function here is pure. Degenerate input (too few samples, zero
//! variance) yields a neutral result instead of an error; `Err` is only
//! returned for contract violations such as mismatched lengths.

pub mod descriptive;
pub mod inference;
pub mod outliers;
pub mod quality;
pub mod regression;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use inference::{compare_groups, select_test, MIN_PARAMETRIC_GROUP_SIZE};
pub use outliers::{IndexedValue, OutlierEnsemble, OutlierReport};
pub use quality::{QualityAssessor, QualityReport, QualityTier};

/// Calculate basic descriptive statistics
///
/// # Examples
/// ```rust
/// use lanthanide_stats::stats;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let stats = stats::describe(&data);
/// assert_eq!(stats.median, 3.0);
/// ```
pub fn describe<T: AsRef<[f64]>>(data: T) -> DescriptiveStats {
    descriptive::describe_impl(data.as_ref())
}

/// Descriptive statistics of a sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Number of values
    pub count: usize,
    /// Mean
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    /// Minimum
    pub min: f64,
    /// 25th percentile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// 75th percentile
    pub q3: f64,
    /// Maximum
    pub max: f64,
}

/// Pearson correlation between two samples
pub fn correlation<T: AsRef<[f64]>, U: AsRef<[f64]>>(x: T, y: U) -> f64 {
    descriptive::pearson_correlation(x.as_ref(), y.as_ref())
}

/// Simple linear regression result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
    /// Coefficient of determination, always `r * r`
    pub r_squared: f64,
    /// Pearson correlation
    pub r: f64,
    /// Approximate two-sided p-value for the slope
    pub p_value: f64,
    /// Standard error of the slope
    pub standard_error: f64,
    /// Fitted values, one per input x
    pub predictions: Vec<f64>,
}

impl RegressionResult {
    /// Evaluate the fitted line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y` on `x` by ordinary least squares
///
/// Fewer than two points gives a neutral fit whose predictions are `y`
/// unchanged. Mismatched lengths are an error.
///
/// # Examples
/// ```rust
/// use lanthanide_stats::stats;
///
/// let fit = stats::linear_regression(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-10);
/// assert!((fit.r_squared - 1.0).abs() < 1e-10);
/// ```
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<RegressionResult> {
    regression::fit_impl(x, y)
}

/// Two-sample test method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestMethod {
    /// Unequal-variance t-test
    WelchT,
    /// Rank-based Mann-Whitney U test
    MannWhitneyU,
}

impl fmt::Display for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestMethod::WelchT => write!(f, "Welch's t-test"),
            TestMethod::MannWhitneyU => write!(f, "Mann-Whitney U"),
        }
    }
}

/// Magnitude band of an effect size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectInterpretation {
    /// |d| < 0.2
    Negligible,
    /// 0.2 <= |d| < 0.5
    Small,
    /// 0.5 <= |d| < 0.8
    Medium,
    /// |d| >= 0.8
    Large,
}

impl EffectInterpretation {
    /// Band an effect size by its magnitude
    pub fn classify(effect_size: f64) -> Self {
        let d = effect_size.abs();
        if d < 0.2 {
            EffectInterpretation::Negligible
        } else if d < 0.5 {
            EffectInterpretation::Small
        } else if d < 0.8 {
            EffectInterpretation::Medium
        } else {
            EffectInterpretation::Large
        }
    }
}

impl fmt::Display for EffectInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectInterpretation::Negligible => write!(f, "negligible"),
            EffectInterpretation::Small => write!(f, "small"),
            EffectInterpretation::Medium => write!(f, "medium"),
            EffectInterpretation::Large => write!(f, "large"),
        }
    }
}

/// Result of a two-sample comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoSampleTestResult {
    /// t statistic or U statistic
    pub statistic: f64,
    /// Approximate two-sided p-value
    pub p_value: f64,
    /// `p_value < 0.05`
    pub significant: bool,
    /// Cohen's d or rank-biserial correlation
    pub effect_size: f64,
    /// Band of `effect_size`
    pub effect_interpretation: EffectInterpretation,
    /// Lower bound of the 95% CI of the mean difference (a - b)
    pub ci_lower: f64,
    /// Upper bound of the 95% CI of the mean difference (a - b)
    pub ci_upper: f64,
    /// Test that produced this result
    pub method: TestMethod,
}

impl TwoSampleTestResult {
    /// Neutral result used when either group has fewer than two values
    pub fn neutral(method: TestMethod) -> Self {
        TwoSampleTestResult {
            statistic: 0.0,
            p_value: 1.0,
            significant: false,
            effect_size: 0.0,
            effect_interpretation: EffectInterpretation::Negligible,
            ci_lower: 0.0,
            ci_upper: 0.0,
            method,
        }
    }
}

/// Welch's unequal-variance t-test
///
/// # Examples
/// ```rust
/// use lanthanide_stats::stats;
///
/// let a = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// let b = vec![11.0, 12.0, 13.0, 14.0, 15.0];
/// let result = stats::welch_t_test(&a, &b);
/// assert!(result.significant);
/// ```
pub fn welch_t_test<T: AsRef<[f64]>, U: AsRef<[f64]>>(a: T, b: U) -> TwoSampleTestResult {
    inference::welch_t_test_impl(a.as_ref(), b.as_ref())
}

/// Mann-Whitney U test with tie-averaged ranks
pub fn mann_whitney_u<T: AsRef<[f64]>, U: AsRef<[f64]>>(a: T, b: U) -> TwoSampleTestResult {
    inference::mann_whitney_u_impl(a.as_ref(), b.as_ref())
}
