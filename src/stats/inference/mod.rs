// Inferential statistics and hypothesis tests
//
// The tail probabilities here are deliberately simplified approximations.
// Downstream significance cut-offs (0.05 and 0.1) are applied to these
// values, so they must not be swapped for exact distributions without
// re-checking every threshold that consumes them.

use crate::config::InferenceConfig;
use crate::stats::descriptive::{mean, variance};
use crate::stats::{EffectInterpretation, TestMethod, TwoSampleTestResult};

/// Groups smaller than this are compared with Mann-Whitney U
pub const MIN_PARAMETRIC_GROUP_SIZE: usize = 8;

/// Standard normal CDF (Abramowitz and Stegun erf approximation)
pub(crate) fn normal_cdf(z: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let x = z.abs() / (2.0_f64).sqrt();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

/// Approximate two-sided Student-t tail probability
///
/// `t` is shrunk to an equivalent normal deviate with the
/// `z = t (1 - 1/4df) / sqrt(1 + t^2/2df)` correction, then the two-sided
/// tail is taken as `exp(-0.717 z - 0.416 z^2)`. Not the exact incomplete
/// beta function.
pub(crate) fn t_two_tailed_p(t: f64, df: f64) -> f64 {
    if t.is_nan() || !(df > 0.0) {
        return 1.0;
    }
    if t.is_infinite() {
        return 0.0;
    }

    let t = t.abs();
    if t == 0.0 {
        return 1.0;
    }

    let z = t * (1.0 - 1.0 / (4.0 * df)) / (1.0 + t * t / (2.0 * df)).sqrt();
    (-0.717 * z - 0.416 * z * z).exp().clamp(0.0, 1.0)
}

/// Pick the test for two groups of the given sizes
///
/// Mann-Whitney U when either group is smaller than `min_group`,
/// Welch's t-test otherwise.
pub fn select_test(n1: usize, n2: usize, min_group: usize) -> TestMethod {
    if n1 < min_group || n2 < min_group {
        TestMethod::MannWhitneyU
    } else {
        TestMethod::WelchT
    }
}

/// Compare two groups with the test chosen by [`select_test`]
pub fn compare_groups(a: &[f64], b: &[f64]) -> TwoSampleTestResult {
    compare_groups_with(a, b, &InferenceConfig::default())
}

/// Compare two groups using explicit inference settings
pub fn compare_groups_with(a: &[f64], b: &[f64], config: &InferenceConfig) -> TwoSampleTestResult {
    let mut result = match select_test(a.len(), b.len(), config.min_parametric_group_size) {
        TestMethod::WelchT => welch_t_test_impl(a, b),
        TestMethod::MannWhitneyU => mann_whitney_u_impl(a, b),
    };
    result.significant = result.p_value < config.alpha;
    result
}

/// Welch's t-test implementation
pub(crate) fn welch_t_test_impl(sample1: &[f64], sample2: &[f64]) -> TwoSampleTestResult {
    let n1 = sample1.len();
    let n2 = sample2.len();

    if n1 < 2 || n2 < 2 {
        return TwoSampleTestResult::neutral(TestMethod::WelchT);
    }

    let (nf1, nf2) = (n1 as f64, n2 as f64);
    let mean1 = mean(sample1);
    let mean2 = mean(sample2);
    let var1 = variance(sample1);
    let var2 = variance(sample2);
    let diff = mean1 - mean2;

    let se1 = var1 / nf1;
    let se2 = var2 / nf2;
    let std_err = (se1 + se2).sqrt();

    let t_stat = if std_err > 0.0 { diff / std_err } else { 0.0 };

    // Welch-Satterthwaite degrees of freedom
    let df_denom = se1.powi(2) / (nf1 - 1.0) + se2.powi(2) / (nf2 - 1.0);
    let df = if df_denom > 0.0 {
        (se1 + se2).powi(2) / df_denom
    } else {
        nf1 + nf2 - 2.0
    };

    let p_value = if std_err > 0.0 {
        t_two_tailed_p(t_stat, df)
    } else {
        1.0
    };

    // Cohen's d with pooled standard deviation
    let pooled_sd = (((nf1 - 1.0) * var1 + (nf2 - 1.0) * var2) / (nf1 + nf2 - 2.0)).sqrt();
    let effect_size = if pooled_sd > 0.0 { diff / pooled_sd } else { 0.0 };

    let critical = 1.96 + 2.4 / df;
    let margin = critical * std_err;

    TwoSampleTestResult {
        statistic: t_stat,
        p_value,
        significant: p_value < 0.05,
        effect_size,
        effect_interpretation: EffectInterpretation::classify(effect_size),
        ci_lower: diff - margin,
        ci_upper: diff + margin,
        method: TestMethod::WelchT,
    }
}

/// Average ranks (1-based) of `values`, ties sharing their mean rank
pub(crate) fn tie_averaged_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank_avg = (i + 1 + j + 1) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank_avg;
        }
        i = j + 1;
    }

    ranks
}

/// Mann-Whitney U test implementation
pub(crate) fn mann_whitney_u_impl(sample1: &[f64], sample2: &[f64]) -> TwoSampleTestResult {
    let n1 = sample1.len();
    let n2 = sample2.len();

    if n1 < 2 || n2 < 2 {
        return TwoSampleTestResult::neutral(TestMethod::MannWhitneyU);
    }

    let combined: Vec<f64> = sample1.iter().chain(sample2.iter()).copied().collect();
    let ranks = tie_averaged_ranks(&combined);

    let r1: f64 = ranks.iter().take(n1).sum();
    let (nf1, nf2) = (n1 as f64, n2 as f64);
    let u1 = r1 - nf1 * (nf1 + 1.0) / 2.0;
    let u2 = nf1 * nf2 - u1;
    let u_statistic = u1.min(u2);

    // Normal approximation, used even for small groups
    let mean_u = nf1 * nf2 / 2.0;
    let std_u = (nf1 * nf2 * (nf1 + nf2 + 1.0) / 12.0).sqrt();
    let p_value = if std_u > 0.0 {
        let z = (u_statistic - mean_u) / std_u;
        (2.0 * normal_cdf(-z.abs())).clamp(0.0, 1.0)
    } else {
        1.0
    };

    let effect_size = 1.0 - 2.0 * u_statistic / (nf1 * nf2);

    let diff = mean(sample1) - mean(sample2);
    let margin = 1.96 * (variance(sample1) / nf1 + variance(sample2) / nf2).sqrt();

    TwoSampleTestResult {
        statistic: u_statistic,
        p_value,
        significant: p_value < 0.05,
        effect_size,
        effect_interpretation: EffectInterpretation::classify(effect_size),
        ci_lower: diff - margin,
        ci_upper: diff + margin,
        method: TestMethod::MannWhitneyU,
    }
}
