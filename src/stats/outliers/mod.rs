//! Outlier detection module
//!
//! Three independent detectors (Grubbs, IQR, Z-score) combined by majority
//! vote. Replicate sets in this domain are small (typically 2-6 values), where
//! any single detector is brittle; requiring agreement between detectors keeps
//! false positives down.
//!
//! All indices refer to positions in the original input, never to a
//! partially cleaned array. Values travel with their original position as
//! [`IndexedValue`] while detectors remove points.

use crate::config::OutlierConfig;
use crate::stats::descriptive::{mean, sorted_copy, std_dev};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two-sided Grubbs critical values at alpha = 0.05 for n = 3..=20
const GRUBBS_CRITICAL_VALUES: [f64; 18] = [
    1.155, 1.481, 1.715, 1.887, 2.020, 2.126, 2.215, 2.290, 2.355, 2.412, 2.462, 2.507, 2.549,
    2.585, 2.620, 2.651, 2.681, 2.709,
];

/// A value paired with its position in the original input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedValue {
    /// Position in the original input
    pub index: usize,
    /// The value itself
    pub value: f64,
}

/// Pair every value with its position
pub fn indexed(values: &[f64]) -> Vec<IndexedValue> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| IndexedValue { index, value })
        .collect()
}

/// Critical Grubbs value for a sample of size `n`, clamped to the table
///
/// Sizes above 20 use the n = 20 entry rather than extrapolating.
pub fn grubbs_critical_value(n: usize) -> Option<f64> {
    if n < 3 {
        return None;
    }
    let idx = n.min(20) - 3;
    Some(GRUBBS_CRITICAL_VALUES[idx])
}

/// Iterative Grubbs test
///
/// Repeatedly removes the most extreme point while its Grubbs statistic
/// exceeds the critical value. Returns original indices in ascending order.
pub fn grubbs_test(values: &[f64]) -> Vec<usize> {
    let mut remaining = indexed(values);
    let mut flagged = Vec::new();

    while let Some(critical) = grubbs_critical_value(remaining.len()) {
        let current: Vec<f64> = remaining.iter().map(|iv| iv.value).collect();
        let m = mean(&current);
        let sd = std_dev(&current);
        if sd == 0.0 {
            break;
        }

        let (pos, g) = current
            .iter()
            .enumerate()
            .map(|(i, &v)| (i, (v - m).abs() / sd))
            .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best });

        if g <= critical {
            break;
        }

        let removed = remaining.remove(pos);
        debug!(
            "grubbs: removing index {} (value {}, G = {:.3} > {:.3})",
            removed.index, removed.value, g, critical
        );
        flagged.push(removed.index);
    }

    flagged.sort_unstable();
    flagged
}

/// IQR fence test with the standard 1.5 multiplier
pub fn iqr_outliers(values: &[f64]) -> Vec<usize> {
    iqr_outliers_with(values, 1.5)
}

/// IQR fence test
///
/// Quartiles come from simple index splitting of the sorted data
/// (`sorted[floor(n/4)]`, `sorted[floor(3n/4)]`), not interpolation.
/// No-op below four values.
pub fn iqr_outliers_with(values: &[f64], multiplier: f64) -> Vec<usize> {
    let n = values.len();
    if n < 4 {
        return Vec::new();
    }

    let sorted = sorted_copy(values);
    let q1 = sorted[n / 4];
    let q3 = sorted[(3 * n) / 4];
    let iqr = q3 - q1;
    let lower = q1 - multiplier * iqr;
    let upper = q3 + multiplier * iqr;

    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v < lower || v > upper)
        .map(|(i, _)| i)
        .collect()
}

/// Z-score test: flags |value - mean| / std > threshold
///
/// No-op below three values or when the standard deviation is zero.
pub fn z_score_outliers(values: &[f64], threshold: f64) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }
    let m = mean(values);
    let sd = std_dev(values);
    if sd == 0.0 {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| (v - m).abs() / sd > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Raw per-detector results, kept for auditability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBreakdown {
    pub grubbs: Vec<usize>,
    pub iqr: Vec<usize>,
    pub z_score: Vec<usize>,
}

/// Result of the ensemble vote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    /// Confirmed outlier positions, strictly increasing
    pub outlier_indices: Vec<usize>,
    /// Input with the confirmed outliers removed, order preserved
    pub cleaned_values: Vec<f64>,
    /// What each detector flagged on its own
    pub methods: MethodBreakdown,
    /// Votes required to confirm an index
    pub min_agreement: usize,
    outliers: Vec<IndexedValue>,
}

impl OutlierReport {
    /// Confirmed outliers with their original positions
    pub fn outliers(&self) -> &[IndexedValue] {
        &self.outliers
    }

    /// Number of confirmed outliers
    pub fn outlier_count(&self) -> usize {
        self.outlier_indices.len()
    }

    /// Whether any outlier was confirmed
    pub fn has_outliers(&self) -> bool {
        !self.outlier_indices.is_empty()
    }
}

/// Majority-vote ensemble of the three detectors
#[derive(Debug, Clone, Default)]
pub struct OutlierEnsemble {
    config: OutlierConfig,
}

impl OutlierEnsemble {
    /// Create an ensemble from configuration
    pub fn new(config: OutlierConfig) -> Self {
        OutlierEnsemble { config }
    }

    /// Run all three detectors and keep indices with enough votes
    pub fn detect(&self, values: &[f64]) -> OutlierReport {
        let methods = MethodBreakdown {
            grubbs: grubbs_test(values),
            iqr: iqr_outliers_with(values, self.config.iqr_multiplier),
            z_score: z_score_outliers(values, self.config.z_threshold),
        };

        let mut votes: BTreeMap<usize, usize> = BTreeMap::new();
        for &idx in methods
            .grubbs
            .iter()
            .chain(methods.iqr.iter())
            .chain(methods.z_score.iter())
        {
            *votes.entry(idx).or_insert(0) += 1;
        }

        let min_agreement = self.config.min_agreement;
        let outlier_indices: Vec<usize> = votes
            .into_iter()
            .filter(|&(_, count)| count >= min_agreement)
            .map(|(idx, _)| idx)
            .collect();

        let (outliers, kept): (Vec<IndexedValue>, Vec<IndexedValue>) = indexed(values)
            .into_iter()
            .partition(|iv| outlier_indices.binary_search(&iv.index).is_ok());

        if !outliers.is_empty() {
            debug!(
                "outlier ensemble: {} of {} values confirmed (grubbs {:?}, iqr {:?}, z {:?})",
                outliers.len(),
                values.len(),
                methods.grubbs,
                methods.iqr,
                methods.z_score
            );
        }

        OutlierReport {
            outlier_indices,
            cleaned_values: kept.into_iter().map(|iv| iv.value).collect(),
            methods,
            min_agreement,
            outliers,
        }
    }
}

/// Ensemble vote with default thresholds and the given agreement level
///
/// # Examples
/// ```rust
/// use lanthanide_stats::stats::outliers::combined;
///
/// let report = combined(&[1.0, 2.0, 3.0, 4.0, 100.0], 2);
/// assert_eq!(report.outlier_indices, vec![4]);
/// assert_eq!(report.cleaned_values, vec![1.0, 2.0, 3.0, 4.0]);
/// ```
pub fn combined(values: &[f64], min_agreement: usize) -> OutlierReport {
    OutlierEnsemble::new(OutlierConfig {
        min_agreement,
        ..OutlierConfig::default()
    })
    .detect(values)
}
