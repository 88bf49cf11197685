//! Replicate quality assessment
//!
//! Maps replicate variability (CV%) and outlier flags to a quality tier.

use crate::config::{OutlierConfig, QualityConfig};
use crate::stats::descriptive::coefficient_of_variation;
use crate::stats::outliers::OutlierEnsemble;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quality tier of a replicate set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QualityTier {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Unreliable,
}

impl QualityTier {
    /// Tier for a CV% under the given bounds
    pub fn classify(cv: f64, bounds: &QualityConfig) -> Self {
        if cv <= bounds.excellent_cv {
            QualityTier::Excellent
        } else if cv <= bounds.good_cv {
            QualityTier::Good
        } else if cv <= bounds.acceptable_cv {
            QualityTier::Acceptable
        } else if cv <= bounds.poor_cv {
            QualityTier::Poor
        } else {
            QualityTier::Unreliable
        }
    }

    /// Advice shown alongside the tier
    pub fn recommendation(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "Replicates are highly consistent",
            QualityTier::Good => "Replicates are consistent",
            QualityTier::Acceptable => "Replicate variability is acceptable; interpret with care",
            QualityTier::Poor => "High replicate variability; consider repeating the measurement",
            QualityTier::Unreliable => "Replicate variability too high; repeat the measurement",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QualityTier::Excellent => "excellent",
            QualityTier::Good => "good",
            QualityTier::Acceptable => "acceptable",
            QualityTier::Poor => "poor",
            QualityTier::Unreliable => "unreliable",
        };
        write!(f, "{}", label)
    }
}

/// Quality assessment of one replicate set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Coefficient of variation in percent
    pub cv: f64,
    /// Tier derived from `cv`
    pub quality: QualityTier,
    /// Whether the outlier ensemble confirmed any value
    pub has_outliers: bool,
    /// Number of confirmed outliers
    pub outlier_count: usize,
    /// Human-readable advice
    pub recommendation: String,
}

/// Replicate quality assessor
#[derive(Debug, Clone, Default)]
pub struct QualityAssessor {
    bounds: QualityConfig,
    ensemble: OutlierEnsemble,
}

impl QualityAssessor {
    /// Create an assessor with explicit tier bounds and outlier settings
    pub fn new(bounds: QualityConfig, outliers: OutlierConfig) -> Self {
        QualityAssessor {
            bounds,
            ensemble: OutlierEnsemble::new(outliers),
        }
    }

    /// Assess one replicate set
    ///
    /// Fewer than two values is reported as unreliable.
    pub fn assess(&self, values: &[f64]) -> QualityReport {
        if values.len() < 2 {
            return QualityReport {
                cv: 0.0,
                quality: QualityTier::Unreliable,
                has_outliers: false,
                outlier_count: 0,
                recommendation: "At least two replicates are required to assess quality"
                    .to_string(),
            };
        }

        let cv = coefficient_of_variation(values);
        let quality = QualityTier::classify(cv, &self.bounds);
        let outlier_count = self.ensemble.detect(values).outlier_count();

        let mut recommendation = quality.recommendation().to_string();
        if outlier_count > 0 {
            recommendation.push_str(&format!(
                " ({} outlier{} detected)",
                outlier_count,
                if outlier_count == 1 { "" } else { "s" }
            ));
        }

        QualityReport {
            cv,
            quality,
            has_outliers: outlier_count > 0,
            outlier_count,
            recommendation,
        }
    }

    /// Assess many replicate sets in parallel, preserving order
    pub fn assess_many<S: AsRef<[f64]> + Sync>(&self, sets: &[S]) -> Vec<QualityReport> {
        sets.par_iter().map(|s| self.assess(s.as_ref())).collect()
    }
}

/// Assess a replicate set with default thresholds
pub fn assess(values: &[f64]) -> QualityReport {
    QualityAssessor::default().assess(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers() {
        let bounds = QualityConfig::default();
        assert_eq!(QualityTier::classify(10.0, &bounds), QualityTier::Excellent);
        assert_eq!(QualityTier::classify(10.01, &bounds), QualityTier::Good);
        assert_eq!(QualityTier::classify(30.0, &bounds), QualityTier::Acceptable);
        assert_eq!(QualityTier::classify(50.0, &bounds), QualityTier::Poor);
        assert_eq!(QualityTier::classify(50.5, &bounds), QualityTier::Unreliable);
    }

    #[test]
    fn test_assess_consistent_replicates() {
        let report = assess(&[9.0, 10.0, 11.0]);
        assert!((report.cv - 10.0).abs() < 1e-10);
        assert_eq!(report.quality, QualityTier::Excellent);
        assert!(!report.has_outliers);
    }

    #[test]
    fn test_assess_single_value() {
        let report = assess(&[4.2]);
        assert_eq!(report.quality, QualityTier::Unreliable);
        assert!(report.recommendation.contains("two replicates"));
    }

    #[test]
    fn test_assess_appends_outlier_count() {
        let report = assess(&[1.0, 2.0, 3.0, 4.0, 100.0]);
        assert!(report.has_outliers);
        assert_eq!(report.outlier_count, 1);
        assert!(report.recommendation.ends_with("(1 outlier detected)"));
    }

    #[test]
    fn test_zero_mean_has_zero_cv() {
        let report = assess(&[-1.0, 1.0]);
        assert_eq!(report.cv, 0.0);
        assert_eq!(report.quality, QualityTier::Excellent);
    }

    #[test]
    fn test_assess_many_preserves_order() {
        let sets = vec![vec![9.0, 10.0, 11.0], vec![1.0], vec![10.0, 20.0, 30.0]];
        let reports = QualityAssessor::default().assess_many(&sets);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].quality, QualityTier::Excellent);
        assert_eq!(reports[1].quality, QualityTier::Unreliable);
        assert_eq!(reports[2].quality, QualityTier::Poor);
    }
}
