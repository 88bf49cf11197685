//! Analysis configuration
//!
//! Thresholds used across the engine can be loaded from TOML, YAML or JSON.
//! Every field has a default, so a partial document only overrides what it names.
//!
//! # Examples
//!
//! ```
//! use lanthanide_stats::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_toml_str("[outliers]\nmin_agreement = 3\n").unwrap();
//! assert_eq!(config.outliers.min_agreement, 3);
//! assert_eq!(config.pca.max_iterations, 100);
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    /// Outlier ensemble settings
    #[serde(default)]
    pub outliers: OutlierConfig,
    /// Replicate quality tiers
    #[serde(default)]
    pub quality: QualityConfig,
    /// Two-sample test settings
    #[serde(default)]
    pub inference: InferenceConfig,
    /// Principal component analysis settings
    #[serde(default)]
    pub pca: PcaConfig,
}

/// Outlier ensemble configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierConfig {
    /// Number of detectors (out of 3) that must flag an index
    #[serde(default = "default_min_agreement")]
    pub min_agreement: usize,
    /// Z-score cut-off
    #[serde(default = "default_z_threshold")]
    pub z_threshold: f64,
    /// IQR fence multiplier
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            min_agreement: default_min_agreement(),
            z_threshold: default_z_threshold(),
            iqr_multiplier: default_iqr_multiplier(),
        }
    }
}

fn default_min_agreement() -> usize {
    2
}
fn default_z_threshold() -> f64 {
    2.5
}
fn default_iqr_multiplier() -> f64 {
    1.5
}

/// Upper CV% bounds for each quality tier (inclusive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityConfig {
    #[serde(default = "default_excellent_cv")]
    pub excellent_cv: f64,
    #[serde(default = "default_good_cv")]
    pub good_cv: f64,
    #[serde(default = "default_acceptable_cv")]
    pub acceptable_cv: f64,
    #[serde(default = "default_poor_cv")]
    pub poor_cv: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            excellent_cv: default_excellent_cv(),
            good_cv: default_good_cv(),
            acceptable_cv: default_acceptable_cv(),
            poor_cv: default_poor_cv(),
        }
    }
}

fn default_excellent_cv() -> f64 {
    10.0
}
fn default_good_cv() -> f64 {
    20.0
}
fn default_acceptable_cv() -> f64 {
    30.0
}
fn default_poor_cv() -> f64 {
    50.0
}

/// Two-sample comparison configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Significance level
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Groups smaller than this are compared with Mann-Whitney U
    #[serde(default = "default_min_parametric_group_size")]
    pub min_parametric_group_size: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            min_parametric_group_size: default_min_parametric_group_size(),
        }
    }
}

fn default_alpha() -> f64 {
    0.05
}
fn default_min_parametric_group_size() -> usize {
    8
}

/// Power-iteration PCA configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PcaConfig {
    /// Iteration cap per eigenpair
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Convergence tolerance on eigenvector displacement
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Eigenvalues below this are treated as numerical noise
    #[serde(default = "default_eigenvalue_floor")]
    pub eigenvalue_floor: f64,
    /// Seed for the start vectors
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            eigenvalue_floor: default_eigenvalue_floor(),
            seed: default_seed(),
        }
    }
}

fn default_max_iterations() -> usize {
    100
}
fn default_tolerance() -> f64 {
    1e-10
}
fn default_eigenvalue_floor() -> f64 {
    1e-10
}
fn default_seed() -> u64 {
    42
}

impl AnalysisConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML document
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format by extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(Error::Config(format!(
                "unsupported config file extension: {}",
                path.display()
            ))),
        }
    }

    /// Check that every threshold is usable
    pub fn validate(&self) -> Result<()> {
        let o = &self.outliers;
        if o.min_agreement == 0 || o.min_agreement > 3 {
            return Err(Error::InvalidInput(format!(
                "outliers.min_agreement must be in 1..=3, got {}",
                o.min_agreement
            )));
        }
        if !(o.z_threshold > 0.0) || !(o.iqr_multiplier > 0.0) {
            return Err(Error::InvalidInput(
                "outlier thresholds must be positive".to_string(),
            ));
        }

        let q = &self.quality;
        let tiers = [q.excellent_cv, q.good_cv, q.acceptable_cv, q.poor_cv];
        if tiers.iter().any(|t| !(*t >= 0.0)) || tiers.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::InvalidInput(
                "quality CV bounds must be non-negative and ascending".to_string(),
            ));
        }

        let i = &self.inference;
        if !(i.alpha > 0.0 && i.alpha < 1.0) {
            return Err(Error::InvalidInput(format!(
                "inference.alpha must be in (0, 1), got {}",
                i.alpha
            )));
        }

        let p = &self.pca;
        if p.max_iterations == 0 {
            return Err(Error::InvalidInput(
                "pca.max_iterations must be at least 1".to_string(),
            ));
        }
        if !(p.tolerance >= 0.0) || !(p.eigenvalue_floor >= 0.0) {
            return Err(Error::InvalidInput(
                "pca tolerances must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.outliers.min_agreement, 2);
        assert_eq!(config.outliers.z_threshold, 2.5);
        assert_eq!(config.quality.poor_cv, 50.0);
        assert_eq!(config.inference.min_parametric_group_size, 8);
        assert_eq!(config.pca.tolerance, 1e-10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = AnalysisConfig::from_yaml_str("pca:\n  seed: 7\n").unwrap();
        assert_eq!(config.pca.seed, 7);
        assert_eq!(config.pca.max_iterations, 100);
        assert_eq!(config.outliers, OutlierConfig::default());
    }

    #[test]
    fn test_json_round_trip_through_serde() {
        let json = serde_json::to_string(&AnalysisConfig::default()).unwrap();
        let config = AnalysisConfig::from_json_str(&json).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_rejects_bad_agreement() {
        let result = AnalysisConfig::from_toml_str("[outliers]\nmin_agreement = 4\n");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_unordered_quality_tiers() {
        let result = AnalysisConfig::from_toml_str("[quality]\ngood_cv = 5.0\n");
        assert!(result.is_err());
    }
}
