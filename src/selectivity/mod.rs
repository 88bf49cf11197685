//! Selectivity metrics
//!
//! Summary statistics over a per-element selectivity profile: Shannon
//! entropy, light/heavy discrimination, k_ex preference strength and the
//! dual-regime (light vs heavy) regression offset.
//!
//! All functions are deterministic in their inputs. Profiles are stored in
//! element order so repeated calls produce bit-identical sums.
//!
//! # Examples
//!
//! ```
//! use lanthanide_stats::selectivity::{selectivity_entropy, SelectivityProfile};
//!
//! let profile: SelectivityProfile = [("La", 50.0), ("Lu", 50.0)].into_iter().collect();
//! let entropy = selectivity_entropy(&profile);
//! assert!((entropy.normalized_entropy - 1.0).abs() < 1e-12);
//! ```

pub mod labels;

pub use labels::{EntropyClass, Preference, PreferenceStrength, RegimePreference};

use crate::error::Result;
use crate::stats::descriptive::mean;
use crate::stats::outliers::OutlierEnsemble;
use crate::stats::{linear_regression, RegressionResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-element percentage of total measured binding
///
/// Values need not sum to exactly 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectivityProfile {
    values: BTreeMap<String, f64>,
}

impl SelectivityProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an element's value, returning the previous one
    pub fn insert<S: Into<String>>(&mut self, element: S, value: f64) -> Option<f64> {
        self.values.insert(element.into(), value)
    }

    pub fn get(&self, element: &str) -> Option<f64> {
        self.values.get(element).copied()
    }

    /// Number of measured elements
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Elements and values in element order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Copy with negative values clamped to zero
    pub fn clamped(&self) -> Self {
        self.values
            .iter()
            .map(|(k, &v)| (k.clone(), v.max(0.0)))
            .collect()
    }

    /// Sum of the positive values of the given elements
    fn positive_sum(&self, elements: &[&str]) -> f64 {
        elements
            .iter()
            .filter_map(|e| self.get(e))
            .filter(|v| *v > 0.0)
            .sum()
    }

    /// Build a profile from per-element replicates
    ///
    /// Each element's replicates are cleaned with the outlier ensemble and
    /// averaged; negative means are clamped to zero and the result is scaled
    /// to percentages of the total. Elements without replicates are skipped.
    pub fn from_replicates<S, V>(replicates: &BTreeMap<S, V>, ensemble: &OutlierEnsemble) -> Self
    where
        S: AsRef<str>,
        V: AsRef<[f64]>,
    {
        let means: Vec<(String, f64)> = replicates
            .iter()
            .filter_map(|(k, v)| {
                let values: &[f64] = v.as_ref();
                if values.is_empty() {
                    return None;
                }
                let report = ensemble.detect(values);
                let element: &str = k.as_ref();
                Some((element.to_string(), mean(&report.cleaned_values).max(0.0)))
            })
            .collect();

        let total: f64 = means.iter().map(|(_, v)| v).sum();
        means
            .into_iter()
            .map(|(k, v)| {
                let pct = if total > 0.0 { v / total * 100.0 } else { 0.0 };
                (k, pct)
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for SelectivityProfile {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        SelectivityProfile {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Shannon entropy of a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyResult {
    /// Raw entropy in nats
    pub entropy: f64,
    /// Entropy divided by ln(number of elements with positive binding)
    pub normalized_entropy: f64,
    /// Label for `normalized_entropy`
    pub interpretation: EntropyClass,
}

/// Shannon entropy of the profile as a probability distribution
///
/// Only positive values contribute; they are renormalized to sum to one.
/// Normalization divides by ln(n) over the positive elements, so zero and
/// negative entries never change the result: 0 means a single binder and 1
/// means uniform binding. A zero-total profile has entropy 0.
pub fn selectivity_entropy(profile: &SelectivityProfile) -> EntropyResult {
    let positive: Vec<f64> = profile.iter().map(|(_, v)| v).filter(|v| *v > 0.0).collect();
    let total: f64 = positive.iter().sum();

    let entropy = if total > 0.0 {
        -positive
            .iter()
            .map(|v| {
                let p = v / total;
                p * p.ln()
            })
            .sum::<f64>()
    } else {
        0.0
    };
    // -0.0 for a single element
    let entropy = entropy.max(0.0);

    let n = positive.len();
    let normalized_entropy = if n > 1 {
        (entropy / (n as f64).ln()).clamp(0.0, 1.0)
    } else {
        0.0
    };

    EntropyResult {
        entropy,
        normalized_entropy,
        interpretation: EntropyClass::classify(normalized_entropy),
    }
}

/// Light/heavy discrimination score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscriminationResult {
    /// (light - heavy) / (light + heavy) * 100, in [-100, 100]
    pub score: f64,
    pub light_sum: f64,
    pub heavy_sum: f64,
    pub preference: Preference,
}

/// Compare total binding of the light and heavy element subsets
///
/// A zero total scores 0 and is balanced.
pub fn light_heavy_discrimination(
    profile: &SelectivityProfile,
    light: &[&str],
    heavy: &[&str],
) -> DiscriminationResult {
    let light_sum = profile.positive_sum(light);
    let heavy_sum = profile.positive_sum(heavy);
    let total = light_sum + heavy_sum;

    let score = if total > 0.0 {
        (light_sum - heavy_sum) / total * 100.0
    } else {
        0.0
    };

    DiscriminationResult {
        score,
        light_sum,
        heavy_sum,
        preference: Preference::classify(score),
    }
}

/// Strength of the selectivity trend against water exchange rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KexPreference {
    /// |slope| * R^2 * min(|t|, 5) / 5
    pub strength: f64,
    /// Capped |slope| / SE
    pub t_statistic: f64,
    pub tier: PreferenceStrength,
    /// p < 0.05 and R^2 > 0.3
    pub reliable: bool,
    /// Sign of the slope: +1 favours fast exchangers, -1 slow, 0 none
    pub direction: i8,
}

impl KexPreference {
    fn none() -> Self {
        KexPreference {
            strength: 0.0,
            t_statistic: 0.0,
            tier: PreferenceStrength::None,
            reliable: false,
            direction: 0,
        }
    }
}

const T_STATISTIC_CAP: f64 = 5.0;

/// Combine slope, fit quality and significance into one strength index
///
/// Requires p < 0.1 and a non-zero standard error; otherwise the strength
/// is 0 and the trend is not reliable.
pub fn kex_preference_strength(regression: &RegressionResult) -> KexPreference {
    if !(regression.p_value < 0.1) || regression.standard_error == 0.0 {
        return KexPreference::none();
    }

    let slope = regression.slope.abs();
    let t_statistic = (slope / regression.standard_error).min(T_STATISTIC_CAP);
    let strength = slope * regression.r_squared * (t_statistic / T_STATISTIC_CAP);

    KexPreference {
        strength,
        t_statistic,
        tier: PreferenceStrength::classify(strength),
        reliable: regression.p_value < 0.05 && regression.r_squared > 0.3,
        direction: if regression.slope > 0.0 {
            1
        } else if regression.slope < 0.0 {
            -1
        } else {
            0
        },
    }
}

/// Regression of selectivity on k_ex together with its strength index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KexCorrelation {
    pub regression: RegressionResult,
    pub preference: KexPreference,
}

/// Fit selectivity (%) on k_ex and score the trend
pub fn kex_correlation(kex: &[f64], selectivity: &[f64]) -> Result<KexCorrelation> {
    let regression = linear_regression(kex, selectivity)?;
    let preference = kex_preference_strength(&regression);
    Ok(KexCorrelation {
        regression,
        preference,
    })
}

/// Vertical gap between the light and heavy regression lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeOffset {
    /// light(midpoint) - heavy(midpoint)
    pub offset: f64,
    /// `offset` as a percentage of the average fitted value
    pub offset_percent: f64,
    pub light_at_midpoint: f64,
    pub heavy_at_midpoint: f64,
    pub slope_difference: f64,
    /// sqrt(SE_light^2 + SE_heavy^2)
    pub combined_standard_error: f64,
    /// |slope difference| > 2 * combined standard error
    pub significant: bool,
    pub preference: RegimePreference,
}

impl RegimeOffset {
    fn insufficient() -> Self {
        RegimeOffset {
            offset: 0.0,
            offset_percent: 0.0,
            light_at_midpoint: 0.0,
            heavy_at_midpoint: 0.0,
            slope_difference: 0.0,
            combined_standard_error: 0.0,
            significant: false,
            preference: RegimePreference::InsufficientData,
        }
    }

    /// Human-readable summary
    pub fn interpretation(&self) -> String {
        let suffix = if self.significant {
            " (slopes differ significantly)"
        } else {
            ""
        };
        match self.preference {
            RegimePreference::InsufficientData => "insufficient data".to_string(),
            RegimePreference::Comparable => {
                format!("Light and heavy regimes bind comparably{}", suffix)
            }
            RegimePreference::Light => format!(
                "Light REEs preferentially bound: {:.1}% above the heavy regime at the midpoint{}",
                self.offset_percent.abs(),
                suffix
            ),
            RegimePreference::Heavy => format!(
                "Heavy REEs preferentially bound: {:.1}% above the light regime at the midpoint{}",
                self.offset_percent.abs(),
                suffix
            ),
        }
    }
}

/// Compare two independently fitted regimes at a midpoint x
///
/// Either regression being absent gives an offset of 0 and
/// [`RegimePreference::InsufficientData`].
pub fn light_heavy_offset(
    light: Option<&RegressionResult>,
    heavy: Option<&RegressionResult>,
    midpoint: f64,
) -> RegimeOffset {
    let (light, heavy) = match (light, heavy) {
        (Some(l), Some(h)) => (l, h),
        _ => return RegimeOffset::insufficient(),
    };

    let light_at_midpoint = light.predict(midpoint);
    let heavy_at_midpoint = heavy.predict(midpoint);
    let offset = light_at_midpoint - heavy_at_midpoint;

    let average = (light_at_midpoint + heavy_at_midpoint) / 2.0;
    let offset_percent = if average == 0.0 {
        0.0
    } else {
        offset / average.abs() * 100.0
    };

    let slope_difference = light.slope - heavy.slope;
    let combined_standard_error =
        (light.standard_error.powi(2) + heavy.standard_error.powi(2)).sqrt();
    let significant = slope_difference.abs() > 2.0 * combined_standard_error;

    let preference = if offset > 0.0 {
        RegimePreference::Light
    } else if offset < 0.0 {
        RegimePreference::Heavy
    } else {
        RegimePreference::Comparable
    };

    RegimeOffset {
        offset,
        offset_percent,
        light_at_midpoint,
        heavy_at_midpoint,
        slope_difference,
        combined_standard_error,
        significant,
        preference,
    }
}

/// Fit (k_ex, selectivity) pairs for one element subset
///
/// Elements missing from either map are skipped. Fewer than two usable
/// points is treated as no regression.
fn fit_subset(
    profile: &SelectivityProfile,
    kex: &BTreeMap<String, f64>,
    elements: &[&str],
) -> Option<RegressionResult> {
    let (x, y): (Vec<f64>, Vec<f64>) = elements
        .iter()
        .filter_map(|e| Some((*kex.get(*e)?, profile.get(e)?)))
        .unzip();

    if x.len() < 2 {
        debug!("regime fit skipped: {} usable elements", x.len());
        return None;
    }
    linear_regression(&x, &y).ok()
}

/// Fit the light and heavy subsets against k_ex and compare them at `midpoint`
pub fn dual_regime_offset(
    profile: &SelectivityProfile,
    kex: &BTreeMap<String, f64>,
    light: &[&str],
    heavy: &[&str],
    midpoint: f64,
) -> RegimeOffset {
    let light_fit = fit_subset(profile, kex, light);
    let heavy_fit = fit_subset(profile, kex, heavy);
    light_heavy_offset(light_fit.as_ref(), heavy_fit.as_ref(), midpoint)
}

/// One mutant in a selectivity ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMutant {
    pub name: String,
    pub normalized_entropy: f64,
    pub interpretation: EntropyClass,
}

/// Rank mutants from most to least selective
///
/// Ordered by normalized entropy ascending, ties broken by name.
pub fn rank_by_selectivity<S: AsRef<str>>(
    profiles: &BTreeMap<S, SelectivityProfile>,
) -> Vec<RankedMutant> {
    let mut ranked: Vec<RankedMutant> = profiles
        .iter()
        .map(|(name, profile)| {
            let entropy = selectivity_entropy(profile);
            let name: &str = name.as_ref();
            RankedMutant {
                name: name.to_string(),
                normalized_entropy: entropy.normalized_entropy,
                interpretation: entropy.interpretation,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.normalized_entropy
            .partial_cmp(&b.normalized_entropy)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked
}
