//! Categorical labels for selectivity metrics
//!
//! The numeric metrics never depend on these; labels can be revised here
//! without touching the math.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selectivity class from normalized entropy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntropyClass {
    /// normalized entropy < 0.3
    HighlySelective,
    /// < 0.6
    Selective,
    /// < 0.8
    Moderate,
    /// >= 0.8
    Promiscuous,
}

impl EntropyClass {
    pub fn classify(normalized_entropy: f64) -> Self {
        if normalized_entropy < 0.3 {
            EntropyClass::HighlySelective
        } else if normalized_entropy < 0.6 {
            EntropyClass::Selective
        } else if normalized_entropy < 0.8 {
            EntropyClass::Moderate
        } else {
            EntropyClass::Promiscuous
        }
    }
}

impl fmt::Display for EntropyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntropyClass::HighlySelective => write!(f, "highly selective"),
            EntropyClass::Selective => write!(f, "selective"),
            EntropyClass::Moderate => write!(f, "moderate"),
            EntropyClass::Promiscuous => write!(f, "promiscuous"),
        }
    }
}

/// Light/heavy preference from a discrimination score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preference {
    Light,
    Heavy,
    Balanced,
}

impl Preference {
    /// Score above 15 is light, below -15 heavy
    pub fn classify(score: f64) -> Self {
        if score > 15.0 {
            Preference::Light
        } else if score < -15.0 {
            Preference::Heavy
        } else {
            Preference::Balanced
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preference::Light => write!(f, "light"),
            Preference::Heavy => write!(f, "heavy"),
            Preference::Balanced => write!(f, "balanced"),
        }
    }
}

/// Tier of the k_ex preference strength index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PreferenceStrength {
    None,
    Weak,
    Moderate,
    Strong,
}

impl PreferenceStrength {
    pub fn classify(strength: f64) -> Self {
        if strength < 0.01 {
            PreferenceStrength::None
        } else if strength < 0.05 {
            PreferenceStrength::Weak
        } else if strength < 0.15 {
            PreferenceStrength::Moderate
        } else {
            PreferenceStrength::Strong
        }
    }
}

impl fmt::Display for PreferenceStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceStrength::None => write!(f, "none"),
            PreferenceStrength::Weak => write!(f, "weak"),
            PreferenceStrength::Moderate => write!(f, "moderate"),
            PreferenceStrength::Strong => write!(f, "strong"),
        }
    }
}

/// Which element subset sits higher at the regime midpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegimePreference {
    Light,
    Heavy,
    Comparable,
    InsufficientData,
}

impl fmt::Display for RegimePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegimePreference::Light => write!(f, "light"),
            RegimePreference::Heavy => write!(f, "heavy"),
            RegimePreference::Comparable => write!(f, "comparable"),
            RegimePreference::InsufficientData => write!(f, "insufficient data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_bands() {
        assert_eq!(EntropyClass::classify(0.0), EntropyClass::HighlySelective);
        assert_eq!(EntropyClass::classify(0.3), EntropyClass::Selective);
        assert_eq!(EntropyClass::classify(0.79), EntropyClass::Moderate);
        assert_eq!(EntropyClass::classify(1.0), EntropyClass::Promiscuous);
        assert_eq!(EntropyClass::HighlySelective.to_string(), "highly selective");
    }

    #[test]
    fn test_preference_bands_are_exclusive_at_fifteen() {
        assert_eq!(Preference::classify(15.0), Preference::Balanced);
        assert_eq!(Preference::classify(15.1), Preference::Light);
        assert_eq!(Preference::classify(-15.1), Preference::Heavy);
    }

    #[test]
    fn test_strength_bands() {
        assert_eq!(PreferenceStrength::classify(0.0), PreferenceStrength::None);
        assert_eq!(PreferenceStrength::classify(0.01), PreferenceStrength::Weak);
        assert_eq!(PreferenceStrength::classify(0.1), PreferenceStrength::Moderate);
        assert_eq!(PreferenceStrength::classify(0.15), PreferenceStrength::Strong);
    }
}
