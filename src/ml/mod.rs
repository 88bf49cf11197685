//! Machine learning module
//!
//! Dimension reduction for per-variant feature matrices.

pub mod dimension_reduction;

pub use dimension_reduction::{
    ComponentFeatures, FeatureContribution, PcaEngine, PcaResult,
};
