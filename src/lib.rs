//! Statistical analysis engine for lanthanide-binding selectivity data.
//!
//! Ranks and compares protein variants ("mutants") by their binding
//! preferences across the lanthanide series:
//!
//! - [`stats`]: least-squares regression, outlier ensemble, two-sample tests,
//!   replicate quality assessment
//! - [`selectivity`]: entropy, light/heavy discrimination, k_ex preference
//!   strength and dual-regime offsets over selectivity profiles
//! - [`ml`]: principal component analysis by power iteration
//!
//! Everything is pure and synchronous. Small or degenerate samples give
//! neutral results rather than errors.

pub mod config;
pub mod error;
pub mod ml;
pub mod selectivity;
pub mod stats;

// Re-export commonly used types
pub use config::AnalysisConfig;
pub use error::{Error, Result};
pub use ml::{PcaEngine, PcaResult};
pub use selectivity::SelectivityProfile;
pub use stats::{OutlierEnsemble, OutlierReport, RegressionResult, TwoSampleTestResult};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
