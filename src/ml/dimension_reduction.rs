//! Dimension reduction module
//!
//! Principal component analysis over per-mutant feature vectors. The
//! eigendecomposition is done from scratch with power iteration and
//! deflation; only as many components as requested are extracted.

use crate::config::PcaConfig;
use crate::error::{Error, Result};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Fitted PCA model and projected training data
///
/// An empty result (`n_components == 0`) is returned when the input is too
/// small or no eigenvalue clears the noise floor; check before use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PcaResult {
    /// Unit eigenvectors, one per component, each of length `n_features`
    pub components: Vec<Vec<f64>>,
    /// Eigenvalues of the covariance matrix
    pub explained_variance: Vec<f64>,
    /// Eigenvalue share of the extracted total
    pub explained_variance_ratio: Vec<f64>,
    /// Running sum of `explained_variance_ratio`
    pub cumulative_variance_ratio: Vec<f64>,
    /// Projected scores, `n_samples x n_components`
    pub transformed_data: Vec<Vec<f64>>,
    /// Eigenvectors scaled by sqrt(eigenvalue)
    pub loadings: Vec<Vec<f64>>,
    /// Per-feature mean used for standardization
    pub mean: Vec<f64>,
    /// Per-feature standard deviation (1 for constant features)
    pub std: Vec<f64>,
    pub n_components: usize,
}

impl PcaResult {
    pub fn is_empty(&self) -> bool {
        self.n_components == 0
    }

    fn empty() -> Self {
        Self::default()
    }
}

/// One feature's weight on a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    /// Raw loading
    pub loading: f64,
    /// Squared loading
    pub contribution: f64,
}

/// Top features of one component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentFeatures {
    /// Zero-based component index
    pub component: usize,
    pub features: Vec<FeatureContribution>,
}

/// Power-iteration PCA
#[derive(Debug, Clone, Default)]
pub struct PcaEngine {
    config: PcaConfig,
}

impl PcaEngine {
    pub fn new(config: PcaConfig) -> Self {
        PcaEngine { config }
    }

    /// Engine with default settings and the given seed
    pub fn with_seed(seed: u64) -> Self {
        PcaEngine {
            config: PcaConfig {
                seed,
                ..PcaConfig::default()
            },
        }
    }

    pub fn config(&self) -> &PcaConfig {
        &self.config
    }

    /// Fit PCA on an `n x p` matrix (rows are observations)
    ///
    /// `n_components` defaults to `min(n - 1, p)` and is capped at `p`.
    /// Fewer than two rows or no columns gives an empty result; ragged rows
    /// are an error.
    pub fn fit(&self, data: &[Vec<f64>], n_components: Option<usize>) -> Result<PcaResult> {
        let n_samples = data.len();
        let n_features = data.first().map_or(0, |row| row.len());

        if let Some((i, row)) = data.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(Error::DimensionMismatch(format!(
                "PCA input must be rectangular: row 0 has {} features, row {} has {}",
                n_features,
                i,
                row.len()
            )));
        }

        if n_samples < 2 || n_features == 0 {
            warn!(
                "PCA needs at least 2 samples and 1 feature, got {}x{}; returning empty result",
                n_samples, n_features
            );
            return Ok(PcaResult::empty());
        }

        let k = n_components
            .unwrap_or_else(|| (n_samples - 1).min(n_features))
            .min(n_features);

        let (mean, std) = Self::column_moments(data);
        let standardized: Vec<Vec<f64>> = data
            .iter()
            .map(|row| standardize_row(row, &mean, &std))
            .collect();

        let mut cov_matrix = Self::compute_covariance_matrix(&standardized);

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut eigenvalues = Vec::with_capacity(k);
        let mut components = Vec::with_capacity(k);

        for idx in 0..k {
            let (eigenvalue, eigenvector) = self.power_iteration(&cov_matrix, &mut rng);
            if !(eigenvalue >= self.config.eigenvalue_floor) {
                debug!(
                    "PCA: stopping at component {} (eigenvalue {:e} below floor)",
                    idx, eigenvalue
                );
                break;
            }
            Self::deflate(&mut cov_matrix, eigenvalue, &eigenvector);
            eigenvalues.push(eigenvalue);
            components.push(eigenvector);
        }

        if components.is_empty() {
            return Ok(PcaResult {
                mean,
                std,
                ..PcaResult::empty()
            });
        }

        let total_variance: f64 = eigenvalues.iter().sum();
        let explained_variance_ratio: Vec<f64> =
            eigenvalues.iter().map(|&val| val / total_variance).collect();

        let mut cumulative_variance_ratio = Vec::with_capacity(eigenvalues.len());
        let mut cum_sum = 0.0;
        for &ratio in &explained_variance_ratio {
            cum_sum += ratio;
            cumulative_variance_ratio.push(cum_sum.min(1.0));
        }

        let transformed_data = standardized
            .iter()
            .map(|row| project(row, &components))
            .collect();

        let loadings = components
            .iter()
            .zip(eigenvalues.iter())
            .map(|(v, &val)| {
                let scale = val.sqrt();
                v.iter().map(|&x| x * scale).collect()
            })
            .collect();

        Ok(PcaResult {
            n_components: components.len(),
            components,
            explained_variance: eigenvalues,
            explained_variance_ratio,
            cumulative_variance_ratio,
            transformed_data,
            loadings,
            mean,
            std,
        })
    }

    /// Column means and sample standard deviations (1 for constant columns)
    fn column_moments(data: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
        let n_samples = data.len() as f64;
        let n_features = data[0].len();

        let mut mean = vec![0.0; n_features];
        for sample in data {
            for (j, &val) in sample.iter().enumerate() {
                mean[j] += val;
            }
        }
        for m in mean.iter_mut() {
            *m /= n_samples;
        }

        let std = (0..n_features)
            .map(|j| {
                let ss: f64 = data.iter().map(|row| (row[j] - mean[j]).powi(2)).sum();
                let sd = (ss / (n_samples - 1.0)).sqrt();
                // constant feature: contributes nothing instead of dividing by zero
                if sd > 0.0 && sd.is_finite() {
                    sd
                } else {
                    1.0
                }
            })
            .collect();

        (mean, std)
    }

    /// Sample covariance of already centered data; upper triangle mirrored
    fn compute_covariance_matrix(data: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let n_samples = data.len();
        let n_features = data[0].len();
        let denom = n_samples as f64 - 1.0;

        let mut cov = vec![vec![0.0; n_features]; n_features];
        for i in 0..n_features {
            for j in i..n_features {
                let sum: f64 = data.iter().map(|sample| sample[i] * sample[j]).sum();
                let value = sum / denom;
                cov[i][j] = value;
                cov[j][i] = value;
            }
        }

        cov
    }

    /// Dominant eigenpair by power iteration from a seeded random start
    fn power_iteration(&self, matrix: &[Vec<f64>], rng: &mut StdRng) -> (f64, Vec<f64>) {
        let n = matrix.len();

        let mut vec: Vec<f64> = (0..n).map(|_| rng.random_range(-1.0..1.0)).collect();
        if normalize(&mut vec) == 0.0 {
            vec = vec![1.0 / (n as f64).sqrt(); n];
        }

        let mut converged = false;
        for iter in 0..self.config.max_iterations {
            let mut new_vec = mat_vec(matrix, &vec);
            if normalize(&mut new_vec) == 0.0 {
                // start vector lies in the null space
                return (0.0, vec);
            }

            let displacement = new_vec
                .iter()
                .zip(vec.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            vec = new_vec;

            if displacement < self.config.tolerance {
                debug!("power iteration converged after {} iterations", iter + 1);
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                "power iteration did not converge within {} iterations",
                self.config.max_iterations
            );
        }

        // Rayleigh quotient; vec is unit length
        let av = mat_vec(matrix, &vec);
        let eigenvalue: f64 = vec.iter().zip(av.iter()).map(|(a, b)| a * b).sum();

        orient(&mut vec);
        (eigenvalue, vec)
    }

    /// Remove the rank-1 contribution of an eigenpair
    fn deflate(matrix: &mut [Vec<f64>], eigenvalue: f64, eigenvector: &[f64]) {
        let n = matrix.len();

        for i in 0..n {
            for j in 0..n {
                matrix[i][j] -= eigenvalue * eigenvector[i] * eigenvector[j];
            }
        }
    }
}

fn standardize_row(row: &[f64], mean: &[f64], std: &[f64]) -> Vec<f64> {
    row.iter()
        .zip(mean.iter().zip(std.iter()))
        .map(|(&x, (&m, &s))| (x - m) / s)
        .collect()
}

fn project(row: &[f64], components: &[Vec<f64>]) -> Vec<f64> {
    components
        .iter()
        .map(|c| c.iter().zip(row.iter()).map(|(a, b)| a * b).sum())
        .collect()
}

fn mat_vec(matrix: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    matrix
        .iter()
        .map(|row| row.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
        .collect()
}

/// Scale to unit length in place, returning the original norm
fn normalize(v: &mut [f64]) -> f64 {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        for x in v.iter_mut() {
            *x /= norm;
        }
        norm
    } else {
        0.0
    }
}

/// Flip sign so the largest-magnitude entry is positive
fn orient(v: &mut [f64]) {
    let pivot = v
        .iter()
        .copied()
        .fold(0.0_f64, |best, x| if x.abs() > best.abs() { x } else { best });
    if pivot < 0.0 {
        for x in v.iter_mut() {
            *x = -*x;
        }
    }
}

/// Fit PCA with default settings
///
/// # Examples
/// ```rust
/// use lanthanide_stats::ml::dimension_reduction::fit;
///
/// let data = vec![
///     vec![1.0, 2.0, 3.0],
///     vec![2.0, 4.1, 5.9],
///     vec![3.0, 6.2, 9.1],
///     vec![4.0, 7.9, 12.2],
/// ];
/// let pca = fit(&data, Some(2)).unwrap();
/// assert!(pca.explained_variance_ratio[0] > 0.9);
/// ```
pub fn fit(data: &[Vec<f64>], n_components: Option<usize>) -> Result<PcaResult> {
    PcaEngine::default().fit(data, n_components)
}

/// Project unseen rows with a fitted model
///
/// Rows are standardized with the model's stored mean and std first. An
/// empty model projects every row to an empty vector.
pub fn transform_data(new_rows: &[Vec<f64>], pca: &PcaResult) -> Result<Vec<Vec<f64>>> {
    if pca.is_empty() {
        return Ok(vec![Vec::new(); new_rows.len()]);
    }

    let n_features = pca.mean.len();
    new_rows
        .iter()
        .map(|row| {
            if row.len() != n_features {
                return Err(Error::DimensionMismatch(format!(
                    "PCA model expects {} features, row has {}",
                    n_features,
                    row.len()
                )));
            }
            let z = standardize_row(row, &pca.mean, &pca.std);
            Ok(project(&z, &pca.components))
        })
        .collect()
}

/// Rank features by |loading| for each component
pub fn top_features<S: AsRef<str>>(
    pca: &PcaResult,
    feature_names: &[S],
    top_n: usize,
) -> Result<Vec<ComponentFeatures>> {
    if !pca.is_empty() && feature_names.len() != pca.mean.len() {
        return Err(Error::DimensionMismatch(format!(
            "PCA model has {} features, got {} names",
            pca.mean.len(),
            feature_names.len()
        )));
    }

    Ok(pca
        .loadings
        .iter()
        .enumerate()
        .map(|(component, loading)| {
            let mut features: Vec<FeatureContribution> = loading
                .iter()
                .zip(feature_names.iter())
                .map(|(&l, name)| FeatureContribution {
                    name: AsRef::<str>::as_ref(name).to_string(),
                    loading: l,
                    contribution: l * l,
                })
                .collect();
            features.sort_by(|a, b| {
                b.loading
                    .abs()
                    .partial_cmp(&a.loading.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            features.truncate(top_n);
            ComponentFeatures {
                component,
                features,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_matrix() -> Vec<Vec<f64>> {
        vec![
            vec![2.5, 2.4, 1.2],
            vec![0.5, 0.7, 0.3],
            vec![2.2, 2.9, 1.1],
            vec![1.9, 2.2, 0.4],
            vec![3.1, 3.0, 1.6],
            vec![2.3, 2.7, 0.9],
            vec![2.0, 1.6, 1.4],
        ]
    }

    #[test]
    fn test_power_iteration_known_matrix() {
        let engine = PcaEngine::default();
        let matrix = vec![vec![2.0, 1.0], vec![1.0, 2.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let (eigenvalue, vector) = engine.power_iteration(&matrix, &mut rng);

        assert!((eigenvalue - 3.0).abs() < 1e-8);
        let expected = 1.0 / 2.0_f64.sqrt();
        assert!((vector[0] - expected).abs() < 1e-6);
        assert!((vector[1] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_covariance_is_symmetric() {
        let cov = PcaEngine::compute_covariance_matrix(&sample_matrix());
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(cov[i][j], cov[j][i]);
            }
        }
    }

    #[test]
    fn test_fit_shapes_and_ratios() {
        let pca = fit(&sample_matrix(), None).unwrap();

        assert!(pca.n_components >= 1 && pca.n_components <= 3);
        assert_eq!(pca.components.len(), pca.n_components);
        assert_eq!(pca.transformed_data.len(), 7);
        assert!(pca.transformed_data.iter().all(|r| r.len() == pca.n_components));
        assert!(pca.explained_variance_ratio.iter().sum::<f64>() <= 1.0 + 1e-9);
        assert!(pca
            .cumulative_variance_ratio
            .windows(2)
            .all(|w| w[0] <= w[1] + 1e-12));

        for (c, l) in pca.components.iter().zip(pca.loadings.iter()) {
            let norm: f64 = c.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
            assert_eq!(c.len(), l.len());
        }
    }

    #[test]
    fn test_constant_feature_is_suppressed() {
        let data = vec![
            vec![1.0, 5.0, 2.0],
            vec![2.0, 5.0, 4.1],
            vec![3.0, 5.0, 5.9],
            vec![4.0, 5.0, 8.2],
        ];
        let pca = fit(&data, None).unwrap();
        assert_eq!(pca.std[1], 1.0);
        assert!(pca.components[0][1].abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(fit(&[vec![1.0, 2.0]], None).unwrap().is_empty());
        assert!(fit(&[vec![], vec![]], None).unwrap().is_empty());
        assert!(fit(&[], None).unwrap().is_empty());

        let constant = vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]];
        let pca = fit(&constant, None).unwrap();
        assert_eq!(pca.n_components, 0);
    }

    #[test]
    fn test_ragged_input_is_error() {
        let data = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(fit(&data, None), Err(Error::DimensionMismatch(_))));
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let engine = PcaEngine::with_seed(7);
        let a = engine.fit(&sample_matrix(), Some(2)).unwrap();
        let b = engine.fit(&sample_matrix(), Some(2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_transform_matches_training_projection() {
        let data = sample_matrix();
        let pca = fit(&data, Some(2)).unwrap();
        let projected = transform_data(&data, &pca).unwrap();
        for (a, b) in projected.iter().zip(pca.transformed_data.iter()) {
            for (x, y) in a.iter().zip(b.iter()) {
                assert!((x - y).abs() < 1e-12);
            }
        }

        assert!(transform_data(&[vec![1.0]], &pca).is_err());
    }

    #[test]
    fn test_top_features() {
        let pca = fit(&sample_matrix(), Some(2)).unwrap();
        let names = ["a", "b", "c"];
        let top = top_features(&pca, &names, 2).unwrap();

        assert_eq!(top.len(), pca.n_components);
        for component in &top {
            assert_eq!(component.features.len(), 2);
            assert!(component.features[0].loading.abs() >= component.features[1].loading.abs());
            let f = &component.features[0];
            assert!((f.contribution - f.loading * f.loading).abs() < 1e-15);
        }

        assert!(matches!(
            top_features(&pca, &["a"], 1),
            Err(Error::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_empty_models_project_to_empty_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];

        // too few samples: no mean or std is stored
        let small = fit(&[vec![1.0, 2.0]], None).unwrap();
        assert!(small.mean.is_empty());
        assert_eq!(transform_data(&rows, &small).unwrap(), vec![Vec::<f64>::new(); 2]);

        // no eigenvalue above the floor: mean and std are kept
        let constant = vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]];
        let flat = fit(&constant, None).unwrap();
        assert_eq!(flat.mean.len(), 2);
        assert_eq!(transform_data(&rows, &flat).unwrap(), vec![Vec::<f64>::new(); 2]);
    }
}
