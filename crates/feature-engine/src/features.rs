//! Feature Vector Assembly

use crate::statistics::BandStatistics;
use dwt_engine::{Band, CoefficientTree};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Stabilizer inside the entropy logarithm (`log(0)` is undefined)
pub const ENTROPY_EPSILON: f64 = 1e-10;

/// Errors during feature extraction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Tree holds no coefficients
    #[error("Cannot extract features from an empty coefficient tree")]
    EmptyTree,

    /// Entropy stabilizer that is not a positive finite number
    #[error("Entropy epsilon must be positive and finite, got {0}")]
    InvalidEpsilon(f64),
}

/// Features of a single band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandFeatures {
    /// Band these features describe
    pub band: Band,
    /// Output column name of the band
    pub column: String,
    /// Sum of squared coefficients
    pub energy: f64,
    /// `-sum(c^2 * ln(c^2 + eps))`
    pub entropy: f64,
    /// Population variance of the coefficients
    pub variance: f64,
    /// Mean coefficient
    pub mean: f64,
    /// Standard deviation of the coefficients
    pub std_dev: f64,
    /// Largest coefficient magnitude
    pub max_abs: f64,
    /// Share of the tree's total energy held by this band
    pub relative_energy: f64,
    /// Number of coefficients in the band
    pub coefficient_count: usize,
    /// Frequency range in Hz, when the sampling rate is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_range: Option<(f64, f64)>,
}

/// Per-band features, ordered like the tree's bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Decomposition depth of the source tree
    pub levels: usize,
    /// One entry per band: detail level 1..=L, then the approximation
    pub bands: Vec<BandFeatures>,
}

impl FeatureVector {
    /// Features of a specific band
    pub fn get(&self, band: Band) -> Option<&BandFeatures> {
        self.bands.iter().find(|f| f.band == band)
    }

    /// Band energies in tree order
    pub fn energies(&self) -> Vec<f64> {
        self.bands.iter().map(|f| f.energy).collect()
    }

    /// Band holding the most energy
    pub fn dominant_band(&self) -> Option<Band> {
        self.bands
            .iter()
            .max_by(|a, b| a.energy.total_cmp(&b.energy))
            .map(|f| f.band)
    }

    /// Flat `[energy, entropy, variance]` triples in band order
    pub fn values(&self) -> Vec<f64> {
        self.bands
            .iter()
            .flat_map(|f| [f.energy, f.entropy, f.variance])
            .collect()
    }
}

/// Feature extractor for coefficient trees
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    /// Sampling rate (Hz) used to annotate band frequency ranges
    sample_rate: Option<f64>,
    /// Entropy stabilizer
    epsilon: f64,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            sample_rate: None,
            epsilon: ENTROPY_EPSILON,
        }
    }
}

impl FeatureExtractor {
    /// Create an extractor that annotates bands with their frequency ranges
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate: Some(sample_rate),
            ..Self::default()
        }
    }

    /// Override the entropy stabilizer
    pub fn with_epsilon(mut self, epsilon: f64) -> Result<Self, FeatureError> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(FeatureError::InvalidEpsilon(epsilon));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    /// Extract per-band features from a tree
    pub fn extract(&self, tree: &CoefficientTree) -> Result<FeatureVector, FeatureError> {
        if tree.is_empty() {
            return Err(FeatureError::EmptyTree);
        }

        let levels = tree.levels();
        let total_energy = tree.total_energy();

        let bands: Vec<BandFeatures> = tree
            .bands()
            .map(|(band, coeffs)| {
                let stats = BandStatistics::from_coefficients(coeffs);
                let relative_energy = if total_energy > 0.0 {
                    stats.energy / total_energy
                } else {
                    0.0
                };

                BandFeatures {
                    band,
                    column: band.column_name(levels),
                    energy: stats.energy,
                    entropy: coefficient_entropy(coeffs, self.epsilon),
                    variance: stats.variance,
                    mean: stats.mean,
                    std_dev: stats.std_dev(),
                    max_abs: stats.max_abs(),
                    relative_energy,
                    coefficient_count: coeffs.len(),
                    frequency_range: self
                        .sample_rate
                        .map(|fs| band.frequency_range(fs, levels)),
                }
            })
            .collect();

        debug!(
            "Extracted features for {} bands, total energy {:.4}",
            bands.len(),
            total_energy
        );

        Ok(FeatureVector { levels, bands })
    }
}

/// Extract features with the default extractor (no frequency annotation)
pub fn extract_features(tree: &CoefficientTree) -> Result<FeatureVector, FeatureError> {
    FeatureExtractor::default().extract(tree)
}

/// Entropy of one band, summed per coefficient: `-sum(c^2 * ln(c^2 + eps))`
pub fn coefficient_entropy(coeffs: &[f64], epsilon: f64) -> f64 {
    -coeffs
        .iter()
        .map(|c| {
            let p = c * c;
            p * (p + epsilon).ln()
        })
        .sum::<f64>()
}
