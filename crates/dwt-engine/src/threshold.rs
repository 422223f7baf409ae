//! Coefficient Thresholding for Denoising

use crate::error::DwtError;
use crate::transform::{decompose, reconstruct};
use crate::tree::CoefficientTree;
use filter_bank::Wavelet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Scale factor turning the median absolute deviation into a Gaussian sigma
const MAD_TO_SIGMA: f64 = 0.6745;

/// How coefficients below the cutoff are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Zero coefficients whose magnitude is below the cutoff
    #[default]
    Hard,
    /// Zero small coefficients and shrink the rest toward zero by the cutoff
    Soft,
}

/// How the absolute cutoff of a detail band is derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutoffRule {
    /// Same absolute cutoff for every detail band
    Fixed(f64),
    /// Fraction of the band's peak magnitude
    PeakRatio(f64),
    /// Universal threshold `sigma * sqrt(2 ln N)`, sigma estimated from the
    /// finest detail band
    Universal,
}

impl Default for CutoffRule {
    fn default() -> Self {
        CutoffRule::PeakRatio(0.1)
    }
}

/// Rule applied to detail bands; the approximation is never thresholded
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    /// Hard or soft shrinkage
    pub mode: ThresholdMode,
    /// Cutoff derivation
    pub rule: CutoffRule,
}

impl ThresholdPolicy {
    /// Hard thresholding at a fraction of each band's peak
    pub fn hard_ratio(ratio: f64) -> Self {
        Self {
            mode: ThresholdMode::Hard,
            rule: CutoffRule::PeakRatio(ratio),
        }
    }

    /// Soft thresholding at a fixed cutoff
    pub fn soft_fixed(cutoff: f64) -> Self {
        Self {
            mode: ThresholdMode::Soft,
            rule: CutoffRule::Fixed(cutoff),
        }
    }

    /// Check the rule's parameter
    pub fn validate(&self) -> Result<(), DwtError> {
        match self.rule {
            CutoffRule::Fixed(t) if !(t.is_finite() && t >= 0.0) => Err(DwtError::InvalidPolicy(
                format!("fixed cutoff must be finite and >= 0, got {}", t),
            )),
            CutoffRule::PeakRatio(r) if !(r.is_finite() && r >= 0.0) => Err(DwtError::InvalidPolicy(
                format!("peak ratio must be finite and >= 0, got {}", r),
            )),
            _ => Ok(()),
        }
    }
}

/// Apply `policy` to every detail band, returning a new tree.
///
/// A band whose cutoff is zero (e.g. an all-zero band under a peak ratio)
/// is passed through unchanged.
pub fn threshold(tree: &CoefficientTree, policy: &ThresholdPolicy) -> Result<CoefficientTree, DwtError> {
    if tree.is_empty() {
        return Err(DwtError::EmptyTree);
    }
    policy.validate()?;

    let universal = match policy.rule {
        CutoffRule::Universal => Some(universal_cutoff(tree)),
        _ => None,
    };

    Ok(tree.map_details(|level, band| {
        let cutoff = match policy.rule {
            CutoffRule::Fixed(t) => t,
            CutoffRule::PeakRatio(r) => r * peak_magnitude(band),
            CutoffRule::Universal => universal.unwrap_or(0.0),
        };

        debug!("Thresholding detail level {} at cutoff {:.6}", level, cutoff);

        if cutoff == 0.0 {
            return band.to_vec();
        }
        band.iter()
            .map(|&c| apply(c, cutoff, policy.mode))
            .collect()
    }))
}

/// Decompose, threshold and reconstruct in one call
pub fn denoise(
    signal: &[f64],
    wavelet: &Wavelet,
    levels: usize,
    policy: &ThresholdPolicy,
) -> Result<Vec<f64>, DwtError> {
    let tree = decompose(signal, wavelet, levels)?;
    let cleaned = threshold(&tree, policy)?;
    reconstruct(&cleaned, wavelet)
}

fn apply(c: f64, cutoff: f64, mode: ThresholdMode) -> f64 {
    match mode {
        ThresholdMode::Hard => {
            if c.abs() < cutoff {
                0.0
            } else {
                c
            }
        }
        ThresholdMode::Soft => {
            if c.abs() <= cutoff {
                0.0
            } else {
                c.signum() * (c.abs() - cutoff)
            }
        }
    }
}

fn peak_magnitude(band: &[f64]) -> f64 {
    band.iter().fold(0.0, |acc: f64, c| acc.max(c.abs()))
}

/// VisuShrink cutoff from the MAD of the finest detail band
fn universal_cutoff(tree: &CoefficientTree) -> f64 {
    let finest = match tree.detail(1) {
        Some(d) if !d.is_empty() => d,
        _ => return 0.0,
    };

    let mut magnitudes: Vec<f64> = finest.iter().map(|c| c.abs()).collect();
    magnitudes.sort_by(|a, b| a.total_cmp(b));
    let median = magnitudes[magnitudes.len() / 2];
    let sigma = median / MAD_TO_SIGMA;

    let n = tree.signal_len().max(2) as f64;
    sigma * (2.0 * n.ln()).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> CoefficientTree {
        CoefficientTree::from_parts(
            vec![vec![0.1, -0.5, 2.0, -4.0], vec![0.0, 0.0]],
            vec![10.0, -10.0],
            8,
        )
    }

    #[test]
    fn test_hard_peak_ratio() {
        let out = threshold(&tree(), &ThresholdPolicy::hard_ratio(0.25)).unwrap();
        // cutoff = 0.25 * 4.0 = 1.0
        assert_eq!(out.detail(1).unwrap(), &[0.0, 0.0, 2.0, -4.0]);
    }

    #[test]
    fn test_soft_fixed() {
        let out = threshold(&tree(), &ThresholdPolicy::soft_fixed(1.0)).unwrap();
        assert_eq!(out.detail(1).unwrap(), &[0.0, 0.0, 1.0, -3.0]);
    }

    #[test]
    fn test_approximation_untouched() {
        let out = threshold(&tree(), &ThresholdPolicy::soft_fixed(100.0)).unwrap();
        assert_eq!(out.approximation(), &[10.0, -10.0]);
        assert_eq!(out.detail(1).unwrap(), &[0.0; 4]);
    }

    #[test]
    fn test_zero_band_passes_through() {
        let out = threshold(&tree(), &ThresholdPolicy::hard_ratio(0.5)).unwrap();
        assert_eq!(out.detail(2).unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn test_original_tree_unchanged() {
        let original = tree();
        let _ = threshold(&original, &ThresholdPolicy::hard_ratio(0.9)).unwrap();
        assert_eq!(original, tree());
    }

    #[test]
    fn test_empty_tree_rejected() {
        let empty = CoefficientTree::from_parts(vec![], vec![], 0);
        assert_eq!(
            threshold(&empty, &ThresholdPolicy::default()),
            Err(DwtError::EmptyTree)
        );
    }

    #[test]
    fn test_negative_cutoff_rejected() {
        let policy = ThresholdPolicy::soft_fixed(-1.0);
        assert!(matches!(
            threshold(&tree(), &policy),
            Err(DwtError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_universal_cutoff_from_finest_band() {
        // |d1| sorted = [0.1, 0.5, 2.0, 4.0], median index 2 => 2.0
        let expected = 2.0 / MAD_TO_SIGMA * (2.0 * 8f64.ln()).sqrt();
        assert!((universal_cutoff(&tree()) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_denoise_reduces_noise() {
        use filter_bank::WaveletRegistry;

        let w = WaveletRegistry::with_builtin().get("db4").unwrap();
        let n = 256;
        let clean: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 64.0).sin())
            .collect();
        let noisy: Vec<f64> = clean
            .iter()
            .enumerate()
            .map(|(i, &x)| x + 0.2 * ((i * 7919 % 97) as f64 / 48.0 - 1.0))
            .collect();

        let policy = ThresholdPolicy {
            mode: ThresholdMode::Soft,
            rule: CutoffRule::Universal,
        };
        let denoised = denoise(&noisy, &w, 4, &policy).unwrap();
        assert_eq!(denoised.len(), n);

        let err = |s: &[f64]| -> f64 { s.iter().zip(&clean).map(|(a, b)| (a - b).powi(2)).sum() };
        assert!(err(&denoised) < err(&noisy));
    }
}
