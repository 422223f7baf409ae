//! Wavelet Filter Definitions

use crate::error::FilterBankError;
use serde::{Deserialize, Serialize};

/// Tolerance for the orthonormality checks on a scaling filter
const ORTHONORMAL_TOLERANCE: f64 = 1e-6;

/// Analysis and synthesis filters of a two-channel filter bank.
///
/// Filters are stored in correlation order: an analysis output sample at
/// position `i` is `sum_k filter[k] * x[2i + k]`, and synthesis spreads a
/// coefficient at `i` back onto positions `2i + k` weighted by the matching
/// synthesis tap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterQuad {
    /// Low-pass analysis filter (scaling filter)
    pub analysis_low: Vec<f64>,
    /// High-pass analysis filter (wavelet filter)
    pub analysis_high: Vec<f64>,
    /// Low-pass synthesis filter
    pub synthesis_low: Vec<f64>,
    /// High-pass synthesis filter
    pub synthesis_high: Vec<f64>,
}

impl FilterQuad {
    /// Build the quadruple of an orthogonal family from its scaling filter.
    ///
    /// The high-pass filter is the quadrature mirror
    /// `g[k] = (-1)^k * h[N-1-k]`; synthesis reuses the analysis taps.
    pub fn orthogonal(scaling: &[f64]) -> Self {
        let n = scaling.len();
        let high: Vec<f64> = (0..n)
            .map(|k| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                sign * scaling[n - 1 - k]
            })
            .collect();

        Self {
            analysis_low: scaling.to_vec(),
            analysis_high: high.clone(),
            synthesis_low: scaling.to_vec(),
            synthesis_high: high,
        }
    }

    /// Number of taps per filter
    pub fn len(&self) -> usize {
        self.analysis_low.len()
    }

    /// Whether the filters carry no taps
    pub fn is_empty(&self) -> bool {
        self.analysis_low.is_empty()
    }

    fn validate(&self) -> Result<(), FilterBankError> {
        let n = self.analysis_low.len();
        if n < 2 || n % 2 != 0 {
            return Err(FilterBankError::InvalidFilter(format!(
                "filter length must be even and >= 2, got {}",
                n
            )));
        }

        let lengths = [
            self.analysis_high.len(),
            self.synthesis_low.len(),
            self.synthesis_high.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(FilterBankError::InvalidFilter(format!(
                "all four filters must have {} taps, got {:?}",
                n, lengths
            )));
        }

        let non_finite = self
            .analysis_low
            .iter()
            .chain(&self.analysis_high)
            .chain(&self.synthesis_low)
            .chain(&self.synthesis_high)
            .any(|tap| !tap.is_finite());
        if non_finite {
            return Err(FilterBankError::InvalidFilter(
                "filter taps must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

/// A named wavelet family with its filter quadruple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wavelet {
    name: String,
    filters: FilterQuad,
}

impl Wavelet {
    /// Create an orthogonal wavelet from its scaling filter.
    ///
    /// The scaling filter must sum to `sqrt(2)` and be orthonormal to its
    /// own even shifts, otherwise reconstruction would not be perfect.
    pub fn orthogonal(name: impl Into<String>, scaling: &[f64]) -> Result<Self, FilterBankError> {
        let filters = FilterQuad::orthogonal(scaling);
        filters.validate()?;

        let sum: f64 = scaling.iter().sum();
        if (sum - std::f64::consts::SQRT_2).abs() > ORTHONORMAL_TOLERANCE {
            return Err(FilterBankError::InvalidFilter(format!(
                "scaling filter must sum to sqrt(2), got {:.9}",
                sum
            )));
        }

        let n = scaling.len();
        for shift in (0..n).step_by(2) {
            let dot: f64 = (0..n - shift).map(|k| scaling[k] * scaling[k + shift]).sum();
            let expected = if shift == 0 { 1.0 } else { 0.0 };
            if (dot - expected).abs() > ORTHONORMAL_TOLERANCE {
                return Err(FilterBankError::InvalidFilter(format!(
                    "scaling filter is not orthonormal at shift {}: {:.9}",
                    shift, dot
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            filters,
        })
    }

    /// Create a wavelet from an explicit filter quadruple (e.g. biorthogonal)
    pub fn from_filters(name: impl Into<String>, filters: FilterQuad) -> Result<Self, FilterBankError> {
        filters.validate()?;
        Ok(Self {
            name: name.into(),
            filters,
        })
    }

    /// Family name as registered
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Analysis and synthesis filters
    pub fn filters(&self) -> &FilterQuad {
        &self.filters
    }

    /// Number of taps per filter
    pub fn filter_len(&self) -> usize {
        self.filters.len()
    }

    /// Deepest level at which the filter still fits the coarsest band.
    ///
    /// Deeper levels are legal as long as `2^levels <= signal_len`, but every
    /// extra level is dominated by wrap-around of the periodic extension.
    pub fn max_useful_level(&self, signal_len: usize) -> usize {
        let span = self.filter_len().saturating_sub(1).max(1);
        if signal_len < span {
            return 0;
        }
        ((signal_len / span) as f64).log2().floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haar_quadrature_mirror() {
        let v = std::f64::consts::FRAC_1_SQRT_2;
        let wavelet = Wavelet::orthogonal("haar", &[v, v]).unwrap();
        let filters = wavelet.filters();
        assert_eq!(filters.analysis_high, vec![v, -v]);
        assert_eq!(filters.synthesis_low, filters.analysis_low);
        assert_eq!(filters.synthesis_high, filters.analysis_high);
    }

    #[test]
    fn test_high_pass_has_zero_mean() {
        let s3 = 3.0_f64.sqrt();
        let d = 4.0 * std::f64::consts::SQRT_2;
        let scaling = [(1.0 + s3) / d, (3.0 + s3) / d, (3.0 - s3) / d, (1.0 - s3) / d];
        let wavelet = Wavelet::orthogonal("db2", &scaling).unwrap();
        let sum: f64 = wavelet.filters().analysis_high.iter().sum();
        assert!(sum.abs() < 1e-12);
    }

    #[test]
    fn test_rejects_odd_length() {
        let err = Wavelet::orthogonal("bad", &[1.0, 0.2, 0.2]).unwrap_err();
        assert!(matches!(err, FilterBankError::InvalidFilter(_)));
    }

    #[test]
    fn test_rejects_non_orthonormal() {
        let err = Wavelet::orthogonal("bad", &[1.0, 0.414_213_562_373_095]).unwrap_err();
        assert!(matches!(err, FilterBankError::InvalidFilter(_)));
    }

    #[test]
    fn test_from_filters_length_mismatch() {
        let quad = FilterQuad {
            analysis_low: vec![0.5, 0.5],
            analysis_high: vec![0.5, -0.5],
            synthesis_low: vec![1.0, 1.0, 0.0, 0.0],
            synthesis_high: vec![1.0, -1.0],
        };
        assert!(Wavelet::from_filters("mismatch", quad).is_err());
    }

    #[test]
    fn test_max_useful_level() {
        let v = std::f64::consts::FRAC_1_SQRT_2;
        let haar = Wavelet::orthogonal("haar", &[v, v]).unwrap();
        assert_eq!(haar.max_useful_level(1024), 10);
        assert_eq!(haar.max_useful_level(1000), 9);
        assert_eq!(haar.max_useful_level(0), 0);
    }
}
