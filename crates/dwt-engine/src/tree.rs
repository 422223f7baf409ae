//! Coefficient Tree

use crate::error::DwtError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one band in a coefficient tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    /// Detail band at the given level (1 = finest)
    Detail(usize),
    /// Coarsest approximation band
    Approximation,
}

impl Band {
    /// Map a flat band index to a band of an `levels`-deep tree.
    ///
    /// Indices `0..levels` are detail levels `1..=levels`; index `levels` is
    /// the approximation.
    pub fn from_index(index: usize, levels: usize) -> Option<Self> {
        match index {
            i if i < levels => Some(Band::Detail(i + 1)),
            i if i == levels => Some(Band::Approximation),
            _ => None,
        }
    }

    /// Flat index of this band in an `levels`-deep tree
    pub fn index(&self, levels: usize) -> usize {
        match self {
            Band::Detail(level) => level.saturating_sub(1),
            Band::Approximation => levels,
        }
    }

    /// Output column name (`detail_L{k}` / `approximation_L{L}`)
    pub fn column_name(&self, levels: usize) -> String {
        match self {
            Band::Detail(level) => format!("detail_L{}", level),
            Band::Approximation => format!("approximation_L{}", levels),
        }
    }

    /// Frequency range in Hz covered by this band.
    ///
    /// Detail level `k` spans `[fs/2^(k+1), fs/2^k]`; the approximation of an
    /// `levels`-deep tree spans `[0, fs/2^(levels+1)]`.
    pub fn frequency_range(&self, sampling_rate: f64, levels: usize) -> (f64, f64) {
        match self {
            Band::Detail(level) => {
                let upper = sampling_rate / 2f64.powi(*level as i32);
                (upper / 2.0, upper)
            }
            Band::Approximation => (0.0, sampling_rate / 2f64.powi(levels as i32 + 1)),
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Band::Detail(level) => write!(f, "detail level {}", level),
            Band::Approximation => write!(f, "approximation"),
        }
    }
}

/// Multi-level decomposition of a signal.
///
/// Holds exactly `levels` detail bands (finest first) plus one approximation
/// band. A tree is never modified in place; operations that change
/// coefficients return a new tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTree {
    details: Vec<Vec<f64>>,
    approximation: Vec<f64>,
    signal_len: usize,
}

impl CoefficientTree {
    /// Assemble a tree from raw bands.
    ///
    /// Shapes are not checked here; reconstruction rejects inconsistent
    /// trees with [`DwtError::DimensionMismatch`].
    pub fn from_parts(details: Vec<Vec<f64>>, approximation: Vec<f64>, signal_len: usize) -> Self {
        Self {
            details,
            approximation,
            signal_len,
        }
    }

    /// Number of decomposition levels (detail bands)
    pub fn levels(&self) -> usize {
        self.details.len()
    }

    /// Number of bands (details plus approximation)
    pub fn num_bands(&self) -> usize {
        self.details.len() + 1
    }

    /// Length of the signal the tree was decomposed from
    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    /// Whether the tree holds no usable coefficients
    pub fn is_empty(&self) -> bool {
        self.details.is_empty() || self.signal_len == 0 || self.total_coefficients() == 0
    }

    /// Detail coefficients at `level` (1 = finest)
    pub fn detail(&self, level: usize) -> Option<&[f64]> {
        level
            .checked_sub(1)
            .and_then(|i| self.details.get(i))
            .map(Vec::as_slice)
    }

    /// All detail bands, finest first
    pub fn details(&self) -> &[Vec<f64>] {
        &self.details
    }

    /// Coarsest approximation coefficients
    pub fn approximation(&self) -> &[f64] {
        &self.approximation
    }

    /// Coefficients of any band
    pub fn band(&self, band: Band) -> Option<&[f64]> {
        match band {
            Band::Detail(level) => self.detail(level),
            Band::Approximation => Some(&self.approximation),
        }
    }

    /// Bands in tree order: detail level 1..=L, then the approximation
    pub fn bands(&self) -> impl Iterator<Item = (Band, &[f64])> + '_ {
        self.details
            .iter()
            .enumerate()
            .map(|(i, d)| (Band::Detail(i + 1), d.as_slice()))
            .chain(std::iter::once((
                Band::Approximation,
                self.approximation.as_slice(),
            )))
    }

    /// Frequency range of every band in tree order
    pub fn band_ranges(&self, sampling_rate: f64) -> Vec<(Band, (f64, f64))> {
        let levels = self.levels();
        self.bands()
            .map(|(band, _)| (band, band.frequency_range(sampling_rate, levels)))
            .collect()
    }

    /// Total number of coefficients
    pub fn total_coefficients(&self) -> usize {
        self.approximation.len() + self.details.iter().map(Vec::len).sum::<usize>()
    }

    /// Sum of squared coefficients over every band
    pub fn total_energy(&self) -> f64 {
        self.bands()
            .flat_map(|(_, coeffs)| coeffs.iter())
            .map(|c| c * c)
            .sum()
    }

    /// Copy of this tree with one band replaced
    pub fn with_band(&self, band: Band, coefficients: Vec<f64>) -> Result<Self, DwtError> {
        let mut copy = self.clone();
        match band {
            Band::Detail(level) if level >= 1 && level <= copy.details.len() => {
                copy.details[level - 1] = coefficients;
            }
            Band::Approximation => copy.approximation = coefficients,
            Band::Detail(_) => {
                return Err(DwtError::InvalidBand {
                    index: band.index(self.levels()),
                    levels: self.levels(),
                })
            }
        }
        Ok(copy)
    }

    /// Copy of this tree with every detail band rewritten by `f`
    pub(crate) fn map_details<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, &[f64]) -> Vec<f64>,
    {
        Self {
            details: self
                .details
                .iter()
                .enumerate()
                .map(|(i, d)| f(i + 1, d.as_slice()))
                .collect(),
            approximation: self.approximation.clone(),
            signal_len: self.signal_len,
        }
    }

    /// Copy of this tree with every band except `keep` set to zero
    pub(crate) fn keep_only(&self, keep: Band) -> Self {
        let zeroed = |band: Band, coeffs: &[f64]| {
            if band == keep {
                coeffs.to_vec()
            } else {
                vec![0.0; coeffs.len()]
            }
        };

        Self {
            details: self
                .details
                .iter()
                .enumerate()
                .map(|(i, d)| zeroed(Band::Detail(i + 1), d.as_slice()))
                .collect(),
            approximation: zeroed(Band::Approximation, &self.approximation),
            signal_len: self.signal_len,
        }
    }

    /// Check that band lengths follow the halving chain of the signal length
    pub fn validate_shape(&self) -> Result<(), DwtError> {
        if self.is_empty() {
            return Err(DwtError::EmptyTree);
        }

        let expected = band_lengths(self.signal_len, self.levels());
        for (level, (detail, &len)) in self.details.iter().zip(&expected).enumerate() {
            if detail.len() != len {
                return Err(DwtError::DimensionMismatch {
                    band: Band::Detail(level + 1).to_string(),
                    expected: len,
                    actual: detail.len(),
                });
            }
        }

        let coarsest = expected.last().copied().unwrap_or(self.signal_len);
        if self.approximation.len() != coarsest {
            return Err(DwtError::DimensionMismatch {
                band: Band::Approximation.to_string(),
                expected: coarsest,
                actual: self.approximation.len(),
            });
        }

        Ok(())
    }

    /// Encode the tree as a compact binary snapshot
    pub fn to_bytes(&self) -> Result<Vec<u8>, DwtError> {
        postcard::to_allocvec(self).map_err(|e| DwtError::Snapshot(e.to_string()))
    }

    /// Decode a tree previously written by [`CoefficientTree::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DwtError> {
        postcard::from_bytes(bytes).map_err(|e| DwtError::Snapshot(e.to_string()))
    }
}

/// Band lengths of a `levels`-deep decomposition of `signal_len` samples.
///
/// Each level halves the previous length, rounding up (odd inputs are
/// extended by one sample before downsampling).
pub fn band_lengths(signal_len: usize, levels: usize) -> Vec<usize> {
    let mut lengths = Vec::with_capacity(levels);
    let mut len = signal_len;
    for _ in 0..levels {
        len = (len + 1) / 2;
        lengths.push(len);
    }
    lengths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> CoefficientTree {
        CoefficientTree::from_parts(
            vec![vec![1.0, -1.0, 0.5, 0.0], vec![2.0, 0.0]],
            vec![3.0, 4.0],
            8,
        )
    }

    #[test]
    fn test_band_lengths_halving() {
        assert_eq!(band_lengths(64, 3), vec![32, 16, 8]);
        assert_eq!(band_lengths(13, 3), vec![7, 4, 2]);
        assert_eq!(band_lengths(1, 1), vec![1]);
    }

    #[test]
    fn test_band_index_roundtrip() {
        for index in 0..=4 {
            let band = Band::from_index(index, 4).unwrap();
            assert_eq!(band.index(4), index);
        }
        assert_eq!(Band::from_index(5, 4), None);
    }

    #[test]
    fn test_column_names() {
        assert_eq!(Band::Detail(2).column_name(3), "detail_L2");
        assert_eq!(Band::Approximation.column_name(3), "approximation_L3");
    }

    #[test]
    fn test_frequency_ranges() {
        assert_eq!(Band::Detail(1).frequency_range(256.0, 4), (64.0, 128.0));
        assert_eq!(Band::Detail(3).frequency_range(256.0, 4), (16.0, 32.0));
        assert_eq!(Band::Approximation.frequency_range(256.0, 4), (0.0, 8.0));
        assert_eq!(Band::Approximation.frequency_range(1000.0, 3), (0.0, 62.5));
    }

    #[test]
    fn test_bands_order() {
        let tree = sample_tree();
        let order: Vec<Band> = tree.bands().map(|(band, _)| band).collect();
        assert_eq!(
            order,
            vec![Band::Detail(1), Band::Detail(2), Band::Approximation]
        );
    }

    #[test]
    fn test_with_band_leaves_original() {
        let tree = sample_tree();
        let modified = tree.with_band(Band::Detail(1), vec![0.0; 4]).unwrap();
        assert_eq!(tree.detail(1).unwrap(), &[1.0, -1.0, 0.5, 0.0]);
        assert_eq!(modified.detail(1).unwrap(), &[0.0; 4]);
        assert!(tree.with_band(Band::Detail(3), vec![]).is_err());
    }

    #[test]
    fn test_keep_only_zeroes_other_bands() {
        let tree = sample_tree().keep_only(Band::Detail(2));
        assert_eq!(tree.detail(1).unwrap(), &[0.0; 4]);
        assert_eq!(tree.detail(2).unwrap(), &[2.0, 0.0]);
        assert_eq!(tree.approximation(), &[0.0, 0.0]);
    }

    #[test]
    fn test_validate_shape() {
        assert!(sample_tree().validate_shape().is_ok());

        let broken = CoefficientTree::from_parts(vec![vec![1.0; 4], vec![1.0; 3]], vec![0.0; 2], 8);
        assert!(matches!(
            broken.validate_shape(),
            Err(DwtError::DimensionMismatch { expected: 2, actual: 3, .. })
        ));

        let empty = CoefficientTree::from_parts(vec![], vec![], 0);
        assert_eq!(empty.validate_shape(), Err(DwtError::EmptyTree));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let tree = sample_tree();
        let bytes = tree.to_bytes().unwrap();
        assert_eq!(CoefficientTree::from_bytes(&bytes).unwrap(), tree);
        assert!(CoefficientTree::from_bytes(&[0xFF]).is_err());
    }
}
