//! DWT Error Types

use filter_bank::FilterBankError;
use thiserror::Error;

/// Errors raised by decomposition, reconstruction and thresholding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DwtError {
    /// Wavelet family could not be resolved or is malformed
    #[error(transparent)]
    FilterBank(#[from] FilterBankError),

    /// Requested depth needs more samples than the signal has
    #[error("Decomposition to {levels} levels needs at least 2^{levels} samples, signal has {length}")]
    InsufficientSignalLength { levels: usize, length: usize },

    /// Depth of zero requested
    #[error("Decomposition depth must be at least 1")]
    InvalidLevels,

    /// Tree holds no coefficients
    #[error("Coefficient tree is empty")]
    EmptyTree,

    /// Band lengths do not match the tree's declared shape
    #[error("Band {band} has {actual} coefficients, expected {expected}")]
    DimensionMismatch {
        band: String,
        expected: usize,
        actual: usize,
    },

    /// Band index outside the tree
    #[error("Band {index} does not exist in a {levels}-level tree")]
    InvalidBand { index: usize, levels: usize },

    /// Threshold policy carries an unusable parameter
    #[error("Invalid threshold policy: {0}")]
    InvalidPolicy(String),

    /// Binary snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}
