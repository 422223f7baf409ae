//! Band table error types

use dwt_engine::DwtError;
use thiserror::Error;

/// Errors building a band table
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// Sampling rate is not a positive finite number
    #[error("Invalid sampling rate: {0} Hz")]
    InvalidSamplingRate(f64),

    /// Signal and tree describe different lengths
    #[error("Signal has {signal} samples but the tree was decomposed from {tree}")]
    LengthMismatch { signal: usize, tree: usize },

    /// Band reconstruction failed
    #[error(transparent)]
    Dwt(#[from] DwtError),
}
