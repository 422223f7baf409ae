//! Filter Bank Error Types

use thiserror::Error;

/// Errors raised while resolving or registering wavelet families
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterBankError {
    /// Requested family is not in the registry
    #[error("Unknown wavelet '{name}'")]
    UnknownWavelet { name: String },

    /// Filter quadruple cannot drive a two-channel filter bank
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}
