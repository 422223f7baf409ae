//! Wavelet Filter Bank
//!
//! Provides the analysis/synthesis filter quadruples of discrete wavelet
//! families and a registry that resolves family names to filters.

mod error;
mod families;
mod registry;
mod wavelet;

pub use error::FilterBankError;
pub use registry::WaveletRegistry;
pub use wavelet::{FilterQuad, Wavelet};
