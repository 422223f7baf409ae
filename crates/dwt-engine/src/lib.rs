//! Discrete Wavelet Transform Engine
//!
//! Multi-resolution decomposition of 1-D signals into a coefficient tree,
//! exact reconstruction, single-band isolation and coefficient thresholding.
//!
//! ```
//! use dwt_engine::{decompose, reconstruct};
//! use filter_bank::WaveletRegistry;
//!
//! let registry = WaveletRegistry::with_builtin();
//! let db4 = registry.get("db4").unwrap();
//! let signal: Vec<f64> = (0..256).map(|i| (i as f64 * 0.1).sin()).collect();
//!
//! let tree = decompose(&signal, &db4, 4).unwrap();
//! assert_eq!(tree.levels(), 4);
//!
//! let rebuilt = reconstruct(&tree, &db4).unwrap();
//! assert!((rebuilt[100] - signal[100]).abs() < 1e-9);
//! ```

mod error;
mod threshold;
mod transform;
mod tree;

pub use error::DwtError;
pub use threshold::{denoise, threshold, CutoffRule, ThresholdMode, ThresholdPolicy};
pub use transform::{decompose, isolate_all, isolate_band, isolate_band_index, reconstruct};
pub use tree::{band_lengths, Band, CoefficientTree};
