//! Band Feature Extraction
//!
//! Per-band energy, entropy and variance of a wavelet coefficient tree,
//! plus a few supporting moments.

mod features;
mod statistics;

pub use features::{
    coefficient_entropy, extract_features, BandFeatures, FeatureError, FeatureExtractor,
    FeatureVector, ENTROPY_EPSILON,
};
pub use statistics::BandStatistics;
