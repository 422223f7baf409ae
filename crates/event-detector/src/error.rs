//! Event detector error types

use thiserror::Error;

/// Errors raised by the continuous transform and event detector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectorError {
    /// Scale list empty, or a scale that is not a positive finite number
    #[error("Invalid scale list: {0}")]
    InvalidScale(String),

    /// Threshold that is not a finite, non-negative number
    #[error("Invalid energy threshold: {0}")]
    InvalidThreshold(f64),
}
