//! Event Detector
//!
//! Computes a non-downsampled continuous wavelet response across a list of
//! scales and flags samples whose aggregate energy exceeds a threshold.
//!
//! ```no_run
//! use event_detector::{detect_events, MexicanHat};
//!
//! let signal = vec![0.0; 512];
//! let flags = detect_events(&signal, &[1.0, 2.0, 4.0], &MexicanHat, 1.0).unwrap();
//! assert_eq!(flags.len(), signal.len());
//! ```

mod cwt;
mod detector;
mod error;
mod kernel;

pub use cwt::{continuous_transform, scales_for_band, ContinuousResponse};
pub use detector::{
    aggregate_energy, detect_events, group_events, DetectionReport, DetectorConfig, Event,
    EventDetector,
};
pub use error::DetectorError;
pub use kernel::{ContinuousWavelet, KernelKind, MexicanHat, Morlet};
