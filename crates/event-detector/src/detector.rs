//! Energy-threshold event detection on the continuous response

use crate::cwt::{continuous_transform, scales_for_band, validate_scales, ContinuousResponse};
use crate::error::DetectorError;
use crate::kernel::{ContinuousWavelet, KernelKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Mother wavelet
    pub kernel: KernelKind,
    /// Scales to evaluate, in samples
    pub scales: Vec<f64>,
    /// Aggregate energy a sample must exceed to be flagged
    pub threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            kernel: KernelKind::MexicanHat,
            scales: vec![1.0, 2.0, 3.0, 4.0],
            threshold: 1.0,
        }
    }
}

impl DetectorConfig {
    /// Morlet detector covering a frequency band with log-spaced scales
    pub fn morlet_band(
        min_freq: f64,
        max_freq: f64,
        count: usize,
        sampling_rate: f64,
        threshold: f64,
    ) -> Result<Self, DetectorError> {
        let kernel = KernelKind::Morlet { omega0: 6.0 };
        let scales = scales_for_band(&kernel, min_freq, max_freq, count, sampling_rate)?;
        Ok(Self {
            kernel,
            scales,
            threshold,
        })
    }

    /// Check scales and threshold
    pub fn validate(&self) -> Result<(), DetectorError> {
        validate_scales(&self.scales)?;
        validate_threshold(self.threshold)
    }
}

/// A run of consecutive flagged samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// First flagged sample
    pub start: usize,
    /// One past the last flagged sample
    pub end: usize,
    /// Sample with the highest energy in the run
    pub peak_index: usize,
    /// Energy at `peak_index`
    pub peak_energy: f64,
    /// `start / sampling_rate`
    pub onset_seconds: f64,
    /// `(end - start) / sampling_rate`
    pub duration_seconds: f64,
}

impl Event {
    /// Number of samples in the event
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false for events produced by [`group_events`]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Detection result for one signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Kernel that produced the response
    pub kernel: String,
    /// Threshold the energy was compared against
    pub threshold: f64,
    /// One flag per input sample
    pub flags: Vec<bool>,
    /// Aggregate energy per input sample
    pub energy: Vec<f64>,
    /// Flagged runs
    pub events: Vec<Event>,
    /// Number of flagged samples
    pub flagged_samples: usize,
}

/// Reusable detector bound to one configuration
#[derive(Debug, Clone)]
pub struct EventDetector {
    config: DetectorConfig,
}

impl EventDetector {
    /// Create a detector after validating its configuration
    pub fn new(config: DetectorConfig) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Continuous response of `signal` at the configured scales
    pub fn response(&self, signal: &[f64]) -> Result<ContinuousResponse, DetectorError> {
        continuous_transform(signal, &self.config.scales, &self.config.kernel)
    }

    /// One flag per sample
    pub fn detect(&self, signal: &[f64]) -> Result<Vec<bool>, DetectorError> {
        detect_events(
            signal,
            &self.config.scales,
            &self.config.kernel,
            self.config.threshold,
        )
    }

    /// Flags, energy and grouped events for a signal sampled at `sampling_rate`
    pub fn analyze(&self, signal: &[f64], sampling_rate: f64) -> Result<DetectionReport, DetectorError> {
        let response = self.response(signal)?;
        let energy = aggregate_energy(&response);
        let flags = flag_samples(&energy, self.config.threshold);
        let events = group_events(&flags, &energy, sampling_rate);
        let flagged_samples = flags.iter().filter(|&&f| f).count();

        debug!(
            "{} of {} samples above {} grouped into {} events",
            flagged_samples,
            flags.len(),
            self.config.threshold,
            events.len()
        );

        Ok(DetectionReport {
            kernel: self.config.kernel.name().to_string(),
            threshold: self.config.threshold,
            flags,
            energy,
            events,
            flagged_samples,
        })
    }
}

/// Flag every sample whose energy summed over `scales` exceeds `threshold`.
///
/// Output has one flag per input sample, so an empty signal yields no
/// flags. Fails with
/// [`DetectorError::InvalidScale`] when `scales` is empty or holds a value
/// that is not strictly positive.
pub fn detect_events<K>(
    signal: &[f64],
    scales: &[f64],
    kernel: &K,
    threshold: f64,
) -> Result<Vec<bool>, DetectorError>
where
    K: ContinuousWavelet + ?Sized,
{
    validate_threshold(threshold)?;
    let response = continuous_transform(signal, scales, kernel)?;
    let flags = flag_samples(&aggregate_energy(&response), threshold);

    debug!(
        "{} of {} samples flagged with {} over {} scales",
        flags.iter().filter(|&&f| f).count(),
        flags.len(),
        kernel.name(),
        scales.len()
    );

    Ok(flags)
}

/// Squared magnitude summed across all scale rows, per time sample
pub fn aggregate_energy(response: &ContinuousResponse) -> Vec<f64> {
    response.energy()
}

/// Merge consecutive flagged samples into events.
///
/// `energy` must be aligned with `flags`; `sampling_rate` converts sample
/// indices to seconds.
pub fn group_events(flags: &[bool], energy: &[f64], sampling_rate: f64) -> Vec<Event> {
    let len = flags.len().min(energy.len());
    let mut events = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &flag) in flags[..len].iter().enumerate() {
        match (flag, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                events.push(make_event(start, i, energy, sampling_rate));
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        events.push(make_event(start, len, energy, sampling_rate));
    }

    events
}

fn make_event(start: usize, end: usize, energy: &[f64], sampling_rate: f64) -> Event {
    // First sample reaching the run's maximum
    let (peak_index, peak_energy) = energy[start..end]
        .iter()
        .enumerate()
        .fold((start, f64::NEG_INFINITY), |(best_i, best_e), (offset, &e)| {
            if e > best_e {
                (start + offset, e)
            } else {
                (best_i, best_e)
            }
        });

    Event {
        start,
        end,
        peak_index,
        peak_energy,
        onset_seconds: start as f64 / sampling_rate,
        duration_seconds: (end - start) as f64 / sampling_rate,
    }
}

fn flag_samples(energy: &[f64], threshold: f64) -> Vec<bool> {
    energy.iter().map(|&e| e > threshold).collect()
}

fn validate_threshold(threshold: f64) -> Result<(), DetectorError> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(())
    } else {
        Err(DetectorError::InvalidThreshold(threshold))
    }
}
