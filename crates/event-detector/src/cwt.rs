//! Continuous Wavelet Transform
//!
//! Each scale row is the linear convolution of the signal with the sampled
//! kernel, aligned on the kernel centre so that row index `t` matches input
//! sample `t`. Samples outside the signal are treated as zero. Convolution
//! runs in the frequency domain: the signal spectrum is computed once and
//! reused for every scale.
//!
//! Magnitudes below the transform's round-off level (a bound proportional to
//! `eps * log2(fft_len) * |signal| * |kernel|`) are reported as exactly zero,
//! so a sample whose true response vanishes carries zero energy.

use crate::error::DetectorError;
use crate::kernel::ContinuousWavelet;
use ndarray::{Array2, ArrayView1, Axis};
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Multiple of the FFT round-off estimate treated as numerical zero
const ROUND_OFF_FACTOR: f64 = 16.0;

/// Response magnitudes on a `[scale x time]` grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuousResponse {
    scales: Vec<f64>,
    magnitudes: Array2<f64>,
}

impl ContinuousResponse {
    /// Scales, one per row
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Full magnitude grid
    pub fn magnitudes(&self) -> &Array2<f64> {
        &self.magnitudes
    }

    /// Number of scale rows
    pub fn num_scales(&self) -> usize {
        self.magnitudes.nrows()
    }

    /// Number of time samples per row
    pub fn len(&self) -> usize {
        self.magnitudes.ncols()
    }

    /// True when the grid has no time samples
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Magnitudes at one scale
    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.num_scales()).then(|| self.magnitudes.row(index))
    }

    /// Sum of squared magnitudes across scales, one value per sample
    pub fn energy(&self) -> Vec<f64> {
        self.magnitudes
            .mapv(|m| m * m)
            .sum_axis(Axis(0))
            .to_vec()
    }
}

/// Compute the continuous response of `signal` at every scale in `scales`
pub fn continuous_transform<K>(
    signal: &[f64],
    scales: &[f64],
    kernel: &K,
) -> Result<ContinuousResponse, DetectorError>
where
    K: ContinuousWavelet + ?Sized,
{
    validate_scales(scales)?;
    if signal.is_empty() {
        return Ok(ContinuousResponse {
            scales: scales.to_vec(),
            magnitudes: Array2::zeros((scales.len(), 0)),
        });
    }

    let n = signal.len();
    // Taps further than `n` from the centre never overlap the signal
    let kernels: Vec<Vec<Complex64>> = scales
        .iter()
        .map(|&s| kernel.truncated_kernel(s, n))
        .collect();
    let longest = kernels.iter().map(Vec::len).max().unwrap_or(1);
    let fft_len = (n + longest - 1).next_power_of_two();

    debug!(
        "Continuous transform with {}: {} samples, {} scales, FFT size {}",
        kernel.name(),
        n,
        scales.len(),
        fft_len
    );

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(fft_len);
    let inverse = planner.plan_fft_inverse(fft_len);

    let mut spectrum: Vec<Complex64> = signal
        .iter()
        .map(|&x| Complex64::new(x, 0.0))
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(fft_len)
        .collect();
    forward.process(&mut spectrum);

    let signal_norm = signal.iter().map(|x| x * x).sum::<f64>().sqrt();
    let rows = compute_rows(&kernels, &spectrum, signal_norm, n, &forward, &inverse);
    let magnitudes = Array2::from_shape_fn((scales.len(), n), |(s, t)| rows[s][t]);

    Ok(ContinuousResponse {
        scales: scales.to_vec(),
        magnitudes,
    })
}

/// Log-spaced scales covering `[min_freq, max_freq]` Hz, smallest scale first
pub fn scales_for_band<K>(
    kernel: &K,
    min_freq: f64,
    max_freq: f64,
    count: usize,
    sampling_rate: f64,
) -> Result<Vec<f64>, DetectorError>
where
    K: ContinuousWavelet + ?Sized,
{
    if count == 0 {
        return Err(DetectorError::InvalidScale("scale count must be at least 1".into()));
    }
    if !(min_freq > 0.0 && max_freq >= min_freq && max_freq.is_finite()) {
        return Err(DetectorError::InvalidScale(format!(
            "frequency band [{}, {}] Hz is not a positive range",
            min_freq, max_freq
        )));
    }
    if !(sampling_rate > 0.0 && sampling_rate.is_finite()) {
        return Err(DetectorError::InvalidScale(format!(
            "sampling rate must be positive, got {}",
            sampling_rate
        )));
    }

    if count == 1 {
        let centre = (min_freq * max_freq).sqrt();
        return Ok(vec![kernel.frequency_to_scale(centre, sampling_rate)]);
    }

    // Highest frequency first gives ascending scales
    let ratio = (min_freq / max_freq).ln();
    Ok((0..count)
        .map(|i| {
            let freq = max_freq * (ratio * i as f64 / (count - 1) as f64).exp();
            kernel.frequency_to_scale(freq, sampling_rate)
        })
        .collect())
}

pub(crate) fn validate_scales(scales: &[f64]) -> Result<(), DetectorError> {
    if scales.is_empty() {
        return Err(DetectorError::InvalidScale("scale list is empty".into()));
    }
    if let Some((i, s)) = scales
        .iter()
        .enumerate()
        .find(|(_, s)| !(s.is_finite() && **s > 0.0))
    {
        return Err(DetectorError::InvalidScale(format!(
            "scale at position {} must be positive and finite, got {}",
            i, s
        )));
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn compute_rows(
    kernels: &[Vec<Complex64>],
    spectrum: &[Complex64],
    signal_norm: f64,
    n: usize,
    forward: &Arc<dyn Fft<f64>>,
    inverse: &Arc<dyn Fft<f64>>,
) -> Vec<Vec<f64>> {
    kernels
        .iter()
        .map(|taps| scale_row(taps, spectrum, signal_norm, n, forward.as_ref(), inverse.as_ref()))
        .collect()
}

#[cfg(feature = "parallel")]
fn compute_rows(
    kernels: &[Vec<Complex64>],
    spectrum: &[Complex64],
    signal_norm: f64,
    n: usize,
    forward: &Arc<dyn Fft<f64>>,
    inverse: &Arc<dyn Fft<f64>>,
) -> Vec<Vec<f64>> {
    // Scale rows are independent; only the shared spectrum is read
    kernels
        .par_iter()
        .map(|taps| scale_row(taps, spectrum, signal_norm, n, forward.as_ref(), inverse.as_ref()))
        .collect()
}

/// Magnitude of the centred linear convolution for one kernel
fn scale_row(
    taps: &[Complex64],
    spectrum: &[Complex64],
    signal_norm: f64,
    n: usize,
    forward: &dyn Fft<f64>,
    inverse: &dyn Fft<f64>,
) -> Vec<f64> {
    let fft_len = spectrum.len();
    let half = taps.len() / 2;

    let mut buffer: Vec<Complex64> = taps
        .iter()
        .copied()
        .chain(std::iter::repeat(Complex64::new(0.0, 0.0)))
        .take(fft_len)
        .collect();
    forward.process(&mut buffer);

    for (b, s) in buffer.iter_mut().zip(spectrum) {
        *b *= *s;
    }
    inverse.process(&mut buffer);

    let kernel_norm = taps.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
    let floor = ROUND_OFF_FACTOR
        * f64::EPSILON
        * (fft_len as f64).log2().max(1.0)
        * signal_norm
        * kernel_norm;

    let norm = 1.0 / fft_len as f64;
    buffer[half..half + n]
        .iter()
        .map(|c| c.norm() * norm)
        .map(|m| if m < floor { 0.0 } else { m })
        .collect()
}
