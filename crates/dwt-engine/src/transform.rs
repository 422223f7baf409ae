//! Forward and Inverse Discrete Wavelet Transform
//!
//! Boundary handling is periodization: every level treats its input as one
//! period of a periodic sequence. Odd-length inputs are first extended by
//! repeating the last sample, so each level yields `ceil(n / 2)` coefficients
//! per band. With orthogonal filters this makes reconstruction exact at every
//! index, edges included.

use crate::error::DwtError;
use crate::tree::{band_lengths, Band, CoefficientTree};
use filter_bank::{FilterQuad, Wavelet};
use tracing::{debug, warn};

/// Decompose `signal` into `levels` detail bands plus an approximation.
///
/// Fails with [`DwtError::InsufficientSignalLength`] when
/// `2^levels > signal.len()`.
pub fn decompose(signal: &[f64], wavelet: &Wavelet, levels: usize) -> Result<CoefficientTree, DwtError> {
    if levels == 0 {
        return Err(DwtError::InvalidLevels);
    }

    let supported = levels < usize::BITS as usize && (1usize << levels) <= signal.len();
    if !supported {
        return Err(DwtError::InsufficientSignalLength {
            levels,
            length: signal.len(),
        });
    }

    let useful = wavelet.max_useful_level(signal.len());
    if levels > useful {
        warn!(
            "Decomposing {} samples to {} levels with {} ({} taps); levels beyond {} are dominated by boundary wrap-around",
            signal.len(),
            levels,
            wavelet.name(),
            wavelet.filter_len(),
            useful
        );
    }

    debug!(
        "Decomposing {} samples with {} to {} levels",
        signal.len(),
        wavelet.name(),
        levels
    );

    let filters = wavelet.filters();
    let mut approx = signal.to_vec();
    let mut details = Vec::with_capacity(levels);

    // Levels are inherently sequential: each consumes the previous approximation
    for _ in 0..levels {
        let (a, d) = analysis_step(&approx, filters);
        details.push(d);
        approx = a;
    }

    Ok(CoefficientTree::from_parts(details, approx, signal.len()))
}

/// Reconstruct the signal a tree was decomposed from.
///
/// The tree's band lengths must follow the halving chain of its signal
/// length, otherwise [`DwtError::DimensionMismatch`] is returned.
pub fn reconstruct(tree: &CoefficientTree, wavelet: &Wavelet) -> Result<Vec<f64>, DwtError> {
    tree.validate_shape()?;

    let filters = wavelet.filters();
    let lengths = band_lengths(tree.signal_len(), tree.levels());
    let mut approx = tree.approximation().to_vec();

    // Coarsest to finest
    for level in (1..=tree.levels()).rev() {
        let detail = &tree.details()[level - 1];
        let output_len = if level >= 2 {
            lengths[level - 2]
        } else {
            tree.signal_len()
        };
        approx = synthesis_step(&approx, detail, filters, output_len);
    }

    Ok(approx)
}

/// Reconstruct the contribution of a single band.
///
/// Every other band is replaced by zeros of matching length before
/// reconstruction; the source tree is left untouched.
pub fn isolate_band(tree: &CoefficientTree, band: Band, wavelet: &Wavelet) -> Result<Vec<f64>, DwtError> {
    if tree.band(band).is_none() {
        return Err(DwtError::InvalidBand {
            index: band.index(tree.levels()),
            levels: tree.levels(),
        });
    }

    debug!("Isolating {} of a {}-level tree", band, tree.levels());
    reconstruct(&tree.keep_only(band), wavelet)
}

/// Reconstruct the band at a flat index (`0..levels` details, `levels` approximation)
pub fn isolate_band_index(tree: &CoefficientTree, index: usize, wavelet: &Wavelet) -> Result<Vec<f64>, DwtError> {
    let band = Band::from_index(index, tree.levels()).ok_or(DwtError::InvalidBand {
        index,
        levels: tree.levels(),
    })?;
    isolate_band(tree, band, wavelet)
}

/// Isolate every band in tree order; the outputs sum to the full reconstruction
pub fn isolate_all(tree: &CoefficientTree, wavelet: &Wavelet) -> Result<Vec<(Band, Vec<f64>)>, DwtError> {
    tree.bands()
        .map(|(band, _)| isolate_band(tree, band, wavelet).map(|signal| (band, signal)))
        .collect()
}

/// One level of analysis: periodized correlation followed by keeping every
/// second sample.
fn analysis_step(input: &[f64], filters: &FilterQuad) -> (Vec<f64>, Vec<f64>) {
    let n = input.len();
    let period = n + n % 2;
    let half = period / 2;

    let sample = |idx: usize| {
        let j = idx % period;
        if j < n {
            input[j]
        } else {
            input[n - 1]
        }
    };

    let mut approx = Vec::with_capacity(half);
    let mut detail = Vec::with_capacity(half);

    for i in 0..half {
        let mut lo_sum = 0.0;
        let mut hi_sum = 0.0;
        for (k, (&lo, &hi)) in filters
            .analysis_low
            .iter()
            .zip(&filters.analysis_high)
            .enumerate()
        {
            let x = sample(2 * i + k);
            lo_sum += lo * x;
            hi_sum += hi * x;
        }
        approx.push(lo_sum);
        detail.push(hi_sum);
    }

    (approx, detail)
}

/// One level of synthesis: spread each coefficient back onto its periodized
/// support, then drop the padding sample of odd-length levels.
fn synthesis_step(approx: &[f64], detail: &[f64], filters: &FilterQuad, output_len: usize) -> Vec<f64> {
    let period = 2 * approx.len();
    let mut output = vec![0.0; period];

    for (i, (&a, &d)) in approx.iter().zip(detail).enumerate() {
        for (k, (&lo, &hi)) in filters
            .synthesis_low
            .iter()
            .zip(&filters.synthesis_high)
            .enumerate()
        {
            output[(2 * i + k) % period] += lo * a + hi * d;
        }
    }

    output.truncate(output_len);
    output
}
