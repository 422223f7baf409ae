//! Continuous mother wavelets
//!
//! A kernel is sampled at a given scale as `psi((j - half) / s) / sqrt(s)`
//! for `j` in `0..=2 * half`, where `half = ceil(support * s)`, optionally
//! capped by the caller. The `1 / sqrt(s)` factor keeps the kernel's energy
//! close to one at every scale.

use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A continuous, non-orthogonal mother wavelet
pub trait ContinuousWavelet {
    /// Short identifier used in logs and reports
    fn name(&self) -> &'static str;

    /// Value of the mother wavelet at `t` (in units of scale)
    fn evaluate(&self, t: f64) -> Complex64;

    /// Half-width beyond which the wavelet is treated as zero
    fn support(&self) -> f64;

    /// Dominant frequency of the mother wavelet, in cycles per unit of `t`
    fn center_frequency(&self) -> f64;

    /// Frequency in Hz that `scale` responds to at sampling rate `sampling_rate`
    fn scale_to_frequency(&self, scale: f64, sampling_rate: f64) -> f64 {
        self.center_frequency() * sampling_rate / scale
    }

    /// Scale whose response peaks at `frequency` Hz
    fn frequency_to_scale(&self, frequency: f64, sampling_rate: f64) -> f64 {
        self.center_frequency() * sampling_rate / frequency
    }

    /// Sampled, energy-normalized taps at `scale` (always odd length)
    fn kernel(&self, scale: f64) -> Vec<Complex64> {
        self.truncated_kernel(scale, usize::MAX / 4)
    }

    /// Like [`kernel`](Self::kernel), with at most `max_half` taps on each
    /// side of the centre
    fn truncated_kernel(&self, scale: f64, max_half: usize) -> Vec<Complex64> {
        let reach = (self.support() * scale).ceil();
        let half = if reach >= max_half as f64 {
            max_half
        } else {
            reach.max(0.0) as usize
        };
        let norm = 1.0 / scale.sqrt();

        (0..=2 * half)
            .map(|j| {
                let t = (j as f64 - half as f64) / scale;
                self.evaluate(t) * norm
            })
            .collect()
    }
}

/// Mexican hat (Ricker) wavelet: negative normalized second derivative of a Gaussian
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MexicanHat;

impl ContinuousWavelet for MexicanHat {
    fn name(&self) -> &'static str {
        "mexican_hat"
    }

    fn evaluate(&self, t: f64) -> Complex64 {
        let amplitude = 2.0 / (3f64.sqrt() * PI.powf(0.25));
        let t2 = t * t;
        Complex64::new(amplitude * (1.0 - t2) * (-t2 / 2.0).exp(), 0.0)
    }

    fn support(&self) -> f64 {
        5.0
    }

    fn center_frequency(&self) -> f64 {
        // Spectrum peaks at angular frequency sqrt(2)
        std::f64::consts::SQRT_2 / (2.0 * PI)
    }
}

/// Complex Morlet wavelet: a Gaussian-windowed complex exponential
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Morlet {
    /// Angular frequency of the carrier
    pub omega0: f64,
}

impl Default for Morlet {
    fn default() -> Self {
        Self { omega0: 6.0 }
    }
}

impl Morlet {
    /// Morlet wavelet with a custom carrier frequency
    pub fn new(omega0: f64) -> Self {
        Self { omega0 }
    }
}

impl ContinuousWavelet for Morlet {
    fn name(&self) -> &'static str {
        "morlet"
    }

    fn evaluate(&self, t: f64) -> Complex64 {
        let envelope = PI.powf(-0.25) * (-t * t / 2.0).exp();
        Complex64::from_polar(envelope, self.omega0 * t)
    }

    fn support(&self) -> f64 {
        4.0
    }

    fn center_frequency(&self) -> f64 {
        self.omega0 / (2.0 * PI)
    }
}

/// Kernel choice as it appears in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KernelKind {
    /// Real Ricker wavelet
    #[default]
    MexicanHat,
    /// Complex Morlet wavelet
    Morlet {
        /// Carrier angular frequency
        #[serde(default = "default_omega0")]
        omega0: f64,
    },
}

fn default_omega0() -> f64 {
    Morlet::default().omega0
}

impl ContinuousWavelet for KernelKind {
    fn name(&self) -> &'static str {
        match self {
            KernelKind::MexicanHat => MexicanHat.name(),
            KernelKind::Morlet { omega0 } => Morlet::new(*omega0).name(),
        }
    }

    fn evaluate(&self, t: f64) -> Complex64 {
        match self {
            KernelKind::MexicanHat => MexicanHat.evaluate(t),
            KernelKind::Morlet { omega0 } => Morlet::new(*omega0).evaluate(t),
        }
    }

    fn support(&self) -> f64 {
        match self {
            KernelKind::MexicanHat => MexicanHat.support(),
            KernelKind::Morlet { omega0 } => Morlet::new(*omega0).support(),
        }
    }

    fn center_frequency(&self) -> f64 {
        match self {
            KernelKind::MexicanHat => MexicanHat.center_frequency(),
            KernelKind::Morlet { omega0 } => Morlet::new(*omega0).center_frequency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(taps: &[Complex64]) -> f64 {
        taps.iter().map(|c| c.norm_sqr()).sum()
    }

    #[test]
    fn test_mexican_hat_peak() {
        let peak = MexicanHat.evaluate(0.0);
        assert!((peak.re - 0.867_325_070_584_077_6).abs() < 1e-12);
        assert_eq!(peak.im, 0.0);
        // Zero crossings at +/-1
        assert!(MexicanHat.evaluate(1.0).re.abs() < 1e-15);
    }

    #[test]
    fn test_morlet_envelope() {
        let m = Morlet::default();
        assert!((m.evaluate(0.0).norm() - PI.powf(-0.25)).abs() < 1e-12);
        assert!((m.evaluate(1.3).norm() - PI.powf(-0.25) * (-1.3f64 * 1.3 / 2.0).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_kernel_length_and_symmetry() {
        let taps = MexicanHat.kernel(2.0);
        assert_eq!(taps.len(), 21);
        for j in 0..taps.len() {
            assert!((taps[j] - taps[taps.len() - 1 - j]).norm() < 1e-15);
        }
        assert_eq!(MexicanHat.kernel(0.1).len(), 3);
    }

    #[test]
    fn test_truncated_kernel() {
        let full = MexicanHat.kernel(2.0);
        let cut = MexicanHat.truncated_kernel(2.0, 4);
        assert_eq!(cut.len(), 9);
        assert_eq!(cut[..], full[6..15]);

        // Reach far beyond usize still yields a bounded kernel
        let huge = MexicanHat.truncated_kernel(1e20, 8);
        assert_eq!(huge.len(), 17);
        assert!(huge.iter().all(|c| c.re.is_finite() && c.re > 0.0));
        assert_eq!(MexicanHat.truncated_kernel(2.0, 100), full);
    }

    #[test]
    fn test_kernel_energy_is_scale_invariant() {
        for scale in [2.0, 4.0, 8.0] {
            assert!((energy(&MexicanHat.kernel(scale)) - 1.0).abs() < 1e-3);
            assert!((energy(&Morlet::default().kernel(scale)) - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_scale_frequency_inverse() {
        let m = Morlet::default();
        let f = m.scale_to_frequency(8.0, 256.0);
        assert!((f - 6.0 * 256.0 / (2.0 * PI * 8.0)).abs() < 1e-12);
        assert!((m.frequency_to_scale(f, 256.0) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_kernel_kind_dispatch() {
        let kind = KernelKind::Morlet { omega0: 5.0 };
        assert_eq!(kind.name(), "morlet");
        assert_eq!(kind.evaluate(0.7), Morlet::new(5.0).evaluate(0.7));
        assert_eq!(KernelKind::default().name(), "mexican_hat");
    }

    #[test]
    fn test_kernel_kind_serde() {
        let kind: KernelKind = serde_json::from_str(r#"{"kind":"morlet"}"#).unwrap();
        assert_eq!(kind, KernelKind::Morlet { omega0: 6.0 });
    }
}
