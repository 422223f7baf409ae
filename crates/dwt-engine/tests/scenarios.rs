//! End-to-end decomposition scenarios

use dwt_engine::{decompose, isolate_band, reconstruct, Band, DwtError};
use filter_bank::WaveletRegistry;
use std::f64::consts::PI;

fn energy(coeffs: &[f64]) -> f64 {
    coeffs.iter().map(|c| c * c).sum()
}

fn sinusoid(freq: f64, fs: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| (2.0 * PI * freq * i as f64 / fs).sin()).collect()
}

#[test]
fn test_sinusoid_energy_lands_in_matching_band() {
    let registry = WaveletRegistry::with_builtin();
    let wavelet = registry.get("db4").unwrap();
    let fs = 256.0;
    let levels = 4;

    // One tone near the middle of each band
    for f0 in [90.0, 45.0, 22.0, 11.0, 4.0] {
        let tree = decompose(&sinusoid(f0, fs, 1024), &wavelet, levels).unwrap();

        let (dominant, _) = tree
            .bands()
            .map(|(band, coeffs)| (band, energy(coeffs)))
            .fold((Band::Approximation, f64::MIN), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            });

        let (lo, hi) = dominant.frequency_range(fs, levels);
        assert!(
            f0 >= lo && f0 <= hi,
            "{} Hz dominated by {} spanning [{}, {}]",
            f0,
            dominant,
            lo,
            hi
        );
    }
}

#[test]
fn test_constant_signal_has_no_detail_energy() {
    let registry = WaveletRegistry::with_builtin();
    for name in ["haar", "db4", "sym8"] {
        let wavelet = registry.get(name).unwrap();
        for levels in 1..=5 {
            let signal = vec![3.0; 100];
            let tree = decompose(&signal, &wavelet, levels).unwrap();

            for detail in tree.details() {
                assert!(energy(detail) < 1e-18, "{} level {}", name, levels);
            }

            let approx = isolate_band(&tree, Band::Approximation, &wavelet).unwrap();
            assert!(approx.iter().all(|v| (v - 3.0).abs() < 1e-9));
        }
    }
}

#[test]
fn test_depth_beyond_signal_length_fails() {
    let wavelet = WaveletRegistry::with_builtin().get("db2").unwrap();
    let signal = vec![0.5; 31];

    assert!(decompose(&signal, &wavelet, 4).is_ok());
    assert_eq!(
        decompose(&signal, &wavelet, 5).unwrap_err(),
        DwtError::InsufficientSignalLength {
            levels: 5,
            length: 31
        }
    );
}

#[test]
fn test_unknown_wavelet_reported() {
    let registry = WaveletRegistry::with_builtin();
    let err: DwtError = registry.get("db99").unwrap_err().into();
    assert!(err.to_string().contains("db99"));
}

#[test]
fn test_reuse_tree_after_band_isolation() {
    let wavelet = WaveletRegistry::with_builtin().get("sym4").unwrap();
    let signal: Vec<f64> = sinusoid(10.0, 128.0, 256)
        .iter()
        .zip(sinusoid(40.0, 128.0, 256))
        .map(|(a, b)| a + b)
        .collect();

    let tree = decompose(&signal, &wavelet, 3).unwrap();
    let _ = isolate_band(&tree, Band::Detail(1), &wavelet).unwrap();
    let rebuilt = reconstruct(&tree, &wavelet).unwrap();

    for (a, b) in signal.iter().zip(&rebuilt) {
        assert!((a - b).abs() < 1e-9);
    }
}
