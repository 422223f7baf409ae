//! Feature invariants over decomposed random signals

use dwt_engine::decompose;
use feature_engine::{extract_features, ENTROPY_EPSILON};
use filter_bank::WaveletRegistry;
use proptest::prelude::*;

/// Depth plus a signal whose length stays even at every level
fn dyadic_signal() -> impl Strategy<Value = (Vec<f64>, usize)> {
    (1usize..=4, 1usize..=16).prop_flat_map(|(levels, blocks)| {
        let len = blocks << levels;
        (prop::collection::vec(-50.0f64..50.0, len), Just(levels))
    })
}

proptest! {
    #[test]
    fn prop_energy_matches_signal_energy(
        (signal, levels) in dyadic_signal(),
        name in prop::sample::select(vec!["haar", "db2", "db4", "sym4"]),
    ) {
        let wavelet = WaveletRegistry::with_builtin().get(name).unwrap();
        let tree = decompose(&signal, &wavelet, levels).unwrap();
        let features = extract_features(&tree).unwrap();

        prop_assert_eq!(features.bands.len(), levels + 1);
        for band in &features.bands {
            prop_assert!(band.energy >= 0.0);
            prop_assert!(band.variance >= 0.0);
            prop_assert!(band.entropy.is_finite());
        }

        // Periodized orthogonal transform on even lengths preserves energy
        let signal_energy: f64 = signal.iter().map(|x| x * x).sum();
        let band_energy: f64 = features.energies().iter().sum();
        prop_assert!(
            (band_energy - signal_energy).abs() <= 1e-9 * signal_energy.max(1.0),
            "bands {} vs signal {}", band_energy, signal_energy
        );
    }

    #[test]
    fn prop_entropy_matches_definition(
        (signal, levels) in dyadic_signal(),
        pick in any::<prop::sample::Index>(),
    ) {
        let wavelet = WaveletRegistry::with_builtin().get("db2").unwrap();
        let tree = decompose(&signal, &wavelet, levels).unwrap();
        let features = extract_features(&tree).unwrap();

        let (band, coeffs) = tree.bands().nth(pick.index(levels + 1)).unwrap();
        let mut expected = 0.0;
        let mut magnitude = 0.0;
        for c in coeffs {
            let term = c * c * (c * c + ENTROPY_EPSILON).ln();
            expected -= term;
            magnitude += term.abs();
        }

        let entropy = features.get(band).unwrap().entropy;
        prop_assert!(
            (entropy - expected).abs() <= 1e-9 * magnitude.max(1.0),
            "{}: {} vs {}", band, entropy, expected
        );
    }
}
