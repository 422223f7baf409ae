//! Summary statistics of a coefficient band

use serde::{Deserialize, Serialize};

/// Moments and extrema of one band's coefficients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BandStatistics {
    /// Coefficient count
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population variance (divides by `count`)
    pub variance: f64,
    /// Smallest coefficient
    pub min: f64,
    /// Largest coefficient
    pub max: f64,
    /// Sum of squared coefficients
    pub energy: f64,
}

impl BandStatistics {
    /// Single pass over `coeffs` (Welford update for the variance)
    pub fn from_coefficients(coeffs: &[f64]) -> Self {
        let Some(&first) = coeffs.first() else {
            return Self::default();
        };

        let mut stats = Self {
            min: first,
            max: first,
            ..Self::default()
        };
        let mut sum_sq_dev = 0.0;

        for &c in coeffs {
            stats.count += 1;
            let delta = c - stats.mean;
            stats.mean += delta / stats.count as f64;
            sum_sq_dev += delta * (c - stats.mean);

            stats.min = stats.min.min(c);
            stats.max = stats.max.max(c);
            stats.energy += c * c;
        }

        stats.variance = sum_sq_dev / stats.count as f64;
        stats
    }

    /// Square root of the variance
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Largest coefficient magnitude
    pub fn max_abs(&self) -> f64 {
        self.min.abs().max(self.max.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_variance() {
        let stats = BandStatistics::from_coefficients(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(stats.count, 8);
        assert!((stats.mean - 5.0).abs() < 1e-12);
        assert!((stats.variance - 4.0).abs() < 1e-12);
        assert!((stats.std_dev() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_energy_and_extrema() {
        let stats = BandStatistics::from_coefficients(&[3.0, -4.0]);
        assert!((stats.energy - 25.0).abs() < 1e-12);
        assert_eq!((stats.min, stats.max), (-4.0, 3.0));
        assert_eq!(stats.max_abs(), 4.0);
    }

    #[test]
    fn test_single_coefficient() {
        let stats = BandStatistics::from_coefficients(&[-1.5]);
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.max_abs(), 1.5);
    }

    #[test]
    fn test_empty_band() {
        let stats = BandStatistics::from_coefficients(&[]);
        assert_eq!(stats, BandStatistics::default());
    }
}
