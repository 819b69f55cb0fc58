//! Aggregate run configuration.
//!
//! One flat `EngineConfig` is the whole user-facing surface; the engine
//! derives each stage's narrower config from it so the stages stay
//! independently testable while the CLI exposes a single set of knobs.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Default hash seed. Any fixed value works; changing it changes every
/// fingerprint, so it is part of the configuration surface.
pub const DEFAULT_SEED: u64 = 0xD12A_AD00_0000_0001;

/// All tunables for one extraction run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Attribute names stripped before structural comparison.
    pub volatile_attrs: Vec<String>,
    /// Shingle window over root-to-leaf tag paths.
    pub window: usize,
    /// MinHash signature length.
    pub num_perm: usize,
    /// LSH band count; must divide `num_perm`.
    pub bands: usize,
    /// Minimum estimated Jaccard similarity for a verified edge.
    pub jaccard_threshold: f64,
    /// Maximum SimHash Hamming distance for a verified edge.
    pub hamming_threshold: u32,
    /// Minimum node-size ratio (min/max) for a verified edge.
    pub size_ratio: f64,
    /// Smallest subtree (element + non-whitespace text descendants) worth
    /// extracting.
    pub min_fragment_nodes: usize,
    /// Smallest cluster worth extracting.
    pub min_occurrences: usize,
    /// Seed for every hash family in the run.
    pub seed: u64,
    /// Fingerprint candidates across the rayon pool.
    pub use_parallel: bool,
    /// Hoist head assets and common footer scripts shared by every page into
    /// `title-meta.html`, `head-css.html`, and `footer-scripts.html`.
    pub hoist_assets: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            volatile_attrs: vec!["class".to_string(), "id".to_string()],
            window: 3,
            num_perm: 128,
            bands: 32,
            jaccard_threshold: 0.6,
            hamming_threshold: 6,
            size_ratio: 0.85,
            min_fragment_nodes: 30,
            min_occurrences: 2,
            seed: DEFAULT_SEED,
            use_parallel: true,
            hoist_assets: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volatile_attrs(mut self, attrs: Vec<String>) -> Self {
        self.volatile_attrs = attrs;
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_num_perm(mut self, num_perm: usize) -> Self {
        self.num_perm = num_perm;
        self
    }

    pub fn with_bands(mut self, bands: usize) -> Self {
        self.bands = bands;
        self
    }

    pub fn with_jaccard_threshold(mut self, threshold: f64) -> Self {
        self.jaccard_threshold = threshold;
        self
    }

    pub fn with_hamming_threshold(mut self, threshold: u32) -> Self {
        self.hamming_threshold = threshold;
        self
    }

    pub fn with_size_ratio(mut self, ratio: f64) -> Self {
        self.size_ratio = ratio;
        self
    }

    pub fn with_min_fragment_nodes(mut self, min: usize) -> Self {
        self.min_fragment_nodes = min;
        self
    }

    pub fn with_min_occurrences(mut self, min: usize) -> Self {
        self.min_occurrences = min;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.use_parallel = parallel;
        self
    }

    pub fn with_hoist_assets(mut self, hoist: bool) -> Self {
        self.hoist_assets = hoist;
        self
    }

    /// Fail fast before any file is touched.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min_fragment_nodes == 0 {
            return Err(EngineError::Config(
                "min_fragment_nodes must be >= 1".to_string(),
            ));
        }
        if self.min_occurrences < 2 {
            return Err(EngineError::Config(
                "min_occurrences must be >= 2".to_string(),
            ));
        }
        self.canonical_config()
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        self.fingerprint_config()
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        self.verifier_config()
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        Ok(())
    }

    pub fn canonical_config(&self) -> canonical::CanonicalConfig {
        canonical::CanonicalConfig::default().with_volatile_attrs(self.volatile_attrs.clone())
    }

    pub fn fingerprint_config(&self) -> fingerprint::FingerprintConfig {
        // The engine already parallelizes across candidates; per-signature
        // slot parallelism stays off.
        fingerprint::FingerprintConfig::new()
            .with_window(self.window)
            .with_num_perm(self.num_perm)
            .with_bands(self.bands)
            .with_seed(self.seed)
            .with_parallel(false)
    }

    pub fn verifier_config(&self) -> cluster::VerifierConfig {
        cluster::VerifierConfig {
            jaccard_threshold: self.jaccard_threshold,
            hamming_threshold: self.hamming_threshold,
            size_ratio: self.size_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn bands_must_divide_num_perm() {
        let cfg = EngineConfig::default().with_num_perm(128).with_bands(33);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn thresholds_are_range_checked() {
        assert!(EngineConfig::default()
            .with_jaccard_threshold(1.5)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_hamming_threshold(64)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_size_ratio(0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn occurrence_and_size_floors() {
        assert!(EngineConfig::default()
            .with_min_occurrences(1)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_min_fragment_nodes(0)
            .validate()
            .is_err());
    }

    #[test]
    fn derived_configs_carry_the_shared_knobs() {
        let cfg = EngineConfig::default()
            .with_seed(99)
            .with_window(4)
            .with_volatile_attrs(vec!["data-testid".to_string()]);
        assert_eq!(cfg.fingerprint_config().seed, 99);
        assert_eq!(cfg.fingerprint_config().window, 4);
        assert!(cfg.canonical_config().is_volatile("data-testid"));
        assert!(!cfg.canonical_config().is_volatile("class"));
        assert_eq!(cfg.verifier_config().hamming_threshold, 6);
    }

    #[test]
    fn serde_round_trip() {
        let cfg = EngineConfig::default().with_bands(16);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
