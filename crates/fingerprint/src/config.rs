//! Configuration and error types for structural fingerprinting.
//!
//! The fingerprinting layer is a pure function of `(canonical_form, config)`:
//! no I/O and no environment-dependent behavior, so fingerprints are
//! reproducible across machines for a fixed seed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters for shingling, MinHash, and SimHash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintConfig {
    /// Configuration schema version. Any change that can alter fingerprints
    /// must bump this, so signatures from different versions never mix.
    pub version: u32,
    /// Shingle window length in tags. Each length-`window` slice of a
    /// root-to-leaf tag path becomes one shingle.
    pub window: usize,
    /// MinHash signature length: number of independent permutations.
    pub num_perm: usize,
    /// Number of LSH bands the signature will be split into downstream.
    /// Must divide `num_perm` exactly.
    pub bands: usize,
    /// Seed for all shingle and permutation hashing.
    pub seed: u64,
    /// Compute MinHash slots in parallel. Bit-identical to the sequential
    /// path, only faster on wide signatures.
    pub use_parallel: bool,
}

impl FingerprintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shingle window length. Small values (2-4) tolerate local edits.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Signature length. More permutations tighten the Jaccard estimate.
    pub fn with_num_perm(mut self, num_perm: usize) -> Self {
        self.num_perm = num_perm;
        self
    }

    /// Band count for the downstream LSH split.
    pub fn with_bands(mut self, bands: usize) -> Self {
        self.bands = bands;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Rows per band implied by `num_perm` and `bands`.
    pub fn rows_per_band(&self) -> usize {
        self.num_perm / self.bands
    }

    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.version == 0 {
            return Err(FingerprintError::InvalidVersion {
                version: self.version,
            });
        }
        if self.window == 0 {
            return Err(FingerprintError::InvalidWindow {
                window: self.window,
            });
        }
        if self.num_perm == 0 {
            return Err(FingerprintError::InvalidNumPerm {
                num_perm: self.num_perm,
            });
        }
        if self.bands == 0 || self.num_perm % self.bands != 0 {
            return Err(FingerprintError::InvalidBands {
                num_perm: self.num_perm,
                bands: self.bands,
            });
        }
        Ok(())
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            version: 1,
            window: 3,
            num_perm: 128,
            bands: 32,
            seed: 0xD12A_AD00_0000_0001,
            use_parallel: false,
        }
    }
}

/// Errors returned by the fingerprinting layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FingerprintError {
    #[error("invalid config version {version}; expected >= 1")]
    InvalidVersion { version: u32 },

    #[error("invalid config: window must be >= 1 (got {window})")]
    InvalidWindow { window: usize },

    #[error("invalid config: num_perm must be >= 1 (got {num_perm})")]
    InvalidNumPerm { num_perm: usize },

    #[error("invalid config: bands must divide num_perm (num_perm={num_perm}, bands={bands})")]
    InvalidBands { num_perm: usize, bands: usize },

    #[error("subtree has no tag path of length >= {window}; too small to fingerprint")]
    NotEnoughStructure { window: usize },
}
