//! # dryad structural fingerprinting
//!
//! Turns a [`canonical::CanonicalForm`] into the two probabilistic sketches
//! the clustering layer compares:
//!
//! 1. **Shingling**: every length-`window` slice of the form's root-to-leaf
//!    tag paths is hashed into a u64 shingle set.
//! 2. **MinHash**: the shingle set is compressed into a fixed-length
//!    signature whose matching-slot fraction estimates Jaccard similarity.
//! 3. **SimHash**: the form's weighted tag walk is folded into a 64-bit
//!    fingerprint whose Hamming distance tracks structural edit proximity.
//!
//! The whole layer is a pure function of `(form, config)`; for a fixed seed
//! the output is bit-identical across runs and machines.

mod config;
mod minhash;
mod shingle;
mod simhash;

use canonical::CanonicalForm;
use serde::{Deserialize, Serialize};

pub use crate::config::{FingerprintConfig, FingerprintError};
pub use crate::minhash::{estimate_jaccard, minhash_signature};
pub use crate::shingle::shingle_set;
pub use crate::simhash::{hamming_distance, simhash_fingerprint, SIMHASH_BITS};

/// Both sketches for one candidate subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// MinHash signature, `num_perm` slots.
    pub minhash: Vec<u64>,
    /// 64-bit SimHash fingerprint.
    pub simhash: u64,
    /// Canonical node size of the fingerprinted subtree. Carried along so
    /// the verifier can gate on size ratio without re-walking the tree.
    pub node_size: usize,
}

/// Fingerprint a canonical form (shingles → MinHash, atoms → SimHash).
///
/// Returns [`FingerprintError::NotEnoughStructure`] when no root-to-leaf
/// path reaches the shingle window; such subtrees are ineligible for
/// comparison rather than being an error at the corpus level.
pub fn fingerprint_form(
    form: &CanonicalForm,
    cfg: &FingerprintConfig,
) -> Result<Fingerprint, FingerprintError> {
    cfg.validate()?;

    let shingles = shingle_set(&form.paths, cfg.window, cfg.seed);
    if shingles.is_empty() {
        return Err(FingerprintError::NotEnoughStructure { window: cfg.window });
    }

    let minhash = minhash_signature(&shingles, cfg.num_perm, cfg.seed, cfg.use_parallel);
    let simhash = simhash_fingerprint(&form.atoms, cfg.seed);

    Ok(Fingerprint {
        minhash,
        simhash,
        node_size: form.node_size,
    })
}
