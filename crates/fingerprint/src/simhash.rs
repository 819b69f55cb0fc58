//! SimHash bit fingerprints over canonical tag atoms.
//!
//! Each element descendant contributes one feature, `hash(tag, depth)`,
//! weighted by the (log-damped) size of its subtree so that large structural
//! blocks dominate leaf noise. Per bit position, weights are added when the
//! feature hash has that bit set and subtracted otherwise; the fingerprint
//! keeps the sign. Hamming distance between fingerprints grows with
//! structural dissimilarity in expectation, and is exactly 0 for identical
//! canonical structure.

use canonical::TagAtom;
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::minhash::splitmix64;

/// Fingerprint width in bits.
pub const SIMHASH_BITS: u32 = 64;

/// Compute a 64-bit SimHash over a canonical pre-order tag walk.
pub fn simhash_fingerprint(atoms: &[TagAtom], seed: u64) -> u64 {
    let mut totals = [0f64; SIMHASH_BITS as usize];
    for atom in atoms {
        let key = splitmix64(seed ^ u64::from(atom.depth));
        let feature = xxh3_64_with_seed(atom.tag.as_bytes(), key);
        let weight = 1.0 + f64::from(atom.subtree_elements).log2();
        for (bit, total) in totals.iter_mut().enumerate() {
            if feature >> bit & 1 == 1 {
                *total += weight;
            } else {
                *total -= weight;
            }
        }
    }

    let mut fingerprint = 0u64;
    for (bit, total) in totals.iter().enumerate() {
        if *total > 0.0 {
            fingerprint |= 1 << bit;
        }
    }
    fingerprint
}

/// Hamming distance between two fingerprints.
#[inline]
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}
