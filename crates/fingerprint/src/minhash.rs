//! MinHash signatures over shingle sets.
//!
//! Each signature slot simulates one hash permutation: the slot's key is
//! derived from the seed and slot index, every shingle is mixed with that
//! key, and the minimum survives. The fraction of equal slots between two
//! signatures is an unbiased estimator of the Jaccard similarity of the
//! underlying shingle sets.

use rayon::prelude::*;
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Compute a `num_perm`-slot MinHash signature.
///
/// An empty shingle set yields an all-`u64::MAX` signature, which never
/// matches a non-empty one. The parallel path is bit-identical to the
/// sequential path.
pub fn minhash_signature(
    shingles: &[u64],
    num_perm: usize,
    seed: u64,
    use_parallel: bool,
) -> Vec<u64> {
    if num_perm == 0 {
        return Vec::new();
    }
    if shingles.is_empty() {
        return vec![u64::MAX; num_perm];
    }

    let mut signature = Vec::with_capacity(num_perm);
    if use_parallel {
        (0..num_perm)
            .into_par_iter()
            .map(|slot| min_under_permutation(shingles, slot, seed))
            .collect_into_vec(&mut signature);
    } else {
        for slot in 0..num_perm {
            signature.push(min_under_permutation(shingles, slot, seed));
        }
    }
    signature
}

/// Estimated Jaccard similarity: the fraction of matching slots.
///
/// This is an estimate, not true Jaccard; the exact sets are never compared.
pub fn estimate_jaccard(a: &[u64], b: &[u64]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let matches = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    matches as f64 / a.len() as f64
}

/// Minimum of the shingle set under one simulated permutation.
#[inline]
fn min_under_permutation(shingles: &[u64], slot: usize, seed: u64) -> u64 {
    // Distinct odd-multiple step per slot, scrambled so adjacent slots get
    // unrelated keys.
    let step = (slot as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let key = splitmix64(seed.wrapping_add(step));
    let mut min = u64::MAX;
    for &shingle in shingles {
        let h = mix_u64(shingle, key);
        if h < min {
            min = h;
        }
    }
    min
}

/// Keyed 64-bit mix: xxh3 over the value, then a Murmur-style finalizer.
#[inline]
pub(crate) fn mix_u64(value: u64, key: u64) -> u64 {
    let mut h = xxh3_64_with_seed(&value.to_le_bytes(), key);
    h ^= h >> 33;
    h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
    h ^= h >> 33;
    h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    h ^ (h >> 33)
}

/// SplitMix64: cheap, well-distributed 64-bit scrambler.
#[inline]
pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
