//! Pairwise verification of LSH candidates.
//!
//! Banding over-proposes; every candidate pair is confirmed against three
//! gates before it becomes a cluster edge:
//!
//! - estimated Jaccard similarity (matching MinHash slots) at or above the
//!   configured threshold,
//! - SimHash Hamming distance at or below the configured threshold,
//! - node-size ratio (min/max) at or above the configured floor, so a small
//!   fragment never merges with a much larger one on vocabulary overlap
//!   alone.
//!
//! Rejected pairs are discarded with no further effect.

use dom::NodeId;
use hashbrown::HashMap;
use fingerprint::{estimate_jaccard, hamming_distance, Fingerprint, SIMHASH_BITS};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ClusterError;

/// Acceptance thresholds for candidate verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifierConfig {
    /// Minimum estimated Jaccard similarity, in (0, 1].
    pub jaccard_threshold: f64,
    /// Maximum SimHash Hamming distance, below the fingerprint width.
    pub hamming_threshold: u32,
    /// Minimum node-size ratio min/max, in (0, 1].
    pub size_ratio: f64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            jaccard_threshold: 0.6,
            hamming_threshold: 6,
            size_ratio: 0.85,
        }
    }
}

impl VerifierConfig {
    pub fn validate(&self) -> Result<(), ClusterError> {
        if !(self.jaccard_threshold > 0.0 && self.jaccard_threshold <= 1.0) {
            return Err(ClusterError::InvalidConfig(format!(
                "jaccard_threshold must be in (0, 1] (got {})",
                self.jaccard_threshold
            )));
        }
        if self.hamming_threshold >= SIMHASH_BITS {
            return Err(ClusterError::InvalidConfig(format!(
                "hamming_threshold must be < {SIMHASH_BITS} (got {})",
                self.hamming_threshold
            )));
        }
        if !(self.size_ratio > 0.0 && self.size_ratio <= 1.0) {
            return Err(ClusterError::InvalidConfig(format!(
                "size_ratio must be in (0, 1] (got {})",
                self.size_ratio
            )));
        }
        Ok(())
    }
}

/// Confirm candidate pairs, preserving input order in the output.
///
/// Verification of each pair is independent; with `parallel` the pairs are
/// checked across the rayon pool.
pub fn verify_candidates(
    pairs: &[(NodeId, NodeId)],
    fingerprints: &HashMap<NodeId, Fingerprint>,
    cfg: &VerifierConfig,
    parallel: bool,
) -> Result<Vec<(NodeId, NodeId)>, ClusterError> {
    cfg.validate()?;

    let accept = |pair: &(NodeId, NodeId)| -> Option<(NodeId, NodeId)> {
        let a = fingerprints.get(&pair.0)?;
        let b = fingerprints.get(&pair.1)?;
        accepts(a, b, cfg).then_some(*pair)
    };

    let accepted = if parallel {
        pairs.par_iter().filter_map(accept).collect()
    } else {
        pairs.iter().filter_map(accept).collect()
    };
    Ok(accepted)
}

fn accepts(a: &Fingerprint, b: &Fingerprint, cfg: &VerifierConfig) -> bool {
    if estimate_jaccard(&a.minhash, &b.minhash) < cfg.jaccard_threshold {
        return false;
    }
    if hamming_distance(a.simhash, b.simhash) > cfg.hamming_threshold {
        return false;
    }
    let (small, large) = if a.node_size <= b.node_size {
        (a.node_size, b.node_size)
    } else {
        (b.node_size, a.node_size)
    };
    large == 0 || (small as f64 / large as f64) >= cfg.size_ratio
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use dom::{parse_str, Corpus};

    use super::*;

    fn node_ids(n: usize) -> Vec<NodeId> {
        let mut corpus = Corpus::new();
        (0..n)
            .map(|i| {
                let doc = parse_str(
                    &mut corpus,
                    Path::new("ids.html"),
                    &format!("<html><body>{i}</body></html>"),
                );
                corpus.document(doc).unwrap().root
            })
            .collect()
    }

    fn fp(minhash: Vec<u64>, simhash: u64, node_size: usize) -> Fingerprint {
        Fingerprint {
            minhash,
            simhash,
            node_size,
        }
    }

    #[test]
    fn accepts_identical_fingerprints() {
        let ids = node_ids(2);
        let mut fps = HashMap::new();
        fps.insert(ids[0], fp(vec![1; 16], 0b1010, 40));
        fps.insert(ids[1], fp(vec![1; 16], 0b1010, 40));
        let pairs = vec![(ids[0], ids[1])];
        let edges =
            verify_candidates(&pairs, &fps, &VerifierConfig::default(), false).unwrap();
        assert_eq!(edges, pairs);
    }

    #[test]
    fn rejects_on_low_jaccard() {
        let ids = node_ids(2);
        let mut fps = HashMap::new();
        // 4 of 16 slots match: estimate 0.25, below 0.6.
        let mut other = vec![9u64; 16];
        other[..4].copy_from_slice(&[1, 1, 1, 1]);
        fps.insert(ids[0], fp(vec![1; 16], 0, 40));
        fps.insert(ids[1], fp(other, 0, 40));
        let edges =
            verify_candidates(&[(ids[0], ids[1])], &fps, &VerifierConfig::default(), false)
                .unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn rejects_on_hamming_distance() {
        let ids = node_ids(2);
        let mut fps = HashMap::new();
        // Identical minhash, but 8 differing simhash bits > threshold 6.
        fps.insert(ids[0], fp(vec![1; 16], 0, 40));
        fps.insert(ids[1], fp(vec![1; 16], 0xFF, 40));
        let edges =
            verify_candidates(&[(ids[0], ids[1])], &fps, &VerifierConfig::default(), false)
                .unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn rejects_on_size_ratio() {
        let ids = node_ids(2);
        let mut fps = HashMap::new();
        // 30/60 = 0.5 < 0.85.
        fps.insert(ids[0], fp(vec![1; 16], 0, 30));
        fps.insert(ids[1], fp(vec![1; 16], 0, 60));
        let edges =
            verify_candidates(&[(ids[0], ids[1])], &fps, &VerifierConfig::default(), false)
                .unwrap();
        assert!(edges.is_empty());
    }

    #[test]
    fn joint_condition_requires_all_three_gates() {
        let ids = node_ids(2);
        let mut fps = HashMap::new();
        fps.insert(ids[0], fp(vec![1; 16], 0b11, 40));
        fps.insert(ids[1], fp(vec![1; 16], 0b00, 38));
        // Jaccard 1.0, hamming 2, ratio 0.95: all pass.
        let edges =
            verify_candidates(&[(ids[0], ids[1])], &fps, &VerifierConfig::default(), false)
                .unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn parallel_matches_sequential() {
        let ids = node_ids(6);
        let mut fps = HashMap::new();
        for (i, &id) in ids.iter().enumerate() {
            fps.insert(id, fp(vec![(i % 2) as u64; 16], 0, 40));
        }
        let pairs: Vec<_> = (0..ids.len())
            .flat_map(|i| ((i + 1)..ids.len()).map(move |j| (i, j)))
            .map(|(i, j)| (ids[i], ids[j]))
            .collect();
        let cfg = VerifierConfig::default();
        let seq = verify_candidates(&pairs, &fps, &cfg, false).unwrap();
        let par = verify_candidates(&pairs, &fps, &cfg, true).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let cfg = VerifierConfig {
            jaccard_threshold: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = VerifierConfig {
            jaccard_threshold: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = VerifierConfig {
            hamming_threshold: 64,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = VerifierConfig {
            size_ratio: -0.1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn pairs_without_fingerprints_are_skipped() {
        let ids = node_ids(2);
        let mut fps = HashMap::new();
        fps.insert(ids[0], fp(vec![1; 16], 0, 40));
        let edges =
            verify_candidates(&[(ids[0], ids[1])], &fps, &VerifierConfig::default(), false)
                .unwrap();
        assert!(edges.is_empty());
    }
}
