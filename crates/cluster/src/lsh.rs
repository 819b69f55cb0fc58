//! Banded locality-sensitive hashing over MinHash signatures.
//!
//! A signature of `bands * rows` slots is split into `bands` contiguous
//! bands; each band's rows hash into one bucket key, and a node joins that
//! band's bucket. Any two nodes sharing a bucket in at least one band form a
//! candidate pair. Insertion is sequential by design: signatures are
//! computed in parallel upstream and merged here in one single-threaded
//! phase, which needs no locking at all.

use dom::NodeId;
use hashbrown::{HashMap, HashSet};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::error::ClusterError;

/// Bucketed band index for one run.
#[derive(Debug)]
pub struct LshIndex {
    bands: usize,
    rows: usize,
    seed: u64,
    /// One bucket map per band.
    buckets: Vec<HashMap<u64, Vec<NodeId>>>,
    inserted: usize,
}

impl LshIndex {
    pub fn new(bands: usize, rows: usize, seed: u64) -> Result<Self, ClusterError> {
        if bands == 0 || rows == 0 {
            return Err(ClusterError::InvalidLshShape { bands, rows });
        }
        Ok(Self {
            bands,
            rows,
            seed,
            buckets: vec![HashMap::new(); bands],
            inserted: 0,
        })
    }

    /// Number of signature slots this index expects.
    pub fn signature_len(&self) -> usize {
        self.bands * self.rows
    }

    pub fn len(&self) -> usize {
        self.inserted
    }

    pub fn is_empty(&self) -> bool {
        self.inserted == 0
    }

    /// Insert one node's signature into every band bucket it hashes to.
    pub fn insert(&mut self, id: NodeId, signature: &[u64]) -> Result<(), ClusterError> {
        if signature.len() != self.signature_len() {
            return Err(ClusterError::SignatureLength {
                expected: self.signature_len(),
                got: signature.len(),
            });
        }
        for band in 0..self.bands {
            let start = band * self.rows;
            let key = band_key(&signature[start..start + self.rows], band, self.seed);
            self.buckets[band].entry(key).or_default().push(id);
        }
        self.inserted += 1;
        Ok(())
    }

    /// Every pair of nodes sharing at least one band bucket, deduplicated,
    /// ordered `(min, max)`, and sorted for deterministic downstream work.
    pub fn candidate_pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs: HashSet<(NodeId, NodeId)> = HashSet::new();
        for band in &self.buckets {
            for members in band.values() {
                if members.len() < 2 {
                    continue;
                }
                for i in 0..members.len() {
                    for j in (i + 1)..members.len() {
                        let a = members[i].min(members[j]);
                        let b = members[i].max(members[j]);
                        if a != b {
                            pairs.insert((a, b));
                        }
                    }
                }
            }
        }
        let mut out: Vec<(NodeId, NodeId)> = pairs.into_iter().collect();
        out.sort_unstable();
        out
    }
}

/// Bucket key for one band slice, salted by band index so equal row values
/// in different bands land in unrelated buckets.
fn band_key(rows: &[u64], band: usize, seed: u64) -> u64 {
    let mut bytes = Vec::with_capacity(rows.len() * 8);
    for &value in rows {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    xxh3_64_with_seed(&bytes, seed ^ band as u64)
}
