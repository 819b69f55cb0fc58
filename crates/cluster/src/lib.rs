//! # dryad clustering
//!
//! From per-subtree fingerprints to the final extraction plan:
//!
//! 1. [`LshIndex`] buckets MinHash signatures by banded segments; only
//!    subtrees colliding in at least one band ever become a candidate pair,
//!    keeping comparison work near-linear in corpus size. Pairs the banding
//!    misses are an accepted false-negative rate, not a defect.
//! 2. [`verify_candidates`] confirms candidates with the joint
//!    Jaccard-estimate / Hamming-distance / size-ratio gate.
//! 3. [`build_clusters`] merges verified edges into connected components via
//!    an explicit [`UnionFind`], dropping components below the minimum
//!    occurrence count. Membership is transitive-closure based, so a cluster
//!    is approximate, not exact, equivalence.
//! 4. [`select_fragments`] greedily resolves ancestor/descendant overlap
//!    between clusters and emits the non-overlapping [`ExtractionPlan`].

mod builder;
mod error;
mod lsh;
mod select;
mod union_find;
mod verify;

pub use crate::builder::{build_clusters, Cluster};
pub use crate::error::ClusterError;
pub use crate::lsh::LshIndex;
pub use crate::select::{select_fragments, ExtractionPlan, Fragment};
pub use crate::union_find::UnionFind;
pub use crate::verify::{verify_candidates, VerifierConfig};
