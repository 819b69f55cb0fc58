//! The canonical form and its derived views.

use serde::{Deserialize, Serialize};

/// One element in the canonical pre-order walk. Input to SimHash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAtom {
    /// Tag name.
    pub tag: String,
    /// Depth below the canonicalized root (the root itself is depth 0).
    pub depth: u32,
    /// Number of elements in this atom's subtree, including itself.
    pub subtree_elements: u32,
}

/// Normalized encoding of one subtree, cached per candidate node.
///
/// Two nodes with equal `encoded` strings (equivalently, equal `sha256_hex`)
/// are structurally indistinguishable under the canonicalization policy that
/// produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalForm {
    /// Canonical markup-shaped encoding of the subtree.
    pub encoded: String,
    /// Elements plus non-whitespace text nodes below the root (the root is
    /// not counted). Matches the corpus subtree weight for canonical trees.
    pub node_size: usize,
    /// Pre-order element walk, root included.
    pub atoms: Vec<TagAtom>,
    /// Root-to-leaf tag paths ("leaf" meaning an element without element
    /// children). Input to shingling.
    pub paths: Vec<Vec<String>>,
    /// Version-bound SHA-256 digest of `encoded`.
    pub sha256_hex: String,
    /// Canonicalization config version this form was produced under.
    pub canonical_version: u32,
}
