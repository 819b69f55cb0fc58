//! Cluster construction from verified edges.
//!
//! Verified pairs are merged into connected components. Transitive closure
//! means A~B and B~C place A and C in one cluster even when A and C were
//! never compared directly; the joint verification gate keeps that drift
//! bounded in practice.

use dom::{Corpus, NodeId};
use hashbrown::HashMap;

use crate::error::ClusterError;
use crate::union_find::UnionFind;

/// One group of structurally equivalent subtrees across the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Members ordered by (document, pre-order position).
    pub members: Vec<NodeId>,
    /// First member in corpus order; its markup becomes the shared partial.
    pub representative: NodeId,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Merge verified edges into clusters, dropping components smaller than
/// `min_occurrences`.
///
/// Output order is deterministic: clusters sorted by their representative's
/// (document, pre-order) key.
pub fn build_clusters(
    edges: &[(NodeId, NodeId)],
    corpus: &Corpus,
    min_occurrences: usize,
) -> Result<Vec<Cluster>, ClusterError> {
    // Dense-index the nodes that appear in at least one edge.
    let mut index_of: HashMap<NodeId, usize> = HashMap::new();
    let mut nodes: Vec<NodeId> = Vec::new();
    for &(a, b) in edges {
        for id in [a, b] {
            index_of.entry(id).or_insert_with(|| {
                nodes.push(id);
                nodes.len() - 1
            });
        }
    }

    let mut uf = UnionFind::new(nodes.len());
    for &(a, b) in edges {
        uf.union(index_of[&a], index_of[&b]);
    }

    let mut components: HashMap<usize, Vec<NodeId>> = HashMap::new();
    for (i, &id) in nodes.iter().enumerate() {
        components.entry(uf.find(i)).or_default().push(id);
    }

    let corpus_key = |id: NodeId| -> Result<(u32, u32), ClusterError> {
        let node = corpus.get(id).ok_or(ClusterError::MissingNode {
            index: id.index(),
        })?;
        Ok((node.doc.index() as u32, node.pre_order))
    };

    let mut clusters: Vec<((u32, u32), Cluster)> = Vec::new();
    for (_, mut members) in components {
        if members.len() < min_occurrences {
            continue;
        }
        let mut keyed: Vec<((u32, u32), NodeId)> = Vec::with_capacity(members.len());
        for id in members.drain(..) {
            keyed.push((corpus_key(id)?, id));
        }
        keyed.sort_unstable();
        let first_key = keyed[0].0;
        let members: Vec<NodeId> = keyed.into_iter().map(|(_, id)| id).collect();
        let representative = members[0];
        clusters.push((
            first_key,
            Cluster {
                members,
                representative,
            },
        ));
    }

    clusters.sort_unstable_by_key(|(key, _)| *key);
    Ok(clusters.into_iter().map(|(_, c)| c).collect())
}
