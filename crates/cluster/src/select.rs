//! Greedy fragment selection.
//!
//! Clusters can nest: a repeated `<nav>` and the repeated `<ul>` inside it
//! both survive verification. Extracting both would rewrite a node inside an
//! already-rewritten subtree, so clusters are committed greedily in order of
//! total extracted size and any cluster whose member overlaps a committed
//! node in the same document is dropped for the run. Greedy is an
//! approximation of the optimal non-overlapping choice, which is acceptable
//! here: the larger fragment is almost always the one worth extracting.

use dom::{Corpus, DocId, NodeId};
use hashbrown::HashMap;

use crate::builder::Cluster;
use crate::error::ClusterError;

/// One accepted cluster, ready for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// File name of the shared partial, unique within the run.
    pub partial_name: String,
    /// Member whose markup is written as the partial body.
    pub representative: NodeId,
    /// All members, in (document, pre-order) order; each is rewritten to an
    /// include directive.
    pub occurrences: Vec<NodeId>,
}

/// Non-overlapping set of fragments for one run, in acceptance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub fragments: Vec<Fragment>,
}

impl ExtractionPlan {
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Resolve overlap between clusters and name the survivors.
///
/// `sizes` carries the canonical node size of every cluster member; a
/// cluster's priority is the total size it would extract across all its
/// occurrences.
pub fn select_fragments(
    clusters: &[Cluster],
    corpus: &Corpus,
    sizes: &HashMap<NodeId, usize>,
) -> Result<ExtractionPlan, ClusterError> {
    let size_of = |id: NodeId| sizes.get(&id).copied().unwrap_or(0);

    let mut ordered: Vec<(usize, (u32, u32), &Cluster)> = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let total: usize = cluster.members.iter().map(|&m| size_of(m)).sum();
        let first = corpus
            .get(cluster.representative)
            .ok_or(ClusterError::MissingNode {
                index: cluster.representative.index(),
            })?;
        ordered.push((total, (first.doc.index() as u32, first.pre_order), cluster));
    }
    // Largest total size first; earliest first occurrence breaks ties.
    ordered.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    let mut committed: HashMap<DocId, Vec<NodeId>> = HashMap::new();
    let mut fragments = Vec::new();

    for (_, _, cluster) in ordered {
        // An edge between a node and its own ancestor would otherwise let a
        // single physical occurrence count twice; keep only members disjoint
        // from every earlier member of the same cluster.
        let mut members: Vec<NodeId> = Vec::with_capacity(cluster.members.len());
        for &member in &cluster.members {
            if members.iter().all(|&kept| !corpus.overlaps(member, kept)) {
                members.push(member);
            }
        }
        // Fewer than two disjoint occurrences means the repetition was
        // illusory; nothing worth sharing.
        if members.len() < 2 {
            continue;
        }

        let mut member_docs = Vec::with_capacity(members.len());
        let mut clashes = false;
        'members: for &member in &members {
            let doc = corpus
                .get(member)
                .ok_or(ClusterError::MissingNode {
                    index: member.index(),
                })?
                .doc;
            member_docs.push(doc);
            if let Some(taken) = committed.get(&doc) {
                for &existing in taken {
                    if corpus.overlaps(member, existing) {
                        clashes = true;
                        break 'members;
                    }
                }
            }
        }
        if clashes {
            continue;
        }

        for (&member, &doc) in members.iter().zip(&member_docs) {
            committed.entry(doc).or_default().push(member);
        }
        let tag = corpus
            .get(cluster.representative)
            .and_then(|n| n.tag())
            .unwrap_or("node");
        fragments.push(Fragment {
            partial_name: format!("partial_{}_{}.html", fragments.len() + 1, tag),
            representative: cluster.representative,
            occurrences: members,
        });
    }

    Ok(ExtractionPlan { fragments })
}
