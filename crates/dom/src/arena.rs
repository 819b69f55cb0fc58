//! Flat node arena shared by every parsed document.
//!
//! Nodes are stored in one `Vec` addressed by [`NodeId`]; parent and child
//! links are indices into that table. Documents only record their root node
//! and source path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Corpus-wide node identifier. Assigned at parse time, never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    /// Position of this node in the corpus table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a parsed document, in corpus insertion order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DocId(u32);

impl DocId {
    pub(crate) fn new(index: usize) -> Self {
        DocId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of an arena node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// An element with its tag name and attributes in source order.
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    /// A text node. Entity references are already decoded by the parser.
    Text(String),
}

/// One DOM node. Structure is immutable once the owning document is parsed.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Document this node belongs to.
    pub doc: DocId,
    /// Pre-order position within the owning document.
    pub pre_order: u32,
}

impl Node {
    /// Tag name if this is an element.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }
}

/// A parsed input file: its source path and root node.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocId,
    pub path: PathBuf,
    pub root: NodeId,
}

/// Flat table of all nodes and documents parsed in one run.
#[derive(Debug, Default)]
pub struct Corpus {
    nodes: Vec<Node>,
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node lookup. `None` means the id was never allocated, which callers
    /// treat as an internal invariant violation rather than user error.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id.index())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Identifier the next parsed document will receive. Nodes are allocated
    /// against this id before the document record itself exists.
    pub(crate) fn next_doc_id(&self) -> DocId {
        DocId::new(self.documents.len())
    }

    pub(crate) fn alloc_document(&mut self, path: &Path, root: NodeId) -> DocId {
        let id = DocId::new(self.documents.len());
        self.documents.push(Document {
            id,
            path: path.to_path_buf(),
            root,
        });
        id
    }

    pub(crate) fn alloc_node(
        &mut self,
        kind: NodeKind,
        parent: Option<NodeId>,
        doc: DocId,
        pre_order: u32,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            id,
            kind,
            parent,
            children: Vec::new(),
            doc,
            pre_order,
        });
        id
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].children.push(child);
    }

    /// The `<body>` element of a document, if the parser produced one.
    pub fn body(&self, doc: DocId) -> Option<NodeId> {
        let root = self.document(doc)?.root;
        self.descendants(root)
            .into_iter()
            .find(|&id| self.nodes[id.index()].tag() == Some("body"))
    }

    /// All nodes below `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id.index()]
            .children
            .iter()
            .rev()
            .copied()
            .collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.index()].children.iter().rev().copied());
        }
        out
    }

    /// Subtree weight of a node: element descendants plus non-whitespace
    /// text descendants. The node itself is not counted.
    pub fn subtree_size(&self, id: NodeId) -> usize {
        self.descendants(id)
            .into_iter()
            .filter(|&d| match &self.nodes[d.index()].kind {
                NodeKind::Element { .. } => true,
                NodeKind::Text(t) => !t.trim().is_empty(),
            })
            .count()
    }

    /// True when `ancestor` lies on the parent chain of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.nodes[node.index()].parent;
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.nodes[p.index()].parent;
        }
        false
    }

    /// True when the two nodes are equal or one contains the other.
    pub fn overlaps(&self, a: NodeId, b: NodeId) -> bool {
        a == b || self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_str;

    use super::*;

    fn nav_corpus() -> (Corpus, DocId) {
        let mut corpus = Corpus::new();
        let doc = parse_str(
            &mut corpus,
            Path::new("a.html"),
            "<html><body><nav><ul><li><a href=\"/\">Home</a></li></ul></nav></body></html>",
        );
        (corpus, doc)
    }

    fn find_tag(corpus: &Corpus, doc: DocId, tag: &str) -> NodeId {
        let root = corpus.document(doc).unwrap().root;
        corpus
            .descendants(root)
            .into_iter()
            .find(|&id| corpus.get(id).unwrap().tag() == Some(tag))
            .unwrap()
    }

    #[test]
    fn body_lookup_finds_body() {
        let (corpus, doc) = nav_corpus();
        let body = corpus.body(doc).unwrap();
        assert_eq!(corpus.get(body).unwrap().tag(), Some("body"));
    }

    #[test]
    fn descendants_are_pre_order() {
        let (corpus, doc) = nav_corpus();
        let nav = find_tag(&corpus, doc, "nav");
        let tags: Vec<_> = corpus
            .descendants(nav)
            .into_iter()
            .filter_map(|id| corpus.get(id).unwrap().tag().map(str::to_owned))
            .collect();
        assert_eq!(tags, ["ul", "li", "a"]);
    }

    #[test]
    fn pre_order_positions_increase_along_traversal() {
        let (corpus, doc) = nav_corpus();
        let root = corpus.document(doc).unwrap().root;
        let positions: Vec<u32> = corpus
            .descendants(root)
            .into_iter()
            .map(|id| corpus.get(id).unwrap().pre_order)
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn subtree_size_counts_elements_and_text() {
        let (corpus, doc) = nav_corpus();
        let nav = find_tag(&corpus, doc, "nav");
        // ul + li + a + "Home"
        assert_eq!(corpus.subtree_size(nav), 4);
    }

    #[test]
    fn subtree_size_ignores_whitespace_text() {
        let mut corpus = Corpus::new();
        let doc = parse_str(
            &mut corpus,
            Path::new("b.html"),
            "<html><body><div>\n  <p>x</p>\n</div></body></html>",
        );
        let div = find_tag(&corpus, doc, "div");
        // p + "x"; the indentation runs do not count
        assert_eq!(corpus.subtree_size(div), 2);
    }

    #[test]
    fn ancestor_checks() {
        let (corpus, doc) = nav_corpus();
        let nav = find_tag(&corpus, doc, "nav");
        let a = find_tag(&corpus, doc, "a");
        assert!(corpus.is_ancestor(nav, a));
        assert!(!corpus.is_ancestor(a, nav));
        assert!(corpus.overlaps(nav, a));
        assert!(corpus.overlaps(a, nav));
        assert!(corpus.overlaps(nav, nav));
    }

    #[test]
    fn siblings_do_not_overlap() {
        let mut corpus = Corpus::new();
        let doc = parse_str(
            &mut corpus,
            Path::new("c.html"),
            "<html><body><header>h</header><footer>f</footer></body></html>",
        );
        let header = find_tag(&corpus, doc, "header");
        let footer = find_tag(&corpus, doc, "footer");
        assert!(!corpus.overlaps(header, footer));
    }

    #[test]
    fn node_ids_unique_across_documents() {
        let mut corpus = Corpus::new();
        let d1 = parse_str(&mut corpus, Path::new("a.html"), "<html><body>a</body></html>");
        let d2 = parse_str(&mut corpus, Path::new("b.html"), "<html><body>b</body></html>");
        let r1 = corpus.document(d1).unwrap().root;
        let r2 = corpus.document(d2).unwrap().root;
        assert_ne!(r1, r2);
        let mut all: Vec<NodeId> = corpus.descendants(r1);
        all.extend(corpus.descendants(r2));
        all.push(r1);
        all.push(r2);
        let len = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), len);
    }
}
