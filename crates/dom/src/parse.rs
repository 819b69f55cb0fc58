//! Adapter from scraper's parsed tree into the flat corpus arena.
//!
//! html5ever is forgiving: malformed markup still yields a tree (with
//! `<html>`/`<head>`/`<body>` synthesized as needed), so parsing itself never
//! fails here. Comments, doctypes, and processing instructions are dropped
//! during the copy; the pipeline never compares or re-emits them.

use std::fs;
use std::path::Path;

use ego_tree::NodeRef;
use scraper::{Html, Node as HtmlNode};

use crate::arena::{Corpus, DocId, NodeId, NodeKind};
use crate::error::ParseError;

/// Read and parse one HTML file into the corpus.
pub fn parse_file(corpus: &mut Corpus, path: &Path) -> Result<DocId, ParseError> {
    let text = fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_str(corpus, path, &text))
}

/// Parse HTML source into the corpus under the given path label.
pub fn parse_str(corpus: &mut Corpus, path: &Path, html: &str) -> DocId {
    let parsed = Html::parse_document(html);
    let doc = corpus.next_doc_id();
    let mut pre_order = 0u32;

    // The tree root is a synthetic Document node; its element child is the
    // <html> element. Empty input still produces one.
    let root_ref = parsed
        .tree
        .root()
        .children()
        .find(|c| c.value().is_element());

    let root = match root_ref {
        Some(r) => copy_subtree(corpus, r, None, doc, &mut pre_order)
            .unwrap_or_else(|| empty_html(corpus, doc, &mut pre_order)),
        None => empty_html(corpus, doc, &mut pre_order),
    };

    corpus.alloc_document(path, root)
}

fn empty_html(corpus: &mut Corpus, doc: DocId, pre_order: &mut u32) -> NodeId {
    let kind = NodeKind::Element {
        tag: "html".to_string(),
        attrs: Vec::new(),
    };
    let id = corpus.alloc_node(kind, None, doc, *pre_order);
    *pre_order += 1;
    id
}

/// Recursively copy an element or text node. Other node kinds return `None`
/// and their subtrees are discarded.
fn copy_subtree(
    corpus: &mut Corpus,
    node: NodeRef<'_, HtmlNode>,
    parent: Option<NodeId>,
    doc: DocId,
    pre_order: &mut u32,
) -> Option<NodeId> {
    let kind = match node.value() {
        HtmlNode::Element(el) => NodeKind::Element {
            tag: el.name().to_string(),
            attrs: el
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        },
        HtmlNode::Text(t) => NodeKind::Text(t.text.to_string()),
        _ => return None,
    };

    let id = corpus.alloc_node(kind, parent, doc, *pre_order);
    *pre_order += 1;

    for child in node.children() {
        if let Some(child_id) = copy_subtree(corpus, child, Some(id), doc, pre_order) {
            corpus.push_child(id, child_id);
        }
    }
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags_of(corpus: &Corpus, doc: DocId) -> Vec<String> {
        let root = corpus.document(doc).unwrap().root;
        let mut tags = vec![corpus.get(root).unwrap().tag().unwrap().to_string()];
        tags.extend(
            corpus
                .descendants(root)
                .into_iter()
                .filter_map(|id| corpus.get(id).unwrap().tag().map(str::to_owned)),
        );
        tags
    }

    #[test]
    fn parses_basic_document() {
        let mut corpus = Corpus::new();
        let doc = parse_str(
            &mut corpus,
            Path::new("x.html"),
            "<html><head><title>t</title></head><body><p>hi</p></body></html>",
        );
        assert_eq!(tags_of(&corpus, doc), ["html", "head", "title", "body", "p"]);
    }

    #[test]
    fn synthesizes_structure_for_fragmentary_input() {
        let mut corpus = Corpus::new();
        let doc = parse_str(&mut corpus, Path::new("x.html"), "<p>hi</p>");
        let tags = tags_of(&corpus, doc);
        assert!(tags.contains(&"body".to_string()));
        assert!(tags.contains(&"p".to_string()));
    }

    #[test]
    fn comments_are_dropped() {
        let mut corpus = Corpus::new();
        let doc = parse_str(
            &mut corpus,
            Path::new("x.html"),
            "<html><body><!-- note --><p>hi</p></body></html>",
        );
        let body = corpus.body(doc).unwrap();
        let kids = &corpus.get(body).unwrap().children;
        assert_eq!(kids.len(), 1);
        assert_eq!(corpus.get(kids[0]).unwrap().tag(), Some("p"));
    }

    #[test]
    fn attributes_survive_the_copy() {
        let mut corpus = Corpus::new();
        let doc = parse_str(
            &mut corpus,
            Path::new("x.html"),
            "<html><body><a href=\"/home\" class=\"link\">x</a></body></html>",
        );
        let body = corpus.body(doc).unwrap();
        let a = corpus.get(body).unwrap().children[0];
        match &corpus.get(a).unwrap().kind {
            NodeKind::Element { tag, attrs } => {
                assert_eq!(tag, "a");
                assert!(attrs.contains(&("href".to_string(), "/home".to_string())));
                assert!(attrs.contains(&("class".to_string(), "link".to_string())));
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn text_entities_are_decoded() {
        let mut corpus = Corpus::new();
        let doc = parse_str(
            &mut corpus,
            Path::new("x.html"),
            "<html><body><p>a &amp; b</p></body></html>",
        );
        let body = corpus.body(doc).unwrap();
        let p = corpus.get(body).unwrap().children[0];
        let text = corpus.get(p).unwrap().children[0];
        assert_eq!(corpus.get(text).unwrap().kind, NodeKind::Text("a & b".to_string()));
    }

    #[test]
    fn empty_input_still_yields_a_root() {
        let mut corpus = Corpus::new();
        let doc = parse_str(&mut corpus, Path::new("x.html"), "");
        let root = corpus.document(doc).unwrap().root;
        assert_eq!(corpus.get(root).unwrap().tag(), Some("html"));
    }

    #[test]
    fn parse_file_missing_path_reports_read_error() {
        let mut corpus = Corpus::new();
        let err = parse_file(&mut corpus, Path::new("/nonexistent/zz.html")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
