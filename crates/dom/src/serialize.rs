//! Markup serialization for arena subtrees.
//!
//! Rewriting is expressed through a replacement map: any node id present in
//! the map serializes as the mapped text (emitted raw, no escaping) instead
//! of its subtree. The arena itself is never mutated.

use std::collections::HashMap;
use std::fmt::Write;

use crate::arena::{Corpus, DocId, NodeId, NodeKind};

/// Elements with no closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "param", "source", "track", "wbr",
];

/// Elements whose text content is emitted verbatim, per the HTML raw-text
/// parsing rules. Escaping inside these would corrupt scripts and styles.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize a whole document: doctype plus the root element.
pub fn serialize_document(
    corpus: &Corpus,
    doc: DocId,
    replacements: &HashMap<NodeId, String>,
) -> String {
    // No trailing newline: characters after `</html>` reparse into `<body>`,
    // which would break fixed-point rewriting of our own output.
    let mut out = String::from("<!DOCTYPE html>\n");
    if let Some(document) = corpus.document(doc) {
        write_node(corpus, document.root, replacements, false, &mut out);
    }
    out
}

/// Serialize one subtree to markup text.
pub fn serialize_node(corpus: &Corpus, id: NodeId) -> String {
    serialize_node_with(corpus, id, &HashMap::new())
}

/// Serialize one subtree, substituting replacement text for mapped node ids.
pub fn serialize_node_with(
    corpus: &Corpus,
    id: NodeId,
    replacements: &HashMap<NodeId, String>,
) -> String {
    let mut out = String::new();
    write_node(corpus, id, replacements, false, &mut out);
    out
}

/// Opening tag of an element, attributes included, children omitted.
/// `None` for text nodes and unknown ids.
pub fn serialize_start_tag(corpus: &Corpus, id: NodeId) -> Option<String> {
    let node = corpus.get(id)?;
    let NodeKind::Element { tag, attrs } = &node.kind else {
        return None;
    };
    let mut out = String::new();
    write_start_tag(tag, attrs, &mut out);
    Some(out)
}

fn write_node(
    corpus: &Corpus,
    id: NodeId,
    replacements: &HashMap<NodeId, String>,
    raw_text: bool,
    out: &mut String,
) {
    if let Some(replacement) = replacements.get(&id) {
        out.push_str(replacement);
        return;
    }

    let Some(node) = corpus.get(id) else {
        return;
    };

    match &node.kind {
        NodeKind::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                push_escaped_text(text, out);
            }
        }
        NodeKind::Element { tag, attrs } => {
            write_start_tag(tag, attrs, out);

            if VOID_ELEMENTS.contains(&tag.as_str()) {
                return;
            }

            let child_raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
            for &child in &node.children {
                write_node(corpus, child, replacements, child_raw, out);
            }

            let _ = write!(out, "</{tag}>");
        }
    }
}

fn write_start_tag(tag: &str, attrs: &[(String, String)], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        if value.is_empty() {
            let _ = write!(out, " {name}");
        } else {
            let _ = write!(out, " {name}=\"{}\"", escape_attr(value));
        }
    }
    out.push('>');
}

fn push_escaped_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
