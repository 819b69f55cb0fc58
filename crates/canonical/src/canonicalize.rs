//! The canonicalization walk.

use std::fmt::Write;

use dom::{Corpus, NodeId, NodeKind};

use crate::config::CanonicalConfig;
use crate::error::CanonicalError;
use crate::form::{CanonicalForm, TagAtom};
use crate::hash::hash_form_bytes;

/// Canonicalize the subtree rooted at `root`.
///
/// Pure function of `(subtree, config)`. The corpus is only read.
pub fn canonicalize(
    corpus: &Corpus,
    root: NodeId,
    cfg: &CanonicalConfig,
) -> Result<CanonicalForm, CanonicalError> {
    cfg.validate()?;

    let node = corpus.get(root).ok_or(CanonicalError::MissingNode {
        index: root.index(),
    })?;
    if !node.is_element() {
        return Err(CanonicalError::NotAnElement {
            index: root.index(),
        });
    }

    let mut walker = Walker {
        corpus,
        cfg,
        encoded: String::new(),
        atoms: Vec::new(),
        paths: Vec::new(),
        counted: 0,
    };
    let mut prefix = Vec::new();
    walker.walk_element(root, 0, &mut prefix)?;

    let sha256_hex = hash_form_bytes(cfg.version, walker.encoded.as_bytes());
    Ok(CanonicalForm {
        node_size: walker.counted - 1, // the root does not count toward its own size
        encoded: walker.encoded,
        atoms: walker.atoms,
        paths: walker.paths,
        sha256_hex,
        canonical_version: cfg.version,
    })
}

struct Walker<'a> {
    corpus: &'a Corpus,
    cfg: &'a CanonicalConfig,
    encoded: String,
    atoms: Vec<TagAtom>,
    paths: Vec<Vec<String>>,
    /// Elements plus kept text nodes seen so far, root included.
    counted: usize,
}

impl Walker<'_> {
    /// Emit one element and recurse. Returns the subtree element count.
    fn walk_element(
        &mut self,
        id: NodeId,
        depth: u32,
        prefix: &mut Vec<String>,
    ) -> Result<u32, CanonicalError> {
        let node = self.corpus.get(id).ok_or(CanonicalError::MissingNode {
            index: id.index(),
        })?;
        let NodeKind::Element { tag, attrs } = &node.kind else {
            return Err(CanonicalError::NotAnElement { index: id.index() });
        };

        self.counted += 1;
        let atom_index = self.atoms.len();
        self.atoms.push(TagAtom {
            tag: tag.clone(),
            depth,
            subtree_elements: 1,
        });

        self.encoded.push('<');
        self.encoded.push_str(tag);
        let mut kept: Vec<&(String, String)> = attrs
            .iter()
            .filter(|(name, _)| !self.cfg.is_volatile(name))
            .collect();
        kept.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in kept {
            if value.is_empty() {
                let _ = write!(self.encoded, " {name}");
            } else {
                let _ = write!(self.encoded, " {name}=\"{value}\"");
            }
        }
        self.encoded.push('>');

        prefix.push(tag.clone());
        let mut child_elements = 0u32;
        let children = node.children.clone();
        for child_id in children {
            let child = self.corpus.get(child_id).ok_or(CanonicalError::MissingNode {
                index: child_id.index(),
            })?;
            match &child.kind {
                NodeKind::Element { .. } => {
                    child_elements += self.walk_element(child_id, depth + 1, prefix)?;
                }
                NodeKind::Text(text) => {
                    let collapsed = collapse_whitespace(text);
                    if !collapsed.is_empty() {
                        self.counted += 1;
                        self.encoded.push_str(&collapsed);
                    }
                }
            }
        }
        if child_elements == 0 {
            self.paths.push(prefix.clone());
        }
        prefix.pop();

        let _ = write!(self.encoded, "</{tag}>");

        let subtree = 1 + child_elements;
        self.atoms[atom_index].subtree_elements = subtree;
        Ok(subtree)
    }
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
/// Whitespace-only text collapses to the empty string.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use dom::{parse_str, DocId};

    use super::*;

    fn parse_one(html: &str) -> (Corpus, DocId) {
        let mut corpus = Corpus::new();
        let doc = parse_str(&mut corpus, Path::new("t.html"), html);
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

    fn form_of(html: &str, tag: &str, cfg: &CanonicalConfig) -> CanonicalForm {
        let (corpus, doc) = parse_one(html);
        let node = find_tag(&corpus, doc, tag);
        canonicalize(&corpus, node, cfg).unwrap()
    }

    const NAV_A: &str = r#"<html><body><nav class="nav"><ul><li class="item"><a href="/">Home</a></li></ul></nav></body></html>"#;
    const NAV_B: &str = r#"<html><body><nav class="nav dark"><ul><li class="item active"><a href="/">Home</a></li></ul></nav></body></html>"#;

    #[test]
    fn volatile_attribute_values_do_not_affect_the_form() {
        let cfg = CanonicalConfig::default();
        let a = form_of(NAV_A, "nav", &cfg);
        let b = form_of(NAV_B, "nav", &cfg);
        assert_eq!(a.encoded, b.encoded);
        assert_eq!(a.sha256_hex, b.sha256_hex);
    }

    #[test]
    fn non_volatile_attribute_values_do_affect_the_form() {
        let cfg = CanonicalConfig::default();
        let a = form_of(NAV_A, "a", &cfg);
        let b = form_of(
            r#"<html><body><a href="/about">Home</a></body></html>"#,
            "a",
            &cfg,
        );
        assert_ne!(a.encoded, b.encoded);
    }

    #[test]
    fn attribute_order_is_normalized() {
        let cfg = CanonicalConfig::default();
        let a = form_of(
            r#"<html><body><a rel="nofollow" href="/">x</a></body></html>"#,
            "a",
            &cfg,
        );
        let b = form_of(
            r#"<html><body><a href="/" rel="nofollow">x</a></body></html>"#,
            "a",
            &cfg,
        );
        assert_eq!(a.encoded, b.encoded);
    }

    #[test]
    fn whitespace_only_text_is_dropped_and_runs_collapse() {
        let cfg = CanonicalConfig::default();
        let a = form_of(
            "<html><body><p>\n   hello\t world \n</p></body></html>",
            "p",
            &cfg,
        );
        let b = form_of("<html><body><p>hello world</p></body></html>", "p", &cfg);
        assert_eq!(a.encoded, b.encoded);
        assert_eq!(a.encoded, "<p>hello world</p>");
    }

    #[test]
    fn paths_are_root_to_leaf_tag_sequences() {
        let cfg = CanonicalConfig::default();
        let form = form_of(NAV_A, "nav", &cfg);
        assert_eq!(form.paths, vec![vec!["nav", "ul", "li", "a"]]);
    }

    #[test]
    fn atoms_are_pre_order_with_subtree_counts() {
        let cfg = CanonicalConfig::default();
        let form = form_of(NAV_A, "nav", &cfg);
        let view: Vec<(&str, u32, u32)> = form
            .atoms
            .iter()
            .map(|a| (a.tag.as_str(), a.depth, a.subtree_elements))
            .collect();
        assert_eq!(
            view,
            vec![("nav", 0, 4), ("ul", 1, 3), ("li", 2, 2), ("a", 3, 1)]
        );
    }

    #[test]
    fn node_size_excludes_the_root() {
        let cfg = CanonicalConfig::default();
        let form = form_of(NAV_A, "nav", &cfg);
        // ul, li, a, "Home"
        assert_eq!(form.node_size, 4);
    }

    #[test]
    fn custom_volatile_set_is_honored() {
        let cfg = CanonicalConfig::new().with_volatile_attrs(["data-reveal"]);
        let a = form_of(
            r#"<html><body><div data-reveal="1"><p>x</p></div></body></html>"#,
            "div",
            &cfg,
        );
        let b = form_of(
            r#"<html><body><div data-reveal="2"><p>x</p></div></body></html>"#,
            "div",
            &cfg,
        );
        assert_eq!(a.encoded, b.encoded);
        // class is not volatile under this config
        assert!(a.encoded.starts_with("<div>"));
        let c = form_of(
            r#"<html><body><div class="x"><p>x</p></div></body></html>"#,
            "div",
            &cfg,
        );
        assert!(c.encoded.contains("class=\"x\""));
    }

    #[test]
    fn text_nodes_cannot_be_canonicalized() {
        let (corpus, doc) = parse_one("<html><body><p>hi</p></body></html>");
        let p = find_tag(&corpus, doc, "p");
        let text = corpus.get(p).unwrap().children[0];
        let err = canonicalize(&corpus, text, &CanonicalConfig::default()).unwrap_err();
        assert!(matches!(err, CanonicalError::NotAnElement { .. }));
    }

    #[test]
    fn invalid_config_fails_before_walking() {
        let (corpus, doc) = parse_one(NAV_A);
        let nav = find_tag(&corpus, doc, "nav");
        let cfg = CanonicalConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            canonicalize(&corpus, nav, &cfg),
            Err(CanonicalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn canonicalization_is_deterministic() {
        let cfg = CanonicalConfig::default();
        let a = form_of(NAV_A, "nav", &cfg);
        let b = form_of(NAV_A, "nav", &cfg);
        assert_eq!(a, b);
    }
}
