//! Hoisting of page assets shared by the whole corpus.
//!
//! Independently of fragment extraction, assets that every page carries are
//! lifted into three fixed partials:
//!
//! - `title-meta.html`: a parameterized `<title>` plus the `<meta>` and
//!   non-stylesheet `<link>` elements present in every head,
//! - `head-css.html`: the stylesheet links, inline `<style>` blocks, and
//!   head scripts present in every head,
//! - `footer-scripts.html`: body `<script src>` elements whose `src` appears
//!   in every page.
//!
//! Titles are factored around their longest common character suffix: the
//! suffix (typically a site name) stays in the partial and the per-page
//! remainder travels through the include directive as a `page_title`
//! parameter. Head elements in the common sets are keyed by their serialized
//! markup, so pages that spell an attribute differently keep their own copy.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use dom::{
    serialize_node, serialize_node_with, serialize_start_tag, Corpus, DocId, Node, NodeId,
    NodeKind,
};

use crate::include::{include_statement, include_statement_with};

pub(crate) const TITLE_META_PARTIAL: &str = "title-meta.html";
pub(crate) const HEAD_CSS_PARTIAL: &str = "head-css.html";
pub(crate) const FOOTER_SCRIPTS_PARTIAL: &str = "footer-scripts.html";

/// Everything needed to rewrite one page's `<head>`.
struct HeadRewrite {
    head: NodeId,
    page_title: String,
    /// Hoisted nodes, mapped to empty replacement text.
    removed: HashMap<NodeId, String>,
}

/// Result of the corpus-wide asset intersection.
pub(crate) struct AssetPlan {
    pub(crate) title_meta: String,
    pub(crate) head_css: String,
    pub(crate) footer_scripts: String,
    /// Body scripts removed from every page in favor of the footer partial.
    pub(crate) dropped_scripts: Vec<NodeId>,
    heads: hashbrown::HashMap<DocId, HeadRewrite>,
}

impl AssetPlan {
    pub(crate) fn analyze(corpus: &Corpus, docs: &[DocId]) -> Self {
        let scans: Vec<HeadScan> = docs
            .iter()
            .filter_map(|&doc| scan_head(corpus, doc))
            .collect();

        let common_metas = intersect(scans.iter().map(|s| keys(&s.metas)));
        let common_links = intersect(scans.iter().map(|s| keys(&s.links)));
        let common_stylesheets = intersect(scans.iter().map(|s| keys(&s.stylesheets)));
        let common_styles = intersect(scans.iter().map(|s| keys(&s.styles)));
        let common_head_scripts = intersect(scans.iter().map(|s| keys(&s.scripts)));

        let titles: Vec<&str> = scans.iter().map(|s| s.title.as_str()).collect();
        let suffix = longest_common_suffix(&titles);

        // Body scripts are keyed by src alone: the same bundle referenced
        // with different attribute noise still hoists.
        let body_scripts: Vec<Vec<(String, NodeId)>> = docs
            .iter()
            .map(|&doc| script_sources(corpus, doc))
            .collect();
        let common_srcs = intersect(body_scripts.iter().map(|s| keys(s)));
        let mut script_markup: BTreeMap<String, String> = BTreeMap::new();
        let mut dropped_scripts = Vec::new();
        for scripts in &body_scripts {
            for (src, id) in scripts {
                if common_srcs.contains(src) {
                    script_markup
                        .entry(src.clone())
                        .or_insert_with(|| serialize_node(corpus, *id));
                    dropped_scripts.push(*id);
                }
            }
        }

        let title_line = if suffix.trim().is_empty() {
            "<title>{{ page_title }}</title>".to_string()
        } else {
            format!("<title>{{{{ page_title }}}} {}</title>", suffix.trim())
        };
        let title_meta: String = std::iter::once(title_line)
            .chain(common_metas.iter().cloned())
            .chain(common_links.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n");
        let head_css: String = common_stylesheets
            .iter()
            .chain(&common_styles)
            .chain(&common_head_scripts)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        let footer_scripts: String =
            script_markup.into_values().collect::<Vec<_>>().join("\n");

        let mut heads = hashbrown::HashMap::new();
        for scan in &scans {
            let mut removed: HashMap<NodeId, String> = HashMap::new();
            for &id in &scan.title_nodes {
                removed.insert(id, String::new());
            }
            for (group, common) in [
                (&scan.metas, &common_metas),
                (&scan.links, &common_links),
                (&scan.stylesheets, &common_stylesheets),
                (&scan.styles, &common_styles),
                (&scan.scripts, &common_head_scripts),
            ] {
                for (key, id) in group {
                    if common.contains(key) {
                        removed.insert(*id, String::new());
                    }
                }
            }
            heads.insert(
                scan.doc,
                HeadRewrite {
                    head: scan.head,
                    page_title: page_title(&scan.title, &suffix),
                    removed,
                },
            );
        }

        Self {
            title_meta,
            head_css,
            footer_scripts,
            dropped_scripts,
            heads,
        }
    }

    /// Replacement markup for a page's `<head>`: the title/meta include, the
    /// surviving head content, then the css include.
    pub(crate) fn head_replacement(
        &self,
        corpus: &Corpus,
        doc: DocId,
    ) -> Option<(NodeId, String)> {
        let rewrite = self.heads.get(&doc)?;
        let node = corpus.get(rewrite.head)?;
        let mut out = serialize_start_tag(corpus, rewrite.head)?;
        if rewrite.page_title.is_empty() {
            out.push_str(&include_statement(TITLE_META_PARTIAL));
        } else {
            out.push_str(&include_statement_with(
                TITLE_META_PARTIAL,
                "page_title",
                &rewrite.page_title,
            ));
        }
        for &child in &node.children {
            out.push_str(&serialize_node_with(corpus, child, &rewrite.removed));
        }
        out.push_str(&include_statement(HEAD_CSS_PARTIAL));
        out.push_str("</head>");
        Some((rewrite.head, out))
    }

    /// Replacement markup for a page's `<body>`: existing content under
    /// `replacements` (fragment directives, dropped scripts), then the footer
    /// scripts include.
    pub(crate) fn body_replacement(
        &self,
        corpus: &Corpus,
        doc: DocId,
        replacements: &HashMap<NodeId, String>,
    ) -> Option<(NodeId, String)> {
        let body = corpus.body(doc)?;
        let node = corpus.get(body)?;
        let mut out = serialize_start_tag(corpus, body)?;
        for &child in &node.children {
            out.push_str(&serialize_node_with(corpus, child, replacements));
        }
        out.push_str(&include_statement(FOOTER_SCRIPTS_PARTIAL));
        out.push_str("</body>");
        Some((body, out))
    }
}

/// Categorized head content of one page.
struct HeadScan {
    doc: DocId,
    head: NodeId,
    title: String,
    title_nodes: Vec<NodeId>,
    metas: Vec<(String, NodeId)>,
    links: Vec<(String, NodeId)>,
    stylesheets: Vec<(String, NodeId)>,
    styles: Vec<(String, NodeId)>,
    scripts: Vec<(String, NodeId)>,
}

fn scan_head(corpus: &Corpus, doc: DocId) -> Option<HeadScan> {
    let root = corpus.document(doc)?.root;
    let head = corpus
        .descendants(root)
        .into_iter()
        .find(|&id| corpus.get(id).and_then(Node::tag) == Some("head"))?;

    let mut scan = HeadScan {
        doc,
        head,
        title: String::new(),
        title_nodes: Vec::new(),
        metas: Vec::new(),
        links: Vec::new(),
        stylesheets: Vec::new(),
        styles: Vec::new(),
        scripts: Vec::new(),
    };
    for id in corpus.descendants(head) {
        let Some(node) = corpus.get(id) else { continue };
        match node.tag() {
            Some("title") => {
                if scan.title_nodes.is_empty() {
                    scan.title = element_text(corpus, node);
                }
                scan.title_nodes.push(id);
            }
            // The charset declaration stays physically in each page; moving
            // it into a partial would push it past the sniffing window.
            Some("meta") if attr(node, "charset").is_none() => {
                scan.metas.push((serialize_node(corpus, id), id));
            }
            Some("link") => {
                let entry = (serialize_node(corpus, id), id);
                if attr(node, "rel") == Some("stylesheet") {
                    scan.stylesheets.push(entry);
                } else {
                    scan.links.push(entry);
                }
            }
            Some("style") => scan.styles.push((serialize_node(corpus, id), id)),
            Some("script") => scan.scripts.push((serialize_node(corpus, id), id)),
            _ => {}
        }
    }
    Some(scan)
}

/// Body `<script>` elements with a `src`, keyed by that src.
fn script_sources(corpus: &Corpus, doc: DocId) -> Vec<(String, NodeId)> {
    let Some(body) = corpus.body(doc) else {
        return Vec::new();
    };
    corpus
        .descendants(body)
        .into_iter()
        .filter_map(|id| {
            let node = corpus.get(id)?;
            if node.tag() != Some("script") {
                return None;
            }
            attr(node, "src").map(|src| (src.to_string(), id))
        })
        .collect()
}

fn attr<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    match &node.kind {
        NodeKind::Element { attrs, .. } => attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str()),
        NodeKind::Text(_) => None,
    }
}

fn element_text(corpus: &Corpus, node: &Node) -> String {
    let mut out = String::new();
    for &child in &node.children {
        if let Some(NodeKind::Text(text)) = corpus.get(child).map(|n| &n.kind) {
            out.push_str(text);
        }
    }
    out.trim().to_string()
}

fn keys(entries: &[(String, NodeId)]) -> BTreeSet<String> {
    entries.iter().map(|(key, _)| key.clone()).collect()
}

/// Intersection across all sets; empty when there are no sets at all.
fn intersect(sets: impl Iterator<Item = BTreeSet<String>>) -> BTreeSet<String> {
    let mut sets = sets;
    let Some(mut acc) = sets.next() else {
        return BTreeSet::new();
    };
    for set in sets {
        acc = acc.intersection(&set).cloned().collect();
    }
    acc
}

/// Longest suffix of characters shared by every title.
fn longest_common_suffix(titles: &[&str]) -> String {
    let Some(first) = titles.first() else {
        return String::new();
    };
    let mut suffix: Vec<char> = first.chars().collect();
    for title in &titles[1..] {
        let chars: Vec<char> = title.chars().collect();
        let mut matched = 0;
        while matched < suffix.len()
            && matched < chars.len()
            && suffix[suffix.len() - 1 - matched] == chars[chars.len() - 1 - matched]
        {
            matched += 1;
        }
        suffix.drain(..suffix.len() - matched);
        if suffix.is_empty() {
            break;
        }
    }
    suffix.into_iter().collect()
}

/// The per-page part of a title: the common suffix removed, separator
/// punctuation trimmed from both ends.
fn page_title(title: &str, suffix: &str) -> String {
    let stem = title.strip_suffix(suffix).unwrap_or(title);
    stem.trim_matches(|c| c == ' ' || c == '|' || c == '-').to_string()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use dom::parse_str;

    use super::*;

    fn parse_pages(pages: &[&str]) -> (Corpus, Vec<DocId>) {
        let mut corpus = Corpus::new();
        let docs = pages
            .iter()
            .enumerate()
            .map(|(i, html)| parse_str(&mut corpus, Path::new(&format!("p{i}.html")), html))
            .collect();
        (corpus, docs)
    }

    const PAGE_A: &str = "<html><head>\
        <meta charset=\"utf-8\">\
        <meta name=\"viewport\" content=\"width=device-width\">\
        <meta name=\"description\" content=\"alpha only\">\
        <title>Home | Acme</title>\
        <link rel=\"stylesheet\" href=\"css/main.css\">\
        <link rel=\"icon\" href=\"favicon.ico\">\
        </head><body><p>a</p>\
        <script src=\"js/app.js\"></script>\
        <script src=\"js/home.js\"></script>\
        </body></html>";

    const PAGE_B: &str = "<html><head>\
        <meta charset=\"utf-8\">\
        <meta name=\"viewport\" content=\"width=device-width\">\
        <title>About | Acme</title>\
        <link rel=\"stylesheet\" href=\"css/main.css\">\
        <link rel=\"icon\" href=\"favicon.ico\">\
        </head><body><p>b</p>\
        <script src=\"js/app.js\"></script>\
        </body></html>";

    #[test]
    fn common_suffix_is_character_wise() {
        assert_eq!(longest_common_suffix(&["Home | Acme", "About | Acme"]), " | Acme");
        assert_eq!(longest_common_suffix(&["abc", "xyz"]), "");
        assert_eq!(longest_common_suffix(&[]), "");
        assert_eq!(longest_common_suffix(&["solo"]), "solo");
    }

    #[test]
    fn page_titles_lose_suffix_and_separators() {
        assert_eq!(page_title("Home | Acme", " | Acme"), "Home");
        assert_eq!(page_title("Docs - Acme", " - Acme"), "Docs");
        assert_eq!(page_title("Acme", "Acme"), "");
    }

    #[test]
    fn shared_head_assets_land_in_the_partials() {
        let (corpus, docs) = parse_pages(&[PAGE_A, PAGE_B]);
        let plan = AssetPlan::analyze(&corpus, &docs);

        assert!(plan.title_meta.contains("<title>{{ page_title }} | Acme</title>"));
        assert!(plan.title_meta.contains("name=\"viewport\""));
        assert!(plan.title_meta.contains("rel=\"icon\""));
        // Only one page carries the description; it is not hoisted.
        assert!(!plan.title_meta.contains("description"));
        // The charset meta never leaves the page.
        assert!(!plan.title_meta.contains("charset"));

        assert!(plan.head_css.contains("css/main.css"));
        assert!(plan.footer_scripts.contains("js/app.js"));
        // home.js is unique to one page.
        assert!(!plan.footer_scripts.contains("js/home.js"));
        assert_eq!(plan.dropped_scripts.len(), 2);
    }

    #[test]
    fn head_rewrite_keeps_page_specific_elements() {
        let (corpus, docs) = parse_pages(&[PAGE_A, PAGE_B]);
        let plan = AssetPlan::analyze(&corpus, &docs);

        let (_, head) = plan.head_replacement(&corpus, docs[0]).unwrap();
        assert!(head.starts_with("<head>"));
        assert!(head.ends_with("</head>"));
        assert!(head.contains(
            "@@include('./partials/title-meta.html', {\"page_title\": \"Home\"})"
        ));
        assert!(head.contains("@@include('./partials/head-css.html')"));
        // Hoisted elements are gone, page-specific ones stay.
        assert!(!head.contains("<title>"));
        assert!(!head.contains("css/main.css"));
        assert!(head.contains("charset=\"utf-8\""));
        assert!(head.contains("alpha only"));
    }

    #[test]
    fn body_rewrite_appends_the_footer_include() {
        let (corpus, docs) = parse_pages(&[PAGE_A, PAGE_B]);
        let plan = AssetPlan::analyze(&corpus, &docs);

        let mut replacements = HashMap::new();
        for &id in &plan.dropped_scripts {
            replacements.insert(id, String::new());
        }
        let (_, body) = plan.body_replacement(&corpus, docs[0], &replacements).unwrap();
        assert!(body.ends_with(
            "@@include('./partials/footer-scripts.html')</body>"
        ));
        assert!(!body.contains("js/app.js"));
        // The page-specific script survives in place.
        assert!(body.contains("js/home.js"));
    }

    #[test]
    fn pages_without_titles_get_an_unparameterized_include() {
        let (corpus, docs) = parse_pages(&[
            "<html><head></head><body>x</body></html>",
            "<html><head></head><body>y</body></html>",
        ]);
        let plan = AssetPlan::analyze(&corpus, &docs);
        assert!(plan.title_meta.contains("<title>{{ page_title }}</title>"));
        let (_, head) = plan.head_replacement(&corpus, docs[0]).unwrap();
        assert!(head.contains("@@include('./partials/title-meta.html')"));
        assert!(!head.contains("page_title\":"));
    }
}
