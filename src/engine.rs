//! Run orchestration: walk, parse, fingerprint, cluster, rewrite.
//!
//! Fingerprinting is embarrassingly parallel per candidate and runs across
//! the rayon pool; the LSH merge that follows is sequential, so the index
//! needs no synchronization. Everything downstream of the merge is cheap
//! relative to hashing and stays single-threaded.
//!
//! Output is written file by file with no rollback: a destination write
//! failure aborts the run and may leave partial output behind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use canonical::CanonicalForm;
use cluster::{build_clusters, select_fragments, verify_candidates, LshIndex};
use dom::{parse_file, serialize_document, serialize_node, Corpus, DocId, NodeId};
use fingerprint::{fingerprint_form, Fingerprint, FingerprintError};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::assets::{
    AssetPlan, FOOTER_SCRIPTS_PARTIAL, HEAD_CSS_PARTIAL, TITLE_META_PARTIAL,
};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::include::{include_statement, PARTIALS_DIR};

/// One extraction run over a source tree.
pub struct Engine {
    src_dir: PathBuf,
    dest_dir: PathBuf,
    config: EngineConfig,
}

/// Counters reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// `.html` files found under the source tree.
    pub documents_scanned: usize,
    pub documents_parsed: usize,
    pub documents_failed: usize,
    /// Subtrees large enough to fingerprint.
    pub candidates: usize,
    pub candidate_pairs: usize,
    pub verified_edges: usize,
    pub clusters: usize,
    pub partials_written: usize,
    /// Fragment occurrences replaced by an include directive, across all
    /// documents.
    pub occurrences_rewritten: usize,
}

impl Engine {
    pub fn new(
        src_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
        config: EngineConfig,
    ) -> Self {
        Self {
            src_dir: src_dir.into(),
            dest_dir: dest_dir.into(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute the full pipeline and write the rewritten tree.
    ///
    /// Zero discovered clusters is a successful run: every document is
    /// copied through re-serialized and the summary reports no extractions.
    pub fn run(&self) -> Result<RunSummary, EngineError> {
        self.config.validate()?;
        fs::metadata(&self.src_dir).map_err(|e| EngineError::io(&self.src_dir, e))?;

        let mut summary = RunSummary::default();

        let files = self.collect_html_files();
        summary.documents_scanned = files.len();

        let mut corpus = Corpus::new();
        let mut docs: Vec<DocId> = Vec::with_capacity(files.len());
        for path in &files {
            match parse_file(&mut corpus, path) {
                Ok(doc) => {
                    docs.push(doc);
                    summary.documents_parsed += 1;
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable document");
                    summary.documents_failed += 1;
                }
            }
        }
        info!(
            scanned = summary.documents_scanned,
            parsed = summary.documents_parsed,
            failed = summary.documents_failed,
            "corpus loaded"
        );

        let candidates = self.mine_candidates(&corpus, &docs);
        summary.candidates = candidates.len();

        let fingerprinted = self.fingerprint_candidates(&corpus, &candidates)?;

        let rows = self.config.num_perm / self.config.bands;
        let mut index = LshIndex::new(self.config.bands, rows, self.config.seed)?;
        let mut fingerprints: hashbrown::HashMap<NodeId, Fingerprint> = hashbrown::HashMap::new();
        let mut sizes: hashbrown::HashMap<NodeId, usize> = hashbrown::HashMap::new();
        let mut digests: hashbrown::HashMap<NodeId, String> = hashbrown::HashMap::new();
        for (id, form, fp) in fingerprinted {
            index.insert(id, &fp.minhash)?;
            sizes.insert(id, form.node_size);
            digests.insert(id, form.sha256_hex);
            fingerprints.insert(id, fp);
        }

        let pairs = index.candidate_pairs();
        summary.candidate_pairs = pairs.len();

        let edges = verify_candidates(
            &pairs,
            &fingerprints,
            &self.config.verifier_config(),
            self.config.use_parallel,
        )?;
        summary.verified_edges = edges.len();

        let clusters = build_clusters(&edges, &corpus, self.config.min_occurrences)?;
        summary.clusters = clusters.len();
        info!(
            candidates = summary.candidates,
            pairs = summary.candidate_pairs,
            edges = summary.verified_edges,
            clusters = summary.clusters,
            "similarity phase complete"
        );

        let plan = select_fragments(&clusters, &corpus, &sizes)?;
        self.warn_on_drift(&corpus, &plan.fragments, &digests);
        summary.occurrences_rewritten =
            plan.fragments.iter().map(|f| f.occurrences.len()).sum();

        summary.partials_written = self.write_output(&corpus, &docs, &plan.fragments)?;
        info!(partials = summary.partials_written, "run complete");
        Ok(summary)
    }

    /// All `.html` files under the source tree, sorted by path.
    fn collect_html_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.src_dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
            })
            .collect();
        files.sort();
        files
    }

    /// Element subtrees under each `<body>` that meet the size floor. The
    /// `<body>` element itself is never a candidate.
    fn mine_candidates(&self, corpus: &Corpus, docs: &[DocId]) -> Vec<NodeId> {
        let mut candidates = Vec::new();
        for &doc in docs {
            let Some(body) = corpus.body(doc) else {
                continue;
            };
            for id in corpus.descendants(body) {
                let Some(node) = corpus.get(id) else {
                    continue;
                };
                if node.is_element()
                    && corpus.subtree_size(id) >= self.config.min_fragment_nodes
                {
                    candidates.push(id);
                }
            }
        }
        candidates
    }

    /// Canonicalize and fingerprint every candidate, in parallel when
    /// configured. Candidates too shallow for the shingle window drop out
    /// here; any other failure is an internal fault.
    #[allow(clippy::type_complexity)]
    fn fingerprint_candidates(
        &self,
        corpus: &Corpus,
        candidates: &[NodeId],
    ) -> Result<Vec<(NodeId, CanonicalForm, Fingerprint)>, EngineError> {
        let canonical_cfg = self.config.canonical_config();
        let fp_cfg = self.config.fingerprint_config();

        let work = |&id: &NodeId| -> Result<Option<(NodeId, CanonicalForm, Fingerprint)>, EngineError> {
            let form = canonical::canonicalize(corpus, id, &canonical_cfg)?;
            match fingerprint_form(&form, &fp_cfg) {
                Ok(fp) => Ok(Some((id, form, fp))),
                Err(FingerprintError::NotEnoughStructure { .. }) => {
                    debug!(node = id.index(), "candidate too shallow to shingle");
                    Ok(None)
                }
                Err(err) => Err(EngineError::Internal(err.to_string())),
            }
        };

        let results: Result<Vec<_>, EngineError> = if self.config.use_parallel {
            candidates.par_iter().map(work).collect()
        } else {
            candidates.iter().map(work).collect()
        };
        Ok(results?.into_iter().flatten().collect())
    }

    /// Substitution is lossy when cluster members differ in non-volatile
    /// details; surface each drifting occurrence so the loss is visible.
    fn warn_on_drift(
        &self,
        corpus: &Corpus,
        fragments: &[cluster::Fragment],
        digests: &hashbrown::HashMap<NodeId, String>,
    ) {
        for fragment in fragments {
            let Some(rep_digest) = digests.get(&fragment.representative) else {
                continue;
            };
            for &member in &fragment.occurrences {
                if member == fragment.representative {
                    continue;
                }
                if digests.get(&member).is_some_and(|d| d != rep_digest) {
                    let doc = corpus.get(member).map(|n| n.doc);
                    let path = doc
                        .and_then(|d| corpus.document(d))
                        .map(|d| d.path.display().to_string())
                        .unwrap_or_default();
                    warn!(
                        partial = %fragment.partial_name,
                        occurrence = %path,
                        "occurrence differs from representative; substitution is lossy"
                    );
                }
            }
        }
    }

    /// Write partials and every rewritten document under the destination.
    /// With asset hoisting on, the three asset partials are written on every
    /// run and each page's `<head>` and `<body>` are rebuilt around their
    /// include directives.
    fn write_output(
        &self,
        corpus: &Corpus,
        docs: &[DocId],
        fragments: &[cluster::Fragment],
    ) -> Result<usize, EngineError> {
        fs::create_dir_all(&self.dest_dir).map_err(|e| EngineError::io(&self.dest_dir, e))?;

        let assets = (self.config.hoist_assets && !docs.is_empty())
            .then(|| AssetPlan::analyze(corpus, docs));

        let partials_dir = self.dest_dir.join(PARTIALS_DIR);
        if !fragments.is_empty() || assets.is_some() {
            fs::create_dir_all(&partials_dir).map_err(|e| EngineError::io(&partials_dir, e))?;
        }

        let mut replacements: HashMap<NodeId, String> = HashMap::new();
        for fragment in fragments {
            let path = partials_dir.join(&fragment.partial_name);
            let mut markup = serialize_node(corpus, fragment.representative);
            markup.push('\n');
            fs::write(&path, markup).map_err(|e| EngineError::io(&path, e))?;
            debug!(
                partial = %fragment.partial_name,
                occurrences = fragment.occurrences.len(),
                "partial written"
            );
            let directive = include_statement(&fragment.partial_name);
            for &occurrence in &fragment.occurrences {
                replacements.insert(occurrence, directive.clone());
            }
        }

        if let Some(plan) = &assets {
            for (name, content) in [
                (TITLE_META_PARTIAL, &plan.title_meta),
                (HEAD_CSS_PARTIAL, &plan.head_css),
                (FOOTER_SCRIPTS_PARTIAL, &plan.footer_scripts),
            ] {
                let path = partials_dir.join(name);
                fs::write(&path, format!("{content}\n"))
                    .map_err(|e| EngineError::io(&path, e))?;
            }
            for &script in &plan.dropped_scripts {
                replacements.insert(script, String::new());
            }
            // Body markup is built first so it sees the fragment directives
            // and dropped scripts; the head and body entries then shadow
            // everything beneath them.
            let mut page_level = Vec::new();
            for &doc in docs {
                if let Some(entry) = plan.body_replacement(corpus, doc, &replacements) {
                    page_level.push(entry);
                }
                if let Some(entry) = plan.head_replacement(corpus, doc) {
                    page_level.push(entry);
                }
            }
            replacements.extend(page_level);
        }

        for &doc in docs {
            let Some(document) = corpus.document(doc) else {
                continue;
            };
            let rel = self.relative_source_path(&document.path);
            let out_path = self.dest_dir.join(rel);
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| EngineError::io(parent, e))?;
            }
            let markup = serialize_document(corpus, doc, &replacements);
            fs::write(&out_path, markup).map_err(|e| EngineError::io(&out_path, e))?;
        }
        Ok(fragments.len())
    }

    fn relative_source_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.src_dir)
            .unwrap_or_else(|_| Path::new(path.file_name().unwrap_or(path.as_os_str())))
    }
}
