//! # dryad
//!
//! Finds structurally repeated fragments (navs, headers, footers, card
//! grids) across a tree of HTML files, extracts one representative copy of
//! each into a partial file, and rewrites every occurrence as an
//! `@@include('./partials/...')` directive.
//!
//! The pipeline, front to back:
//!
//! 1. [`dom`] parses every `.html` file into one shared node arena.
//! 2. [`canonical`] normalizes candidate subtrees so cosmetic differences
//!    (volatile attributes, whitespace, attribute order) vanish.
//! 3. [`fingerprint`] sketches each canonical form as a MinHash signature
//!    and a SimHash fingerprint.
//! 4. [`cluster`] buckets signatures with banded LSH, verifies candidate
//!    pairs, merges verified edges into clusters, and greedily selects a
//!    non-overlapping extraction plan.
//! 5. [`Engine`] orchestrates the run and writes the rewritten tree. Along
//!    the way it hoists head assets and footer scripts shared by every page
//!    into `title-meta.html`, `head-css.html`, and `footer-scripts.html`.
//!
//! For a fixed seed the whole run is deterministic: identical input trees
//! produce byte-identical output, whether or not parallelism is enabled.
//!
//! ```no_run
//! use dryad::{Engine, EngineConfig};
//!
//! let engine = Engine::new("site/", "out/", EngineConfig::default());
//! let summary = engine.run()?;
//! println!("extracted {} partials", summary.partials_written);
//! # Ok::<(), dryad::EngineError>(())
//! ```

mod assets;
mod config;
mod engine;
mod error;
mod include;

pub use crate::config::{EngineConfig, DEFAULT_SEED};
pub use crate::engine::{Engine, RunSummary};
pub use crate::error::EngineError;
pub use crate::include::{include_statement, include_statement_with, PARTIALS_DIR};
