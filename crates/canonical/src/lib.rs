//! # dryad canonicalization
//!
//! Normalizes a DOM subtree into a [`CanonicalForm`] so that cosmetic
//! variance never affects structural comparison. Canonicalization is a pure
//! function of `(subtree, config)`: no I/O, no clocks, no global state.
//!
//! ## Policy
//!
//! - Attributes whose names appear in the configured volatile set (default
//!   `class` and `id`) are removed entirely.
//! - Remaining attributes are sorted by name, so source attribute order does
//!   not influence the form.
//! - Whitespace-only text nodes are dropped; whitespace inside kept text is
//!   collapsed to single spaces.
//! - Tag names and child order are preserved.
//!
//! Invariant: two subtrees that differ only in volatile-attribute values
//! produce byte-identical canonical forms, and therefore identical digests.
//!
//! Downstream fingerprinting consumes the form's derived views: the
//! root-to-leaf tag paths (shingling) and the pre-order tag atoms (SimHash).

mod canonicalize;
mod config;
mod error;
mod form;
mod hash;

pub use crate::canonicalize::canonicalize;
pub use crate::config::CanonicalConfig;
pub use crate::error::CanonicalError;
pub use crate::form::{CanonicalForm, TagAtom};
pub use crate::hash::hash_form_bytes;

/// Current canonicalization algorithm version for this crate.
pub const CANONICAL_VERSION: u32 = 1;
