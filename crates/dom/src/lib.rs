//! # dryad DOM layer
//!
//! Arena-backed DOM model for the dryad pipeline. Every parsed document
//! contributes its nodes to a single flat [`Corpus`] table; parent/child
//! relationships are integer indices, so there are no ownership cycles and
//! ancestor checks are cheap pointer-free walks.
//!
//! ## Contract
//!
//! - Node identifiers are unique across the whole corpus and stable for the
//!   lifetime of a run.
//! - Pre-order positions are assigned per document at parse time and never
//!   change afterwards; downstream stages rely on them for deterministic
//!   tie-breaking.
//! - The tree is read-only once parsed. Rewriting happens at serialization
//!   time through a replacement map, never by mutating the arena.

mod arena;
mod error;
mod parse;
mod serialize;

pub use crate::arena::{Corpus, DocId, Document, Node, NodeId, NodeKind};
pub use crate::error::ParseError;
pub use crate::parse::{parse_file, parse_str};
pub use crate::serialize::{
    serialize_document, serialize_node, serialize_node_with, serialize_start_tag,
};
