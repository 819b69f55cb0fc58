use thiserror::Error;

/// Errors returned by the canonicalizer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("invalid canonical config: {0}")]
    InvalidConfig(String),

    #[error("node {index} does not exist in the corpus")]
    MissingNode { index: usize },

    #[error("node {index} is a text node; only elements can be canonicalized")]
    NotAnElement { index: usize },
}
