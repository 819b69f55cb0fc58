use thiserror::Error;

/// Errors raised by the clustering layer.
///
/// `MissingNode` and `SignatureLength` indicate broken invariants between
/// pipeline stages rather than user mistakes; the engine reports them as
/// internal faults, distinct from configuration or I/O errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("invalid LSH shape: bands={bands}, rows={rows}; both must be >= 1")]
    InvalidLshShape { bands: usize, rows: usize },

    #[error("invalid verifier config: {0}")]
    InvalidConfig(String),

    #[error("signature length {got} does not match index shape {expected}")]
    SignatureLength { expected: usize, got: usize },

    #[error("node {index} referenced by clustering is not resolvable")]
    MissingNode { index: usize },
}
