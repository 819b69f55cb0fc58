use std::path::PathBuf;

use thiserror::Error;

/// Engine-level failures.
///
/// `Config` and `Io` are user-facing: bad parameters or an unusable
/// filesystem. `Internal` covers broken invariants between pipeline stages
/// (an unresolvable node id, a signature of the wrong shape) and is kept
/// separate so callers never mistake a bug for a usage error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("i/o failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("internal pipeline error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<cluster::ClusterError> for EngineError {
    fn from(err: cluster::ClusterError) -> Self {
        // Threshold errors are caught by EngineConfig::validate before any
        // processing; anything surfacing here is a stage-invariant breach.
        EngineError::Internal(err.to_string())
    }
}

impl From<canonical::CanonicalError> for EngineError {
    fn from(err: canonical::CanonicalError) -> Self {
        EngineError::Internal(err.to_string())
    }
}
