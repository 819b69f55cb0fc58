use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading an input document.
///
/// These are per-file conditions: the engine reports them and continues with
/// the remaining corpus. The HTML parser itself is error-tolerant and always
/// produces a tree, so only the read can fail.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
