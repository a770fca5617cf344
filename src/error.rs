//! Error type shared by the generator and the inspector.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GarbageError>;

#[derive(Debug, Error)]
pub enum GarbageError {
    /// Filesystem failure, tagged with the path being read or written
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),

    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// The file does not have the layout it was expected to have
    #[error("malformed fixture: {0}")]
    Malformed(String),

    #[error("verification failed: {0}")]
    Verification(String),

    #[error("a counting worker panicked")]
    Worker,
}

impl GarbageError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| GarbageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
