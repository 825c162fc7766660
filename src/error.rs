use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostics::{Violation, render};
use crate::models::{KeyPath, Kind};

/// A single violation found in a metainfo document.
///
/// Displays as `Invalid metainfo: <message>`; the text is stable and meant
/// to be shown to users verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct MetainfoError {
    path: KeyPath,
    violation: Violation,
}

impl MetainfoError {
    pub fn new(path: KeyPath, violation: Violation) -> Self {
        Self { path, violation }
    }

    /// Location of the violation. For missing keys this is the containing mapping.
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn violation(&self) -> &Violation {
        &self.violation
    }

    /// The message without the `Invalid metainfo: ` prefix
    pub fn message(&self) -> String {
        render(&self.path, &self.violation)
    }
}

impl fmt::Display for MetainfoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid metainfo: {}", self.message())
    }
}

impl std::error::Error for MetainfoError {}

/// Errors raised at the bencode boundary
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed bencode: {0}")]
    Malformed(#[source] serde_bencode::Error),

    #[error("top-level bencode value must be a dictionary, not {0}")]
    NotADict(Kind),

    #[error("cannot encode non-integral number {0} as bencode")]
    Float(f64),

    #[error("failed to encode bencode: {0}")]
    Encode(#[source] serde_bencode::Error),
}

/// Everything the library can fail with
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Metainfo(#[from] MetainfoError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a regular file: '{}'", .0.display())]
    NotAFile(PathBuf),

    #[error("no content to create torrent from: '{}'", .0.display())]
    EmptyContent(PathBuf),

    #[error("torrent has no local content path")]
    NoContent,

    #[error("failed to build hashing thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// The metainfo violation, if this is one
    pub fn as_metainfo(&self) -> Option<&MetainfoError> {
        match self {
            Error::Metainfo(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
