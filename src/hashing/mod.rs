pub(crate) mod io;
mod pieces;

pub use pieces::{hash_pieces, piece_digests};

use indicatif::ProgressBar;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub type Digest = [u8; crate::config::DIGEST_LEN];

/// Cooperative cancellation shared between a caller and running hash work.
///
/// Checked before each piece is hashed; a cancelled run returns
/// [`crate::Error::Cancelled`] and leaves the document untouched.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Knobs for the piece-hash engine
#[derive(Clone, Default)]
pub struct HashOptions {
    /// Worker threads; defaults to the number of CPU cores
    pub threads: Option<usize>,
    pub progress: Option<ProgressBar>,
    pub cancel: Option<CancelToken>,
}

impl HashOptions {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}
