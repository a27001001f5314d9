//! Append-only comment store for eConsult.
//!
//! Comments are validated before they reach the log, written to an optional
//! JSON-lines journal, and folded into an incrementally maintained
//! [`Tally`](econsult_analysis::Tally) under the same write lock. The tally is
//! a cache: opening a journal replays it, and [`CommentStore::rebuild_cache`]
//! recomputes it from the log.

mod filter;
mod journal;
mod store;

pub use filter::{CommentFilter, CommentSnapshot, SnapshotIter};
pub use store::CommentStore;

use econsult_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("comment store is unavailable")]
    Unavailable,

    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt journal entry at line {line}: {source}")]
    Journal {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("journal entry at line {line} is not a valid comment: {source}")]
    InvalidEntry {
        line: usize,
        #[source]
        source: ValidationError,
    },

    #[error("journal entry at line {line} has id {found}, expected {expected}")]
    OutOfOrder {
        line: usize,
        expected: u64,
        found: u64,
    },

    #[error("failed to encode comment: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    /// Whether the caller sent bad input, as opposed to the store failing.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}
