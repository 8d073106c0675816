//! Stage error types.

use sieve_store::StoreError;
use thiserror::Error;

/// Result type for stage operations.
pub type StageResult<T> = Result<T, StageError>;

/// Errors that can occur while processing one event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StageError {
    /// A fact store operation failed. The event was not applied.
    #[error("fact store operation failed: {0}")]
    Store(#[from] StoreError),
}
