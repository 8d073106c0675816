//! Fact store error types.

use thiserror::Error;

/// Result type for fact store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during fact store operations.
///
/// A store failure is fatal for the event being processed: the stages do
/// not retry or partially apply, they propagate the error to the runtime,
/// which owns the retry and recovery policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// I/O error during a store operation.
    #[error("I/O error: {operation}: {message}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// Error message.
        message: String,
    },

    /// A store operation timed out.
    #[error("timeout: {operation} after {waited_ms}ms")]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
        /// How long the caller waited, in milliseconds.
        waited_ms: u64,
    },
}
