//! Error types for the pulsewatch state store.

use thiserror::Error;

/// Result type alias for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while restoring or flushing the snapshot.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read snapshot: {0}")]
    Read(String),

    #[error("failed to write snapshot: {0}")]
    Write(String),

    #[error("failed to encode snapshot: {0}")]
    Encode(String),

    #[error("failed to decode snapshot: {0}")]
    Decode(String),
}
