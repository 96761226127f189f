//! Memory error types.
//!
//! Used by turn stores, the memory engine and callers that want to tell a
//! degraded retrieval apart from an empty one.

use thiserror::Error;

/// Errors that can occur while persisting or retrieving turns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MemoryError {
    /// Embedding provider unreachable or returned a malformed response.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Turn store unreachable or the query failed.
    #[error("Store error: {0}")]
    Store(String),

    /// A stored row could not be decoded into a turn.
    #[error("Format error: {0}")]
    Format(String),

    /// Role literal outside {user, agent}.
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// A store or embedding call did not finish in time.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl MemoryError {
    /// Builds a `Store` error from any displayable source.
    pub fn store(err: impl std::fmt::Display) -> Self {
        MemoryError::Store(err.to_string())
    }

    /// Builds a `Format` error from any displayable source.
    pub fn format(err: impl std::fmt::Display) -> Self {
        MemoryError::Format(err.to_string())
    }
}
