//! Conversation error types.

use memory_core::MemoryError;
use thiserror::Error;

/// Failures that end an exchange. Retrieval problems never get here; they degrade.
#[derive(Error, Debug)]
pub enum ConversationError {
    /// The model stream failed; nothing was persisted.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The answer streamed but a turn could not be recorded.
    #[error("Failed to persist turn: {0}")]
    Persist(#[from] MemoryError),
}
