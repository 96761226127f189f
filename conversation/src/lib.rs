//! # Conversation
//!
//! Ties the memory engine, context selection, prompt composition and the LLM
//! client together for one question at a time:
//!
//! 1. retrieve similar and recent turns (fail-soft),
//! 2. gate and select them by the configured policy,
//! 3. compose the prompt and stream the model's answer,
//! 4. record the user turn, then the full agent turn.

mod driver;
mod error;

pub use driver::{ConversationDriver, DriverSettings, PreparedPrompt};
pub use error::ConversationError;
