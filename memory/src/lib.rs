//! # Memory
//!
//! The conversation memory engine. Every turn is appended to a [`TurnStore`]
//! (optionally with an embedding) and later retrieved two ways:
//!
//! - by recency: the newest turns, returned oldest first;
//! - by similarity: exact L2 nearest neighbours of the query embedding.
//!
//! Retrieval is fail-soft: store and embedding failures produce a degraded,
//! empty [`Retrieval`] instead of an error, so a broken memory never blocks an answer.
//!
//! ```rust
//! use std::sync::Arc;
//! use memory::{MemoryEngine, TurnRole};
//! use memory_inmemory::InMemoryTurnStore;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let engine = MemoryEngine::new(Arc::new(InMemoryTurnStore::new()), None);
//! engine.record(TurnRole::User, "How much is a flat in Leeds?").await.unwrap();
//! let recent = engine.recent_turns(5).await;
//! assert_eq!(recent.items(), ["How much is a flat in Leeds?".to_string()]);
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - MemoryEngine (record / recent_turns / similar_turns / build_context)
//! - [`config`] - MemoryConfig trait and EnvMemoryConfig
//! - [`factory`] - store / embedding / engine construction from config

pub mod config;
pub mod engine;
pub mod factory;

pub use config::{EnvMemoryConfig, MemoryConfig};
pub use engine::{MemoryEngine, DEFAULT_RETRIEVAL_TIMEOUT};
pub use factory::{create_embedding_service, create_memory_engine, create_turn_store};
pub use memory_core::{
    ContextBundle, MemoryError, Retrieval, ScoredTurn, Turn, TurnRole, TurnStore,
};
