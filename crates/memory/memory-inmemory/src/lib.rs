//! # In-Memory Turn Store
//!
//! This crate provides an in-memory implementation of the `TurnStore` trait from `memory-core`.
//!
//! ## InMemoryTurnStore
//!
//! Simple in-memory storage for tests, development and `MEMORY_STORE_TYPE=memory`.
//!
//! **Advantages**:
//! - No I/O
//! - Simple to set up and use
//!
//! **Limitations**:
//! - Data is lost on restart
//! - Limited by available memory
//!
//! ## Example
//!
//! ```rust
//! use memory_inmemory::InMemoryTurnStore;
//! use memory_core::{NewTurn, TurnRole, TurnStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), memory_core::MemoryError> {
//!     let store = InMemoryTurnStore::new();
//!     store.insert(NewTurn::new(TurnRole::User, "Hello world")).await?;
//!     assert_eq!(store.count().await?, 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Thread Safety
//!
//! The log sits behind `Arc<RwLock<>>`; inserts take the write lock, so `seq`
//! and `created_at` are assigned atomically per turn.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use memory_core::{rank_nearest, MemoryError, NewTurn, ScoredTurn, Turn, TurnStore};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Log {
    turns: Vec<Turn>,
    last_created_at: Option<DateTime<Utc>>,
}

/// In-memory, append-only turn store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTurnStore {
    log: Arc<RwLock<Log>>,
}

impl InMemoryTurnStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of turns in the store.
    pub async fn len(&self) -> usize {
        self.log.read().await.turns.len()
    }

    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl TurnStore for InMemoryTurnStore {
    async fn insert(&self, turn: NewTurn) -> Result<Turn, MemoryError> {
        let mut log = self.log.write().await;

        // Clamp so created_at never goes backwards, even if the wall clock does.
        let now = Utc::now();
        let created_at = match log.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        let seq = i64::try_from(log.turns.len() + 1).unwrap_or(i64::MAX);

        let stored = Turn {
            id: Uuid::new_v4(),
            seq,
            role: turn.role,
            content: turn.content,
            embedding: turn.embedding,
            created_at,
        };
        log.last_created_at = Some(created_at);
        log.turns.push(stored.clone());

        debug!(
            seq,
            role = %stored.role,
            has_embedding = stored.embedding.is_some(),
            "In-memory turn store insert"
        );
        Ok(stored)
    }

    async fn query_recent(&self, limit: usize) -> Result<Vec<Turn>, MemoryError> {
        let log = self.log.read().await;
        // Insertion order already matches (created_at, seq) ascending.
        let results: Vec<Turn> = log.turns.iter().rev().take(limit).cloned().collect();
        debug!(limit, count = results.len(), "In-memory turn store query_recent");
        Ok(results)
    }

    async fn query_nearest(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredTurn>, MemoryError> {
        let log = self.log.read().await;
        let results = rank_nearest(query_embedding, &log.turns, limit);
        debug!(
            dimension = query_embedding.len(),
            limit,
            scanned = log.turns.len(),
            count = results.len(),
            "In-memory turn store query_nearest"
        );
        Ok(results)
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.len().await)
    }
}
