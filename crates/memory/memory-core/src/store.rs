//! # Turn Storage
//!
//! The `TurnStore` trait is implemented by storage backends (in-memory, SQLite).
//! The log is append-only: there is no update or delete.

use async_trait::async_trait;

use crate::error::MemoryError;
use crate::types::{NewTurn, ScoredTurn, Turn};

/// Append-only, queryable log of conversational turns.
#[async_trait]
pub trait TurnStore: Send + Sync {
    /// Appends a turn. The store assigns `seq` and a non-decreasing `created_at`.
    async fn insert(&self, turn: NewTurn) -> Result<Turn, MemoryError>;

    /// Returns up to `limit` turns, newest first (`created_at` desc, then `seq` desc).
    async fn query_recent(&self, limit: usize) -> Result<Vec<Turn>, MemoryError>;

    /// Returns up to `limit` turns nearest to `query_embedding` by L2 distance, nearest first.
    async fn query_nearest(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredTurn>, MemoryError>;

    /// Number of stored turns.
    async fn count(&self) -> Result<usize, MemoryError>;

    /// Releases pooled resources. Called once at shutdown.
    async fn close(&self) {}
}
