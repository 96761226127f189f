//! # SQLite Turn Store
//!
//! This crate provides an SQLite-based implementation of the `TurnStore` trait.
//!
//! **Advantages**:
//! - Persistent storage (turns survive restarts)
//! - No external database required
//!
//! **Limitations**:
//! - Similarity search is a full scan with exact L2 distance computed in process
//!
//! ## Example
//!
//! ```rust,no_run
//! use memory_sqlite::SqliteTurnStore;
//! use memory_core::{NewTurn, TurnRole, TurnStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), memory_core::MemoryError> {
//!     let store = SqliteTurnStore::new("memory.db").await?;
//!     store.insert(NewTurn::new(TurnRole::User, "It's a flat in Leeds")).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE conversation_memory (
//!     seq INTEGER PRIMARY KEY AUTOINCREMENT,
//!     id TEXT NOT NULL UNIQUE,
//!     role TEXT NOT NULL,
//!     content TEXT NOT NULL,
//!     embedding BLOB,
//!     created_at INTEGER NOT NULL
//! );
//! ```
//!
//! `created_at` holds microseconds since the Unix epoch. Every value reaches
//! SQLite through bind parameters; content is never spliced into SQL text.

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use memory_core::{rank_nearest, MemoryError, NewTurn, ScoredTurn, Turn, TurnRole, TurnStore};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// SQLite-backed, append-only turn store.
#[derive(Clone)]
pub struct SqliteTurnStore {
    pool: SqlitePool,
}

impl SqliteTurnStore {
    /// Opens (or creates) the database file at `path` and initializes the schema.
    ///
    /// Missing parent directories are created.
    pub async fn new(path: &str) -> Result<Self, MemoryError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(MemoryError::store)?;
            }
        }

        info!(path = %path, "Opening SQLite turn store");
        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(path);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(MemoryError::store)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    /// Opens a private in-memory database. Useful for tests.
    ///
    /// A single pooled connection keeps every query on the same database.
    pub async fn in_memory() -> Result<Self, MemoryError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(MemoryError::store)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(MemoryError::store)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), MemoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_memory (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(MemoryError::store)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversation_memory_created_at \
             ON conversation_memory(created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(MemoryError::store)?;

        Ok(())
    }

    /// Converts a database row to a Turn.
    ///
    /// Embeddings are stored little-endian, 4 bytes per float; a blob whose
    /// length is not a multiple of 4 is a format error.
    fn row_to_turn(row: &SqliteRow) -> Result<Turn, MemoryError> {
        let seq: i64 = row.try_get("seq").map_err(MemoryError::format)?;
        let id: String = row.try_get("id").map_err(MemoryError::format)?;
        let role: String = row.try_get("role").map_err(MemoryError::format)?;
        let content: String = row.try_get("content").map_err(MemoryError::format)?;
        let embedding_blob: Option<Vec<u8>> =
            row.try_get("embedding").map_err(MemoryError::format)?;
        let created_at: i64 = row.try_get("created_at").map_err(MemoryError::format)?;

        let id = Uuid::from_str(&id).map_err(MemoryError::format)?;
        let role = TurnRole::from_str(&role)
            .map_err(|_| MemoryError::Format(format!("unknown role '{}' at seq {}", role, seq)))?;
        let embedding = embedding_blob.map(|blob| decode_embedding(&blob)).transpose()?;
        let created_at = micros_to_datetime(created_at)?;

        Ok(Turn {
            id,
            seq,
            role,
            content,
            embedding,
            created_at,
        })
    }

    /// Releases the pool's connections.
    pub async fn close_pool(&self) {
        self.pool.close().await;
    }
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>, MemoryError> {
    if blob.len() % 4 != 0 {
        return Err(MemoryError::Format(format!(
            "embedding blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

fn micros_to_datetime(micros: i64) -> Result<DateTime<Utc>, MemoryError> {
    Utc.timestamp_micros(micros)
        .single()
        .ok_or_else(|| MemoryError::Format(format!("invalid created_at {}", micros)))
}

#[async_trait::async_trait]
impl TurnStore for SqliteTurnStore {
    /// Appends a turn in one statement inside its own transaction.
    ///
    /// `created_at` is `max(now, newest stored created_at)` so it never
    /// decreases; `seq` comes from AUTOINCREMENT. The turn is committed before
    /// this returns, so every pooled connection sees it.
    #[instrument(skip(self, turn), fields(role = %turn.role, content_len = turn.content.len()))]
    async fn insert(&self, turn: NewTurn) -> Result<Turn, MemoryError> {
        let id = Uuid::new_v4();
        let now = Utc::now().timestamp_micros();
        let embedding_blob = turn.embedding.as_deref().map(encode_embedding);

        let mut tx = self.pool.begin().await.map_err(MemoryError::store)?;
        let rows = sqlx::query(
            r#"
            INSERT INTO conversation_memory (id, role, content, embedding, created_at)
            VALUES (?1, ?2, ?3, ?4,
                MAX(?5, COALESCE((SELECT MAX(created_at) FROM conversation_memory), 0)))
            RETURNING seq, created_at
            "#,
        )
        .bind(id.to_string())
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(embedding_blob)
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(MemoryError::store)?;
        tx.commit().await.map_err(MemoryError::store)?;

        let row = rows
            .first()
            .ok_or_else(|| MemoryError::Store("INSERT returned no row".to_string()))?;

        let seq: i64 = row.try_get("seq").map_err(MemoryError::format)?;
        let created_at: i64 = row.try_get("created_at").map_err(MemoryError::format)?;

        debug!(seq, has_embedding = turn.embedding.is_some(), "SQLite turn store insert");

        Ok(Turn {
            id,
            seq,
            role: turn.role,
            content: turn.content,
            embedding: turn.embedding,
            created_at: micros_to_datetime(created_at)?,
        })
    }

    async fn query_recent(&self, limit: usize) -> Result<Vec<Turn>, MemoryError> {
        let rows = sqlx::query(
            r#"
            SELECT seq, id, role, content, embedding, created_at
            FROM conversation_memory
            ORDER BY created_at DESC, seq DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(MemoryError::store)?;

        let turns = rows
            .iter()
            .map(Self::row_to_turn)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(limit, count = turns.len(), "SQLite turn store query_recent");
        Ok(turns)
    }

    /// Full scan over every stored embedding; distances are computed in process.
    async fn query_nearest(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredTurn>, MemoryError> {
        let rows = sqlx::query(
            r#"
            SELECT seq, id, role, content, embedding, created_at
            FROM conversation_memory
            WHERE embedding IS NOT NULL
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(MemoryError::store)?;

        let turns = rows
            .iter()
            .map(Self::row_to_turn)
            .collect::<Result<Vec<_>, _>>()?;
        let results = rank_nearest(query_embedding, &turns, limit);

        debug!(
            dimension = query_embedding.len(),
            limit,
            scanned = turns.len(),
            count = results.len(),
            "SQLite turn store query_nearest"
        );
        Ok(results)
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversation_memory")
            .fetch_one(&self.pool)
            .await
            .map_err(MemoryError::store)?;
        Ok(count as usize)
    }

    async fn close(&self) {
        info!("Closing SQLite turn store");
        self.close_pool().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_blob_round_trip() {
        let v = vec![0.5_f32, -1.25, 3.0];
        assert_eq!(decode_embedding(&encode_embedding(&v)).unwrap(), v);
    }

    #[test]
    fn test_decode_embedding_rejects_truncated_blob() {
        let err = decode_embedding(&[0, 0, 128]).unwrap_err();
        assert!(matches!(err, MemoryError::Format(_)));
    }

    #[tokio::test]
    async fn test_unknown_role_is_format_error() {
        let store = SqliteTurnStore::in_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO conversation_memory (id, role, content, created_at) VALUES (?1, 'system', 'x', 1)",
        )
        .bind(Uuid::new_v4().to_string())
        .execute(&store.pool)
        .await
        .unwrap();

        let err = store.query_recent(5).await.unwrap_err();
        assert!(matches!(err, MemoryError::Format(_)));
    }

    #[tokio::test]
    async fn test_closed_pool_reports_store_error() {
        let store = SqliteTurnStore::in_memory().await.unwrap();
        store.close().await;
        let err = store.query_recent(1).await.unwrap_err();
        assert!(matches!(err, MemoryError::Store(_)));
    }
}
