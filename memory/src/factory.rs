//! Builds the turn store and embedding service from configuration.

use std::sync::Arc;

use anyhow::Result;
use embedding::{EmbeddingConfig, EmbeddingService};
use memory_core::TurnStore;
use memory_inmemory::InMemoryTurnStore;
use memory_sqlite::SqliteTurnStore;
use openai_embedding::OpenAIEmbedding;
use tracing::{error, info, instrument};

use crate::config::MemoryConfig;
use crate::engine::MemoryEngine;

/// Creates the turn store named by `MEMORY_STORE_TYPE`.
#[instrument(skip(config), fields(store_type = %config.store_type()))]
pub async fn create_turn_store(config: &dyn MemoryConfig) -> Result<Arc<dyn TurnStore>> {
    let store: Arc<dyn TurnStore> = match config.store_type() {
        "sqlite" => {
            info!(db_path = %config.sqlite_path(), "Using SQLite turn store");
            Arc::new(SqliteTurnStore::new(config.sqlite_path()).await.map_err(|e| {
                error!(error = %e, "Failed to initialize SQLite turn store");
                anyhow::anyhow!("Failed to initialize SQLite turn store: {}", e)
            })?)
        }
        "memory" => {
            info!("Using in-memory turn store");
            Arc::new(InMemoryTurnStore::new())
        }
        other => anyhow::bail!("Unsupported MEMORY_STORE_TYPE: {}", other),
    };
    Ok(store)
}

/// Creates the embedding service, or `None` when embeddings are disabled.
pub fn create_embedding_service(
    config: &dyn EmbeddingConfig,
) -> Option<Arc<dyn EmbeddingService>> {
    if !config.enabled() {
        info!("Embeddings disabled; similarity retrieval unavailable");
        return None;
    }
    info!(model = %config.model(), "Using OpenAI embedding service");
    Some(Arc::new(OpenAIEmbedding::from_config(config)))
}

/// Store + embedding service + retrieval timeout, wired into an engine.
pub async fn create_memory_engine(
    memory_config: &dyn MemoryConfig,
    embedding_config: &dyn EmbeddingConfig,
) -> Result<MemoryEngine> {
    let store = create_turn_store(memory_config).await?;
    let embedder = create_embedding_service(embedding_config);
    Ok(MemoryEngine::new(store, embedder).with_retrieval_timeout(memory_config.retrieval_timeout()))
}
