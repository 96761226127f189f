//! # Text Embeddings
//!
//! This crate defines the embedding service interface used by the memory engine.
//! Implementations must fail loudly: an error is returned instead of a zero vector,
//! so callers decide their own fail-soft policy.

use async_trait::async_trait;

mod config;
pub use config::{EmbeddingConfig, EnvEmbeddingConfig, DEFAULT_EMBEDDING_MODEL};

/// Service for generating text embeddings.
///
/// Every call within one deployment returns vectors of the same dimension.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generates an embedding vector for a single text string.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error>;

    /// Generates embedding vectors for several texts, in input order.
    ///
    /// The default implementation calls [`embed`](Self::embed) once per text.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}
