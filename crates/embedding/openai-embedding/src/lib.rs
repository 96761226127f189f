//! # OpenAI Embedding Service
//!
//! Implements [`EmbeddingService`] on top of the OpenAI embeddings API via `async-openai`.
//! Any OpenAI-compatible endpoint works when a base URL is configured.
//!
//! ```rust,no_run
//! use embedding::EmbeddingService;
//! use openai_embedding::OpenAIEmbedding;
//!
//! async fn example() -> Result<(), anyhow::Error> {
//!     let service = OpenAIEmbedding::new("sk-...".to_string(), "text-embedding-3-small".to_string());
//!     let vector = service.embed("Average price of a flat in Leeds").await?;
//!     println!("dimension: {}", vector.len());
//!     Ok(())
//! }
//! ```
//!
//! Requests time out after 30 s (single) or 60 s (batch); a timeout is an error,
//! never an empty vector.

use std::time::Duration;

use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use embedding::{EmbeddingConfig, EmbeddingService, DEFAULT_EMBEDDING_MODEL};
use tracing::{debug, info, instrument, warn};

const EMBED_TIMEOUT: Duration = Duration::from_secs(30);
const EMBED_BATCH_TIMEOUT: Duration = Duration::from_secs(60);
const LOG_PREVIEW_LEN: usize = 200;

/// OpenAI embedding service. Holds the async-openai client and model name.
#[derive(Debug, Clone)]
pub struct OpenAIEmbedding {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIEmbedding {
    /// Creates a service for the default OpenAI endpoint.
    ///
    /// An empty `api_key` falls back to the OPENAI_API_KEY environment variable.
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_base_url(api_key, model, None)
    }

    /// Creates a service that sends requests to `base_url` when given.
    pub fn new_with_base_url(api_key: String, model: String, base_url: Option<&str>) -> Self {
        let api_key = if api_key.is_empty() {
            std::env::var("OPENAI_API_KEY").unwrap_or_default()
        } else {
            api_key
        };

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(url) = base_url.filter(|s| !s.is_empty()) {
            openai_config = openai_config.with_api_base(url);
        }

        Self {
            client: Client::with_config(openai_config),
            model,
        }
    }

    /// Builds the service from an [`EmbeddingConfig`].
    pub fn from_config(config: &dyn EmbeddingConfig) -> Self {
        let model = if config.model().is_empty() {
            DEFAULT_EMBEDDING_MODEL.to_string()
        } else {
            config.model().to_string()
        };
        Self::new_with_base_url(
            config.openai_api_key().to_string(),
            model,
            config.openai_base_url(),
        )
    }

    /// Returns the embedding model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Char-boundary-safe preview of `text` for logs.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl EmbeddingService for OpenAIEmbedding {
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        info!(
            text_preview = %preview(text, LOG_PREVIEW_LEN),
            "step: embedding OpenAI embed request"
        );

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(vec![text])
            .build()?;

        let embeddings = self.client.embeddings();
        let response = match tokio::time::timeout(EMBED_TIMEOUT, embeddings.create(request)).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => {
                warn!(error = %e, "OpenAI embed request failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(timeout_secs = EMBED_TIMEOUT.as_secs(), "OpenAI embed request timed out");
                anyhow::bail!(
                    "OpenAI embed request timed out after {} seconds",
                    EMBED_TIMEOUT.as_secs()
                );
            }
        };

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| {
                warn!("OpenAI embed response has no embedding data");
                anyhow::anyhow!("No embedding in response")
            })?;

        if embedding.is_empty() {
            anyhow::bail!("OpenAI returned an empty embedding");
        }

        debug!(dimension = embedding.len(), "step: embedding OpenAI embed done");
        Ok(embedding)
    }

    #[instrument(skip(self, texts), fields(model = %self.model, batch_size = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, anyhow::Error> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let inputs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(inputs)
            .build()?;

        let embeddings = self.client.embeddings();
        let response =
            match tokio::time::timeout(EMBED_BATCH_TIMEOUT, embeddings.create(request)).await {
                Ok(Ok(r)) => r,
                Ok(Err(e)) => {
                    warn!(error = %e, "OpenAI embed_batch request failed");
                    return Err(e.into());
                }
                Err(_) => {
                    warn!(
                        timeout_secs = EMBED_BATCH_TIMEOUT.as_secs(),
                        "OpenAI embed_batch request timed out"
                    );
                    anyhow::bail!(
                        "OpenAI embed_batch request timed out after {} seconds",
                        EMBED_BATCH_TIMEOUT.as_secs()
                    );
                }
            };

        // The API reports an index per item; order by it rather than trusting response order.
        let mut data = response.data;
        data.sort_by_key(|item| item.index);
        let vectors: Vec<Vec<f32>> = data.into_iter().map(|item| item.embedding).collect();

        if vectors.len() != texts.len() {
            warn!(
                expected = texts.len(),
                got = vectors.len(),
                "OpenAI embed_batch response count mismatch"
            );
            anyhow::bail!("Expected {} embeddings, got {}", texts.len(), vectors.len());
        }

        info!(count = vectors.len(), "step: embedding OpenAI embed_batch done");
        Ok(vectors)
    }
}
