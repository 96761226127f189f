//! Embedding configuration: trait and env-based implementation.

use anyhow::Result;
use std::env;

/// Default OpenAI embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Embedding service configuration interface.
pub trait EmbeddingConfig: Send + Sync {
    /// When false, turns are stored without vectors and similarity retrieval is off.
    fn enabled(&self) -> bool;
    fn model(&self) -> &str;
    /// API key for the OpenAI-compatible embedding endpoint (OPENAI_API_KEY).
    fn openai_api_key(&self) -> &str;
    /// Optional base URL for OpenAI-compatible endpoints (OPENAI_BASE_URL).
    fn openai_base_url(&self) -> Option<&str>;
}

/// Embedding config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvEmbeddingConfig {
    pub embedding_enabled: bool,
    pub embedding_model: String,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
}

impl EmbeddingConfig for EnvEmbeddingConfig {
    fn enabled(&self) -> bool {
        self.embedding_enabled
    }
    fn model(&self) -> &str {
        &self.embedding_model
    }
    fn openai_api_key(&self) -> &str {
        &self.openai_api_key
    }
    fn openai_base_url(&self) -> Option<&str> {
        self.openai_base_url.as_deref().filter(|s| !s.is_empty())
    }
}

impl EnvEmbeddingConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let embedding_enabled = env::var("EMBEDDING_ENABLED")
            .ok()
            .map(|s| !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);
        let embedding_model = env::var("EMBEDDING_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
        let openai_api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        let openai_base_url = env::var("OPENAI_BASE_URL").ok().filter(|s| !s.trim().is_empty());
        Ok(Self {
            embedding_enabled,
            embedding_model,
            openai_api_key,
            openai_base_url,
        })
    }

    /// Validate config: an enabled provider needs an API key.
    pub fn validate(&self) -> Result<()> {
        if self.embedding_enabled && self.openai_api_key.is_empty() {
            anyhow::bail!(
                "EMBEDDING_ENABLED requires OPENAI_API_KEY to be set (or set EMBEDDING_ENABLED=false)"
            );
        }
        Ok(())
    }
}
