//! Memory configuration: trait and env-based implementation.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use memory_strategies::{SelectionPolicy, DEFAULT_RELEVANCE_THRESHOLD};

/// Memory store, retrieval and selection configuration interface.
pub trait MemoryConfig: Send + Sync {
    /// `sqlite` or `memory`.
    fn store_type(&self) -> &str;
    fn sqlite_path(&self) -> &str;
    fn recent_limit(&self) -> usize;
    fn similar_limit(&self) -> usize;
    fn relevance_threshold(&self) -> f32;
    fn selection_policy(&self) -> SelectionPolicy;
    fn retrieval_timeout(&self) -> Duration;
    /// Instruction text placed before the context blocks in the composed prompt.
    fn prompt_preamble(&self) -> Option<&str>;
}

/// Memory config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvMemoryConfig {
    pub memory_store_type: String,
    pub memory_sqlite_path: String,
    pub memory_recent_limit: usize,
    pub memory_similar_limit: usize,
    pub memory_relevance_threshold: f32,
    pub memory_selection_policy: SelectionPolicy,
    pub memory_retrieval_timeout_secs: u64,
    pub memory_prompt_preamble: Option<String>,
}

impl MemoryConfig for EnvMemoryConfig {
    fn store_type(&self) -> &str {
        &self.memory_store_type
    }
    fn sqlite_path(&self) -> &str {
        &self.memory_sqlite_path
    }
    fn recent_limit(&self) -> usize {
        self.memory_recent_limit
    }
    fn similar_limit(&self) -> usize {
        self.memory_similar_limit
    }
    fn relevance_threshold(&self) -> f32 {
        self.memory_relevance_threshold
    }
    fn selection_policy(&self) -> SelectionPolicy {
        self.memory_selection_policy
    }
    fn retrieval_timeout(&self) -> Duration {
        Duration::from_secs(self.memory_retrieval_timeout_secs)
    }
    fn prompt_preamble(&self) -> Option<&str> {
        self.memory_prompt_preamble.as_deref()
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(s) if !s.trim().is_empty() => s
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {}", name, s)),
        _ => Ok(default),
    }
}

impl EnvMemoryConfig {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let memory_store_type = env::var("MEMORY_STORE_TYPE")
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|_| "sqlite".to_string());
        let memory_sqlite_path =
            env::var("MEMORY_SQLITE_PATH").unwrap_or_else(|_| "./data/memory.db".to_string());
        let memory_recent_limit = parse_var("MEMORY_RECENT_LIMIT", 5)?;
        let memory_similar_limit = parse_var("MEMORY_SIMILAR_LIMIT", 3)?;
        let memory_relevance_threshold =
            parse_var("MEMORY_RELEVANCE_THRESHOLD", DEFAULT_RELEVANCE_THRESHOLD)?;
        let memory_selection_policy =
            parse_var("MEMORY_SELECTION_POLICY", SelectionPolicy::default())?;
        let memory_retrieval_timeout_secs = parse_var("MEMORY_RETRIEVAL_TIMEOUT_SECS", 10)?;
        let memory_prompt_preamble = env::var("MEMORY_PROMPT_PREAMBLE")
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Self {
            memory_store_type,
            memory_sqlite_path,
            memory_recent_limit,
            memory_similar_limit,
            memory_relevance_threshold,
            memory_selection_policy,
            memory_retrieval_timeout_secs,
            memory_prompt_preamble,
        })
    }

    /// Validate config: known store type, usable threshold and timeout.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.memory_store_type.as_str(), "sqlite" | "memory") {
            anyhow::bail!(
                "MEMORY_STORE_TYPE must be sqlite or memory, got {}",
                self.memory_store_type
            );
        }
        if !self.memory_relevance_threshold.is_finite() || self.memory_relevance_threshold < 0.0 {
            anyhow::bail!(
                "MEMORY_RELEVANCE_THRESHOLD must be a non-negative number, got {}",
                self.memory_relevance_threshold
            );
        }
        if self.memory_retrieval_timeout_secs == 0 {
            anyhow::bail!("MEMORY_RETRIEVAL_TIMEOUT_SECS must be greater than 0");
        }
        Ok(())
    }
}
