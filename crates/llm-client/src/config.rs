//! LLM configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;

/// Chat model used when `MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// LLM configuration interface for OpenAI-compatible APIs.
pub trait LlmConfig: Send + Sync {
    fn api_key(&self) -> &str;
    fn base_url(&self) -> Option<&str>;
    fn model(&self) -> &str;
    fn system_prompt(&self) -> Option<&str>;
}

/// LLM config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLlmConfig {
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub llm_model: String,
    pub llm_system_prompt: Option<String>,
}

impl LlmConfig for EnvLlmConfig {
    fn api_key(&self) -> &str {
        &self.openai_api_key
    }
    fn base_url(&self) -> Option<&str> {
        self.openai_base_url.as_deref()
    }
    fn model(&self) -> &str {
        &self.llm_model
    }
    fn system_prompt(&self) -> Option<&str> {
        self.llm_system_prompt.as_deref()
    }
}

impl EnvLlmConfig {
    /// Load from environment variables. `OPENAI_API_KEY` is required.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .context("OPENAI_API_KEY not set")?;
        let openai_base_url = env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let llm_model = env::var("MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let llm_system_prompt = env::var("LLM_SYSTEM_PROMPT")
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Self {
            openai_api_key,
            openai_base_url,
            llm_model,
            llm_system_prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for v in ["OPENAI_API_KEY", "OPENAI_BASE_URL", "MODEL", "LLM_SYSTEM_PROMPT"] {
            env::remove_var(v);
        }
    }

    #[test]
    #[serial]
    fn test_missing_api_key_is_error() {
        clear_env();
        let err = EnvLlmConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        env::set_var("OPENAI_API_KEY", "sk-test");
        let config = EnvLlmConfig::from_env().unwrap();
        assert_eq!(config.api_key(), "sk-test");
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert!(config.base_url().is_none());
        assert!(config.system_prompt().is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_custom_values() {
        clear_env();
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("OPENAI_BASE_URL", "http://localhost:11434/v1");
        env::set_var("MODEL", "gpt-4o");
        env::set_var("LLM_SYSTEM_PROMPT", "You analyse house prices.");
        let config = EnvLlmConfig::from_env().unwrap();
        assert_eq!(config.base_url(), Some("http://localhost:11434/v1"));
        assert_eq!(config.model(), "gpt-4o");
        assert_eq!(config.system_prompt(), Some("You analyse house prices."));
        clear_env();
    }
}
