//! Server configuration: base settings plus the memory and embedding concerns.
//! Loaded from env; the LLM config is loaded separately because only `serve` needs it.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use embedding::EnvEmbeddingConfig;
use memory::EnvMemoryConfig;

/// Bind address, logging and dataset location.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BIND_ADDR
    pub bind_addr: String,
    /// Log file path
    pub log_file: String,
    /// SQLite file holding the property_prices table
    pub dataset_path: String,
}

impl BaseConfig {
    pub fn load() -> Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/property-chat.log".to_string());
        let dataset_path =
            env::var("DATASET_PATH").unwrap_or_else(|_| "./data/uk_data.db".to_string());
        Ok(Self {
            bind_addr,
            log_file,
            dataset_path,
        })
    }

    /// Parsed bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("BIND_ADDR is not a valid socket address: {}", self.bind_addr))
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.dataset_path.trim().is_empty() {
            anyhow::bail!("DATASET_PATH must not be empty");
        }
        Ok(())
    }
}

/// Everything the binary needs apart from the LLM credentials.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base: BaseConfig,
    pub memory: EnvMemoryConfig,
    pub embedding: EnvEmbeddingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Ok(Self {
            base: BaseConfig::load()?,
            memory: EnvMemoryConfig::from_env()?,
            embedding: EnvEmbeddingConfig::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.memory.validate()?;
        self.embedding.validate()?;
        Ok(())
    }

    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }

    pub fn dataset_path(&self) -> &str {
        &self.base.dataset_path
    }
}
