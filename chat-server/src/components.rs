//! Wires config into the running components: memory engine, dataset, LLM client, driver.

use std::sync::Arc;

use anyhow::{Context, Result};
use conversation::{ConversationDriver, DriverSettings};
use dataset::{PropertyRepository, SqlQueryTool};
use llm_client::{LlmConfig, OpenAILlmClient};
use memory::create_memory_engine;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::server::AppState;

/// Builds the application state for `serve`.
pub async fn build_app_state(config: &AppConfig, llm_config: &dyn LlmConfig) -> Result<AppState> {
    let memory = create_memory_engine(&config.memory, &config.embedding).await?;
    info!(
        has_embedder = memory.has_embedder(),
        "step: memory engine ready"
    );

    let dataset = PropertyRepository::open(config.dataset_path())
        .await
        .with_context(|| format!("Failed to open dataset at {}", config.dataset_path()))?;
    match dataset.count().await {
        Ok(0) => warn!(
            dataset_path = %config.dataset_path(),
            "property_prices is empty; run `property-chat init-db --csv <path>` first"
        ),
        Ok(rows) => info!(rows, "step: dataset ready"),
        Err(e) => warn!(error = %e, "Could not count dataset rows"),
    }

    let llm = OpenAILlmClient::from_config(llm_config)
        .with_tools(Arc::new(SqlQueryTool::new(dataset.clone())));
    info!(model = %llm.model(), "step: LLM client ready");

    let settings = DriverSettings::from_config(&config.memory);
    let driver = ConversationDriver::new(memory, Arc::new(llm), settings);
    Ok(AppState::new(Arc::new(driver)).with_dataset(dataset))
}
