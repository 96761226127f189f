//! property-chat binary: serve the chat endpoint, bootstrap the dataset, inspect memory.

use anyhow::{Context, Result};
use clap::Parser;
use dataset::PropertyRepository;
use llm_client::EnvLlmConfig;
use memory::{create_turn_store, MemoryEngine};
use property_chat::cli::{Cli, Commands};
use property_chat::{build_app_state, init_tracing, serve, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_tracing(config.log_file())?;

    let result = match cli.command {
        Commands::Serve => handle_serve(&config).await,
        Commands::InitDb { csv, limit } => handle_init_db(&config, &csv, limit).await,
        Commands::Recent { limit } => handle_recent(&config, limit).await,
    };
    if let Err(e) = &result {
        error!(error = %e, "property-chat failed");
    }
    result
}

async fn handle_serve(config: &AppConfig) -> Result<()> {
    config.validate()?;
    let llm_config = EnvLlmConfig::from_env()?;
    let addr = config.base.socket_addr()?;
    let state = build_app_state(config, &llm_config).await?;
    serve(state, addr).await
}

async fn handle_init_db(config: &AppConfig, csv: &str, limit: usize) -> Result<()> {
    config.base.validate()?;
    let repo = PropertyRepository::open(config.dataset_path())
        .await
        .with_context(|| format!("Failed to open dataset at {}", config.dataset_path()))?;
    let inserted = repo.bootstrap_from_csv(csv, limit).await;
    let total = repo.count().await;
    repo.close().await;

    let inserted = inserted.with_context(|| format!("Failed to load {}", csv))?;
    let total = total?;
    info!(inserted, total, "init-db done");
    if inserted == 0 {
        println!("property_prices already has {} rows; nothing loaded", total);
    } else {
        println!("Loaded {} rows into {}", inserted, config.dataset_path());
    }
    Ok(())
}

async fn handle_recent(config: &AppConfig, limit: usize) -> Result<()> {
    config.memory.validate()?;
    let store = create_turn_store(&config.memory).await?;
    let engine = MemoryEngine::new(store, None);
    let turns = engine.history(limit).await;
    engine.close().await;

    let turns = turns?;
    if turns.is_empty() {
        println!("No turns remembered yet.");
    }
    for turn in turns {
        println!("[{}] {}: {}", turn.created_at.format("%Y-%m-%d %H:%M:%S"), turn.role, turn.content);
    }
    Ok(())
}
