//! property-chat: HTTP server and CLI around the conversation driver.
//!
//! ## Modules
//!
//! - [`cli`] – clap commands: serve, init-db, recent
//! - [`config`] – BaseConfig, AppConfig
//! - [`components`] – builds AppState from config
//! - [`logger`] – tracing to stdout and log file
//! - [`server`] – axum router, graceful shutdown

pub mod cli;
pub mod components;
pub mod config;
pub mod logger;
pub mod server;

pub use components::build_app_state;
pub use config::{AppConfig, BaseConfig};
pub use logger::{init_tracing, open_log_file};
pub use server::{build_router, serve, shutdown_signal, AppState, ChatRequest};
