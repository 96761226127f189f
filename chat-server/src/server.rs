//! HTTP surface: `POST /chat` streams the answer as plain text, `GET /health` says ok.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use conversation::ConversationDriver;
use dataset::PropertyRepository;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info};

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub driver: Arc<ConversationDriver>,
    /// Dataset behind the SQL tool; closed on shutdown.
    pub dataset: Option<PropertyRepository>,
}

impl AppState {
    pub fn new(driver: Arc<ConversationDriver>) -> Self {
        Self {
            driver,
            dataset: None,
        }
    }

    pub fn with_dataset(mut self, dataset: PropertyRepository) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Releases the memory store and dataset pools.
    pub async fn close(&self) {
        self.driver.memory().close().await;
        if let Some(dataset) = &self.dataset {
            dataset.close().await;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Chunks are written in emission order; a failed exchange ends the body with an error.
async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    info!(text_len = request.text.len(), "POST /chat");
    let chunks = state.driver.clone().respond_stream(request.text);
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(ReceiverStream::new(chunks)),
    )
        .into_response()
}

/// Resolves on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}

/// Serves until a shutdown signal, then closes the pools held by `state`.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "property-chat listening");

    let result = axum::serve(listener, build_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    state.close().await;
    info!("Shutdown complete");
    result.context("HTTP server error")
}
