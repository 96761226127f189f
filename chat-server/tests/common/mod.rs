//! Shared helpers for router tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use conversation::{ConversationDriver, DriverSettings};
use llm_client::{LlmClient, StreamChunk, StreamChunkCallback};
use memory::MemoryEngine;
use memory_inmemory::InMemoryTurnStore;
use prompt::ChatMessage;
use property_chat::AppState;

/// Streams a fixed answer in the given pieces.
pub struct ChunkedLlmClient {
    chunks: Vec<String>,
}

impl ChunkedLlmClient {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[async_trait]
impl LlmClient for ChunkedLlmClient {
    async fn get_llm_response_stream_with_messages(
        &self,
        _messages: Vec<ChatMessage>,
        callback: &mut StreamChunkCallback,
    ) -> anyhow::Result<String> {
        for (i, chunk) in self.chunks.iter().enumerate() {
            callback(StreamChunk {
                content: chunk.clone(),
                done: i + 1 == self.chunks.len(),
            })
            .await?;
        }
        Ok(self.chunks.concat())
    }
}

/// Fails before producing any text.
pub struct DownLlmClient;

#[async_trait]
impl LlmClient for DownLlmClient {
    async fn get_llm_response_stream_with_messages(
        &self,
        _messages: Vec<ChatMessage>,
        _callback: &mut StreamChunkCallback,
    ) -> anyhow::Result<String> {
        anyhow::bail!("connection refused")
    }
}

/// App state over an in-memory store, no embedder and no dataset.
pub fn state_with(llm: Arc<dyn LlmClient>) -> (AppState, Arc<InMemoryTurnStore>) {
    let store = Arc::new(InMemoryTurnStore::new());
    let engine = MemoryEngine::new(store.clone(), None);
    let driver = ConversationDriver::new(engine, llm, DriverSettings::default());
    (AppState::new(Arc::new(driver)), store)
}
