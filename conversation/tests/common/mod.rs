//! Shared mocks for conversation driver tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use llm_client::{LlmClient, StreamChunk, StreamChunkCallback};
use prompt::ChatMessage;

/// Streams a fixed list of chunks and remembers every request it received.
pub struct ScriptedLlmClient {
    chunks: Vec<String>,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlmClient {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// User prompt of the n-th request.
    pub fn prompt(&self, n: usize) -> String {
        let requests = self.requests.lock().unwrap();
        requests[n].last().map(|m| m.content.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn get_llm_response_stream_with_messages(
        &self,
        messages: Vec<ChatMessage>,
        callback: &mut StreamChunkCallback,
    ) -> anyhow::Result<String> {
        self.requests.lock().unwrap().push(messages);
        let mut full = String::new();
        for (i, chunk) in self.chunks.iter().enumerate() {
            full.push_str(chunk);
            callback(StreamChunk {
                content: chunk.clone(),
                done: i + 1 == self.chunks.len(),
            })
            .await?;
        }
        Ok(full)
    }
}

/// Emits one chunk, then fails mid-stream.
pub struct BrokenLlmClient;

#[async_trait]
impl LlmClient for BrokenLlmClient {
    async fn get_llm_response_stream_with_messages(
        &self,
        _messages: Vec<ChatMessage>,
        callback: &mut StreamChunkCallback,
    ) -> anyhow::Result<String> {
        callback(StreamChunk {
            content: "The average".to_string(),
            done: false,
        })
        .await?;
        anyhow::bail!("Stream error: connection reset")
    }
}
