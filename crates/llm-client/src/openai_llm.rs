//! OpenAI implementation of [`LlmClient`]: wraps openai-client, prepends the system
//! message and runs the configured tools between streamed rounds.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{ChatCompletionRequestMessage, StreamChunk as OpenAIStreamChunk, ToolCall};
use prompt::{ChatMessage, MessageRole, DEFAULT_SYSTEM_MESSAGE};
use tracing::{info, instrument, warn};

use super::{chat_message_to_openai, LlmClient, LlmConfig, StreamChunk, StreamChunkCallback, ToolExecutor};
use crate::config::DEFAULT_MODEL;

/// [`LlmClient`] backed by the OpenAI chat completions API.
#[derive(Clone)]
pub struct OpenAILlmClient {
    client: openai_client::OpenAIClient,
    model: String,
    system_prompt: Option<String>,
    tools: Option<Arc<dyn ToolExecutor>>,
}

impl OpenAILlmClient {
    pub fn new(api_key: String) -> Self {
        Self::from_client(openai_client::OpenAIClient::new(api_key))
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self::from_client(openai_client::OpenAIClient::with_base_url(api_key, base_url))
    }

    fn from_client(client: openai_client::OpenAIClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            system_prompt: None,
            tools: None,
        }
    }

    /// Builds the client from an [`LlmConfig`].
    pub fn from_config(config: &dyn LlmConfig) -> Self {
        let client = match config.base_url() {
            Some(url) => Self::with_base_url(config.api_key().to_string(), url.to_string()),
            None => Self::new(config.api_key().to_string()),
        };
        client
            .with_model(config.model().to_string())
            .with_system_prompt_opt(config.system_prompt().map(String::from))
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_system_prompt_opt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Offers `tools` to the model on every request.
    pub fn with_tools(mut self, tools: Arc<dyn ToolExecutor>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn system_content(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_MESSAGE)
    }

    /// System message first unless the caller already supplied one.
    fn to_openai_messages(&self, messages: &[ChatMessage]) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut openai_messages = Vec::with_capacity(messages.len() + 1);
        if !messages.iter().any(|m| m.role == MessageRole::System) {
            openai_messages.push(chat_message_to_openai(&ChatMessage::system(self.system_content()))?);
        }
        for msg in messages {
            openai_messages.push(chat_message_to_openai(msg)?);
        }
        Ok(openai_messages)
    }
}

#[async_trait]
impl LlmClient for OpenAILlmClient {
    #[instrument(skip(self, messages, callback), fields(model = %self.model))]
    async fn get_llm_response_stream_with_messages(
        &self,
        messages: Vec<ChatMessage>,
        callback: &mut StreamChunkCallback,
    ) -> Result<String> {
        let openai_messages = self.to_openai_messages(&messages)?;
        let definitions = self
            .tools
            .as_ref()
            .map(|t| t.definitions())
            .unwrap_or_default();
        let tools = self.tools.clone();

        self.client
            .chat_completion_stream(
                &self.model,
                openai_messages,
                &definitions,
                |call: ToolCall| {
                    let tools = tools.clone();
                    async move {
                        match tools {
                            Some(t) => {
                                info!(tool = %call.name, "step: llm tool call");
                                t.execute(&call.name, &call.arguments).await
                            }
                            None => {
                                warn!(tool = %call.name, "model requested a tool but none are configured");
                                format!("Error: unknown tool {}", call.name)
                            }
                        }
                    }
                },
                |chunk: OpenAIStreamChunk| {
                    callback(StreamChunk {
                        content: chunk.content,
                        done: chunk.done,
                    })
                },
            )
            .await
            .map_err(|e| anyhow::anyhow!("Stream error: {}", e))
    }
}
