//! # LLM client abstraction
//!
//! Defines the [`LlmClient`] trait, the [`ToolExecutor`] trait for function tools the
//! model may call, and an OpenAI implementation. Used by the conversation driver.
//!
//! The stream method uses a boxed callback so that [`LlmClient`] is object-safe (dyn compatible).

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use openai_client::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
};
use prompt::{ChatMessage, MessageRole};

mod config;
mod openai_llm;

pub use config::{EnvLlmConfig, LlmConfig, DEFAULT_MODEL};
pub use openai_client::ToolDefinition;
pub use openai_llm::OpenAILlmClient;

/// A chunk of streamed LLM output; aligned with `openai_client::StreamChunk`.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    pub content: String,
    pub done: bool,
}

/// Type-erased callback for stream chunks so that [`LlmClient`] is dyn compatible.
pub type StreamChunkCallback =
    dyn FnMut(StreamChunk) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send;

/// LLM client interface: streamed completion from a list of messages.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Streamed completion: invokes `callback` for each chunk in order and returns the full reply text.
    async fn get_llm_response_stream_with_messages(
        &self,
        messages: Vec<ChatMessage>,
        callback: &mut StreamChunkCallback,
    ) -> Result<String>;

    /// Full reply text without observing chunks.
    async fn get_llm_response_with_messages(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let mut ignore: Box<StreamChunkCallback> = Box::new(|_chunk: StreamChunk| Box::pin(async { Ok(()) }));
        self.get_llm_response_stream_with_messages(messages, ignore.as_mut())
            .await
    }
}

/// Function tools the model may call during a completion.
///
/// Tool failures are reported to the model as text, never as an `Err`.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Runs tool `name` with the model's raw JSON `arguments`.
    async fn execute(&self, name: &str, arguments: &str) -> String;
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoClient;

    #[async_trait]
    impl LlmClient for EchoClient {
        async fn get_llm_response_stream_with_messages(
            &self,
            messages: Vec<ChatMessage>,
            callback: &mut StreamChunkCallback,
        ) -> Result<String> {
            let text = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            callback(StreamChunk {
                content: text.clone(),
                done: true,
            })
            .await?;
            Ok(text)
        }
    }

    #[tokio::test]
    async fn test_default_non_stream_collects_reply() {
        let reply = EchoClient
            .get_llm_response_with_messages(vec![ChatMessage::user("hello")])
            .await
            .unwrap();
        assert_eq!(reply, "hello");
    }

    #[test]
    fn test_chat_message_to_openai_roles() {
        assert!(matches!(
            chat_message_to_openai(&ChatMessage::system("s")).unwrap(),
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(
            chat_message_to_openai(&ChatMessage::user("u")).unwrap(),
            ChatCompletionRequestMessage::User(_)
        ));
        assert!(matches!(
            chat_message_to_openai(&ChatMessage::assistant("a")).unwrap(),
            ChatCompletionRequestMessage::Assistant(_)
        ));
    }
}
