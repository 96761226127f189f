//! # OpenAI API client
//!
//! Thin wrapper around [async-openai] for streamed chat completion with function tools.
//! Provides token masking for safe logging.
//!
//! A streamed request may end with tool calls instead of text. The client then runs
//! each call through the caller's executor, appends the assistant tool-call message and
//! the tool results, and streams the next round, up to [`MAX_TOOL_ROUNDS`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionMessageToolCallChunk, ChatCompletionTool,
    ChatCompletionToolArgs, ChatCompletionToolType, CreateChatCompletionRequestArgs,
    FunctionCall, FunctionObjectArgs,
};
use async_openai::{config::OpenAIConfig, Client};
use futures::StreamExt;

pub use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};

/// Upper bound on tool-call rounds for one request.
pub const MAX_TOOL_ROUNDS: usize = 5;

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_char_boundary(7) || !token.is_char_boundary(len - 4) {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

/// A function tool offered to the model.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    fn to_openai(&self) -> anyhow::Result<ChatCompletionTool> {
        Ok(ChatCompletionToolArgs::default()
            .r#type(ChatCompletionToolType::Function)
            .function(
                FunctionObjectArgs::default()
                    .name(self.name.clone())
                    .description(self.description.clone())
                    .parameters(self.parameters.clone())
                    .build()?,
            )
            .build()?)
    }
}

/// A complete tool call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model.
    pub arguments: String,
}

/// Reassembles tool calls from streamed deltas, keyed by the delta index.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<i32, ToolCall>,
}

impl ToolCallAccumulator {
    pub fn push(&mut self, chunk: &ChatCompletionMessageToolCallChunk) {
        let entry = self.calls.entry(chunk.index).or_insert_with(|| ToolCall {
            id: String::new(),
            name: String::new(),
            arguments: String::new(),
        });
        if let Some(id) = &chunk.id {
            entry.id = id.clone();
        }
        if let Some(function) = &chunk.function {
            if let Some(name) = &function.name {
                entry.name.push_str(name);
            }
            if let Some(arguments) = &function.arguments {
                entry.arguments.push_str(arguments);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Calls in index order.
    pub fn finish(self) -> Vec<ToolCall> {
        self.calls.into_values().collect()
    }
}

/// A chunk of streamed completion content and whether the stream is finished.
#[derive(Debug, Clone)]
pub struct StreamChunk {
    /// Text of one streamed delta.
    pub content: String,
    /// True if this is the final chunk for the response.
    pub done: bool,
}

/// OpenAI chat client. Wraps async-openai client and holds the API key for masked logging.
#[derive(Clone)]
pub struct OpenAIClient {
    client: Arc<Client<OpenAIConfig>>,
    /// API key stored only for logging (masked).
    api_key_for_logging: String,
}

impl OpenAIClient {
    /// Builds a client using the given API key and default API base URL.
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key.clone());
        Self {
            client: Arc::new(Client::with_config(config)),
            api_key_for_logging: api_key,
        }
    }

    /// Builds a client with a custom base URL (e.g. for proxies or compatible endpoints).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.clone())
            .with_api_base(base_url);
        Self {
            client: Arc::new(Client::with_config(config)),
            api_key_for_logging: api_key,
        }
    }

    fn masked_key(&self) -> String {
        mask_token(&self.api_key_for_logging)
    }

    /// Streams a chat completion, running requested tools between rounds.
    ///
    /// `callback` receives text chunks in emission order; `execute_tool` turns a tool
    /// call into the text returned to the model. Returns the full streamed text.
    /// Stream errors and callback errors are propagated.
    pub async fn chat_completion_stream<F, Fut, E, EFut>(
        &self,
        model: &str,
        mut messages: Vec<ChatCompletionRequestMessage>,
        tools: &[ToolDefinition],
        mut execute_tool: E,
        mut callback: F,
    ) -> anyhow::Result<String>
    where
        F: FnMut(StreamChunk) -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<()>>,
        E: FnMut(ToolCall) -> EFut,
        EFut: std::future::Future<Output = String>,
    {
        let openai_tools = tools
            .iter()
            .map(ToolDefinition::to_openai)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut full_response = String::new();

        for round in 0..=MAX_TOOL_ROUNDS {
            tracing::info!(
                model = %model,
                message_count = messages.len(),
                tool_count = openai_tools.len(),
                round,
                api_key = %self.masked_key(),
                "OpenAI chat_completion_stream request"
            );

            let mut args = CreateChatCompletionRequestArgs::default();
            args.model(model).messages(messages.clone());
            if !openai_tools.is_empty() {
                args.tools(openai_tools.clone());
            }
            let request = args.build()?;

            if let Ok(json) = serde_json::to_string(&request) {
                tracing::debug!(request_json = %json, "OpenAI chat_completion_stream request JSON");
            }

            let mut stream = self.client.chat().create_stream(request).await?;

            let mut round_text = String::new();
            let mut tool_calls = ToolCallAccumulator::default();

            while let Some(result) = stream.next().await {
                let chunk = result.map_err(|e| anyhow::anyhow!("Stream error: {}", e))?;
                if let Some(ref u) = chunk.usage {
                    tracing::info!(
                        prompt_tokens = u.prompt_tokens,
                        completion_tokens = u.completion_tokens,
                        total_tokens = u.total_tokens,
                        "OpenAI chat_completion_stream usage"
                    );
                }
                let Some(choice) = chunk.choices.first() else {
                    continue;
                };
                if let Some(deltas) = &choice.delta.tool_calls {
                    for delta in deltas {
                        tool_calls.push(delta);
                    }
                }
                if let Some(content) = choice.delta.content.as_deref().filter(|c| !c.is_empty()) {
                    round_text.push_str(content);
                    callback(StreamChunk {
                        content: content.to_string(),
                        done: choice.finish_reason.is_some() && tool_calls.is_empty(),
                    })
                    .await?;
                }
            }

            full_response.push_str(&round_text);

            if tool_calls.is_empty() {
                tracing::info!(
                    response_len = full_response.len(),
                    rounds = round + 1,
                    "OpenAI chat_completion_stream done"
                );
                return Ok(full_response);
            }
            if round == MAX_TOOL_ROUNDS {
                break;
            }

            let calls = tool_calls.finish();
            tracing::info!(
                count = calls.len(),
                names = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "OpenAI chat_completion_stream tool calls"
            );

            let mut assistant = ChatCompletionRequestAssistantMessageArgs::default();
            assistant.tool_calls(
                calls
                    .iter()
                    .map(|c| ChatCompletionMessageToolCall {
                        id: c.id.clone(),
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionCall {
                            name: c.name.clone(),
                            arguments: c.arguments.clone(),
                        },
                    })
                    .collect::<Vec<_>>(),
            );
            if !round_text.is_empty() {
                assistant.content(round_text);
            }
            messages.push(assistant.build()?.into());

            for call in calls {
                let id = call.id.clone();
                let output = execute_tool(call).await;
                messages.push(
                    ChatCompletionRequestToolMessageArgs::default()
                        .content(output)
                        .tool_call_id(id)
                        .build()?
                        .into(),
                );
            }
        }

        anyhow::bail!("Tool call limit of {} rounds reached", MAX_TOOL_ROUNDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::types::FunctionCallStream;

    fn delta(index: i32, id: Option<&str>, name: Option<&str>, args: Option<&str>) -> ChatCompletionMessageToolCallChunk {
        ChatCompletionMessageToolCallChunk {
            index,
            id: id.map(String::from),
            r#type: Some(ChatCompletionToolType::Function),
            function: Some(FunctionCallStream {
                name: name.map(String::from),
                arguments: args.map(String::from),
            }),
        }
    }

    #[test]
    fn test_accumulator_joins_argument_fragments() {
        let mut acc = ToolCallAccumulator::default();
        acc.push(&delta(0, Some("call_1"), Some("run_sql_query"), Some("{\"query\":")));
        acc.push(&delta(0, None, None, Some("\"SELECT 1\"}")));
        let calls = acc.finish();
        assert_eq!(
            calls,
            vec![ToolCall {
                id: "call_1".into(),
                name: "run_sql_query".into(),
                arguments: "{\"query\":\"SELECT 1\"}".into(),
            }]
        );
    }

    #[test]
    fn test_accumulator_orders_by_index() {
        let mut acc = ToolCallAccumulator::default();
        acc.push(&delta(1, Some("b"), Some("second"), Some("{}")));
        acc.push(&delta(0, Some("a"), Some("first"), Some("{}")));
        let names: Vec<String> = acc.finish().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_accumulator_interleaved_calls() {
        let mut acc = ToolCallAccumulator::default();
        acc.push(&delta(0, Some("a"), Some("run_sql_query"), Some("{\"query\":\"SELECT")));
        acc.push(&delta(1, Some("b"), Some("run_sql_query"), Some("{\"query\":")));
        acc.push(&delta(0, None, None, Some(" 1\"}")));
        acc.push(&delta(1, None, None, Some("\"SELECT 2\"}")));
        let args: Vec<String> = acc.finish().into_iter().map(|c| c.arguments).collect();
        assert_eq!(
            args,
            vec!["{\"query\":\"SELECT 1\"}", "{\"query\":\"SELECT 2\"}"]
        );
    }

    #[test]
    fn test_masked_key_hides_secret() {
        let client = OpenAIClient::new("sk-abcdefghijklmnop1234".to_string());
        assert_eq!(client.masked_key(), "sk-abcd***1234");
        let short = OpenAIClient::with_base_url("sk-short".to_string(), "http://localhost:1/v1".to_string());
        assert_eq!(short.masked_key(), "***");
    }

    #[test]
    fn test_tool_definition_converts() {
        let def = ToolDefinition {
            name: "run_sql_query".into(),
            description: "Run SQL".into(),
            parameters: serde_json::json!({"type": "object"}),
        };
        let tool = def.to_openai().unwrap();
        assert_eq!(tool.function.name, "run_sql_query");
    }
}
