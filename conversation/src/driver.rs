//! One exchange end to end: retrieve, select, compose, stream, persist.

use std::sync::Arc;

use llm_client::{LlmClient, StreamChunk, StreamChunkCallback};
use memory::{MemoryConfig, MemoryEngine};
use memory_core::TurnRole;
use memory_strategies::{ContextSelector, RelevanceGate, SelectedContext, SelectionPolicy};
use prompt::{build_messages, compose_prompt};
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

use crate::error::ConversationError;

/// Capacity of the chunk channel between the model stream and the HTTP body.
const CHUNK_CHANNEL_CAPACITY: usize = 64;

/// Retrieval limits, selection rule and preamble for every exchange.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub similar_limit: usize,
    pub recent_limit: usize,
    pub selector: ContextSelector,
    pub preamble: Option<String>,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            similar_limit: 3,
            recent_limit: 5,
            selector: ContextSelector::default(),
            preamble: None,
        }
    }
}

impl DriverSettings {
    pub fn from_config(config: &dyn MemoryConfig) -> Self {
        Self {
            similar_limit: config.similar_limit(),
            recent_limit: config.recent_limit(),
            selector: ContextSelector::new(
                RelevanceGate::new(config.relevance_threshold()),
                config.selection_policy(),
            ),
            preamble: config.prompt_preamble().map(String::from),
        }
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.selector.policy = policy;
        self
    }
}

/// The prompt for one question and the context that went into it.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub prompt: String,
    pub context: SelectedContext,
}

/// Drives a single conversation lane over the memory engine and an LLM client.
pub struct ConversationDriver {
    memory: MemoryEngine,
    llm: Arc<dyn LlmClient>,
    settings: DriverSettings,
}

impl ConversationDriver {
    pub fn new(memory: MemoryEngine, llm: Arc<dyn LlmClient>, settings: DriverSettings) -> Self {
        Self {
            memory,
            llm,
            settings,
        }
    }

    pub fn memory(&self) -> &MemoryEngine {
        &self.memory
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// Retrieves context for `question` and composes the prompt. Never fails.
    #[instrument(skip(self, question), fields(question_len = question.len()))]
    pub async fn prepare_prompt(&self, question: &str) -> PreparedPrompt {
        let bundle = self
            .memory
            .build_context(question, self.settings.similar_limit, self.settings.recent_limit)
            .await;
        let context = self.settings.selector.select(&bundle);
        let prompt = compose_prompt(
            self.settings.preamble.as_deref(),
            &context.recent,
            context.similar_contents(),
            question,
        );
        info!(
            prompt_len = prompt.len(),
            recent = context.recent.len(),
            similar = context.similar.len(),
            "step: conversation prompt composed"
        );
        PreparedPrompt { prompt, context }
    }

    /// Answers `question`, passing chunks to `callback` in order, then records the
    /// user turn and the full agent turn. On a model failure nothing is recorded.
    #[instrument(skip(self, question, callback), fields(question_len = question.len()))]
    pub async fn respond(
        &self,
        question: &str,
        callback: &mut StreamChunkCallback,
    ) -> Result<String, ConversationError> {
        let prepared = self.prepare_prompt(question).await;
        let messages = build_messages(None, &prepared.prompt);

        let answer = self
            .llm
            .get_llm_response_stream_with_messages(messages, callback)
            .await
            .map_err(|e| {
                error!(error = %e, "LLM stream failed, exchange not persisted");
                ConversationError::Llm(e.to_string())
            })?;

        self.memory.record(TurnRole::User, question).await.map_err(|e| {
            error!(error = %e, "Failed to record user turn");
            e
        })?;
        self.memory.record(TurnRole::Agent, &answer).await.map_err(|e| {
            error!(error = %e, "Failed to record agent turn");
            e
        })?;

        info!(answer_len = answer.len(), "step: conversation exchange done");
        Ok(answer)
    }

    /// Runs [`respond`](Self::respond) on a task and returns its chunks as a channel.
    ///
    /// The channel ends after the last chunk, or with one `Err` if the exchange failed.
    pub fn respond_stream(
        self: Arc<Self>,
        question: String,
    ) -> mpsc::Receiver<Result<String, ConversationError>> {
        let (tx, rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let chunk_tx = tx.clone();
            let mut callback: Box<StreamChunkCallback> = Box::new(move |chunk: StreamChunk| {
                let chunk_tx = chunk_tx.clone();
                Box::pin(async move {
                    if chunk.content.is_empty() {
                        return Ok(());
                    }
                    chunk_tx
                        .send(Ok(chunk.content))
                        .await
                        .map_err(|_| anyhow::anyhow!("client disconnected"))
                })
            });

            if let Err(e) = self.respond(&question, callback.as_mut()).await {
                if tx.send(Err(e)).await.is_err() {
                    warn!("client disconnected before the error could be reported");
                }
            }
        });

        rx
    }
}
