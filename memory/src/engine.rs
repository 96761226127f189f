//! Memory engine: persistence and fail-soft retrieval over a [`TurnStore`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use embedding::EmbeddingService;
use memory_core::{ContextBundle, MemoryError, NewTurn, Retrieval, ScoredTurn, Turn, TurnRole, TurnStore};
use tracing::{debug, info, instrument, warn};

/// Default bound on a single store or embedding call made during retrieval.
pub const DEFAULT_RETRIEVAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Records conversation turns and retrieves them by recency and by similarity.
///
/// Without an embedding service turns are stored without vectors and
/// similarity retrieval always comes back empty.
#[derive(Clone)]
pub struct MemoryEngine {
    store: Arc<dyn TurnStore>,
    embedder: Option<Arc<dyn EmbeddingService>>,
    retrieval_timeout: Duration,
}

impl MemoryEngine {
    pub fn new(store: Arc<dyn TurnStore>, embedder: Option<Arc<dyn EmbeddingService>>) -> Self {
        Self {
            store,
            embedder,
            retrieval_timeout: DEFAULT_RETRIEVAL_TIMEOUT,
        }
    }

    pub fn with_retrieval_timeout(mut self, timeout: Duration) -> Self {
        self.retrieval_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn TurnStore> {
        &self.store
    }

    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    /// Appends one turn. Embeds `content` first when an embedding service is set;
    /// an embedding failure aborts the record and nothing is stored.
    #[instrument(skip(self, content), fields(role = %role, content_len = content.len()))]
    pub async fn record(&self, role: TurnRole, content: &str) -> Result<Turn, MemoryError> {
        let mut turn = NewTurn::new(role, content);

        if let Some(embedder) = &self.embedder {
            let vector = embedder.embed(content).await.map_err(|e| {
                warn!(error = %e, "record: embedding failed, turn not stored");
                MemoryError::Embedding(e.to_string())
            })?;
            debug!(dimension = vector.len(), "record: content embedded");
            turn = turn.with_embedding(vector);
        }

        let stored = self.store.insert(turn).await?;
        info!(seq = stored.seq, "step: memory turn recorded");
        Ok(stored)
    }

    /// The `limit` newest turn contents, oldest first. Never fails; store
    /// errors come back as [`Retrieval::Degraded`].
    #[instrument(skip(self))]
    pub async fn recent_turns(&self, limit: usize) -> Retrieval<String> {
        if limit == 0 {
            return Retrieval::Found(Vec::new());
        }

        match self.bounded("query_recent", self.store.query_recent(limit)).await {
            Ok(mut turns) => {
                turns.reverse();
                debug!(count = turns.len(), "recent_turns: retrieved");
                Retrieval::Found(turns.into_iter().map(|t| t.content).collect())
            }
            Err(e) => {
                warn!(error = %e, limit, "recent_turns: store failed, returning degraded result");
                Retrieval::Degraded(e)
            }
        }
    }

    /// The `limit` stored turns nearest to `query_text` by L2 distance, nearest first.
    /// Never fails; embedding or store errors come back as [`Retrieval::Degraded`].
    #[instrument(skip(self, query_text), fields(query_len = query_text.len()))]
    pub async fn similar_turns(&self, query_text: &str, limit: usize) -> Retrieval<ScoredTurn> {
        let Some(embedder) = &self.embedder else {
            debug!("similar_turns: no embedding service, similarity retrieval unavailable");
            return Retrieval::Found(Vec::new());
        };
        if limit == 0 {
            return Retrieval::Found(Vec::new());
        }

        let embed = async {
            embedder
                .embed(query_text)
                .await
                .map_err(|e| MemoryError::Embedding(e.to_string()))
        };
        let query_vector = match self.bounded("embed", embed).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "similar_turns: embedding failed, returning degraded result");
                return Retrieval::Degraded(e);
            }
        };

        match self
            .bounded("query_nearest", self.store.query_nearest(&query_vector, limit))
            .await
        {
            Ok(scored) => {
                debug!(
                    count = scored.len(),
                    best_score = scored.first().map(|s| s.score),
                    "similar_turns: retrieved"
                );
                Retrieval::Found(scored)
            }
            Err(e) => {
                warn!(error = %e, limit, "similar_turns: store failed, returning degraded result");
                Retrieval::Degraded(e)
            }
        }
    }

    /// Similar then recent retrieval for one query, returned unfiltered.
    #[instrument(skip(self, query_text), fields(query_len = query_text.len()))]
    pub async fn build_context(
        &self,
        query_text: &str,
        similar_limit: usize,
        recent_limit: usize,
    ) -> ContextBundle {
        let similar = self.similar_turns(query_text, similar_limit).await;
        let recent = self.recent_turns(recent_limit).await;
        info!(
            similar = similar.len(),
            recent = recent.len(),
            degraded = similar.is_degraded() || recent.is_degraded(),
            "step: memory context built"
        );
        ContextBundle { similar, recent }
    }

    /// Strict history read for diagnostics: up to `limit` full turns, oldest first.
    pub async fn history(&self, limit: usize) -> Result<Vec<Turn>, MemoryError> {
        let mut turns = self.store.query_recent(limit).await?;
        turns.reverse();
        Ok(turns)
    }

    /// Releases the store's resources.
    pub async fn close(&self) {
        self.store.close().await;
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, MemoryError>
    where
        F: Future<Output = Result<T, MemoryError>>,
    {
        match tokio::time::timeout(self.retrieval_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(MemoryError::Timeout(format!(
                "{} did not finish within {} ms",
                op,
                self.retrieval_timeout.as_millis()
            ))),
        }
    }
}
