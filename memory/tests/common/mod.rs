//! Shared mocks for memory engine tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use embedding::EmbeddingService;
use memory_core::{MemoryError, NewTurn, ScoredTurn, Turn, TurnStore};

/// Deterministic embedding: character-class counts of the text.
pub fn vector_for(text: &str) -> Vec<f32> {
    let vowels = text.chars().filter(|c| "aeiouAEIOU".contains(*c)).count();
    let spaces = text.chars().filter(|c| c.is_whitespace()).count();
    let digits = text.chars().filter(|c| c.is_ascii_digit()).count();
    vec![vowels as f32, spaces as f32, digits as f32]
}

/// Embedding service backed by [`vector_for`]; counts calls.
#[derive(Default)]
pub struct MockEmbeddingService {
    pub calls: AtomicUsize,
}

impl MockEmbeddingService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingService for MockEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vector_for(text))
    }
}

/// Embedding service whose provider is always unreachable.
pub struct FailingEmbeddingService;

#[async_trait]
impl EmbeddingService for FailingEmbeddingService {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, anyhow::Error> {
        anyhow::bail!("connection refused")
    }
}

/// Store that fails every call, as if the database were unreachable.
pub struct FailingStore;

#[async_trait]
impl TurnStore for FailingStore {
    async fn insert(&self, _turn: NewTurn) -> Result<Turn, MemoryError> {
        Err(MemoryError::Store("database is locked".into()))
    }

    async fn query_recent(&self, _limit: usize) -> Result<Vec<Turn>, MemoryError> {
        Err(MemoryError::Store("database is locked".into()))
    }

    async fn query_nearest(
        &self,
        _query: &[f32],
        _limit: usize,
    ) -> Result<Vec<ScoredTurn>, MemoryError> {
        Err(MemoryError::Store("database is locked".into()))
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Err(MemoryError::Store("database is locked".into()))
    }
}

/// Store whose reads hang far longer than any test timeout; counts calls.
#[derive(Default)]
pub struct SlowStore {
    pub calls: AtomicUsize,
}

impl SlowStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TurnStore for SlowStore {
    async fn insert(&self, _turn: NewTurn) -> Result<Turn, MemoryError> {
        Err(MemoryError::Store("read-only".into()))
    }

    async fn query_recent(&self, _limit: usize) -> Result<Vec<Turn>, MemoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }

    async fn query_nearest(
        &self,
        _query: &[f32],
        _limit: usize,
    ) -> Result<Vec<ScoredTurn>, MemoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(0)
    }
}
