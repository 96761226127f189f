//! # Retrieval Results
//!
//! Retrieval operations never fail outright: a store or embedding failure is
//! reported as [`Retrieval::Degraded`] so the caller still gets an empty item
//! list, yet can tell "no matches" apart from "store unreachable".
//!
//! [`ContextBundle`] pairs the similarity and recency results of one
//! `build_context` call.

use crate::error::MemoryError;
use crate::types::ScoredTurn;

/// Outcome of a fail-soft retrieval.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval<T> {
    /// The store answered; the list may be empty.
    Found(Vec<T>),
    /// The store or embedding provider failed; no items.
    Degraded(MemoryError),
}

impl<T> Retrieval<T> {
    /// Items returned by the store; empty when degraded.
    pub fn items(&self) -> &[T] {
        match self {
            Retrieval::Found(items) => items,
            Retrieval::Degraded(_) => &[],
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Retrieval::Found(items) => items,
            Retrieval::Degraded(_) => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Retrieval::Degraded(_))
    }

    /// The failure behind a degraded result.
    pub fn error(&self) -> Option<&MemoryError> {
        match self {
            Retrieval::Found(_) => None,
            Retrieval::Degraded(e) => Some(e),
        }
    }

    /// Strict view: a degraded result becomes `Err`.
    pub fn into_result(self) -> Result<Vec<T>, MemoryError> {
        match self {
            Retrieval::Found(items) => Ok(items),
            Retrieval::Degraded(e) => Err(e),
        }
    }
}

impl<T> From<Result<Vec<T>, MemoryError>> for Retrieval<T> {
    fn from(result: Result<Vec<T>, MemoryError>) -> Self {
        match result {
            Ok(items) => Retrieval::Found(items),
            Err(e) => Retrieval::Degraded(e),
        }
    }
}

/// Similar and recent context gathered for one query. Not cached across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextBundle {
    /// Nearest turns, most similar first.
    pub similar: Retrieval<ScoredTurn>,
    /// Recent turn contents, oldest first.
    pub recent: Retrieval<String>,
}

impl ContextBundle {
    pub fn empty() -> Self {
        Self {
            similar: Retrieval::Found(Vec::new()),
            recent: Retrieval::Found(Vec::new()),
        }
    }

    pub fn similar(&self) -> &[ScoredTurn] {
        self.similar.items()
    }

    pub fn recent(&self) -> &[String] {
        self.recent.items()
    }

    /// True if either half came back degraded.
    pub fn is_degraded(&self) -> bool {
        self.similar.is_degraded() || self.recent.is_degraded()
    }
}
