//! # Core Types
//!
//! This module defines the core types for conversational memory.
//!
//! ## TurnRole
//!
//! Who produced a turn: the `User` or the `Agent`. Parsed from the literals
//! `"user"` / `"agent"`; anything else is rejected with
//! [`MemoryError::InvalidRole`](crate::MemoryError::InvalidRole).
//!
//! ## Turn
//!
//! One persisted conversational event. Turns are immutable once written;
//! `seq` and `created_at` are assigned by the store.
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `id` | `Uuid` | Unique identifier |
//! | `seq` | `i64` | Store-assigned insertion sequence (tie-breaker) |
//! | `role` | `TurnRole` | Who produced the turn |
//! | `content` | `String` | Message text, stored verbatim |
//! | `embedding` | `Option<Vec<f32>>` | Vector for similarity search |
//! | `created_at` | `DateTime<Utc>` | Store-assigned, non-decreasing |
//!
//! ## ScoredTurn
//!
//! Transient result of a similarity query. `score` is an L2 distance, so
//! lower means more similar.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MemoryError;

/// Represents the role of a turn in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Agent,
}

impl TurnRole {
    /// Lowercase literal used in storage and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Agent => "agent",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TurnRole {
    type Err = MemoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(TurnRole::User),
            "agent" => Ok(TurnRole::Agent),
            other => Err(MemoryError::InvalidRole(other.to_string())),
        }
    }
}

/// Insert payload for a turn; the store assigns `seq` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTurn {
    pub role: TurnRole,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
}

impl NewTurn {
    /// Creates a turn payload without an embedding.
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            embedding: None,
        }
    }

    /// Attaches an embedding vector.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A single persisted turn in the conversation log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    /// Unique identifier
    pub id: Uuid,
    /// Store-assigned insertion sequence number
    pub seq: i64,
    /// Who produced the turn
    pub role: TurnRole,
    /// The message text
    pub content: String,
    /// Vector embedding for similarity search
    pub embedding: Option<Vec<f32>>,
    /// When the store accepted the turn
    pub created_at: DateTime<Utc>,
}

/// Result of a similarity query: content plus its L2 distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredTurn {
    pub content: String,
    pub score: f32,
}

impl ScoredTurn {
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            score,
        }
    }
}
