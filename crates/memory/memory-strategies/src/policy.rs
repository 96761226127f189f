//! Selection policies between the recent and similar context blocks.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("Unknown selection policy: {0} (expected exclusive, similarity-first, recency-first or hybrid)")]
pub struct ParsePolicyError(pub String);

/// Which retrieved blocks reach the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Gated similar turns if any, otherwise recent turns.
    Exclusive,
    /// Recent turns if any, otherwise gated similar turns.
    RecencyFirst,
    /// Both blocks, each only when non-empty.
    #[default]
    Hybrid,
}

impl SelectionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::Exclusive => "exclusive",
            SelectionPolicy::RecencyFirst => "recency-first",
            SelectionPolicy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exclusive" | "similarity-first" => Ok(SelectionPolicy::Exclusive),
            "recency-first" => Ok(SelectionPolicy::RecencyFirst),
            "hybrid" => Ok(SelectionPolicy::Hybrid),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}
