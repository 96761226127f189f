//! # Memory Core
//!
//! Core types and traits for the turn log and its retrieval results.
//! Used by the store crates, `memory-strategies` and the `memory` engine.
//!
//! ## Modules
//!
//! - [`types`] - Turn, NewTurn, TurnRole, ScoredTurn
//! - [`store`] - TurnStore trait
//! - [`retrieval`] - Retrieval (found vs degraded) and ContextBundle
//! - [`distance`] - brute-force L2 ranking
//! - [`error`] - MemoryError

pub mod distance;
pub mod error;
pub mod retrieval;
pub mod store;
pub mod types;

pub use distance::{l2_distance, rank_nearest};
pub use error::MemoryError;
pub use retrieval::{ContextBundle, Retrieval};
pub use store::TurnStore;
pub use types::*;
