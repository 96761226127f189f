//! # Context Selection
//!
//! Decides which retrieved turns are injected into the next prompt.
//!
//! - [`RelevanceGate`]: drops similarity matches whose L2 distance is not strictly
//!   below the threshold.
//! - [`SelectionPolicy`]: chooses between the recent block and the gated similar block.
//! - [`ContextSelector`]: gate + policy applied to a [`memory_core::ContextBundle`].
//!
//! ## Logging
//!
//! Selection emits `tracing` logs so prompt context can be inspected in production:
//! score distribution before gating, how many matches survived, and which
//! blocks the policy kept.

mod gate;
mod policy;
mod selector;

pub use gate::{RelevanceGate, DEFAULT_RELEVANCE_THRESHOLD};
pub use policy::{ParsePolicyError, SelectionPolicy};
pub use selector::{select_context, ContextSelector, SelectedContext};
