//! Applies the relevance gate and a selection policy to a retrieved bundle.

use memory_core::{ContextBundle, ScoredTurn};
use tracing::info;

use crate::gate::RelevanceGate;
use crate::policy::SelectionPolicy;

/// Context blocks chosen for one prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedContext {
    /// Recent turn contents, oldest first.
    pub recent: Vec<String>,
    /// Similar turns that passed the gate, most similar first.
    pub similar: Vec<ScoredTurn>,
}

impl SelectedContext {
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty() && self.similar.is_empty()
    }

    /// Contents of the similar block.
    pub fn similar_contents(&self) -> Vec<&str> {
        self.similar.iter().map(|s| s.content.as_str()).collect()
    }
}

/// Gate and policy configured once, applied per query.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContextSelector {
    pub gate: RelevanceGate,
    pub policy: SelectionPolicy,
}

impl ContextSelector {
    pub fn new(gate: RelevanceGate, policy: SelectionPolicy) -> Self {
        Self { gate, policy }
    }

    pub fn select(&self, bundle: &ContextBundle) -> SelectedContext {
        select_context(bundle, &self.gate, self.policy)
    }
}

/// Gates `bundle.similar` and keeps the blocks `policy` asks for.
pub fn select_context(
    bundle: &ContextBundle,
    gate: &RelevanceGate,
    policy: SelectionPolicy,
) -> SelectedContext {
    let valid_similar = gate.filter(bundle.similar());
    let recent = bundle.recent();

    let selected = match policy {
        SelectionPolicy::Exclusive => {
            if !valid_similar.is_empty() {
                SelectedContext {
                    recent: Vec::new(),
                    similar: valid_similar,
                }
            } else {
                SelectedContext {
                    recent: recent.to_vec(),
                    similar: Vec::new(),
                }
            }
        }
        SelectionPolicy::RecencyFirst => {
            if !recent.is_empty() {
                SelectedContext {
                    recent: recent.to_vec(),
                    similar: Vec::new(),
                }
            } else {
                SelectedContext {
                    recent: Vec::new(),
                    similar: valid_similar,
                }
            }
        }
        SelectionPolicy::Hybrid => SelectedContext {
            recent: recent.to_vec(),
            similar: valid_similar,
        },
    };

    info!(
        policy = %policy,
        threshold = gate.threshold(),
        similar_retrieved = bundle.similar().len(),
        recent_retrieved = recent.len(),
        similar_kept = selected.similar.len(),
        recent_kept = selected.recent.len(),
        degraded = bundle.is_degraded(),
        "step: context selection done"
    );
    selected
}
