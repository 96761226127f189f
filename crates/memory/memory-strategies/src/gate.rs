//! Relevance threshold over L2 distances.

use memory_core::ScoredTurn;
use tracing::{debug, info};

/// Default maximum L2 distance (exclusive) for a similarity match to count.
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.8;

/// Keeps similarity matches with `score < threshold`.
///
/// Scores are L2 distances, so lower is better and the comparison is strict:
/// a match exactly at the threshold is rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceGate {
    threshold: f32,
}

impl Default for RelevanceGate {
    fn default() -> Self {
        Self::new(DEFAULT_RELEVANCE_THRESHOLD)
    }
}

impl RelevanceGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn admits(&self, score: f32) -> bool {
        score < self.threshold
    }

    /// Returns the matches that pass the gate, preserving their order.
    pub fn filter(&self, similar: &[ScoredTurn]) -> Vec<ScoredTurn> {
        if similar.is_empty() {
            return Vec::new();
        }

        let min_s = similar.iter().map(|s| s.score).fold(f32::INFINITY, f32::min);
        let max_s = similar.iter().map(|s| s.score).fold(f32::NEG_INFINITY, f32::max);
        let mean_s = similar.iter().map(|s| s.score).sum::<f32>() / similar.len() as f32;
        debug!(
            count = similar.len(),
            score_min = %min_s,
            score_mean = %mean_s,
            score_max = %max_s,
            "step: relevance gate score distribution"
        );

        let kept: Vec<ScoredTurn> = similar
            .iter()
            .filter(|s| self.admits(s.score))
            .cloned()
            .collect();

        if kept.is_empty() {
            info!(
                threshold = self.threshold,
                count_before = similar.len(),
                "relevance gate: no similar turn below threshold"
            );
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        let gate = RelevanceGate::default();
        assert!(gate.admits(0.79));
        assert!(!gate.admits(0.8));
        assert!(!gate.admits(1.5));
    }

    #[test]
    fn test_filter_keeps_order() {
        let gate = RelevanceGate::new(1.0);
        let similar = vec![
            ScoredTurn::new("a", 0.1),
            ScoredTurn::new("b", 1.0),
            ScoredTurn::new("c", 0.5),
        ];
        let kept = gate.filter(&similar);
        let contents: Vec<&str> = kept.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "c"]);
    }

    #[test]
    fn test_filter_empty() {
        assert!(RelevanceGate::default().filter(&[]).is_empty());
    }
}
