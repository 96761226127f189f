//! Selection policy behaviour over hand-built context bundles.

use memory_core::{ContextBundle, MemoryError, Retrieval, ScoredTurn};
use memory_strategies::{select_context, ContextSelector, RelevanceGate, SelectionPolicy};

fn bundle(similar: Vec<(&str, f32)>, recent: Vec<&str>) -> ContextBundle {
    ContextBundle {
        similar: Retrieval::Found(
            similar
                .into_iter()
                .map(|(c, s)| ScoredTurn::new(c, s))
                .collect(),
        ),
        recent: Retrieval::Found(recent.into_iter().map(String::from).collect()),
    }
}

/// **Test: Exclusive keeps only similar turns when any pass the gate.**
#[test]
fn test_exclusive_prefers_similar() {
    let b = bundle(vec![("flats in Leeds", 0.3)], vec!["hello", "hi"]);
    let selected = select_context(&b, &RelevanceGate::default(), SelectionPolicy::Exclusive);
    assert!(selected.recent.is_empty());
    assert_eq!(selected.similar_contents(), vec!["flats in Leeds"]);
}

/// **Test: All scores at or above the threshold make Exclusive fall back to recent.**
#[test]
fn test_exclusive_falls_back_to_recent_when_gate_rejects_all() {
    let b = bundle(vec![("far", 0.8), ("farther", 1.7)], vec!["first", "second"]);
    let selected = select_context(&b, &RelevanceGate::default(), SelectionPolicy::Exclusive);
    assert!(selected.similar.is_empty());
    assert_eq!(selected.recent, vec!["first", "second"]);
}

/// **Test: Exclusive with nothing usable selects no context.**
#[test]
fn test_exclusive_empty() {
    let b = bundle(vec![("far", 2.0)], vec![]);
    let selected = select_context(&b, &RelevanceGate::default(), SelectionPolicy::Exclusive);
    assert!(selected.is_empty());
}

/// **Test: RecencyFirst keeps only recent turns when there are any.**
#[test]
fn test_recency_first_prefers_recent() {
    let b = bundle(vec![("close", 0.1)], vec!["earlier question"]);
    let selected = select_context(&b, &RelevanceGate::default(), SelectionPolicy::RecencyFirst);
    assert_eq!(selected.recent, vec!["earlier question"]);
    assert!(selected.similar.is_empty());
}

/// **Test: RecencyFirst falls back to gated similar turns.**
#[test]
fn test_recency_first_falls_back_to_similar() {
    let b = bundle(vec![("close", 0.1), ("far", 0.9)], vec![]);
    let selected = select_context(&b, &RelevanceGate::default(), SelectionPolicy::RecencyFirst);
    assert_eq!(selected.similar_contents(), vec!["close"]);
}

/// **Test: Hybrid keeps both blocks and still applies the gate.**
#[test]
fn test_hybrid_keeps_both_blocks() {
    let b = bundle(vec![("close", 0.2), ("far", 0.95)], vec!["a", "b"]);
    let selector = ContextSelector::default();
    assert_eq!(selector.policy, SelectionPolicy::Hybrid);
    let selected = selector.select(&b);
    assert_eq!(selected.recent, vec!["a", "b"]);
    assert_eq!(selected.similar_contents(), vec!["close"]);
}

/// **Test: A degraded bundle selects nothing under every policy.**
#[test]
fn test_degraded_bundle_selects_nothing() {
    let b = ContextBundle {
        similar: Retrieval::Degraded(MemoryError::Embedding("offline".into())),
        recent: Retrieval::Degraded(MemoryError::Store("offline".into())),
    };
    for policy in [
        SelectionPolicy::Exclusive,
        SelectionPolicy::RecencyFirst,
        SelectionPolicy::Hybrid,
    ] {
        assert!(select_context(&b, &RelevanceGate::default(), policy).is_empty());
    }
}
