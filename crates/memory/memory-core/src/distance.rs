//! Brute-force L2 ranking shared by the turn stores.
//!
//! Exact distance against every stored embedding. Fine for the expected
//! history size (up to ~10^5 short turns); there is no index.

use crate::types::{ScoredTurn, Turn};

/// Euclidean distance between two vectors of equal length.
///
/// Returns `None` when the dimensions differ.
pub fn l2_distance(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    let sum: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum();
    Some(sum.sqrt())
}

/// Scores every turn that carries an embedding of the query's dimension and
/// returns the `limit` nearest, ascending by distance.
///
/// The sort is stable, so equal distances keep the iteration order of `turns`.
pub fn rank_nearest<'a, I>(query: &[f32], turns: I, limit: usize) -> Vec<ScoredTurn>
where
    I: IntoIterator<Item = &'a Turn>,
{
    let mut scored: Vec<ScoredTurn> = turns
        .into_iter()
        .filter_map(|turn| {
            let embedding = turn.embedding.as_deref()?;
            let score = l2_distance(query, embedding)?;
            Some(ScoredTurn::new(turn.content.clone(), score))
        })
        .collect();

    scored.sort_by(|a, b| a.score.total_cmp(&b.score));
    scored.truncate(limit);
    scored
}
