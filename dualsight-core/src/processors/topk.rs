//! Top-k selection over probability vectors.

use std::cmp::Ordering;

/// A selected score and its position in the source vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredIndex {
    pub index: usize,
    pub score: f32,
}

/// Orders by score descending, then by index ascending so equal scores rank
/// the lower original index first.
fn rank_order(a: &ScoredIndex, b: &ScoredIndex) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

/// Returns the `k` highest scores, highest first.
///
/// Returns `min(k, scores.len())` entries; an empty input or `k == 0` yields
/// an empty result.
pub fn top_k(scores: &[f32], k: usize) -> Vec<ScoredIndex> {
    let k = k.min(scores.len());
    if k == 0 {
        return Vec::new();
    }

    let mut indexed: Vec<ScoredIndex> = scores
        .iter()
        .enumerate()
        .map(|(index, &score)| ScoredIndex { index, score })
        .collect();

    if k < indexed.len() {
        indexed.select_nth_unstable_by(k - 1, rank_order);
        indexed.truncate(k);
    }
    indexed.sort_unstable_by(rank_order);
    indexed
}
