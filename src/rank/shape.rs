// src/rank/shape.rs
use crate::ingest::types::NormalizedItem;
use crate::rank::scoring::ScoredItem;

/// Cut the ranked list to `limit` and drop the scores. Order is kept as-is.
pub fn shape(ranked: Vec<ScoredItem>, limit: usize) -> Vec<NormalizedItem> {
    ranked.into_iter().take(limit).map(|s| s.item).collect()
}
