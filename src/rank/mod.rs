// src/rank/mod.rs
//! Post-merge pipeline: query filter → scoring/sort → truncation.

pub mod filter;
pub mod scoring;
pub mod shape;

use chrono::{DateTime, Utc};

use crate::ingest::types::NormalizedItem;
use crate::source_weights::SourceWeights;

pub use filter::filter_by_query;
pub use scoring::{rank, RankMode, ScoredItem};
pub use shape::shape;

/// Per-request ranking parameters.
#[derive(Clone, Debug)]
pub struct RankRequest<'a> {
    pub mode: RankMode,
    pub query: Option<&'a str>,
    pub limit: usize,
}

/// Ranked, capped items plus how many survived the query filter.
#[derive(Debug)]
pub struct PipelineOutput {
    pub matched: usize,
    pub items: Vec<NormalizedItem>,
}

/// Filter, rank and cap merged items. Output length is `min(limit, matches)`.
pub fn run_pipeline(
    items: Vec<NormalizedItem>,
    req: &RankRequest<'_>,
    weights: &SourceWeights,
    now: DateTime<Utc>,
) -> PipelineOutput {
    let filtered = filter_by_query(items, req.query);
    let matched = filtered.len();
    let ranked = rank(filtered, req.mode, weights, now);
    PipelineOutput {
        matched,
        items: shape(ranked, req.limit),
    }
}
