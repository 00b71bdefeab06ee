//! Recency/source-weighted ranking.
//!
//! - `ageHours = max(0.1, (now - publishedAt) / 1h)`; unparsable dates count as "now".
//! - `recent`:   score = -ageHours (newest first, weights ignored)
//! - `balanced`: score = exp(-ageHours / 18) * sourceWeight
//!
//! Sorting is stable, so ties keep merge order.

use chrono::{DateTime, Utc};

use crate::ingest::types::NormalizedItem;
use crate::source_weights::SourceWeights;

/// Floor for item age, in hours.
pub const MIN_AGE_HOURS: f64 = 0.1;
/// Scale of the exponential recency decay, in hours.
pub const DECAY_HOURS: f64 = 18.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RankMode {
    #[default]
    Balanced,
    Recent,
}

impl RankMode {
    /// `"recent"` selects recency-only ranking; anything else is balanced.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("recent") => RankMode::Recent,
            _ => RankMode::Balanced,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankMode::Balanced => "balanced",
            RankMode::Recent => "recent",
        }
    }
}

/// An item plus its per-request rank key. Never serialized.
#[derive(Clone, Debug)]
pub struct ScoredItem {
    pub item: NormalizedItem,
    pub score: f64,
}

/// Parse an item timestamp (ISO-8601 / RFC 3339, or RFC 2822 as found in raw pubDate).
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Age in hours, clamped to `MIN_AGE_HOURS`. Future and unparsable dates clamp too.
pub fn age_hours(published_at: &str, now: DateTime<Utc>) -> f64 {
    let published = parse_published(published_at).unwrap_or(now);
    let hours = (now - published).num_milliseconds() as f64 / 3_600_000.0;
    hours.max(MIN_AGE_HOURS)
}

pub fn score(age_hours: f64, source_weight: f64, mode: RankMode) -> f64 {
    match mode {
        RankMode::Recent => -age_hours,
        RankMode::Balanced => (-age_hours / DECAY_HOURS).exp() * source_weight,
    }
}

/// Score every item and sort by descending score.
pub fn rank(
    items: Vec<NormalizedItem>,
    mode: RankMode,
    weights: &SourceWeights,
    now: DateTime<Utc>,
) -> Vec<ScoredItem> {
    let mut scored: Vec<ScoredItem> = items
        .into_iter()
        .map(|item| {
            let age = age_hours(&item.published_at, now);
            let score = score(age, weights.weight_for(&item.source), mode);
            ScoredItem { item, score }
        })
        .collect();

    // Vec::sort_by is stable: equal scores keep merge order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
