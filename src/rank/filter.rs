// src/rank/filter.rs
use crate::ingest::types::NormalizedItem;

/// Keep items whose `title + " " + summary` contains `query` (case-insensitive).
/// A blank query keeps everything.
pub fn filter_by_query(items: Vec<NormalizedItem>, query: Option<&str>) -> Vec<NormalizedItem> {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    if needle.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|it| {
            format!("{} {}", it.title, it.summary)
                .to_lowercase()
                .contains(&needle)
        })
        .collect()
}
