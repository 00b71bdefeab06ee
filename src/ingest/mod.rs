// src/ingest/mod.rs
pub mod normalize;
pub mod parse;
pub mod providers;
pub mod types;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::ingest::normalize::normalize_item;
use crate::ingest::types::{FeedFetcher, FeedSource, NormalizedItem};

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("news_requests_total", "Requests served by /api/news.");
        describe_counter!(
            "news_feed_items_total",
            "Items normalized from successfully fetched feeds."
        );
        describe_counter!(
            "news_feed_errors_total",
            "Feed fetch/parse failures absorbed as empty sources."
        );
        describe_counter!(
            "news_empty_responses_total",
            "Requests where no source returned anything."
        );
        describe_histogram!("news_feed_fetch_ms", "Feed fetch + parse time in milliseconds.");
    });
}

/// Fetch and normalize one source. Failures never escape: they become an empty Vec.
pub async fn fetch_source(
    fetcher: &dyn FeedFetcher,
    feed: &FeedSource,
    now: DateTime<Utc>,
) -> Vec<NormalizedItem> {
    match fetcher.fetch_items(&feed.url).await {
        Ok(raw) => {
            let items: Vec<NormalizedItem> = raw
                .iter()
                .map(|it| normalize_item(it, &feed.source, now))
                .collect();
            tracing::debug!(
                target: "ingest",
                source = %feed.source,
                fetcher = fetcher.name(),
                items = items.len(),
                "feed fetched"
            );
            counter!("news_feed_items_total", "source" => feed.source.clone())
                .increment(items.len() as u64);
            items
        }
        Err(e) => {
            tracing::warn!(
                target: "ingest",
                error = ?e,
                source = %feed.source,
                url = %feed.url,
                "feed failed, skipping source"
            );
            counter!("news_feed_errors_total", "source" => feed.source.clone()).increment(1);
            Vec::new()
        }
    }
}

/// Fetch every source concurrently, wait for all of them, and concatenate.
///
/// Items keep their in-feed order; sources are appended in configured order.
/// "Every source failed" is just an empty result.
pub async fn aggregate(
    fetcher: &dyn FeedFetcher,
    feeds: &[FeedSource],
    now: DateTime<Utc>,
) -> Vec<NormalizedItem> {
    ensure_metrics_described();

    let per_source = join_all(feeds.iter().map(|f| fetch_source(fetcher, f, now))).await;
    per_source.into_iter().flatten().collect()
}
