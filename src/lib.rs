// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod rank;
pub mod source_weights;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::NewsConfig;
pub use crate::ingest::types::{FeedFetcher, FeedSource, NormalizedItem, RawFeedItem};

use tracing::info;

/// Build the production router: config from disk/env, real HTTP fetcher.
pub fn app() -> anyhow::Result<axum::Router> {
    let config = NewsConfig::load_default()?;
    info!(
        feeds = config.feeds.len(),
        limit = config.limit,
        timeout_secs = config.fetch.timeout_secs,
        "news config loaded"
    );
    let state = AppState::with_http(config)?;
    Ok(router(state))
}
