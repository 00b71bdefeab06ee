// src/ingest/providers/mod.rs
pub mod fixture;
pub mod http_rss;

pub use fixture::FixtureFeedFetcher;
pub use http_rss::HttpFeedFetcher;
