// src/ingest/providers/http_rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;

use crate::config::FetchConfig;
use crate::ingest::parse::parse_feed;
use crate::ingest::types::{FeedFetcher, RawFeedItem};

/// Fetches feeds over HTTP with one shared client (browser-like headers, bounded timeout).
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(cfg: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent).context("invalid user agent header")?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&cfg.accept).context("invalid accept header")?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("building feed http client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch_items(&self, url: &str) -> Result<Vec<RawFeedItem>> {
        let t0 = std::time::Instant::now();

        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?
            .text()
            .await
            .context("feed http .text()")?;

        let items = parse_feed(&body).with_context(|| format!("parsing feed {url}"))?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("news_feed_fetch_ms").record(ms);
        Ok(items)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
