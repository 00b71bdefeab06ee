// src/ingest/providers/fixture.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use crate::ingest::parse::parse_feed;
use crate::ingest::types::{FeedFetcher, RawFeedItem};

/// Serves feed documents from memory, keyed by URL. Unknown URLs fail like a dead host.
#[derive(Default)]
pub struct FixtureFeedFetcher {
    docs: HashMap<String, String>,
}

impl FixtureFeedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, url: &str, xml: &str) -> Self {
        self.docs.insert(url.to_string(), xml.to_string());
        self
    }
}

#[async_trait]
impl FeedFetcher for FixtureFeedFetcher {
    async fn fetch_items(&self, url: &str) -> Result<Vec<RawFeedItem>> {
        let xml = self
            .docs
            .get(url)
            .ok_or_else(|| anyhow!("no fixture for {url}"))?;
        parse_feed(xml)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
