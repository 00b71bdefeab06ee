// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A media reference read from an attribute-style `url` field
/// (`<enclosure url=".."/>`, `<media:content url=".."/>`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: Option<String>,
}

impl MediaRef {
    pub fn new(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
        }
    }
}

/// One entry as yielded by the feed parser. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFeedItem {
    pub guid: Option<String>,
    pub link: Option<String>,
    pub title: Option<String>,
    /// Publish time already parsed and re-emitted as ISO-8601 UTC.
    pub iso_date: Option<String>,
    /// Publish time exactly as found in the document.
    pub pub_date: Option<String>,
    /// Plain-text rendition of `content`.
    pub content_snippet: Option<String>,
    pub content: Option<String>,
    /// Full HTML body (`content:encoded`), if the feed ships one.
    pub content_encoded: Option<String>,
    #[serde(default)]
    pub enclosures: Vec<MediaRef>,
    #[serde(default)]
    pub media_content: Vec<MediaRef>,
    #[serde(default)]
    pub media_thumbnail: Vec<MediaRef>,
}

/// Canonical news item returned by `/api/news`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    pub id: String,
    pub title: String,
    pub source: String,
    pub published_at: String,
    pub link: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A configured origin: feed URL plus the display label stamped on its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub url: String,
    pub source: String,
}

impl FeedSource {
    pub fn new(url: &str, source: &str) -> Self {
        Self {
            url: url.to_string(),
            source: source.to_string(),
        }
    }
}

/// The feed retrieval collaborator: turns a feed URL into raw entries.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch_items(&self, url: &str) -> Result<Vec<RawFeedItem>>;
    fn name(&self) -> &'static str;
}
