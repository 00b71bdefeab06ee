// src/ingest/normalize.rs
//! Field normalization: one raw feed entry in, one `NormalizedItem` out.
//!
//! Every field has a fallback chain ending in a safe default, so nothing here
//! can fail. Empty strings are treated like missing values.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::ingest::types::{MediaRef, NormalizedItem, RawFeedItem};

pub const UNTITLED: &str = "Untitled";
pub const PLACEHOLDER_LINK: &str = "#";

/// One way of finding an image for an item.
type ImageStrategy = fn(&RawFeedItem) -> Option<String>;

/// Tried in order; the first hit wins.
const IMAGE_STRATEGIES: &[ImageStrategy] = &[
    image_from_enclosure,
    image_from_media_content,
    image_from_media_thumbnail,
    image_from_html,
];

pub fn normalize_item(raw: &RawFeedItem, source: &str, now: DateTime<Utc>) -> NormalizedItem {
    let title = non_empty(raw.title.as_deref())
        .unwrap_or(UNTITLED)
        .to_string();

    let id = non_empty(raw.guid.as_deref())
        .or_else(|| non_empty(raw.link.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{source}:{title}"));

    let published_at = non_empty(raw.iso_date.as_deref())
        .or_else(|| non_empty(raw.pub_date.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

    let link = non_empty(raw.link.as_deref())
        .unwrap_or(PLACEHOLDER_LINK)
        .to_string();

    let summary = non_empty(raw.content_snippet.as_deref())
        .or_else(|| non_empty(raw.content.as_deref()))
        .unwrap_or_default()
        .to_string();

    NormalizedItem {
        id,
        title,
        source: source.to_string(),
        published_at,
        link,
        summary,
        image: resolve_image(raw),
    }
}

/// Run the image strategies and normalize whatever they found.
pub fn resolve_image(raw: &RawFeedItem) -> Option<String> {
    IMAGE_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(raw))
        .map(|url| normalize_image_url(&url))
}

/// `//host/path` becomes `https://host/path`; everything else passes through.
pub fn normalize_image_url(url: &str) -> String {
    match url.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

fn image_from_enclosure(raw: &RawFeedItem) -> Option<String> {
    first_url(&raw.enclosures)
}

fn image_from_media_content(raw: &RawFeedItem) -> Option<String> {
    first_url(&raw.media_content)
}

fn image_from_media_thumbnail(raw: &RawFeedItem) -> Option<String> {
    first_url(&raw.media_thumbnail)
}

fn image_from_html(raw: &RawFeedItem) -> Option<String> {
    static RE_IMG: OnceCell<Regex> = OnceCell::new();
    let re = RE_IMG.get_or_init(|| {
        Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).expect("img src regex")
    });

    [raw.content_encoded.as_deref(), raw.content.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|html| re.captures(html))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

// Only the first reference counts, even when there are several.
fn first_url(refs: &[MediaRef]) -> Option<String> {
    refs.first()
        .and_then(|r| non_empty(r.url.as_deref()))
        .map(str::to_string)
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
