// src/config/mod.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::types::FeedSource;
use crate::source_weights::SourceWeights;

pub const ENV_CONFIG_PATH: &str = "NEWS_CONFIG_PATH";
pub const ENV_LIMIT: &str = "NEWS_LIMIT";

pub const DEFAULT_CONFIG_TOML: &str = "config/news.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/news.json";

pub const DEFAULT_LIMIT: usize = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0 Safari/537.36";
const DEFAULT_ACCEPT: &str =
    "application/rss+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.7";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedSource>,
    /// Max items per response.
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub weights: SourceWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept")]
    pub accept: String,
}

/// CDN cache hints for `/api/news`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `s-maxage` when no source returned anything.
    #[serde(default = "default_empty_max_age")]
    pub empty_max_age_secs: u64,
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,
    #[serde(default = "default_swr")]
    pub stale_while_revalidate_secs: u64,
}

fn default_feeds() -> Vec<FeedSource> {
    vec![
        FeedSource::new("https://www.autosport.com/rss/f1/news", "Autosport"),
        FeedSource::new("https://www.motorsport.com/rss/f1/all/news", "Motorsport"),
        FeedSource::new("https://www.racefans.net/category/f1/feed/", "RaceFans"),
    ]
}
fn default_limit() -> usize {
    DEFAULT_LIMIT
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_accept() -> String {
    DEFAULT_ACCEPT.to_string()
}
fn default_empty_max_age() -> u64 {
    60
}
fn default_max_age() -> u64 {
    300
}
fn default_swr() -> u64 {
    60
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            limit: default_limit(),
            fetch: FetchConfig::default(),
            cache: CacheConfig::default(),
            weights: SourceWeights::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept: default_accept(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            empty_max_age_secs: default_empty_max_age(),
            max_age_secs: default_max_age(),
            stale_while_revalidate_secs: default_swr(),
        }
    }
}

impl CacheConfig {
    /// `Cache-Control` value for the "nothing fetched" response.
    pub fn empty_header(&self) -> String {
        format!("s-maxage={}", self.empty_max_age_secs)
    }

    /// `Cache-Control` value for a normal response.
    pub fn header(&self) -> String {
        format!(
            "s-maxage={}, stale-while-revalidate={}",
            self.max_age_secs, self.stale_while_revalidate_secs
        )
    }
}

impl NewsConfig {
    /// Load config from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading news config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing news config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load config using env var + fallbacks:
    /// 1) $NEWS_CONFIG_PATH
    /// 2) config/news.toml
    /// 3) config/news.json
    /// 4) built-in defaults
    ///
    /// `$NEWS_LIMIT` overrides the cap in every case.
    pub fn load_default() -> Result<Self> {
        let cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("NEWS_CONFIG_PATH points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_CONFIG_TOML).exists() {
            Self::load_from(Path::new(DEFAULT_CONFIG_TOML))?
        } else if Path::new(DEFAULT_CONFIG_JSON).exists() {
            Self::load_from(Path::new(DEFAULT_CONFIG_JSON))?
        } else {
            Self::default()
        };
        Ok(cfg.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(limit) = parse_limit_env(std::env::var(ENV_LIMIT).ok()) {
            self.limit = limit;
        }
        self
    }

    /// Drop unusable feeds and replace zero limits/timeouts with defaults.
    fn sanitized(mut self) -> Self {
        self.feeds.retain(|f| {
            let ok = !f.url.trim().is_empty() && !f.source.trim().is_empty();
            if !ok {
                tracing::warn!(url = %f.url, source = %f.source, "ignoring incomplete feed entry");
            }
            ok
        });
        if self.limit == 0 {
            self.limit = default_limit();
        }
        if self.fetch.timeout_secs == 0 {
            self.fetch.timeout_secs = default_timeout_secs();
        }
        self
    }
}

// positive integers only; anything else is ignored
fn parse_limit_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

fn parse_config(s: &str, hint_ext: &str) -> Result<NewsConfig> {
    if hint_ext == "json" {
        if let Ok(v) = serde_json::from_str(s) {
            return Ok(v);
        }
        return toml::from_str(s).map_err(|_| anyhow!("unsupported news config format"));
    }
    // TOML first for .toml and unknown extensions, then JSON.
    match toml::from_str(s) {
        Ok(v) => Ok(v),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!("unsupported news config format: {toml_err}")),
    }
}
