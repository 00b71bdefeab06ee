use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use metrics::counter;
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};
use tracing::{error, info};

use crate::config::NewsConfig;
use crate::ingest::{
    self,
    providers::HttpFeedFetcher,
    types::{FeedFetcher, NormalizedItem},
};
use crate::rank::{self, RankMode, RankRequest};

const FAILURE_MESSAGE: &str = "Failed to fetch news";

/// Shared, read-only request context. No mutable state lives here.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<NewsConfig>,
    pub fetcher: Arc<dyn FeedFetcher>,
}

impl AppState {
    pub fn new(config: NewsConfig, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }

    /// State backed by the real HTTP fetcher.
    pub fn with_http(config: NewsConfig) -> anyhow::Result<Self> {
        let fetcher = HttpFeedFetcher::new(&config.fetch)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/news", get(news))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Any error that escapes the pipeline. Source failures never get here.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = ?self.0, "news pipeline failed");
        failure_response()
    }
}

fn failure_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": FAILURE_MESSAGE })),
    )
        .into_response()
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!(panic = detail, "news pipeline panicked");
    failure_response()
}

/// GET /api/news?mode=balanced|recent&q=...
async fn news(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let cfg = &state.config;
    let mode = RankMode::from_param(params.get("mode").map(String::as_str));
    counter!("news_requests_total", "mode" => mode.as_str()).increment(1);

    let merged = ingest::aggregate(state.fetcher.as_ref(), &cfg.feeds, now).await;

    // Nothing came back at all: short cache so the CDN retries soon.
    if merged.is_empty() {
        counter!("news_empty_responses_total").increment(1);
        info!(mode = mode.as_str(), "no items from any source");
        let empty: Vec<NormalizedItem> = Vec::new();
        return json_response(&empty, &cfg.cache.empty_header());
    }

    let merged_count = merged.len();
    let req = RankRequest {
        mode,
        query: params.get("q").map(String::as_str),
        limit: cfg.limit,
    };
    let out = rank::run_pipeline(merged, &req, &cfg.weights, now);

    info!(
        mode = mode.as_str(),
        merged = merged_count,
        filtered = out.matched,
        returned = out.items.len(),
        "news served"
    );
    json_response(&out.items, &cfg.cache.header())
}

fn json_response<T: Serialize>(body: &T, cache_control: &str) -> Result<Response, ApiError> {
    let bytes = serde_json::to_vec(body).context("serializing news items")?;
    let cache = HeaderValue::from_str(cache_control).context("invalid cache-control value")?;
    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (CACHE_CONTROL, cache),
        ],
        bytes,
    )
        .into_response())
}
