//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{ApiError, FetchError, Result};
use crate::events::EventLog;
use crate::models::{
    validate_key, ClearQuery, ClearResponse, EventsResponse, HealthResponse, LoadResponse,
    RefreshResponse, RemoveResponse, StatsResponse,
};
use crate::store::{FileStore, SharedStore};
use crate::upstream::{HttpUpstream, Upstream};

/// Application state shared across all handlers.
///
/// Every field is a cheap handle onto shared state.
#[derive(Clone)]
pub struct AppState {
    /// TTL cache over the persistent store
    pub cache: TtlCache<SharedStore>,
    /// Source of fresh data
    pub upstream: Arc<dyn Upstream>,
    /// Analytics history
    pub events: EventLog,
    /// Prefix that clear-all leaves alone by default
    pub protected_prefix: String,
}

impl AppState {
    /// Creates a new AppState from already-built parts.
    pub fn new(
        cache: TtlCache<SharedStore>,
        upstream: Arc<dyn Upstream>,
        events: EventLog,
        protected_prefix: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            upstream,
            events,
            protected_prefix: protected_prefix.into(),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the file store and builds the HTTP upstream client.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = FileStore::open(&config.store_dir)
            .await
            .with_context(|| format!("opening store at {}", config.store_dir.display()))?;
        let upstream = HttpUpstream::new(&config.upstream_url, config.upstream_timeout())
            .context("building upstream client")?;

        let store: SharedStore = Arc::new(store);
        Ok(Self::new(
            TtlCache::new(store, config.ttl_ms),
            Arc::new(upstream),
            EventLog::new(config.event_capacity),
            config.protected_prefix.clone(),
        ))
    }

    /// Calls upstream for `path`, recording request and outcome events.
    async fn fetch(&self, path: &str) -> std::result::Result<Value, FetchError> {
        self.events.record(format!("API Request: GET {}", path)).await;

        let result = self.upstream.fetch(path).await;
        let event = match &result {
            Ok(_) => format!("API Success: {}", path),
            Err(FetchError::Status { status, .. }) => format!("API Error {}: {}", status, path),
            Err(FetchError::Network(msg)) => format!("Network Error: {}", msg),
            Err(FetchError::Decode(msg)) => format!("API Error invalid payload: {} ({})", path, msg),
        };
        self.events.record(event).await;

        result
    }
}

fn checked_key(key: String) -> Result<String> {
    match validate_key(&key) {
        Some(error_msg) => Err(ApiError::InvalidRequest(error_msg)),
        None => Ok(key),
    }
}

/// Handler for GET /resources/*key
///
/// Loads through the cache. Never fails for upstream reasons: a failed
/// fetch yields stale data or `data: null`.
pub async fn load_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LoadResponse>> {
    let key = checked_key(key)?;

    let loaded = state.cache.load(&key, || state.fetch(&key)).await;

    Ok(Json(LoadResponse::new(key, loaded)))
}

/// Handler for POST /refresh/*key
///
/// Fetches unconditionally; an upstream failure is reported as 502.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RefreshResponse>> {
    let key = checked_key(key)?;

    let data = state.cache.refresh(&key, || state.fetch(&key)).await?;

    Ok(Json(RefreshResponse::new(key, data)))
}

/// Handler for DELETE /resources/*key
pub async fn remove_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<RemoveResponse>> {
    let key = checked_key(key)?;

    if !state.cache.remove(&key).await {
        return Err(ApiError::Store(format!("could not remove '{}'", key)));
    }

    Ok(Json(RemoveResponse::new(key)))
}

/// Handler for DELETE /resources
///
/// Removes every key outside the preserved prefix.
pub async fn clear_handler(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<ClearResponse>> {
    let prefix = query
        .preserve_prefix
        .unwrap_or_else(|| state.protected_prefix.clone());

    if !state.cache.clear(&prefix).await {
        return Err(ApiError::Store("clear-all did not complete".to_string()));
    }

    Ok(Json(ClearResponse::new(prefix)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::new(stats, state.cache.ttl_ms()))
}

/// Handler for GET /events
pub async fn events_handler(State(state): State<AppState>) -> Json<EventsResponse> {
    let history = state.events.history().await;
    Json(EventsResponse::new(&history))
}

/// Handler for DELETE /events
pub async fn clear_events_handler(State(state): State<AppState>) -> Json<EventsResponse> {
    state.events.clear().await;
    Json(EventsResponse::new(&[]))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
