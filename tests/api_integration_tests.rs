//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against an
//! in-process upstream whose availability can be toggled.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use market_cache::{
    api::create_router, clock::ManualClock, error::FetchError, store::SharedStore,
    upstream::Upstream, AppState, EventLog, MemoryStore, PersistentStore, TtlCache,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const TTL_MS: u64 = 1_800_000;

// == Helper Types ==

/// Upstream serving a growing product list; can be taken offline.
#[derive(Default)]
struct CatalogUpstream {
    offline: AtomicBool,
    not_found: AtomicBool,
    calls: AtomicUsize,
}

#[async_trait]
impl Upstream for CatalogUpstream {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Network("connection refused".to_string()));
        }
        if self.not_found.load(Ordering::SeqCst) {
            return Err(FetchError::Status {
                status: 404,
                path: path.to_string(),
            });
        }
        Ok(json!({ "path": path, "total": 10 + 2 * n }))
    }
}

struct TestApp {
    router: Router,
    upstream: Arc<CatalogUpstream>,
    store: MemoryStore,
    clock: ManualClock,
}

// == Helper Functions ==

fn create_test_app() -> TestApp {
    let upstream = Arc::new(CatalogUpstream::default());
    let store = MemoryStore::new();
    let clock = ManualClock::new(0);
    let shared: SharedStore = Arc::new(store.clone());
    let cache = TtlCache::new(shared, TTL_MS).with_clock(clock.clone());
    let state = AppState::new(cache, upstream.clone(), EventLog::default(), "@app:");

    TestApp {
        router: create_router(state),
        upstream,
        store,
        clock,
    }
}

async fn send(app: &TestApp, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// == Load Endpoint Tests ==

#[tokio::test]
async fn test_load_miss_fetches_and_caches() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/resources/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "products");
    assert_eq!(json["source"], "fetched");
    assert_eq!(json["loading"], false);
    assert_eq!(json["data"]["total"], 10);
    assert!(app.store.get("products").await.unwrap().is_some());
}

#[tokio::test]
async fn test_load_nested_path_key() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/resources/products/42").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "products/42");
    assert_eq!(json["data"]["path"], "products/42");
}

#[tokio::test]
async fn test_products_timeline() {
    let app = create_test_app();

    // t=0 refresh stores 10 items
    let (status, json) = send(&app, "POST", "/refresh/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 10);

    // t=10min served fresh, no upstream call
    app.clock.set(600_000);
    let (_, json) = send(&app, "GET", "/resources/products").await;
    assert_eq!(json["source"], "fresh");
    assert_eq!(json["data"]["total"], 10);
    assert_eq!(app.upstream.calls.load(Ordering::SeqCst), 1);

    // Past the TTL one fetch replaces the entry with 12 items
    app.clock.set(2_000_000);
    let (_, json) = send(&app, "GET", "/resources/products").await;
    assert_eq!(json["source"], "fetched");
    assert_eq!(json["data"]["total"], 12);
    assert_eq!(app.upstream.calls.load(Ordering::SeqCst), 2);

    let raw = app.store.get("products").await.unwrap().unwrap();
    let stored: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored["storedAt"], 2_000_000);
}

#[tokio::test]
async fn test_load_stale_fallback_when_offline() {
    let app = create_test_app();
    send(&app, "GET", "/resources/products").await;

    app.clock.set(TTL_MS as i64 + 1);
    app.upstream.offline.store(true, Ordering::SeqCst);
    let (status, json) = send(&app, "GET", "/resources/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["source"], "stale_fallback");
    assert_eq!(json["data"]["total"], 10);
}

#[tokio::test]
async fn test_load_cold_offline_returns_null_data() {
    let app = create_test_app();
    app.upstream.offline.store(true, Ordering::SeqCst);

    let (status, json) = send(&app, "GET", "/resources/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], Value::Null);
    assert_eq!(json["source"], "empty");
}

#[tokio::test]
async fn test_load_recovers_from_corrupted_record() {
    let app = create_test_app();
    app.store
        .set("products", "{\"value\": [1, 2".to_string())
        .await
        .unwrap();

    let (_, json) = send(&app, "GET", "/resources/products").await;

    assert_eq!(json["source"], "fetched");
    let raw = app.store.get("products").await.unwrap().unwrap();
    assert!(serde_json::from_str::<Value>(&raw).is_ok());
}

// == Refresh Endpoint Tests ==

#[tokio::test]
async fn test_refresh_failure_is_bad_gateway_even_with_cache() {
    let app = create_test_app();
    send(&app, "GET", "/resources/products").await;
    app.upstream.offline.store(true, Ordering::SeqCst);

    let (status, json) = send(&app, "POST", "/refresh/products").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_refresh_bypasses_fresh_entry() {
    let app = create_test_app();
    send(&app, "GET", "/resources/products").await;

    let (status, json) = send(&app, "POST", "/refresh/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 12);
    assert_eq!(app.upstream.calls.load(Ordering::SeqCst), 2);
}

// == Remove / Clear Endpoint Tests ==

#[tokio::test]
async fn test_remove_endpoint() {
    let app = create_test_app();
    send(&app, "GET", "/resources/cart").await;

    let (status, json) = send(&app, "DELETE", "/resources/cart").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "cart");
    assert!(app.store.get("cart").await.unwrap().is_none());
}

#[tokio::test]
async fn test_clear_endpoint_keeps_protected_keys() {
    let app = create_test_app();
    app.store
        .set("@app:settings", "{}".to_string())
        .await
        .unwrap();
    send(&app, "GET", "/resources/products").await;
    send(&app, "GET", "/resources/cart").await;

    let (status, json) = send(&app, "DELETE", "/resources").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["preserved_prefix"], "@app:");
    assert_eq!(
        app.store.keys().await.unwrap(),
        vec!["@app:settings".to_string()]
    );
}

#[tokio::test]
async fn test_clear_endpoint_custom_prefix() {
    let app = create_test_app();
    send(&app, "GET", "/resources/products").await;
    send(&app, "GET", "/resources/cart").await;

    let (status, _) = send(&app, "DELETE", "/resources?preserve_prefix=cart").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.store.keys().await.unwrap(), vec!["cart".to_string()]);
}

// == Stats / Events / Health Endpoint Tests ==

#[tokio::test]
async fn test_stats_reflect_load_outcomes() {
    let app = create_test_app();
    send(&app, "GET", "/resources/products").await;
    send(&app, "GET", "/resources/products").await;

    let (status, json) = send(&app, "GET", "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["fetched"], 1);
    assert_eq!(json["fresh_hits"], 1);
    assert_eq!(json["hit_rate"], 0.5);
    assert_eq!(json["ttl_ms"], TTL_MS);
}

#[tokio::test]
async fn test_events_record_upstream_outcomes() {
    let app = create_test_app();
    app.upstream.not_found.store(true, Ordering::SeqCst);
    send(&app, "GET", "/resources/products/999").await;

    let (status, json) = send(&app, "GET", "/events").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    let newest = json["events"][0].as_str().unwrap();
    assert!(newest.ends_with("API Error 404: products/999"));

    let (_, json) = send(&app, "DELETE", "/events").await;
    assert_eq!(json["count"], 0);
    let (_, json) = send(&app, "GET", "/events").await;
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
