//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, LoadSource, Loaded};
use crate::events::EventRecord;

/// Response body for a load (GET /resources/*key)
///
/// `data` is null when nothing is cached and the fetch failed.
#[derive(Debug, Clone, Serialize)]
pub struct LoadResponse {
    pub key: String,
    pub data: Option<Value>,
    pub loading: bool,
    pub source: LoadSource,
}

impl LoadResponse {
    pub fn new(key: impl Into<String>, loaded: Loaded<Value>) -> Self {
        Self {
            key: key.into(),
            data: loaded.data,
            loading: loaded.loading,
            source: loaded.source,
        }
    }
}

/// Response body for a refresh (POST /refresh/*key)
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub key: String,
    pub data: Value,
}

impl RefreshResponse {
    pub fn new(key: impl Into<String>, data: Value) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }
}

/// Response body for removing one entry (DELETE /resources/*key)
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    /// Success message
    pub message: String,
    /// The key that was removed
    pub key: String,
}

impl RemoveResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed successfully", key),
            key,
        }
    }
}

/// Response body for clear-all (DELETE /resources)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub preserved_prefix: String,
}

impl ClearResponse {
    pub fn new(preserved_prefix: impl Into<String>) -> Self {
        let preserved_prefix = preserved_prefix.into();
        Self {
            message: format!("Cleared all keys except '{}*'", preserved_prefix),
            preserved_prefix,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Total completed loads
    pub loads: u64,
    /// Share of loads served fresh
    pub hit_rate: f64,
    /// Configured entry TTL in milliseconds
    pub ttl_ms: u64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: CacheStats, ttl_ms: u64) -> Self {
        Self {
            loads: stats.loads(),
            hit_rate: stats.hit_rate(),
            stats,
            ttl_ms,
        }
    }
}

/// Response body for the events endpoint (GET /events)
#[derive(Debug, Clone, Serialize)]
pub struct EventsResponse {
    pub count: usize,
    /// Rendered `[timestamp] message` lines, newest first
    pub events: Vec<String>,
}

impl EventsResponse {
    pub fn new(records: &[EventRecord]) -> Self {
        Self {
            count: records.len(),
            events: records.iter().map(EventRecord::line).collect(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_response_serialize_empty() {
        let loaded = Loaded {
            data: None,
            loading: false,
            source: LoadSource::Empty,
        };
        let json = serde_json::to_value(LoadResponse::new("products", loaded)).unwrap();
        assert_eq!(json["data"], Value::Null);
        assert_eq!(json["loading"], false);
        assert_eq!(json["source"], "empty");
    }

    #[test]
    fn test_load_response_stale_source_is_snake_case() {
        let loaded = Loaded {
            data: Some(json!([1, 2])),
            loading: false,
            source: LoadSource::StaleFallback,
        };
        let json = serde_json::to_value(LoadResponse::new("products", loaded)).unwrap();
        assert_eq!(json["source"], "stale_fallback");
        assert_eq!(json["data"], json!([1, 2]));
    }

    #[test]
    fn test_remove_response_serialize() {
        let resp = RemoveResponse::new("cart");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("cart"));
        assert!(json.contains("removed"));
    }

    #[test]
    fn test_stats_response_flattens_counters() {
        let mut stats = CacheStats::new();
        stats.record_fresh_hit();
        stats.record_fetched();
        let json = serde_json::to_value(StatsResponse::new(stats, 1_800_000)).unwrap();
        assert_eq!(json["fresh_hits"], 1);
        assert_eq!(json["loads"], 2);
        assert_eq!(json["hit_rate"], 0.5);
        assert_eq!(json["ttl_ms"], 1_800_000);
    }

    #[test]
    fn test_events_response_counts() {
        let records = vec![EventRecord {
            at: chrono::Utc::now(),
            message: "API Success: products".to_string(),
        }];
        let resp = EventsResponse::new(&records);
        assert_eq!(resp.count, 1);
        assert!(resp.events[0].ends_with("API Success: products"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
