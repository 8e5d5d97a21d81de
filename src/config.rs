//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_TTL_MS;
use crate::events::DEFAULT_EVENT_CAPACITY;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Time-to-live in milliseconds shared by every cache entry
    pub ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Directory backing the file store
    pub store_dir: PathBuf,
    /// Base URL of the upstream the fetcher talks to
    pub upstream_url: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout_secs: u64,
    /// Key prefix that survives a full clear
    pub protected_prefix: String,
    /// Number of analytics events retained by the event log
    pub event_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Entry TTL in milliseconds (default: 1800000, 30 minutes)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `STORE_DIR` - File store directory (default: ./cache-data)
    /// - `UPSTREAM_URL` - Upstream base URL (default: https://dummyjson.com)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream timeout (default: 10)
    /// - `PROTECTED_PREFIX` - Prefix kept by clear-all (default: @app:)
    /// - `EVENT_CAPACITY` - Retained analytics events (default: 100)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from any variable source, e.g. a map in tests.
    /// Missing or unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        Self {
            ttl_ms: parse(lookup("CACHE_TTL_MS")).unwrap_or(defaults.ttl_ms),
            server_port: parse(lookup("SERVER_PORT")).unwrap_or(defaults.server_port),
            store_dir: non_empty("STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
            upstream_url: non_empty("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            upstream_timeout_secs: parse(lookup("UPSTREAM_TIMEOUT_SECS"))
                .unwrap_or(defaults.upstream_timeout_secs),
            protected_prefix: lookup("PROTECTED_PREFIX").unwrap_or(defaults.protected_prefix),
            event_capacity: parse(lookup("EVENT_CAPACITY")).unwrap_or(defaults.event_capacity),
        }
    }

    /// Upstream timeout as a Duration.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            server_port: 3000,
            store_dir: PathBuf::from("./cache-data"),
            upstream_url: "https://dummyjson.com".to_string(),
            upstream_timeout_secs: 10,
            protected_prefix: "@app:".to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}
