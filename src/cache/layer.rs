//! TTL Cache Layer
//!
//! Read-through cache over a `StoreAdapter`. Fresh entries are served
//! without fetching; stale entries are refetched and only served again if
//! that fetch fails.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, Freshness};
use crate::clock::{Clock, SystemClock};
use crate::store::{PersistentStore, StoreAdapter};

// == Load Source ==
/// Which branch of `load` produced the returned data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSource {
    /// Served from a fresh entry, no fetch
    Fresh,
    /// Produced by a successful fetch
    Fetched,
    /// Fetch failed, served the stale entry
    StaleFallback,
    /// Fetch failed and nothing was cached
    Empty,
}

// == Loaded ==
/// Result of a `load` call. `data` is `None` when nothing is available.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: Option<T>,
    /// Always false once `load` has resolved
    pub loading: bool,
    pub source: LoadSource,
}

impl<T> Loaded<T> {
    fn done(data: Option<T>, source: LoadSource) -> Self {
        Self {
            data,
            loading: false,
            source,
        }
    }
}

// == TTL Cache ==
/// Cache handle. Clones share the store, clock and statistics.
///
/// Concurrent loads of the same key are not coalesced: each one reads the
/// store and may fetch and write independently, last writer wins.
#[derive(Clone)]
pub struct TtlCache<S> {
    adapter: StoreAdapter<S>,
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
    stats: Arc<RwLock<CacheStats>>,
}

impl<S: PersistentStore> TtlCache<S> {
    // == Constructor ==
    /// Creates a cache over `store` where every entry shares `ttl_ms`.
    pub fn new(store: S, ttl_ms: u64) -> Self {
        Self {
            adapter: StoreAdapter::new(store),
            ttl_ms,
            clock: Arc::new(SystemClock),
            stats: Arc::new(RwLock::new(CacheStats::new())),
        }
    }

    /// Replaces the wall clock, mainly for tests.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    pub fn adapter(&self) -> &StoreAdapter<S> {
        &self.adapter
    }

    // == Load ==
    /// Returns the best available data for `key`.
    ///
    /// 1. A fresh entry is returned as-is and `fetch` is not called.
    /// 2. Otherwise `fetch` runs; its result is persisted and returned.
    /// 3. If `fetch` fails, a stale entry is returned when one exists,
    ///    otherwise `data` is `None`.
    ///
    /// Never fails. Fetch errors are logged and absorbed.
    pub async fn load<T, F, Fut, E>(&self, key: &str, fetch: F) -> Loaded<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let stale = match self.adapter.get::<CacheEntry<T>>(key).await {
            Some(entry) => {
                let now = self.clock.now_ms();
                match entry.freshness(now, self.ttl_ms) {
                    Freshness::Fresh => {
                        debug!(key, age_ms = entry.age_ms(now), "serving fresh entry");
                        self.stats.write().await.record_fresh_hit();
                        return Loaded::done(Some(entry.value), LoadSource::Fresh);
                    }
                    Freshness::Stale => {
                        debug!(key, age_ms = entry.age_ms(now), "entry stale, refetching");
                        Some(entry)
                    }
                }
            }
            None => {
                debug!(key, "cache miss, fetching");
                None
            }
        };

        match fetch().await {
            Ok(value) => {
                self.stats.write().await.record_fetch(true);
                let value = self.persist(key, value).await;
                self.stats.write().await.record_fetched();
                Loaded::done(Some(value), LoadSource::Fetched)
            }
            Err(e) => {
                self.stats.write().await.record_fetch(false);
                match stale {
                    Some(entry) => {
                        warn!(key, error = %e, "fetch failed, serving stale entry");
                        self.stats.write().await.record_stale_fallback();
                        Loaded::done(Some(entry.value), LoadSource::StaleFallback)
                    }
                    None => {
                        warn!(key, error = %e, "fetch failed and nothing cached");
                        self.stats.write().await.record_empty();
                        Loaded::done(None, LoadSource::Empty)
                    }
                }
            }
        }
    }

    // == Refresh ==
    /// Fetches unconditionally and overwrites the entry for `key`.
    ///
    /// Unlike [`TtlCache::load`], a fetch failure is returned to the caller
    /// unchanged and no cached data is substituted.
    pub async fn refresh<T, F, Fut, E>(&self, key: &str, fetch: F) -> Result<T, E>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        match fetch().await {
            Ok(value) => {
                self.stats.write().await.record_fetch(true);
                let value = self.persist(key, value).await;
                self.stats.write().await.record_refresh();
                info!(key, "refreshed");
                Ok(value)
            }
            Err(e) => {
                self.stats.write().await.record_fetch(false);
                warn!(key, error = %e, "refresh failed");
                Err(e)
            }
        }
    }

    /// Writes a fresh entry stamped now. A failed write is counted and
    /// logged; the value is handed back either way.
    async fn persist<T: Serialize>(&self, key: &str, value: T) -> T {
        let entry = CacheEntry::new(value, self.clock.now_ms());
        if !self.adapter.save(key, &entry).await {
            warn!(key, "fetched value not persisted");
            self.stats.write().await.record_write_failure();
        }
        entry.value
    }

    // == Remove ==
    /// Drops the entry for `key` (logout, explicit cleanup).
    pub async fn remove(&self, key: &str) -> bool {
        self.adapter.remove(key).await
    }

    // == Clear ==
    /// Drops every entry whose key does not start with `preserve_prefix`.
    pub async fn clear(&self, preserve_prefix: &str) -> bool {
        self.adapter.clear_all(preserve_prefix).await
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    pub async fn reset_stats(&self) {
        *self.stats.write().await = CacheStats::new();
    }
}
