//! Cache Statistics Module
//!
//! Tracks how each load and refresh was resolved.

use serde::Serialize;

// == Cache Stats ==
/// Outcome counters for one cache instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Loads answered from a fresh entry without fetching
    pub fresh_hits: u64,
    /// Loads answered by a successful fetch (miss or stale)
    pub fetched: u64,
    /// Loads that served a stale entry after the fetch failed
    pub stale_fallbacks: u64,
    /// Loads that ended with no data at all
    pub empty_results: u64,
    /// Fetch invocations, from both load and refresh
    pub fetches: u64,
    /// Fetch invocations that failed
    pub fetch_failures: u64,
    /// Successful refreshes
    pub refreshes: u64,
    /// Fetched values that could not be persisted
    pub write_failures: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Share of loads served from a fresh entry.
    ///
    /// Returns 0.0 if no loads have completed.
    pub fn hit_rate(&self) -> f64 {
        let total = self.loads();
        if total == 0 {
            0.0
        } else {
            self.fresh_hits as f64 / total as f64
        }
    }

    /// Total completed loads.
    pub fn loads(&self) -> u64 {
        self.fresh_hits + self.fetched + self.stale_fallbacks + self.empty_results
    }

    pub fn record_fresh_hit(&mut self) {
        self.fresh_hits += 1;
    }

    pub fn record_fetched(&mut self) {
        self.fetched += 1;
    }

    pub fn record_stale_fallback(&mut self) {
        self.stale_fallbacks += 1;
    }

    pub fn record_empty(&mut self) {
        self.empty_results += 1;
    }

    // == Record Fetch ==
    /// Counts one fetch invocation and whether it failed.
    pub fn record_fetch(&mut self, succeeded: bool) {
        self.fetches += 1;
        if !succeeded {
            self.fetch_failures += 1;
        }
    }

    pub fn record_refresh(&mut self) {
        self.refreshes += 1;
    }

    pub fn record_write_failure(&mut self) {
        self.write_failures += 1;
    }
}
