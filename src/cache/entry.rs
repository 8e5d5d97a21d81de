//! Cache Entry Module
//!
//! Defines the persisted snapshot written for each cache key and the
//! freshness policy applied to it.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A value together with the instant it was written.
///
/// Serialized as `{"value": ..., "storedAt": <ms>}`. A record missing
/// `storedAt`, or carrying a non-integer one, does not deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached payload
    pub value: T,
    /// Write timestamp (Unix milliseconds)
    #[serde(rename = "storedAt")]
    pub stored_at: i64,
}

// == Freshness ==
/// Classification of an entry against the cache TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Age is within the TTL; serve without fetching
    Fresh,
    /// Age exceeds the TTL; usable only as a fallback
    Stale,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry stamped at `now_ms`.
    pub fn new(value: T, now_ms: i64) -> Self {
        Self {
            value,
            stored_at: now_ms,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was written.
    ///
    /// An entry stamped in the future (clock moved backwards) reports a
    /// negative age and therefore counts as fresh.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.stored_at)
    }

    // == Freshness ==
    /// Fresh when `now - stored_at <= ttl`, stale otherwise.
    pub fn freshness(&self, now_ms: i64, ttl_ms: u64) -> Freshness {
        let ttl = i64::try_from(ttl_ms).unwrap_or(i64::MAX);
        if self.age_ms(now_ms) <= ttl {
            Freshness::Fresh
        } else {
            Freshness::Stale
        }
    }

    pub fn is_fresh(&self, now_ms: i64, ttl_ms: u64) -> bool {
        self.freshness(now_ms, ttl_ms) == Freshness::Fresh
    }
}
