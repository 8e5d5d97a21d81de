//! Cache Module
//!
//! TTL cache with stale-on-error fallback, persisted through a
//! `PersistentStore`.

mod entry;
mod layer;
mod stats;


// Re-export public types
pub use entry::{CacheEntry, Freshness};
pub use layer::{LoadSource, Loaded, TtlCache};
pub use stats::CacheStats;

// == Public Constants ==
/// Default entry time-to-live: 30 minutes
pub const DEFAULT_TTL_MS: u64 = 30 * 60 * 1000;

/// Maximum key length accepted at the HTTP surface, in bytes
pub const MAX_KEY_LENGTH: usize = 256;
