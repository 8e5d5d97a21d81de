//! Market Cache - A persistent TTL cache with stale-on-error fallback
//!
//! Serves fresh entries without fetching, refetches stale ones, and falls
//! back to the stale copy when the fetch fails.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod store;
pub mod upstream;

pub use api::AppState;
pub use cache::{LoadSource, Loaded, TtlCache};
pub use config::Config;
pub use events::EventLog;
pub use store::{FileStore, MemoryStore, PersistentStore, StoreAdapter};
