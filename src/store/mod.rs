//! Store Module
//!
//! The persistent key-value contract the cache writes through, an adapter
//! that handles serialization and corruption recovery, and two backends.
//!
//! # Backends
//! - `MemoryStore` - process-local map with an optional byte quota
//! - `FileStore` - one JSON file per key, durable across restarts

mod adapter;
mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreError;

pub use adapter::StoreAdapter;
pub use file::FileStore;
pub use memory::MemoryStore;

// == Persistent Store ==
/// Asynchronous string-keyed storage of raw serialized values.
///
/// Implementations accept arbitrary string keys. Removing an absent key
/// succeeds. A `get` must never return data written under another key.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Reads the raw value at `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes `raw` at `key`, replacing any previous value.
    async fn set(&self, key: &str, raw: String) -> Result<(), StoreError>;

    /// Deletes the value at `key`.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Lists every stored key.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}

#[async_trait]
impl<S: PersistentStore + ?Sized> PersistentStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, raw: String) -> Result<(), StoreError> {
        (**self).set(key, raw).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key).await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys().await
    }
}

/// Type-erased store handle shared across the service.
pub type SharedStore = Arc<dyn PersistentStore>;
