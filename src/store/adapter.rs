//! Store Adapter
//!
//! JSON serialization over a `PersistentStore`, with corruption recovery.
//! Nothing here returns an error: reads degrade to "absent" and writes
//! report success as a boolean, so the cache layer never has to unwind.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::PersistentStore;
use crate::error::StoreError;

// == Store Adapter ==
#[derive(Debug, Clone)]
pub struct StoreAdapter<S> {
    store: S,
}

impl<S: PersistentStore> StoreAdapter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    // == Get ==
    /// Reads and decodes the value at `key`.
    ///
    /// A record that does not decode as `T`, or that the backend reports as
    /// corrupt, is removed from the store and reported as absent. Any other
    /// failed read is logged and also reported as absent, but the record is
    /// left in place.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e @ StoreError::Corrupt(_)) => {
                warn!(key, error = %e, "corrupted record detected, removing");
                self.remove(key).await;
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "store read failed, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "corrupted record detected, removing");
                self.remove(key).await;
                None
            }
        }
    }

    // == Save ==
    /// Encodes `value` and writes it at `key`. Returns false if either
    /// step fails; the previous record, if any, is then left untouched.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "value could not be serialized");
                return false;
            }
        };

        match self.store.set(key, raw).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "store write failed");
                false
            }
        }
    }

    // == Remove ==
    pub async fn remove(&self, key: &str) -> bool {
        match self.store.remove(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "store remove failed");
                false
            }
        }
    }

    // == Multi Get ==
    /// Reads several keys at once. Absent and corrupted keys are left out of
    /// the result; corrupted ones are removed as in [`StoreAdapter::get`].
    pub async fn multi_get<T, K>(&self, keys: &[K]) -> HashMap<String, T>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            if let Some(value) = self.get(key).await {
                found.insert(key.to_string(), value);
            }
        }
        debug!(requested = keys.len(), found = found.len(), "multi-get complete");
        found
    }

    // == Multi Remove ==
    /// Removes every listed key, continuing past failures. Returns true only
    /// if all removals succeeded.
    pub async fn multi_remove<K: AsRef<str>>(&self, keys: &[K]) -> bool {
        let mut all_removed = true;
        for key in keys {
            if !self.remove(key.as_ref()).await {
                all_removed = false;
            }
        }
        all_removed
    }

    // == Clear All ==
    /// Removes every key except those starting with `preserve_prefix`.
    /// An empty prefix preserves everything.
    pub async fn clear_all(&self, preserve_prefix: &str) -> bool {
        if preserve_prefix.is_empty() {
            debug!("clear-all with empty prefix keeps every key");
            return true;
        }

        let keys = match self.store.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "could not list store keys");
                return false;
            }
        };

        let doomed: Vec<String> = keys
            .into_iter()
            .filter(|k| !k.starts_with(preserve_prefix))
            .collect();
        debug!(count = doomed.len(), preserve_prefix, "clearing store");
        self.multi_remove(&doomed).await
    }
}
