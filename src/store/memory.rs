//! In-memory store backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PersistentStore;
use crate::error::StoreError;

// == Memory Store ==
/// Process-local store. Clones share the same map.
///
/// With a quota set, a write that would push the stored bytes (keys plus
/// values) past the quota is rejected and leaves the map untouched.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that refuses writes past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Arc::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently held (keys plus values).
    pub async fn used_bytes(&self) -> usize {
        let entries = self.entries.read().await;
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, raw: String) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;

        if let Some(quota) = self.quota_bytes {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let requested = key.len() + raw.len();
            if used + requested > quota {
                return Err(StoreError::QuotaExceeded {
                    quota,
                    used,
                    requested,
                });
            }
        }

        entries.insert(key.to_string(), raw);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();

        store.set("cart", "[1,2]".to_string()).await.unwrap();
        assert_eq!(store.get("cart").await.unwrap().as_deref(), Some("[1,2]"));

        store.remove("cart").await.unwrap();
        assert!(store.get("cart").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();

        handle.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(10);

        store.set("a", "1234".to_string()).await.unwrap();
        let err = store.set("b", "123456789".to_string()).await.unwrap_err();

        assert!(matches!(err, StoreError::QuotaExceeded { quota: 10, .. }));
        assert!(store.get("b").await.unwrap().is_none());
        assert_eq!(store.used_bytes().await, 5);
    }

    #[tokio::test]
    async fn test_quota_counts_overwrite_once() {
        let store = MemoryStore::with_quota(6);

        store.set("k", "12345".to_string()).await.unwrap();
        // Replacing the value frees the old bytes first
        store.set("k", "54321".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("54321"));
    }
}
