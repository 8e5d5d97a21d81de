//! File-backed store.
//!
//! Each key lives in `<root>/<hex(sha256(key))>.json`, so file names have a
//! fixed length whatever the key. The file holds a small JSON record with
//! the original key next to the raw value, which is how `keys()` recovers
//! keys. Writes land in a sibling temp file that is renamed over the
//! target, so a reader sees either the previous record or the complete new
//! one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use super::PersistentStore;
use crate::error::StoreError;

const RECORD_EXT: &str = "json";

/// Hex length of a SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// On-disk shape of one record.
#[derive(Debug, Serialize, Deserialize)]
struct Record {
    key: String,
    raw: String,
}

#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    write_seq: Arc<AtomicU64>,
}

impl FileStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            write_seq: Arc::new(AtomicU64::new(0)),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`, whether or not it exists yet.
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", key_digest(key), RECORD_EXT))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(".{}.{}.tmp", key_digest(key), seq))
    }
}

fn key_digest(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// True for `<64 hex digits>.json`; temp files and foreign files are skipped.
fn is_record_file_name(name: &str) -> bool {
    name.strip_suffix(RECORD_EXT)
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|stem| {
            stem.len() == DIGEST_HEX_LEN && stem.bytes().all(|b| b.is_ascii_hexdigit())
        })
}

/// Decodes file bytes into a record. Invalid UTF-8 is corruption, never
/// patched up.
fn decode_record(bytes: Vec<u8>) -> Result<Record, StoreError> {
    let text = String::from_utf8(bytes)
        .map_err(|e| StoreError::Corrupt(format!("invalid UTF-8: {}", e)))?;
    serde_json::from_str(&text).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[async_trait]
impl PersistentStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let bytes = match fs::read(self.record_path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record = decode_record(bytes)?;
        if record.key != key {
            return Err(StoreError::Corrupt(format!(
                "record holds key {:?}",
                record.key
            )));
        }
        Ok(Some(record.raw))
    }

    async fn set(&self, key: &str, raw: String) -> Result<(), StoreError> {
        let record = Record {
            key: key.to_string(),
            raw,
        };
        let bytes = serde_json::to_vec(&record).map_err(std::io::Error::from)?;

        let tmp = self.temp_path(key);
        if let Err(e) = fs::write(&tmp, &bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, self.record_path(key)).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut dir = fs::read_dir(&self.root).await?;
        let mut keys = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            let name = item.file_name();
            if !name.to_str().is_some_and(is_record_file_name) {
                continue;
            }

            let bytes = match fs::read(item.path()).await {
                Ok(bytes) => bytes,
                // Removed since the directory was listed
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            match decode_record(bytes) {
                Ok(record) => keys.push(record.key),
                Err(e) => debug!(file = ?name, error = %e, "skipping unreadable record"),
            }
        }
        Ok(keys)
    }
}
