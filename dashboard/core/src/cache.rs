//! Panel cache stores
//!
//! The resolver reaches the cache only through the [`CacheStore`] trait, so
//! tests can swap in doubles and surfaces can choose where the slots live.
//!
//! # Slots
//!
//! One slot per panel key. The value is a [`CachedBlob`] envelope:
//!
//! ```json
//! { "stored_at": "2026-01-29T15:45:22Z", "records": [ { "title": "A" } ] }
//! ```
//!
//! A bare JSON array is also accepted on read (older dashboards wrote the
//! record list directly) and is treated as having no timestamp.
//!
//! # Stores
//!
//! - [`MemoryCacheStore`]: process-local, backed by a `DashMap`
//! - [`FileCacheStore`]: one `<key>.json` file per slot, written atomically

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::Record;
use crate::source::parse_json_records;

/// Errors raised by cache stores
#[derive(Debug, Error)]
pub enum CacheError {
    /// Key contains characters that cannot be used as a slot name
    #[error("invalid cache key '{0}'")]
    InvalidKey(String),

    /// Filesystem failure
    #[error("cache I/O error for '{key}': {source}")]
    Io {
        /// Slot key
        key: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Records could not be serialized
    #[error("failed to encode cache entry: {0}")]
    Encode(String),
}

/// Key-value store holding one serialized blob per panel
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a slot; `Ok(None)` when absent
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Overwrite a slot
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;

    /// Remove a slot, returning whether it existed
    async fn remove(&self, key: &str) -> Result<bool, CacheError>;
}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        (**self).remove(key).await
    }
}

// ============================================================================
// Cached Blob
// ============================================================================

/// Decoded contents of a cache slot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedBlob {
    /// When the records were written; `None` for legacy bare-array slots
    pub stored_at: Option<DateTime<Utc>>,
    /// Last successfully resolved records
    pub records: Vec<Record>,
}

#[derive(Deserialize)]
struct Envelope {
    stored_at: DateTime<Utc>,
    records: Vec<Record>,
}

impl CachedBlob {
    /// Wrap records stamped with the given time
    #[must_use]
    pub fn new(records: Vec<Record>, stored_at: DateTime<Utc>) -> Self {
        Self {
            stored_at: Some(stored_at),
            records,
        }
    }

    /// Serialize to the slot format
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Encode` if serialization fails.
    pub fn encode(&self) -> Result<String, CacheError> {
        serde_json::to_string(self).map_err(|e| CacheError::Encode(e.to_string()))
    }

    /// Parse a slot value, accepting both the envelope and a bare array
    ///
    /// # Errors
    ///
    /// Returns the parser message when neither form matches.
    pub fn decode(raw: &str) -> Result<Self, String> {
        if let Ok(envelope) = serde_json::from_str::<Envelope>(raw) {
            return Ok(Self {
                stored_at: Some(envelope.stored_at),
                records: envelope.records,
            });
        }

        parse_json_records(raw).map(|records| Self {
            stored_at: None,
            records,
        })
    }

    /// Age relative to `now`; `None` for legacy slots
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.stored_at.map(|t| now - t)
    }
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey(key.to_string()))
    }
}

// ============================================================================
// Memory Store
// ============================================================================

/// Process-local cache store
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    slots: DashMap<String, String>,
}

impl MemoryCacheStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot is occupied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        validate_key(key)?;
        Ok(self.slots.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        validate_key(key)?;
        self.slots.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        validate_key(key)?;
        Ok(self.slots.remove(key).is_some())
    }
}

// ============================================================================
// File Store
// ============================================================================

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cache store keeping one JSON file per slot
#[derive(Clone, Debug)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$XDG_CACHE_HOME/moltdash`, when a cache directory is known
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("moltdash"))
    }

    /// Directory holding the slot files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CacheError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn io_error(key: &str, source: std::io::Error) -> CacheError {
        CacheError::Io {
            key: key.to_string(),
            source,
        }
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(key, e))?;

        // Write-then-rename keeps readers from ever seeing a partial slot
        let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!(".{key}.{}.{seq}.tmp", std::process::id()));
        tokio::fs::write(&tmp, value.as_bytes())
            .await
            .map_err(|e| Self::io_error(key, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Self::io_error(key, e));
        }

        tracing::debug!(key = %key, path = %path.display(), "Cache slot written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Record> {
        vec![Record::new().with("title", "A")]
    }

    #[test]
    fn test_blob_envelope() {
        let at = Utc.with_ymd_and_hms(2026, 1, 29, 15, 45, 22).unwrap();
        let blob = CachedBlob::new(sample(), at);
        let raw = blob.encode().unwrap();
        assert!(raw.contains("\"stored_at\""));
        assert_eq!(CachedBlob::decode(&raw).unwrap(), blob);
    }

    #[test]
    fn test_blob_accepts_legacy_array() {
        let blob = CachedBlob::decode(r#"[{"title":"A"}]"#).unwrap();
        assert_eq!(blob.stored_at, None);
        assert_eq!(blob.records, sample());
        assert_eq!(blob.age(Utc::now()), None);
    }

    #[test]
    fn test_blob_rejects_garbage() {
        assert!(CachedBlob::decode("not json").is_err());
        assert!(CachedBlob::decode(r#"{"title":"A"}"#).is_err());
        assert!(CachedBlob::decode(r#"["A"]"#).is_err());
    }

    #[test]
    fn test_blob_age() {
        let at = Utc.with_ymd_and_hms(2026, 1, 29, 15, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 29, 16, 0, 0).unwrap();
        let blob = CachedBlob::new(sample(), at);
        assert_eq!(blob.age(now), Some(chrono::Duration::hours(1)));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryCacheStore::new();
        assert_eq!(store.get("moltbot-epics-data").await.unwrap(), None);

        store
            .set("moltbot-epics-data", "[]".to_string())
            .await
            .unwrap();
        assert_eq!(
            store.get("moltbot-epics-data").await.unwrap(),
            Some("[]".to_string())
        );
        assert_eq!(store.len(), 1);

        assert!(store.remove("moltbot-epics-data").await.unwrap());
        assert!(!store.remove("moltbot-epics-data").await.unwrap());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(dir.path().join("cache"));

        assert_eq!(store.get("moltbot-news-data").await.unwrap(), None);

        store
            .set("moltbot-news-data", r#"[{"title":"A"}]"#.to_string())
            .await
            .unwrap();
        assert!(dir.path().join("cache/moltbot-news-data.json").exists());
        assert_eq!(
            store.get("moltbot-news-data").await.unwrap().as_deref(),
            Some(r#"[{"title":"A"}]"#)
        );

        store
            .set("moltbot-news-data", "[]".to_string())
            .await
            .unwrap();
        assert_eq!(
            store.get("moltbot-news-data").await.unwrap().as_deref(),
            Some("[]")
        );

        assert!(store.remove("moltbot-news-data").await.unwrap());
        assert_eq!(store.get("moltbot-news-data").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCacheStore::new(dir.path());

        let err = store
            .set("../escape", "[]".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey(_)));
        assert!(store.get("").await.is_err());
    }

    #[tokio::test]
    async fn test_stores_reject_the_same_keys() {
        let dir = tempfile::tempdir().unwrap();
        let stores: Vec<Box<dyn CacheStore>> = vec![
            Box::new(MemoryCacheStore::new()),
            Box::new(FileCacheStore::new(dir.path())),
        ];

        for store in &stores {
            for key in ["", "../escape", "a/b", "has space"] {
                assert!(matches!(
                    store.get(key).await,
                    Err(CacheError::InvalidKey(_))
                ));
                assert!(matches!(
                    store.set(key, "[]".to_string()).await,
                    Err(CacheError::InvalidKey(_))
                ));
                assert!(matches!(
                    store.remove(key).await,
                    Err(CacheError::InvalidKey(_))
                ));
            }
            assert_eq!(store.get("moltbot-cron-data").await.unwrap(), None);
        }
    }
}
