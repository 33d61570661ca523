//! Instrumented Test Doubles
//!
//! Mock cache and fetcher that record every call, so tests can assert which
//! chain steps ran and how often.
//!
//! ```ignore
//! let fetcher = MockFetcher::new().respond("https://x/epics.json", r#"[{"title":"R"}]"#);
//! let cache = CountingCache::new();
//! // ... resolve ...
//! assert_eq!(fetcher.call_count(), 1);
//! assert_eq!(cache.sets(), 1);
//! ```

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use dashboard_core::cache::{CacheError, CacheStore, MemoryCacheStore};
use dashboard_core::error::ResolveError;
use dashboard_core::fetch::Fetcher;
use dashboard_core::record::Record;

// =============================================================================
// Fetcher
// =============================================================================

/// Canned outcome for one location
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Body returned as-is
    Body(String),
    /// Non-success HTTP status
    Status(u16),
    /// Transport failure
    Unreachable,
}

/// Fetcher answering from a table; unknown locations are unreachable
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, MockResponse>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `location`
    pub fn respond(mut self, location: &str, body: &str) -> Self {
        self.responses
            .insert(location.to_string(), MockResponse::Body(body.to_string()));
        self
    }

    /// Answer `location` with an HTTP status
    pub fn fail_with_status(mut self, location: &str, status: u16) -> Self {
        self.responses
            .insert(location.to_string(), MockResponse::Status(status));
        self
    }

    /// Every location fetched, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, location: &str) -> Result<String, ResolveError> {
        self.calls.lock().push(location.to_string());
        match self.responses.get(location) {
            Some(MockResponse::Body(body)) => Ok(body.clone()),
            Some(MockResponse::Status(status)) => Err(ResolveError::Status {
                location: location.to_string(),
                status: *status,
            }),
            Some(MockResponse::Unreachable) | None => Err(ResolveError::Network {
                location: location.to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

// =============================================================================
// Cache
// =============================================================================

/// In-memory cache counting reads and writes
#[derive(Default)]
pub struct CountingCache {
    inner: MemoryCacheStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
    fail_writes: bool,
}

impl CountingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose writes always fail
    pub fn read_only() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Seed a slot with a raw value, bypassing the counters
    pub async fn seed(&self, key: &str, raw: &str) {
        self.inner
            .set(key, raw.to_string())
            .await
            .expect("memory store accepts valid keys");
    }

    /// Raw value currently in a slot
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.ok().flatten()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for CountingCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(CacheError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        self.inner.remove(key).await
    }
}

// =============================================================================
// Records
// =============================================================================

/// Single-record list `[{ "title": <title> }]`
pub fn titled(title: &str) -> Vec<Record> {
    vec![Record::new().with("title", title)]
}
