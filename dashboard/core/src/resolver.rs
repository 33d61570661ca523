//! Panel Data Resolver
//!
//! One generic loop that walks a panel's chain and returns the first source
//! that yields records.
//!
//! # Chain Walk
//!
//! ```text
//! local-cache ──miss──▶ remote-primary ──fail──▶ remote-fallback-file ──fail──▶ embedded-default
//!      │                     │                          │                            │
//!     hit                    ok ──▶ write back          ok ──▶ write back            ok
//!      ▼                     ▼                          ▼                            ▼
//!                          Resolution { records, source_used, warnings }
//! ```
//!
//! Steps run strictly in order; a step is attempted only after the previous
//! one has failed. Every failure becomes a warning on the result. A cache hit
//! skips the network entirely, so a stale slot wins over an unreachable or
//! recovered upstream until it is overwritten, removed, or ages past the
//! optional TTL.
//!
//! `resolve` never fails: when every step fails it returns an empty record
//! list, the tag of the last step tried, and the accumulated warnings.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, CacheStore, CachedBlob};
use crate::error::ResolveError;
use crate::fetch::Fetcher;
use crate::panel::PanelId;
use crate::record::Record;
use crate::source::{decode_payload, Source, SourceKind};

/// Resolver tuning
#[derive(Clone, Debug, Default)]
pub struct ResolverConfig {
    /// Maximum age of a cache slot before it counts as a miss
    ///
    /// `None` keeps slots forever (last-known-good).
    pub cache_ttl: Option<Duration>,
}

/// Outcome of resolving one panel
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resolution {
    /// Panel that was resolved
    pub panel: PanelId,
    /// Records from the winning step; empty when every step failed
    pub records: Vec<Record>,
    /// Winning step, or the last step tried when every step failed
    pub source_used: SourceKind,
    /// One entry per failed step, in chain order
    pub warnings: Vec<String>,
}

impl Resolution {
    /// Whether every step failed
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.records.is_empty()
    }
}

/// Walks resolution chains against an injected cache and fetcher
pub struct Resolver<C: CacheStore, F: Fetcher> {
    cache: C,
    fetcher: F,
    config: ResolverConfig,
}

impl<C: CacheStore, F: Fetcher> Resolver<C, F> {
    /// Create a resolver with default tuning
    pub fn new(cache: C, fetcher: F) -> Self {
        Self::with_config(cache, fetcher, ResolverConfig::default())
    }

    /// Create a resolver with explicit tuning
    pub fn with_config(cache: C, fetcher: F, config: ResolverConfig) -> Self {
        Self {
            cache,
            fetcher,
            config,
        }
    }

    /// The injected cache store
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// The injected fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolve a panel by walking `chain` in order
    pub async fn resolve(&self, panel: PanelId, chain: &[Source]) -> Resolution {
        let mut warnings = Vec::new();
        let mut last = SourceKind::EmbeddedDefault;

        for (step, source) in chain.iter().enumerate() {
            last = source.kind();
            debug!(panel = %panel, step = step, source = %last, "Attempting source");

            match self.attempt(panel, source).await {
                Ok(records) => {
                    if matches!(source, Source::Remote { .. }) {
                        if let Err(e) = self.write_back(panel, &records).await {
                            warn!(panel = %panel, error = %e, "Failed to write panel cache");
                            warnings.push(e.to_string());
                        }
                    }

                    info!(
                        panel = %panel,
                        source = %last,
                        records = records.len(),
                        warnings = warnings.len(),
                        "Panel resolved"
                    );
                    return Resolution {
                        panel,
                        records,
                        source_used: last,
                        warnings,
                    };
                }
                Err(e) => {
                    if e.is_cache_miss() {
                        debug!(panel = %panel, reason = %e, "Cache unusable");
                    } else {
                        warn!(panel = %panel, source = %last, error = %e, "Source failed, falling through");
                    }
                    warnings.push(e.to_string());
                }
            }
        }

        let exhausted = ResolveError::AllSourcesExhausted {
            panel,
            attempted: chain.len(),
        };
        warn!(panel = %panel, error = %exhausted, "No source produced records");
        warnings.push(exhausted.to_string());

        Resolution {
            panel,
            records: Vec::new(),
            source_used: last,
            warnings,
        }
    }

    /// Drop a panel's cache slot so the next resolution reaches the network
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn invalidate(&self, panel: PanelId) -> Result<bool, CacheError> {
        self.cache.remove(&panel.cache_key()).await
    }

    async fn attempt(&self, panel: PanelId, source: &Source) -> Result<Vec<Record>, ResolveError> {
        match source {
            Source::Cache => self.read_cache(panel).await,
            Source::Remote {
                location, format, ..
            } => {
                let body = self.fetcher.fetch(location).await?;
                let records = decode_payload(location, *format, &body)?;
                if records.is_empty() {
                    return Err(ResolveError::EmptyPayload {
                        location: location.clone(),
                    });
                }
                Ok(records)
            }
            Source::Default(records) if records.is_empty() => Err(ResolveError::EmptyPayload {
                location: "embedded defaults".to_string(),
            }),
            Source::Default(records) => Ok(records.clone()),
        }
    }

    async fn read_cache(&self, panel: PanelId) -> Result<Vec<Record>, ResolveError> {
        let key = panel.cache_key();
        let raw = self
            .cache
            .get(&key)
            .await?
            .ok_or_else(|| ResolveError::CacheMiss { key: key.clone() })?;

        let blob = CachedBlob::decode(&raw).map_err(|reason| ResolveError::CacheParse {
            key: key.clone(),
            reason,
        })?;

        if let (Some(ttl), Some(age)) = (self.config.cache_ttl, blob.age(Utc::now())) {
            // Negative ages (clock moved backwards) count as fresh
            if age.to_std().is_ok_and(|age| age > ttl) {
                return Err(ResolveError::CacheExpired {
                    key,
                    age_secs: age.num_seconds(),
                });
            }
        }

        if blob.records.is_empty() {
            return Err(ResolveError::CacheMiss { key });
        }

        Ok(blob.records)
    }

    async fn write_back(&self, panel: PanelId, records: &[Record]) -> Result<(), ResolveError> {
        let raw = CachedBlob::new(records.to_vec(), Utc::now()).encode()?;
        self.cache.set(&panel.cache_key(), raw).await?;
        debug!(panel = %panel, records = records.len(), "Panel cache updated");
        Ok(())
    }
}
