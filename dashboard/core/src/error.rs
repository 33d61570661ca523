//! Resolution errors
//!
//! Every variant except [`ResolveError::AllSourcesExhausted`] is recovered by
//! moving to the next chain step. None of them ever reaches the caller of
//! `resolve` as an `Err`; they are turned into warning strings on the
//! resulting [`Resolution`](crate::resolver::Resolution).

use thiserror::Error;

use crate::cache::CacheError;
use crate::panel::PanelId;

/// Why a chain step did not produce records
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No entry in the panel's cache slot
    #[error("cache miss for '{key}'")]
    CacheMiss {
        /// Cache key that was looked up
        key: String,
    },

    /// Entry present but not a list of records
    #[error("corrupt cache entry for '{key}': {reason}")]
    CacheParse {
        /// Cache key that was looked up
        key: String,
        /// Parser message
        reason: String,
    },

    /// Entry older than the configured TTL
    #[error("cache entry for '{key}' expired ({age_secs}s old)")]
    CacheExpired {
        /// Cache key that was looked up
        key: String,
        /// Age of the entry in seconds
        age_secs: i64,
    },

    /// Cache store failed to read or write
    #[error("cache store error: {0}")]
    CacheStore(#[from] CacheError),

    /// Transport failure (connect, timeout, TLS, body read)
    #[error("network error fetching {location}: {reason}")]
    Network {
        /// URL that was fetched
        location: String,
        /// Transport message
        reason: String,
    },

    /// Server answered with a non-success status
    #[error("{location} returned HTTP {status}")]
    Status {
        /// URL that was fetched
        location: String,
        /// HTTP status code
        status: u16,
    },

    /// Static data file could not be read
    #[error("failed to read {location}: {source}")]
    Io {
        /// Resolved file path
        location: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Payload did not have the expected shape
    #[error("malformed payload from {location}: {reason}")]
    PayloadParse {
        /// Where the payload came from
        location: String,
        /// Parser message
        reason: String,
    },

    /// Payload parsed but contained no records
    #[error("{location} returned no records")]
    EmptyPayload {
        /// Where the payload came from
        location: String,
    },

    /// Every chain step failed
    #[error("all {attempted} source(s) exhausted for panel '{panel}'")]
    AllSourcesExhausted {
        /// Panel being resolved
        panel: PanelId,
        /// Number of steps attempted
        attempted: usize,
    },
}

impl ResolveError {
    /// Whether this is one of the cache-miss family (absent, corrupt, expired)
    #[must_use]
    pub fn is_cache_miss(&self) -> bool {
        matches!(
            self,
            Self::CacheMiss { .. } | Self::CacheParse { .. } | Self::CacheExpired { .. }
        )
    }

    /// Whether this came from fetching a remote location
    #[must_use]
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::Network { .. }
                | Self::Status { .. }
                | Self::Io { .. }
                | Self::PayloadParse { .. }
                | Self::EmptyPayload { .. }
        )
    }
}
