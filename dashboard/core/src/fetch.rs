//! Remote fetching
//!
//! The resolver obtains remote payloads through the [`Fetcher`] trait. The
//! production implementation, [`HttpFetcher`], issues one GET per call for
//! `http(s)://` locations and reads any other location as a static data file
//! under the configured data directory.
//!
//! A fetch succeeds only with a success status; everything else is a
//! [`ResolveError`] that the resolver records before moving on.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ResolveError;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent
pub const DEFAULT_USER_AGENT: &str = concat!("moltdash/", env!("CARGO_PKG_VERSION"));

/// Source of remote payload bodies
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the body at `location`
    ///
    /// Implementations must fail on non-success statuses rather than
    /// returning an error page as the body.
    async fn fetch(&self, location: &str) -> Result<String, ResolveError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for std::sync::Arc<T> {
    async fn fetch(&self, location: &str) -> Result<String, ResolveError> {
        (**self).fetch(location).await
    }
}

/// Whether a location should go over HTTP rather than the filesystem
#[must_use]
pub fn is_url(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// HTTP client plus static data directory
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    /// HTTP client
    http_client: reqwest::Client,
    /// Base directory for non-URL locations
    data_dir: PathBuf,
}

impl HttpFetcher {
    /// Create a fetcher with the given timeout and user agent
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            http_client,
            data_dir: data_dir.into(),
        })
    }

    /// Resolve a data file location against the data directory
    #[must_use]
    pub fn resolve_path(&self, location: &str) -> PathBuf {
        let path = PathBuf::from(location);
        if path.is_absolute() {
            path
        } else {
            self.data_dir.join(path)
        }
    }

    async fn fetch_http(&self, url: &str) -> Result<String, ResolveError> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            ResolveError::Network {
                location: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status {
                location: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| ResolveError::Network {
            location: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch_file(&self, location: &str) -> Result<String, ResolveError> {
        let path = self.resolve_path(location);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ResolveError::Io {
                location: path.display().to_string(),
                source,
            })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<String, ResolveError> {
        if is_url(location) {
            self.fetch_http(location.trim()).await
        } else {
            self.fetch_file(location).await
        }
    }
}
