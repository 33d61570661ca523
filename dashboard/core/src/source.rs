//! Chain sources
//!
//! A chain is an ordered list of [`Source`] descriptors. The resolver walks it
//! until one source yields records. This module also owns payload decoding,
//! which turns a fetched body into records according to its
//! [`PayloadFormat`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResolveError;
use crate::record::Record;
use crate::rss;

/// Tag identifying which kind of step produced (or failed to produce) data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// The panel's local cache slot
    LocalCache,
    /// Primary remote source
    RemotePrimary,
    /// Secondary source, usually a static data file shipped with the dashboard
    RemoteFallbackFile,
    /// Fixed list compiled into the crate
    EmbeddedDefault,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalCache => write!(f, "local-cache"),
            Self::RemotePrimary => write!(f, "remote-primary"),
            Self::RemoteFallbackFile => write!(f, "remote-fallback-file"),
            Self::EmbeddedDefault => write!(f, "embedded-default"),
        }
    }
}

/// Shape a remote payload is expected to have
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayloadFormat {
    /// A JSON array of objects
    JsonArray,
    /// An RSS document whose `<item>` elements become records
    Rss {
        /// Maximum number of items kept
        max_items: usize,
    },
}

/// One step of a resolution chain
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    /// Look up the panel's cache slot
    Cache,
    /// Fetch a remote location
    Remote {
        /// Primary or fallback-file
        kind: SourceKind,
        /// URL, or data file path for non-URL locations
        location: String,
        /// Expected payload shape
        format: PayloadFormat,
    },
    /// Fixed records that always succeed
    Default(Vec<Record>),
}

impl Source {
    /// Create a remote step
    pub fn remote(kind: SourceKind, location: impl Into<String>, format: PayloadFormat) -> Self {
        Self::Remote {
            kind,
            location: location.into(),
            format,
        }
    }

    /// Remote primary step expecting a JSON array
    pub fn primary_json(location: impl Into<String>) -> Self {
        Self::remote(SourceKind::RemotePrimary, location, PayloadFormat::JsonArray)
    }

    /// Fallback-file step expecting a JSON array
    pub fn fallback_json(location: impl Into<String>) -> Self {
        Self::remote(
            SourceKind::RemoteFallbackFile,
            location,
            PayloadFormat::JsonArray,
        )
    }

    /// The step's kind tag
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Cache => SourceKind::LocalCache,
            Self::Remote { kind, .. } => *kind,
            Self::Default(_) => SourceKind::EmbeddedDefault,
        }
    }

    /// Short human description, used by the CLI's chain listing
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Cache => "local-cache".to_string(),
            Self::Remote { kind, location, .. } => format!("{kind} {location}"),
            Self::Default(records) => format!("embedded-default ({} records)", records.len()),
        }
    }
}

/// Decode a fetched body into records
///
/// # Errors
///
/// Returns `ResolveError::PayloadParse` if the body does not have the
/// expected shape.
pub fn decode_payload(
    location: &str,
    format: PayloadFormat,
    body: &str,
) -> Result<Vec<Record>, ResolveError> {
    match format {
        PayloadFormat::JsonArray => parse_json_records(body).map_err(|reason| {
            ResolveError::PayloadParse {
                location: location.to_string(),
                reason,
            }
        }),
        PayloadFormat::Rss { max_items } => {
            rss::parse_feed(body, max_items).map_err(|e| ResolveError::PayloadParse {
                location: location.to_string(),
                reason: e.to_string(),
            })
        }
    }
}

/// Parse a JSON array of objects
///
/// Used for remote payloads and for legacy cache blobs. Any non-object
/// element makes the whole payload invalid.
pub(crate) fn parse_json_records(body: &str) -> Result<Vec<Record>, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let Value::Array(items) = value else {
        return Err("expected a JSON array".to_string());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            Record::try_from(item).map_err(|_| format!("element {idx} is not an object"))
        })
        .collect()
}
