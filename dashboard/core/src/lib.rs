//! Dashboard Core - Panel Data Resolution for moltdash
//!
//! This crate provides everything behind the moltdash dashboard except the
//! surface that shows it: fallback-chain data resolution, cache stores,
//! fetchers, RSS normalization, embedded defaults, pure renderers and tab
//! state.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Surfaces (CLI)                          │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │ load_panel / switch_tab / page
//! ┌───────────────────────────────┴──────────────────────────────────┐
//! │                            Dashboard                             │
//! │  ┌──────────┐   ┌──────────────────────────────┐   ┌──────────┐  │
//! │  │  TabSet  │   │           Resolver            │   │  render  │  │
//! │  └──────────┘   │  cache ─▶ primary ─▶ file ─▶  │   └──────────┘  │
//! │                 │           default             │                 │
//! │                 └──────┬─────────────────┬──────┘                 │
//! │                        │                 │                        │
//! │                 ┌──────┴─────┐    ┌──────┴─────┐                  │
//! │                 │ CacheStore │    │  Fetcher   │                  │
//! │                 └────────────┘    └────────────┘                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Resolver`]: walks a panel's chain against an injected cache and fetcher
//! - [`Resolution`]: records, the source that produced them, and warnings
//! - [`Dashboard`]: resolves and renders panels, tracks the visible tab
//! - [`DashboardConfig`]: merged file, environment and CLI configuration
//!
//! # Module Overview
//!
//! - [`cache`]: cache store trait, in-memory and file stores
//! - [`config`]: TOML configuration loading
//! - [`dashboard`]: the facade used by surfaces
//! - [`defaults`]: embedded default records per panel
//! - [`error`]: resolution errors
//! - [`fetch`]: fetcher trait and HTTP/data-file implementation
//! - [`panel`]: panel identifiers and chain assembly
//! - [`record`]: schemaless record type
//! - [`render`]: fragment tree and panel renderers
//! - [`resolver`]: the fallback chain walk
//! - [`rss`]: RSS/Atom normalization
//! - [`source`]: chain step descriptors and payload decoding
//! - [`tabs`]: tab visibility state

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod defaults;
pub mod error;
pub mod fetch;
pub mod panel;
pub mod record;
pub mod render;
pub mod resolver;
pub mod rss;
pub mod source;
pub mod tabs;

// Re-exports for convenience
pub use cache::{CacheError, CacheStore, CachedBlob, FileCacheStore, MemoryCacheStore};
pub use dashboard::{Dashboard, DashboardError, LiveDashboard, PanelView};
pub use error::ResolveError;
pub use fetch::{Fetcher, HttpFetcher};
pub use panel::{PanelId, UnknownPanel};
pub use record::Record;
pub use render::{Element, Fragment};
pub use resolver::{Resolution, Resolver, ResolverConfig};
pub use source::{PayloadFormat, Source, SourceKind};
pub use tabs::TabSet;

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, DashboardConfig, DashboardToml,
};
