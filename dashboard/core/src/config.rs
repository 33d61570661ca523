//! TOML Configuration File Support
//!
//! Centralized configuration for the dashboard, loaded from
//! `~/.config/moltdash/dashboard.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/moltdash/dashboard.toml` (typically `~/.config/moltdash/dashboard.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! data_dir = "/srv/moltdash/data"
//!
//! [http]
//! timeout_secs = 10
//! user_agent = "moltdash/0.1"
//!
//! [cache]
//! enabled = true
//! dir = "/var/cache/moltdash"
//! ttl_secs = 3600
//!
//! [panels.news]
//! primary_url = "https://www.rtp.pt/noticias/rss"
//! fallback_path = "latest_news.json"
//! max_items = 10
//!
//! [panels.epics]
//! primary_url = "https://example.com/epics.json"
//! use_cache = true
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::panel::PanelId;
use crate::resolver::ResolverConfig;
use crate::rss::DEFAULT_MAX_ITEMS;

/// Public headline feed used by the news panel
pub const DEFAULT_NEWS_URL: &str = "https://www.rtp.pt/noticias/rss";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// HTTP section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpToml {
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// User-Agent header
    pub user_agent: Option<String>,
}

/// Cache section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheToml {
    /// Whether any panel may use the cache
    pub enabled: Option<bool>,

    /// Directory holding cache slots
    pub dir: Option<PathBuf>,

    /// Maximum slot age in seconds (0 or absent = keep forever)
    pub ttl_secs: Option<u64>,
}

/// One `[panels.<id>]` table
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelToml {
    /// Primary remote URL
    pub primary_url: Option<String>,

    /// Static fallback data file
    pub fallback_path: Option<String>,

    /// Whether the panel reads and writes the cache
    pub use_cache: Option<bool>,

    /// Maximum feed items kept (news only)
    pub max_items: Option<usize>,
}

/// `[panels]` section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelsToml {
    /// Epics panel
    pub epics: Option<PanelToml>,
    /// Cron panel
    pub cron: Option<PanelToml>,
    /// News panel
    pub news: Option<PanelToml>,
    /// System panel
    pub system: Option<PanelToml>,
}

/// Root TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardToml {
    /// Base directory for static data files
    pub data_dir: Option<PathBuf>,

    /// HTTP settings
    pub http: Option<HttpToml>,

    /// Cache settings
    pub cache: Option<CacheToml>,

    /// Per-panel sources
    pub panels: Option<PanelsToml>,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// HTTP client settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Cache settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Global switch; when off no chain contains a cache step
    pub enabled: bool,
    /// Slot directory; `None` uses the XDG cache directory
    pub dir: Option<PathBuf>,
    /// Maximum slot age; `None` keeps slots forever
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            ttl: None,
        }
    }
}

/// Sources for one panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    /// Primary remote URL
    pub primary_url: Option<String>,
    /// Static fallback file, relative to the data directory
    pub fallback_path: Option<String>,
    /// Whether the chain starts with the cache
    pub use_cache: bool,
    /// Maximum feed items kept from an RSS primary
    pub max_items: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            primary_url: None,
            fallback_path: None,
            use_cache: false,
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

/// Sources for every panel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelsConfig {
    /// Epics panel
    pub epics: PanelConfig,
    /// Cron panel
    pub cron: PanelConfig,
    /// News panel
    pub news: PanelConfig,
    /// System panel
    pub system: PanelConfig,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            epics: PanelConfig {
                fallback_path: Some("epics.json".to_string()),
                use_cache: true,
                ..PanelConfig::default()
            },
            cron: PanelConfig::default(),
            news: PanelConfig {
                primary_url: Some(DEFAULT_NEWS_URL.to_string()),
                fallback_path: Some("latest_news.json".to_string()),
                ..PanelConfig::default()
            },
            system: PanelConfig::default(),
        }
    }
}

/// Centralized configuration for the dashboard
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct DashboardConfig {
    /// HTTP client settings
    pub http: HttpConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Base directory for static data files
    pub data_dir: PathBuf,

    /// Per-panel sources
    pub panels: PanelsConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            cache: CacheConfig::default(),
            data_dir: PathBuf::from("data"),
            panels: PanelsConfig::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Sources configured for a panel
    #[must_use]
    pub fn panel(&self, panel: PanelId) -> &PanelConfig {
        match panel {
            PanelId::Epics => &self.panels.epics,
            PanelId::Cron => &self.panels.cron,
            PanelId::News => &self.panels.news,
            PanelId::System => &self.panels.system,
        }
    }

    /// Mutable sources for a panel
    pub fn panel_mut(&mut self, panel: PanelId) -> &mut PanelConfig {
        match panel {
            PanelId::Epics => &mut self.panels.epics,
            PanelId::Cron => &mut self.panels.cron,
            PanelId::News => &mut self.panels.news,
            PanelId::System => &mut self.panels.system,
        }
    }

    /// Resolver tuning derived from the cache settings
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            cache_ttl: self.cache.ttl,
        }
    }

    /// Check values that would make the dashboard unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "http.user_agent must not be empty".to_string(),
            ));
        }
        for panel in PanelId::ALL {
            let cfg = self.panel(panel);
            if cfg.max_items == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "panels.{panel}.max_items must be greater than 0"
                )));
            }
            if cfg.primary_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "panels.{panel}.primary_url must not be empty"
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/moltdash/dashboard.toml` or
/// `~/.config/moltdash/dashboard.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("moltdash").join("dashboard.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<DashboardConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed, or if
/// the merged values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<DashboardConfig, ConfigError> {
    let mut config = DashboardConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: DashboardToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

fn apply_panel_toml(panel: &mut PanelConfig, toml: &PanelToml) {
    if let Some(ref url) = toml.primary_url {
        panel.primary_url = Some(url.clone());
    }
    if let Some(ref path) = toml.fallback_path {
        panel.fallback_path = Some(path.clone());
    }
    if let Some(use_cache) = toml.use_cache {
        panel.use_cache = use_cache;
    }
    if let Some(max_items) = toml.max_items {
        panel.max_items = max_items;
    }
}

fn apply_toml_config(config: &mut DashboardConfig, toml: &DashboardToml) {
    if let Some(ref dir) = toml.data_dir {
        config.data_dir = dir.clone();
    }

    if let Some(ref http) = toml.http {
        if let Some(secs) = http.timeout_secs {
            config.http.timeout = Duration::from_secs(secs);
        }
        if let Some(ref agent) = http.user_agent {
            config.http.user_agent = agent.clone();
        }
    }

    if let Some(ref cache) = toml.cache {
        if let Some(enabled) = cache.enabled {
            config.cache.enabled = enabled;
        }
        if let Some(ref dir) = cache.dir {
            config.cache.dir = Some(dir.clone());
        }
        if let Some(secs) = cache.ttl_secs {
            config.cache.ttl = (secs > 0).then(|| Duration::from_secs(secs));
        }
    }

    if let Some(ref panels) = toml.panels {
        let tables = [
            (PanelId::Epics, &panels.epics),
            (PanelId::Cron, &panels.cron),
            (PanelId::News, &panels.news),
            (PanelId::System, &panels.system),
        ];
        for (id, table) in tables
            .into_iter()
            .filter_map(|(id, table)| table.as_ref().map(|t| (id, t)))
        {
            apply_panel_toml(config.panel_mut(id), table);
        }
    }
}

fn env_flag(value: &str) -> bool {
    value != "0" && value.to_lowercase() != "false"
}

fn apply_env_config(config: &mut DashboardConfig) {
    if let Ok(timeout) = std::env::var("DASHBOARD_HTTP_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.http.timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(agent) = std::env::var("DASHBOARD_USER_AGENT") {
        config.http.user_agent = agent;
        config.source = ConfigSource::Env;
    }

    if let Ok(dir) = std::env::var("DASHBOARD_CACHE_DIR") {
        config.cache.dir = Some(PathBuf::from(dir));
        config.source = ConfigSource::Env;
    }
    if let Ok(ttl) = std::env::var("DASHBOARD_CACHE_TTL") {
        if let Ok(secs) = ttl.parse::<u64>() {
            config.cache.ttl = (secs > 0).then(|| Duration::from_secs(secs));
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(no_cache) = std::env::var("DASHBOARD_NO_CACHE") {
        config.cache.enabled = !env_flag(&no_cache);
        config.source = ConfigSource::Env;
    }

    if let Ok(dir) = std::env::var("DASHBOARD_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
        config.source = ConfigSource::Env;
    }
    if let Ok(url) = std::env::var("DASHBOARD_NEWS_URL") {
        config.panels.news.primary_url = Some(url);
        config.source = ConfigSource::Env;
    }
    if let Ok(url) = std::env::var("DASHBOARD_EPICS_URL") {
        config.panels.epics.primary_url = Some(url);
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Command-line overrides, applied last
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Cache directory override
    pub cache_dir: Option<PathBuf>,

    /// Disable the cache entirely
    pub no_cache: bool,

    /// Request timeout override (seconds)
    pub timeout_secs: Option<u64>,

    /// Data directory override
    pub data_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create empty overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache directory
    #[must_use]
    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = Some(dir);
        self
    }

    /// Disable the cache
    #[must_use]
    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set the data directory
    #[must_use]
    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = Some(dir);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut DashboardConfig) {
        let mut changed = false;

        if let Some(ref dir) = self.cache_dir {
            config.cache.dir = Some(dir.clone());
            changed = true;
        }
        if self.no_cache {
            config.cache.enabled = false;
            changed = true;
        }
        if let Some(secs) = self.timeout_secs {
            config.http.timeout = Duration::from_secs(secs);
            changed = true;
        }
        if let Some(ref dir) = self.data_dir {
            config.data_dir = dir.clone();
            changed = true;
        }

        if changed {
            config.source = ConfigSource::Cli;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
