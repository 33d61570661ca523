//! Panel identifiers
//!
//! Each dashboard section is a panel with its own data chain and renderer.
//! [`PanelId`] names them; chains are assembled from configuration in
//! [`PanelId::chain`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DashboardConfig;
use crate::defaults;
use crate::source::{PayloadFormat, Source, SourceKind};

/// Identifier of one dashboard panel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelId {
    /// Project epics
    Epics,
    /// Scheduled job status
    Cron,
    /// News headlines
    News,
    /// System and resource status
    System,
}

impl PanelId {
    /// All panels in tab order
    pub const ALL: [PanelId; 4] = [Self::Epics, Self::Cron, Self::News, Self::System];

    /// Lowercase identifier used in config, CLI and markup ids
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Epics => "epics",
            Self::Cron => "cron",
            Self::News => "news",
            Self::System => "system",
        }
    }

    /// Key of this panel's cache slot
    #[must_use]
    pub fn cache_key(self) -> String {
        format!("moltbot-{}-data", self.as_str())
    }

    /// Human title shown on the tab button
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Epics => "Epics",
            Self::Cron => "Cron Jobs",
            Self::News => "News",
            Self::System => "System",
        }
    }

    /// Build this panel's resolution chain
    ///
    /// Order is always cache, primary, fallback file, embedded default, with
    /// the first three present only when configured.
    #[must_use]
    pub fn chain(self, config: &DashboardConfig) -> Vec<Source> {
        let panel = config.panel(self);
        let format = match self {
            Self::News => PayloadFormat::Rss {
                max_items: panel.max_items,
            },
            _ => PayloadFormat::JsonArray,
        };

        let mut chain = Vec::with_capacity(4);
        if panel.use_cache && config.cache.enabled {
            chain.push(Source::Cache);
        }
        if let Some(ref url) = panel.primary_url {
            chain.push(Source::remote(SourceKind::RemotePrimary, url.clone(), format));
        }
        if let Some(ref path) = panel.fallback_path {
            // Static data files are always JSON arrays, even for the news panel
            chain.push(Source::remote(
                SourceKind::RemoteFallbackFile,
                path.clone(),
                PayloadFormat::JsonArray,
            ));
        }
        chain.push(Source::Default(defaults::for_panel(self)));
        chain
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown panel name
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown panel '{0}' (expected one of: epics, cron, news, system)")]
pub struct UnknownPanel(pub String);

impl FromStr for PanelId {
    type Err = UnknownPanel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "epics" => Ok(Self::Epics),
            "cron" => Ok(Self::Cron),
            "news" => Ok(Self::News),
            "system" => Ok(Self::System),
            _ => Err(UnknownPanel(s.to_string())),
        }
    }
}
