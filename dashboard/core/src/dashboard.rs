//! Dashboard facade
//!
//! Ties configuration, resolver, renderers and tab state together. Surfaces
//! talk to a [`Dashboard`]; they never walk chains or build fragments
//! themselves.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheError, CacheStore, FileCacheStore, MemoryCacheStore};
use crate::config::{ConfigError, DashboardConfig};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::panel::PanelId;
use crate::render::{self, Fragment};
use crate::resolver::{Resolution, Resolver};
use crate::tabs::TabSet;

/// Errors raised while assembling a dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A resolved and rendered panel
#[derive(Clone, Debug, Serialize)]
pub struct PanelView {
    /// Panel shown
    pub panel: PanelId,
    /// Resolution the fragment was rendered from
    pub resolution: Resolution,
    /// Rendered body, or the error affordance when every source failed
    #[serde(skip)]
    pub fragment: Fragment,
}

/// Dashboard backed by the production cache and fetcher
pub type LiveDashboard = Dashboard<Arc<dyn CacheStore>, HttpFetcher>;

/// Panels, their chains and the visible tab
pub struct Dashboard<C: CacheStore, F: Fetcher> {
    config: DashboardConfig,
    resolver: Resolver<C, F>,
    tabs: RwLock<TabSet>,
    views: DashMap<PanelId, PanelView>,
}

impl LiveDashboard {
    /// Build a dashboard with an HTTP fetcher and the configured cache store
    ///
    /// With the cache disabled, or no usable cache directory, slots live in
    /// memory for the life of the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn from_config(config: DashboardConfig) -> Result<Self, DashboardError> {
        config.validate()?;

        let fetcher = HttpFetcher::new(
            config.http.timeout,
            &config.http.user_agent,
            config.data_dir.clone(),
        )?;

        let cache: Arc<dyn CacheStore> = if config.cache.enabled {
            match config.cache.dir.clone().or_else(FileCacheStore::default_dir) {
                Some(dir) => {
                    debug!(dir = %dir.display(), "Using file cache");
                    Arc::new(FileCacheStore::new(dir))
                }
                None => {
                    warn!("No cache directory available, using in-memory cache");
                    Arc::new(MemoryCacheStore::new())
                }
            }
        } else {
            Arc::new(MemoryCacheStore::new())
        };

        Ok(Self::new(config, cache, fetcher))
    }
}

impl<C: CacheStore, F: Fetcher> Dashboard<C, F> {
    /// Build a dashboard around an injected cache and fetcher
    pub fn new(config: DashboardConfig, cache: C, fetcher: F) -> Self {
        let resolver = Resolver::with_config(cache, fetcher, config.resolver_config());
        Self {
            config,
            resolver,
            tabs: RwLock::new(TabSet::default()),
            views: DashMap::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Underlying resolver
    pub fn resolver(&self) -> &Resolver<C, F> {
        &self.resolver
    }

    /// The visible panel
    pub fn active_panel(&self) -> PanelId {
        self.tabs.read().active()
    }

    /// Resolve and render one panel
    pub async fn load_panel(&self, panel: PanelId) -> PanelView {
        let chain = panel.chain(&self.config);
        let resolution = self.resolver.resolve(panel, &chain).await;

        let fragment = if resolution.is_exhausted() {
            render::render_error(panel, &resolution.warnings)
        } else {
            render::render_panel(panel, &resolution.records)
        };

        let view = PanelView {
            panel,
            resolution,
            fragment,
        };
        self.views.insert(panel, view.clone());
        view
    }

    /// Resolve and render every panel concurrently, in tab order
    pub async fn load_all(&self) -> Vec<PanelView> {
        let (epics, cron, news, system) = tokio::join!(
            self.load_panel(PanelId::Epics),
            self.load_panel(PanelId::Cron),
            self.load_panel(PanelId::News),
            self.load_panel(PanelId::System),
        );
        vec![epics, cron, news, system]
    }

    /// Make `panel` visible without loading it
    ///
    /// Returns whether the visible panel changed.
    pub fn set_active(&self, panel: PanelId) -> bool {
        let changed = self.tabs.write().switch(panel);
        debug!(panel = %panel, changed = changed, "Tab switched");
        changed
    }

    /// Make `panel` visible and load it
    pub async fn switch_tab(&self, panel: PanelId) -> PanelView {
        self.set_active(panel);
        self.load_panel(panel).await
    }

    /// Last view loaded for a panel
    pub fn view(&self, panel: PanelId) -> Option<PanelView> {
        self.views.get(&panel).map(|v| v.value().clone())
    }

    /// Full tabbed page from the views loaded so far
    pub fn page(&self) -> Fragment {
        let bodies: Vec<(PanelId, Fragment)> = PanelId::ALL
            .into_iter()
            .filter_map(|p| self.views.get(&p).map(|v| (p, v.fragment.clone())))
            .collect();
        let tabs = *self.tabs.read();
        render::render_page(&tabs, &bodies)
    }

    /// Remove cache slots for one panel, or all when `panel` is `None`
    ///
    /// Returns how many slots existed.
    ///
    /// # Errors
    ///
    /// Propagates the first store error.
    pub async fn clear_cache(&self, panel: Option<PanelId>) -> Result<usize, CacheError> {
        let panels = match panel {
            Some(p) => vec![p],
            None => PanelId::ALL.to_vec(),
        };

        let mut removed = 0;
        for p in panels {
            if self.resolver.invalidate(p).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
