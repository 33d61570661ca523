//! moltdash Dashboard CLI
//!
//! Resolves panels through their fallback chains and prints the rendered
//! markup on stdout. Logs go to stderr so output can be piped.
//!
//! # Usage
//!
//! ```bash
//! # One panel as HTML
//! dashboard render news
//!
//! # Full tabbed page with the cron tab visible
//! dashboard page --active cron
//!
//! # Raw resolution (records, source used, warnings) as JSON
//! dashboard resolve epics
//!
//! # Show each panel's chain
//! dashboard panels
//!
//! # Drop cached data for one panel, or all
//! dashboard clear-cache epics
//! dashboard clear-cache
//!
//! # Verbose logging
//! dashboard --log-level debug render epics
//! ```
//!
//! # Environment Variables
//!
//! - `DASHBOARD_CONFIG`: config file (default `~/.config/moltdash/dashboard.toml`)
//! - `DASHBOARD_LOG_LEVEL`: log level (trace, debug, info, warn, error)
//! - `RUST_LOG`: full filter directive, overrides the level
//! - `DASHBOARD_*`: configuration overrides, see `dashboard_core::config`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use dashboard_core::{
    default_config_path, load_config_from_path, ConfigOverrides, DashboardConfig, LiveDashboard,
    PanelId, Source,
};

/// moltdash - tabbed status dashboard with cache and fallback data chains
#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short = 'c', long, env = "DASHBOARD_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short = 'l',
        long,
        env = "DASHBOARD_LOG_LEVEL",
        default_value = "warn",
        global = true
    )]
    log_level: String,

    /// Directory holding cache slots
    #[arg(long, value_name = "DIR", global = true)]
    cache_dir: Option<PathBuf>,

    /// Skip the cache entirely
    #[arg(long, global = true)]
    no_cache: bool,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    timeout_secs: Option<u64>,

    /// Base directory for static data files
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one panel and print its markup
    Render {
        /// Panel to render (epics, cron, news, system)
        panel: PanelId,
    },

    /// Resolve every panel and print the tabbed page
    Page {
        /// Panel visible on load
        #[arg(long, default_value = "epics")]
        active: PanelId,
    },

    /// Resolve one panel and print the resolution as JSON
    Resolve {
        /// Panel to resolve
        panel: PanelId,
    },

    /// List panels and their source chains
    Panels,

    /// Remove cached data for one panel, or all panels
    ClearCache {
        /// Panel whose slot to remove; all when omitted
        panel: Option<PanelId>,
    },
}

/// Initialize logging with the specified level, writing to stderr
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("dashboard={level},dashboard_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}

/// Merge file, environment and command-line configuration
fn build_config(args: &Args) -> Result<DashboardConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path.clone())
        .with_context(|| format!("Failed to load configuration from {path:?}"))?;

    let mut overrides = ConfigOverrides::new().with_no_cache(args.no_cache);
    if let Some(ref dir) = args.cache_dir {
        overrides = overrides.with_cache_dir(dir.clone());
    }
    if let Some(secs) = args.timeout_secs {
        overrides = overrides.with_timeout_secs(secs);
    }
    if let Some(ref dir) = args.data_dir {
        overrides = overrides.with_data_dir(dir.clone());
    }
    overrides.apply(&mut config);

    debug!(source = %config.source(), "Configuration loaded");
    Ok(config)
}

fn describe_chain(chain: &[Source]) -> String {
    chain
        .iter()
        .map(Source::describe)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    let config = build_config(&args)?;

    if let Command::Panels = args.command {
        for panel in PanelId::ALL {
            println!("{panel:<8} {}", describe_chain(&panel.chain(&config)));
        }
        return Ok(());
    }

    let dashboard = LiveDashboard::from_config(config).context("Failed to start dashboard")?;

    match args.command {
        Command::Render { panel } => {
            let view = dashboard.switch_tab(panel).await;
            println!("{}", view.fragment.to_html());
        }
        Command::Page { active } => {
            dashboard.set_active(active);
            dashboard.load_all().await;
            println!("{}", dashboard.page().to_html());
        }
        Command::Resolve { panel } => {
            let view = dashboard.load_panel(panel).await;
            let json = serde_json::to_string_pretty(&view.resolution)
                .context("Failed to serialize resolution")?;
            println!("{json}");
        }
        Command::ClearCache { panel } => {
            let removed = dashboard
                .clear_cache(panel)
                .await
                .context("Failed to clear cache")?;
            info!(removed = removed, "Cache cleared");
            println!("Removed {removed} cache slot(s)");
        }
        Command::Panels => {}
    }

    Ok(())
}
