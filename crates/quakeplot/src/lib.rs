//! Command line front end for quakeplot

use clap::Parser;
use quake_charts::{Dashboard, DashboardReport};
use quake_common::{QuakeError, Result};
use quake_config::{Config, ConfigLoader, FetchMode, OutputFormat};
use std::path::PathBuf;
use tracing::{debug, info};

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory the charts are written into
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, json or both
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// independent (one request per chart) or shared (one request in total)
    #[arg(long)]
    pub fetch_mode: Option<FetchMode>,

    /// Log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// GeoJSON feed URL
    #[arg(long, conflicts_with = "feed_file")]
    pub feed_url: Option<String>,

    /// Read the feed from a saved GeoJSON file instead of the network
    #[arg(long)]
    pub feed_file: Option<PathBuf>,
}

impl Args {
    /// Apply command line values on top of `config`; they win over file and
    /// environment settings
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(mode) = self.fetch_mode {
            config.feed.fetch_mode = mode;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(url) = &self.feed_url {
            config.feed.url = url.clone();
            config.feed.file = None;
        }
        if let Some(file) = &self.feed_file {
            config.feed.file = Some(file.clone());
        }
    }
}

/// Load configuration from the given file, or the usual locations, then
/// apply the command line
pub fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    args.apply(&mut config);
    config
        .validate_all()
        .map_err(|e| QuakeError::config_with_source("Invalid command line arguments", e))?;

    Ok(config)
}

/// Configuration file [`load_config`] reads, `None` when it falls back to defaults
pub fn config_source(args: &Args) -> Option<PathBuf> {
    args.config.clone().or_else(ConfigLoader::config_path)
}

/// Render every chart once
pub async fn run(config: &Config) -> Result<DashboardReport> {
    debug!("Effective configuration: {:?}", config);

    let dashboard = Dashboard::from_config(config)?;
    info!(
        "Rendering {} output into {}",
        config.output.format,
        config.output.directory.display()
    );

    Ok(dashboard.run().await)
}
