//! Configuration loading utilities

use crate::Config;
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "QUAKEPLOT_CONFIG_PATH";

/// Files searched in the working directory when no path is given
const DEFAULT_CONFIG_FILES: [&str; 2] = ["quakeplot.yaml", "quakeplot.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for quake_common::QuakeError {
    fn from(err: ConfigError) -> Self {
        quake_common::QuakeError::config_with_source("Failed to load configuration", err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        debug!("Parsed configuration from {}", path.as_ref().display());

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Locate the configuration file, falling back to defaults when there is none.
    ///
    /// Runs before logging is configured, so callers report the source
    /// themselves through [`ConfigLoader::config_path`].
    pub fn load() -> quake_common::Result<Config> {
        let config = match Self::config_path() {
            Some(path) => Self::load_config(&path)?,
            None => Self::load_defaults()?,
        };

        Ok(config)
    }

    /// File [`ConfigLoader::load`] reads: `QUAKEPLOT_CONFIG_PATH`, else the
    /// first default location that exists
    pub fn config_path() -> Option<PathBuf> {
        Self::locate(env::var(CONFIG_PATH_VAR).ok())
    }

    /// Defaults plus environment overrides
    pub fn load_defaults() -> Result<Config, ConfigError> {
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> quake_common::Result<Config> {
        Ok(Self::load_config(path)?)
    }

    fn locate(explicit: Option<String>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        DEFAULT_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists())
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |key| env::var(key).ok())
    }

    /// Apply overrides using an arbitrary variable lookup
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Feed configuration overrides
        if let Some(url) = lookup("QUAKEPLOT_FEED_URL") {
            config.feed.url = url;
        }

        if let Some(file) = lookup("QUAKEPLOT_FEED_FILE") {
            config.feed.file = Some(PathBuf::from(file));
        }

        if let Some(raw) = lookup("QUAKEPLOT_FEED_TIMEOUT") {
            config.feed.timeout_seconds = parse_var("QUAKEPLOT_FEED_TIMEOUT", &raw)?;
        }

        if let Some(raw) = lookup("QUAKEPLOT_FEED_MAX_RETRIES") {
            config.feed.max_retries = parse_var("QUAKEPLOT_FEED_MAX_RETRIES", &raw)?;
        }

        if let Some(raw) = lookup("QUAKEPLOT_FETCH_MODE") {
            config.feed.fetch_mode = parse_var("QUAKEPLOT_FETCH_MODE", &raw)?;
        }

        // Output configuration overrides
        if let Some(dir) = lookup("QUAKEPLOT_OUTPUT_DIR") {
            config.output.directory = PathBuf::from(dir);
        }

        if let Some(raw) = lookup("QUAKEPLOT_OUTPUT_FORMAT") {
            config.output.format = parse_var("QUAKEPLOT_OUTPUT_FORMAT", &raw)?;
        }

        if let Some(raw) = lookup("QUAKEPLOT_WIDTH") {
            config.output.width = parse_var("QUAKEPLOT_WIDTH", &raw)?;
        }

        if let Some(raw) = lookup("QUAKEPLOT_HEIGHT") {
            config.output.height = parse_var("QUAKEPLOT_HEIGHT", &raw)?;
        }

        // Chart configuration overrides
        if let Some(tz) = lookup("QUAKEPLOT_TIMEZONE") {
            config.chart.timezone = Some(tz);
        }

        // Logging configuration overrides
        if let Some(level) = lookup("QUAKEPLOT_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(file) = lookup("QUAKEPLOT_LOG_FILE") {
            config.logging.file = Some(file);
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::EnvParseError {
        var: var.to_string(),
        source: e.into(),
    })
}
