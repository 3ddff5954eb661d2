//! Configuration management for quakeplot

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader, CONFIG_PATH_VAR};
pub use settings::{
    ChartConfig, Config, FeedConfig, FetchMode, LoggingConfig, OutputConfig, OutputFormat,
};
