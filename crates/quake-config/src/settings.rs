//! Application configuration structures

use quake_common::{FeedClientConfig, LoggingConfig as LogSetup, DEFAULT_FEED_URL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Feed endpoint and HTTP client settings
    pub feed: FeedConfig,

    /// Where and how charts are written
    pub output: OutputConfig,

    /// Chart styling and date handling
    pub chart: ChartConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// How the four charts obtain their data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Every chart issues its own request
    #[default]
    Independent,
    /// One request, the snapshot is reused by every chart
    Shared,
}

impl FromStr for FetchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "independent" => Ok(Self::Independent),
            "shared" => Ok(Self::Shared),
            other => Err(format!("unknown fetch mode '{}'", other)),
        }
    }
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Independent => write!(f, "independent"),
            Self::Shared => write!(f, "shared"),
        }
    }
}

/// Output artefact kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Bitmap images drawn with plotters
    #[default]
    Png,
    /// Plotly-compatible `{data, layout, config}` documents
    Json,
    /// Both of the above
    Both,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "json" => Ok(Self::Json),
            "both" => Ok(Self::Both),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Json => write!(f, "json"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// Feed endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FeedConfig {
    /// GeoJSON summary feed URL
    #[validate(url(message = "Feed URL must be a valid URL"))]
    #[validate(custom(function = "crate::validation::validate_feed_url", message = "Feed URL must use http or https"))]
    pub url: String,

    /// Read the feed from this file instead of the network
    pub file: Option<PathBuf>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_seconds: u64,

    /// Requests per second allowed towards the feed host
    #[validate(range(min = 1, max = 100, message = "Rate limit must be between 1 and 100 requests per second"))]
    pub rate_limit_per_sec: u32,

    /// Retries after a failed request
    #[validate(range(max = 10, message = "Max retries cannot exceed 10"))]
    pub max_retries: usize,

    /// Independent fetch per chart, or one shared snapshot
    pub fetch_mode: FetchMode,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            file: None,
            timeout_seconds: 30,
            rate_limit_per_sec: 10,
            max_retries: 0,
            fetch_mode: FetchMode::Independent,
        }
    }
}

impl FeedConfig {
    /// Settings for the HTTP feed client
    pub fn client_config(&self) -> FeedClientConfig {
        FeedClientConfig::new(self.url.clone())
            .with_timeout(self.timeout_seconds)
            .with_rate_limit(self.rate_limit_per_sec)
            .with_max_retries(self.max_retries)
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the region files are written into
    pub directory: PathBuf,

    /// png, json or both
    pub format: OutputFormat,

    /// Image width in pixels
    #[validate(range(min = 100, max = 4000, message = "Width must be between 100 and 4000 pixels"))]
    pub width: u32,

    /// Image height in pixels
    #[validate(range(min = 100, max = 4000, message = "Height must be between 100 and 4000 pixels"))]
    pub height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("charts"),
            format: OutputFormat::Png,
            width: 1200,
            height: 700,
        }
    }
}

/// Chart styling configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChartConfig {
    /// Text color (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Font color must be valid hex color"))]
    pub font_color: String,

    /// Canvas color behind the transparent plot area of bitmap output (hex format)
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Background color must be valid hex color"))]
    pub background_color: String,

    /// Font family for text rendering
    #[validate(length(min = 1, message = "Font family cannot be empty"))]
    pub font_family: String,

    /// IANA zone used to bucket events by day; local time when unset
    #[validate(custom(function = "crate::validation::validate_timezone", message = "Timezone must be an IANA name such as Europe/Paris"))]
    pub timezone: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            font_color: "#FFFFFF".to_string(),
            background_color: "#1E1E2E".to_string(),
            font_family: "sans-serif".to_string(),
            timezone: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Optional log file path
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Log file path contains invalid characters"))]
    pub file: Option<String>,

    /// Single-line output instead of the pretty format
    pub compact: bool,

    /// Whether to log span open/close events
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            compact: false,
            include_spans: false,
        }
    }
}

impl LoggingConfig {
    /// Settings for the tracing subscriber
    pub fn to_setup(&self) -> LogSetup {
        LogSetup {
            level: self.level.clone(),
            compact: self.compact,
            file_path: self.file.clone(),
            include_spans: self.include_spans,
            ..LogSetup::default()
        }
    }
}

impl Config {
    /// Validate every section
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.feed.validate()?;
        self.output.validate()?;
        self.chart.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.feed.url, DEFAULT_FEED_URL);
        assert_eq!(config.feed.fetch_mode, FetchMode::Independent);
        assert_eq!(config.output.format, OutputFormat::Png);
        assert_eq!(config.chart.font_color, "#FFFFFF");
    }

    #[test]
    fn test_invalid_sections() {
        let mut config = Config::default();
        config.output.width = 0;
        assert!(config.validate_all().is_err());

        let mut config = Config::default();
        config.chart.font_color = "white".to_string();
        assert!(config.validate_all().is_err());

        let mut config = Config::default();
        config.feed.url = "ftp://example.com/feed.geojson".to_string();
        assert!(config.validate_all().is_err());

        let mut config = Config::default();
        config.chart.timezone = Some("Mars/Olympus_Mons".to_string());
        assert!(config.validate_all().is_err());

        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("shared".parse::<FetchMode>(), Ok(FetchMode::Shared));
        assert_eq!("Independent".parse::<FetchMode>(), Ok(FetchMode::Independent));
        assert!("sometimes".parse::<FetchMode>().is_err());

        assert_eq!("BOTH".parse::<OutputFormat>(), Ok(OutputFormat::Both));
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert!("svg".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_client_config_mapping() {
        let mut feed = FeedConfig::default();
        feed.timeout_seconds = 12;
        feed.max_retries = 2;

        let client = feed.client_config();
        assert_eq!(client.feed_url, DEFAULT_FEED_URL);
        assert_eq!(client.timeout_secs, 12);
        assert_eq!(client.max_retries, 2);
    }

    #[test]
    fn test_logging_setup_mapping() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            file: Some("/tmp/quakeplot.log".to_string()),
            compact: true,
            include_spans: true,
        };
        let setup = logging.to_setup();
        assert_eq!(setup.level, "debug");
        assert_eq!(setup.file_path.as_deref(), Some("/tmp/quakeplot.log"));
        assert!(setup.compact);
        assert!(setup.include_targets);
    }
}
