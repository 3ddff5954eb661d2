//! Error types and utilities for quakeplot

use thiserror::Error;

/// Result type alias for quakeplot operations
pub type Result<T> = std::result::Result<T, QuakeError>;

/// Main error type for quakeplot operations
#[derive(Error, Debug)]
pub enum QuakeError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network related errors (connection refused, timeouts, etc.)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Feed endpoint answered, but not with a usable payload
    #[error("Feed error: {message}")]
    Feed {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Graph generation and plotting errors
    #[error("Graph error: {message}")]
    Graph {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },
}

impl QuakeError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new feed error
    pub fn feed(msg: impl Into<String>) -> Self {
        Self::Feed {
            message: msg.into(),
            status_code: None,
            source: None,
        }
    }

    /// Create a new feed error carrying the HTTP status
    pub fn feed_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Feed {
            message: msg.into(),
            status_code: Some(status),
            source: None,
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// True for the "feed retrieval/parse failure" family: the feed could not be
    /// reached, answered with an error, or sent a body that does not parse.
    pub fn is_feed_failure(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Feed { .. } | Self::Serialization(_)
        )
    }

    /// HTTP status attached to a feed error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Feed { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

/// Convert from reqwest::Error to QuakeError
impl From<reqwest::Error> for QuakeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_decode() {
            Self::Feed {
                message: "Failed to decode feed body".to_string(),
                status_code: None,
                source: Some(Box::new(err)),
            }
        } else if let Some(status) = err.status() {
            Self::Feed {
                message: format!("HTTP error: {}", status.as_u16()),
                status_code: Some(status.as_u16()),
                source: Some(Box::new(err)),
            }
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

/// Convert from url::ParseError to QuakeError
impl From<url::ParseError> for QuakeError {
    fn from(err: url::ParseError) -> Self {
        Self::config_with_source("Invalid feed URL", err)
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to QuakeError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for QuakeError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Graph rendering failed", err)
    }
}
