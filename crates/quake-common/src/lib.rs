//! Common utilities and types for quakeplot

pub mod error;
pub mod logging;
pub mod usgs;

// Re-export commonly used types
pub use error::{QuakeError, Result};
pub use logging::{init_default_logging, init_logging, LoggingConfig};
pub use usgs::{
    Event, Feature, FeatureCollection, FeatureProperties, FeedClient, FeedClientConfig,
    FeedMetadata, FeedSnapshot, FeedSource, FileFeed, Geometry, DEFAULT_FEED_URL,
};
