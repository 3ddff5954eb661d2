//! USGS earthquake feed client and GeoJSON models
//!
//! The client wraps a pooled `reqwest` client with a request timeout, a
//! `governor` rate limiter and optional exponential-backoff retries. Every call
//! to [`FeedSource::fetch_snapshot`] issues a fresh request; nothing is cached.

use crate::error::{QuakeError, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, path::PathBuf, sync::Arc, time::Duration};
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Past-week "all magnitudes" summary feed
pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";

/// Configuration for the feed client
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// GeoJSON endpoint
    pub feed_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u32,
    /// Retries after the first attempt (default: 0)
    pub max_retries: usize,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            timeout_secs: 30,
            rate_limit_per_sec: 10,
            max_retries: 0,
            user_agent: concat!("quakeplot/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FeedClientConfig {
    /// Create a configuration pointing at the given feed
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set the rate limit
    pub fn with_rate_limit(mut self, rate_limit_per_sec: u32) -> Self {
        self.rate_limit_per_sec = rate_limit_per_sec;
        self
    }

    /// Set the maximum retry attempts
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Anything that can produce a fresh feed snapshot
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Retrieve and parse the current feed
    async fn fetch_snapshot(&self) -> Result<FeedSnapshot>;

    /// Human-readable origin, used in log lines
    fn describe(&self) -> String;
}

/// HTTP client for the USGS GeoJSON summary feeds
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    config: FeedClientConfig,
    feed_url: Url,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl FeedClient {
    /// Create a new feed client with the given configuration
    pub fn new(config: FeedClientConfig) -> Result<Self> {
        let feed_url = Url::parse(&config.feed_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| QuakeError::network_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_second(
            NonZeroU32::new(config.rate_limit_per_sec)
                .ok_or_else(|| QuakeError::config("Rate limit must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            config,
            feed_url,
            rate_limiter,
        })
    }

    /// Create a client for the default past-week feed
    pub fn with_defaults() -> Result<Self> {
        Self::new(FeedClientConfig::default())
    }

    /// The parsed endpoint
    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    /// The active configuration
    pub fn config(&self) -> &FeedClientConfig {
        &self.config
    }

    async fn request_once(&self) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(self.feed_url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            if status.is_client_error() {
                warn!("Feed rejected request: {}", status);
            } else {
                warn!("Feed server error: {}", status);
            }
            return Err(QuakeError::feed_with_status(
                format!("Feed returned {}", status),
                status.as_u16(),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| QuakeError::network_with_source("Failed to read feed body", e))
    }
}

/// 4xx answers will not change on a second attempt
fn is_retryable(err: &QuakeError) -> bool {
    match err.status_code() {
        Some(code) => StatusCode::from_u16(code)
            .map(|status| !status.is_client_error())
            .unwrap_or(true),
        None => matches!(err, QuakeError::Network { .. }),
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    #[instrument(skip(self), fields(url = %self.feed_url))]
    async fn fetch_snapshot(&self) -> Result<FeedSnapshot> {
        // 100ms, 200ms, 400ms, ...
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(50)
            .max_delay(Duration::from_secs(10))
            .take(self.config.max_retries);

        let body = RetryIf::start(strategy, || self.request_once(), is_retryable).await?;
        debug!("Feed body is {} bytes", body.len());

        let snapshot = FeedSnapshot::parse(&body)?;
        info!("Fetched {} events", snapshot.len());
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        self.feed_url.to_string()
    }
}

/// Reads a saved GeoJSON document from disk, for offline runs
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    /// Create a source backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileFeed {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_snapshot(&self) -> Result<FeedSnapshot> {
        let body = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            QuakeError::Feed {
                message: format!("Failed to read {}", self.path.display()),
                status_code: None,
                source: Some(Box::new(e)),
            }
        })?;
        FeedSnapshot::parse(&body)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// GeoJSON Models
// ============================================================================

/// Top-level GeoJSON document
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Feed metadata block
    #[serde(default)]
    pub metadata: Option<FeedMetadata>,
    /// One feature per event
    pub features: Vec<Feature>,
}

/// Feed-level metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedMetadata {
    /// Generation time in epoch milliseconds
    pub generated: Option<i64>,
    /// Feed title, e.g. "USGS All Earthquakes, Past Week"
    pub title: Option<String>,
    /// Number of features the feed claims to carry
    pub count: Option<u32>,
}

/// One seismic event as published
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Feature {
    /// Event identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Descriptive properties
    pub properties: FeatureProperties,
    /// Point geometry
    pub geometry: Geometry,
}

/// The subset of feature properties the charts read
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureProperties {
    /// Magnitude; the feed publishes `null` for some events
    pub mag: Option<f64>,
    /// Human readable location
    pub place: Option<String>,
    /// Origin time in epoch milliseconds
    pub time: Option<i64>,
    /// Display title, e.g. "M 2.1 - 10 km N of Somewhere"
    pub title: Option<String>,
}

/// `[longitude, latitude, depth_km]`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Geometry {
    /// Coordinate triple; depth may be absent
    pub coordinates: Vec<f64>,
}

/// A projected, immutable earthquake record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub longitude: f64,
    pub latitude: f64,
    /// Kilometres below the surface; `None` when the geometry has no third coordinate
    pub depth: Option<f64>,
    /// `None` when the feed publishes no magnitude
    pub magnitude: Option<f64>,
    pub place: String,
    pub title: String,
    pub time: DateTime<Utc>,
}

impl TryFrom<Feature> for Event {
    type Error = QuakeError;

    fn try_from(feature: Feature) -> Result<Self> {
        let label = feature.id.as_deref().unwrap_or("<unnamed>").to_string();

        let (longitude, latitude, depth) = match feature.geometry.coordinates.as_slice() {
            [lon, lat] => (*lon, *lat, None),
            [lon, lat, depth, ..] => (*lon, *lat, Some(*depth)),
            _ => {
                return Err(QuakeError::feed(format!(
                    "Feature {} has fewer than two coordinates",
                    label
                )))
            }
        };

        let millis = feature
            .properties
            .time
            .ok_or_else(|| QuakeError::feed(format!("Feature {} has no time", label)))?;
        let time = Utc
            .timestamp_millis_opt(millis)
            .single()
            .ok_or_else(|| QuakeError::feed(format!("Feature {} has invalid time {}", label, millis)))?;

        Ok(Self {
            longitude,
            latitude,
            depth,
            magnitude: feature.properties.mag,
            place: feature.properties.place.unwrap_or_default(),
            title: feature.properties.title.unwrap_or_default(),
            time,
        })
    }
}

/// Events of one feed retrieval, in feed order
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedSnapshot {
    pub title: Option<String>,
    pub generated: Option<DateTime<Utc>>,
    pub events: Vec<Event>,
}

impl FeedSnapshot {
    /// Wrap already-projected events
    pub fn from_events(events: Vec<Event>) -> Self {
        Self {
            title: None,
            generated: None,
            events,
        }
    }

    /// Parse a GeoJSON body
    pub fn parse(body: &str) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_str(body)?;
        Self::try_from(collection)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl TryFrom<FeatureCollection> for FeedSnapshot {
    type Error = QuakeError;

    fn try_from(collection: FeatureCollection) -> Result<Self> {
        let (title, generated) = match collection.metadata {
            Some(meta) => (
                meta.title,
                meta.generated
                    .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            ),
            None => (None, None),
        };

        let events = collection
            .features
            .into_iter()
            .map(Event::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            title,
            generated,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "metadata": {
            "generated": 1709640000000,
            "url": "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson",
            "title": "USGS All Earthquakes, Past Week",
            "status": 200,
            "api": "1.10.3",
            "count": 3
        },
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "mag": 4.6,
                    "place": "120 km SSW of Hihifo, Tonga",
                    "time": 1709636400000,
                    "updated": 1709637000000,
                    "title": "M 4.6 - 120 km SSW of Hihifo, Tonga"
                },
                "geometry": { "type": "Point", "coordinates": [-174.2, -16.9, 35.0] },
                "id": "us7000abcd"
            },
            {
                "type": "Feature",
                "properties": {
                    "mag": null,
                    "place": null,
                    "time": 1709550000000,
                    "title": "M ? - unknown"
                },
                "geometry": { "type": "Point", "coordinates": [-117.5, 35.7] },
                "id": "ci40000001"
            },
            {
                "type": "Feature",
                "properties": {
                    "mag": -0.4,
                    "place": "5 km NW of The Geysers, CA",
                    "time": 1709463600000,
                    "title": "M -0.4 - 5 km NW of The Geysers, CA"
                },
                "geometry": { "type": "Point", "coordinates": [-122.8, 38.8, 1.9] },
                "id": "nc75000001"
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_feed() {
        let snapshot = FeedSnapshot::parse(SAMPLE).unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.title.as_deref(), Some("USGS All Earthquakes, Past Week"));
        assert!(snapshot.generated.is_some());

        let first = &snapshot.events()[0];
        assert_eq!(first.longitude, -174.2);
        assert_eq!(first.latitude, -16.9);
        assert_eq!(first.depth, Some(35.0));
        assert_eq!(first.magnitude, Some(4.6));
        assert_eq!(first.place, "120 km SSW of Hihifo, Tonga");
        assert_eq!(first.time.timestamp_millis(), 1709636400000);
    }

    #[test]
    fn test_null_fields_keep_one_event_per_feature() {
        let snapshot = FeedSnapshot::parse(SAMPLE).unwrap();
        let second = &snapshot.events()[1];

        assert_eq!(second.magnitude, None);
        assert_eq!(second.depth, None);
        assert_eq!(second.place, "");
        assert_eq!(snapshot.events()[2].magnitude, Some(-0.4));
    }

    #[test]
    fn test_empty_collection() {
        let snapshot =
            FeedSnapshot::parse(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.title.is_none());
    }

    #[test]
    fn test_malformed_body_is_feed_failure() {
        let err = FeedSnapshot::parse("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(err.is_feed_failure());

        let err = FeedSnapshot::parse(r#"{"type": "FeatureCollection"}"#).unwrap_err();
        assert!(err.is_feed_failure());
    }

    #[test]
    fn test_feature_without_time_is_rejected() {
        let body = r#"{"features": [{
            "properties": {"mag": 1.0, "place": "x", "title": "x"},
            "geometry": {"coordinates": [1.0, 2.0, 3.0]}
        }]}"#;
        let err = FeedSnapshot::parse(body).unwrap_err();
        assert!(matches!(err, QuakeError::Feed { .. }));
        assert!(err.to_string().contains("no time"));
    }

    #[test]
    fn test_feature_with_single_coordinate_is_rejected() {
        let body = r#"{"features": [{
            "id": "bad1",
            "properties": {"mag": 1.0, "time": 0},
            "geometry": {"coordinates": [1.0]}
        }]}"#;
        let err = FeedSnapshot::parse(body).unwrap_err();
        assert!(err.to_string().contains("bad1"));
    }

    #[test]
    fn test_client_config_builder() {
        let config = FeedClientConfig::new("https://example.com/feed.geojson")
            .with_timeout(5)
            .with_rate_limit(2)
            .with_max_retries(3);

        assert_eq!(config.feed_url, "https://example.com/feed.geojson");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.rate_limit_per_sec, 2);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_client_defaults() {
        let client = FeedClient::with_defaults().unwrap();
        assert_eq!(client.feed_url().as_str(), DEFAULT_FEED_URL);
        assert_eq!(client.config().max_retries, 0);
        assert_eq!(client.describe(), DEFAULT_FEED_URL);
    }

    #[test]
    fn test_client_rejects_zero_rate_limit() {
        let result = FeedClient::new(FeedClientConfig::default().with_rate_limit(0));
        assert!(matches!(result, Err(QuakeError::Config { .. })));
    }

    #[test]
    fn test_client_rejects_bad_url() {
        let result = FeedClient::new(FeedClientConfig::new("not a url"));
        assert!(matches!(result, Err(QuakeError::Config { .. })));
    }

    #[test]
    fn test_retry_policy() {
        assert!(is_retryable(&QuakeError::network("reset")));
        assert!(is_retryable(&QuakeError::feed_with_status("down", 503)));
        assert!(!is_retryable(&QuakeError::feed_with_status("gone", 404)));
        assert!(!is_retryable(&QuakeError::feed("bad body")));
    }

    #[tokio::test]
    async fn test_unreachable_feed_returns_error() {
        // Port 9 (discard) on localhost is closed on CI machines
        let config = FeedClientConfig::new("http://127.0.0.1:9/feed.geojson").with_timeout(2);
        let client = FeedClient::new(config).unwrap();

        let err = client.fetch_snapshot().await.unwrap_err();
        assert!(err.is_feed_failure());
    }

    #[test]
    fn test_file_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("week.geojson");
        std::fs::write(&path, SAMPLE).unwrap();

        let feed = FileFeed::new(&path);
        let snapshot = tokio_test::block_on(feed.fetch_snapshot()).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(feed.describe(), path.display().to_string());

        let missing = FileFeed::new(dir.path().join("missing.geojson"));
        let err = tokio_test::block_on(missing.fetch_snapshot()).unwrap_err();
        assert!(err.is_feed_failure());
    }
}
