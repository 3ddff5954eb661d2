//! Chart functions and the dashboard that runs all four at once

use crate::{
    context::ChartContext,
    projection::projection_for,
    renderer::{renderer_for, ChartRenderer, RenderOutput},
    types::Region,
};
use quake_common::{FeedClient, FeedSnapshot, FeedSource, FileFeed, QuakeError, Result};
use quake_config::{Config, FetchMode};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Fetch a fresh snapshot and render `region` from it.
///
/// A failed fetch or parse is returned as is and the renderer is not called.
pub async fn create_chart(
    region: Region,
    source: &dyn FeedSource,
    renderer: &dyn ChartRenderer,
    context: &ChartContext,
) -> Result<RenderOutput> {
    let snapshot = source.fetch_snapshot().await?;
    render_chart(region, &snapshot, renderer, context).await
}

/// Project an already fetched snapshot into `region` and render it
pub async fn render_chart(
    region: Region,
    snapshot: &FeedSnapshot,
    renderer: &dyn ChartRenderer,
    context: &ChartContext,
) -> Result<RenderOutput> {
    let spec = projection_for(region).build(snapshot, context);
    renderer.render(&spec).await
}

/// World map in the `map` region
pub async fn create_map(
    source: &dyn FeedSource,
    renderer: &dyn ChartRenderer,
    context: &ChartContext,
) -> Result<RenderOutput> {
    create_chart(Region::Map, source, renderer, context).await
}

/// Magnitude histogram in the `barchart` region
pub async fn create_bar_chart(
    source: &dyn FeedSource,
    renderer: &dyn ChartRenderer,
    context: &ChartContext,
) -> Result<RenderOutput> {
    create_chart(Region::Barchart, source, renderer, context).await
}

/// Daily frequency line in the `linechart` region
pub async fn create_line_chart(
    source: &dyn FeedSource,
    renderer: &dyn ChartRenderer,
    context: &ChartContext,
) -> Result<RenderOutput> {
    create_chart(Region::Linechart, source, renderer, context).await
}

/// Magnitude against depth in the `plotdot` region
pub async fn create_dot_plot(
    source: &dyn FeedSource,
    renderer: &dyn ChartRenderer,
    context: &ChartContext,
) -> Result<RenderOutput> {
    create_chart(Region::Plotdot, source, renderer, context).await
}

/// Result of one region
#[derive(Debug)]
pub struct RegionOutcome {
    pub region: Region,
    pub result: Result<RenderOutput>,
}

impl RegionOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Results of one dashboard run, in region order
#[derive(Debug, Default)]
pub struct DashboardReport {
    pub outcomes: Vec<RegionOutcome>,
}

impl DashboardReport {
    pub fn outcome(&self, region: Region) -> Option<&RegionOutcome> {
        self.outcomes.iter().find(|o| o.region == region)
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed() == 0
    }

    /// Nothing was rendered at all
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded() == 0
    }
}

/// Runs the four chart functions against one source and one renderer
pub struct Dashboard {
    source: Arc<dyn FeedSource>,
    renderer: Arc<dyn ChartRenderer>,
    context: ChartContext,
    mode: FetchMode,
}

impl Dashboard {
    pub fn new(source: Arc<dyn FeedSource>, renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            source,
            renderer,
            context: ChartContext::default(),
            mode: FetchMode::default(),
        }
    }

    /// Source, renderer, styling and fetch mode taken from configuration.
    /// A configured feed file takes precedence over the feed URL.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source: Arc<dyn FeedSource> = match &config.feed.file {
            Some(path) => Arc::new(FileFeed::new(path.clone())),
            None => Arc::new(FeedClient::new(config.feed.client_config())?),
        };
        let renderer = renderer_for(&config.output, &config.chart);
        let context = ChartContext::from_config(&config.chart)?;

        Ok(Self::new(source, renderer)
            .with_context(context)
            .with_fetch_mode(config.feed.fetch_mode))
    }

    pub fn with_context(mut self, context: ChartContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_fetch_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.mode
    }

    pub fn context(&self) -> &ChartContext {
        &self.context
    }

    /// Launch all four charts concurrently and wait for every one of them.
    /// Failures are logged and reported, never raised.
    #[instrument(skip(self), fields(source = %self.source.describe(), mode = %self.mode))]
    pub async fn run(&self) -> DashboardReport {
        let results = match self.mode {
            FetchMode::Independent => self.run_independent().await,
            FetchMode::Shared => self.run_shared().await,
        };

        let outcomes: Vec<RegionOutcome> = Region::ALL
            .into_iter()
            .zip(results)
            .map(|(region, result)| {
                match &result {
                    Ok(output) => info!("Rendered {} ({} file(s))", region, output.paths.len()),
                    Err(e) if e.is_feed_failure() => warn!("Skipped {}: feed unavailable: {}", region, e),
                    Err(e) => warn!("Failed to render {}: {}", region, e),
                }
                RegionOutcome { region, result }
            })
            .collect();

        let report = DashboardReport { outcomes };
        info!(
            "Dashboard finished: {} rendered, {} failed",
            report.succeeded(),
            report.failed()
        );
        report
    }

    async fn run_independent(&self) -> [Result<RenderOutput>; 4] {
        let source = self.source.as_ref();
        let renderer = self.renderer.as_ref();
        let context = &self.context;

        let (map, bar, line, dot) = futures::join!(
            create_map(source, renderer, context),
            create_bar_chart(source, renderer, context),
            create_line_chart(source, renderer, context),
            create_dot_plot(source, renderer, context),
        );
        [map, bar, line, dot]
    }

    async fn run_shared(&self) -> [Result<RenderOutput>; 4] {
        let snapshot = match self.source.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Shared feed fetch failed: {}", e);
                return Region::ALL.map(|region| {
                    Err(QuakeError::feed(format!(
                        "Shared feed fetch failed before rendering {}: {}",
                        region, e
                    )))
                });
            }
        };

        let renderer = self.renderer.as_ref();
        let context = &self.context;
        let (map, bar, line, dot) = futures::join!(
            render_chart(Region::Map, &snapshot, renderer, context),
            render_chart(Region::Barchart, &snapshot, renderer, context),
            render_chart(Region::Linechart, &snapshot, renderer, context),
            render_chart(Region::Plotdot, &snapshot, renderer, context),
        );
        [map, bar, line, dot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quake_config::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn test_report_counts() {
        let report = DashboardReport {
            outcomes: vec![
                RegionOutcome {
                    region: Region::Map,
                    result: Ok(RenderOutput::new(Region::Map)),
                },
                RegionOutcome {
                    region: Region::Barchart,
                    result: Err(QuakeError::feed("down")),
                },
            ],
        };

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_failed());
        assert!(!report.is_complete_success());
        assert!(report.outcome(Region::Barchart).is_some_and(|o| !o.is_ok()));
        assert!(report.outcome(Region::Plotdot).is_none());
    }

    #[test]
    fn test_empty_report_is_not_all_failed() {
        assert!(!DashboardReport::default().all_failed());
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.feed.fetch_mode = FetchMode::Shared;
        config.feed.file = Some(PathBuf::from("week.geojson"));
        config.output.format = OutputFormat::Json;
        config.chart.timezone = Some("UTC".to_string());

        let dashboard = Dashboard::from_config(&config).expect("dashboard builds");

        assert_eq!(dashboard.fetch_mode(), FetchMode::Shared);
        assert_eq!(dashboard.source.describe(), "week.geojson");
        assert_eq!(dashboard.renderer.name(), "json");
        assert_eq!(dashboard.context().font_color, "#FFFFFF");
    }

    #[test]
    fn test_from_config_uses_feed_url() {
        let mut config = Config::default();
        config.feed.url = "http://127.0.0.1:9/all_week.geojson".to_string();

        let dashboard = Dashboard::from_config(&config).expect("dashboard builds");
        assert_eq!(dashboard.source.describe(), "http://127.0.0.1:9/all_week.geojson");
        assert_eq!(dashboard.fetch_mode(), FetchMode::Independent);
    }
}
