//! Chart rendering trait and fan-out renderer

use crate::{
    json::JsonSpecRenderer,
    png::{PngRenderer, PngStyle},
    types::{PlotSpec, Region},
};
use async_trait::async_trait;
use quake_common::Result;
use quake_config::{ChartConfig, OutputConfig, OutputFormat};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Files written for one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutput {
    pub region: Region,
    pub paths: Vec<PathBuf>,
}

impl RenderOutput {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            paths: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.paths.push(path);
        self
    }
}

/// Draws a plot specification into its region, replacing previous output
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Render `spec` into the slot named by `spec.region`
    async fn render(&self, spec: &PlotSpec) -> Result<RenderOutput>;

    /// Short name for log lines
    fn name(&self) -> &'static str;
}

/// Hands each specification to several renderers in turn
#[derive(Clone, Default)]
pub struct MultiRenderer {
    renderers: Vec<Arc<dyn ChartRenderer>>,
}

impl MultiRenderer {
    pub fn new(renderers: Vec<Arc<dyn ChartRenderer>>) -> Self {
        Self { renderers }
    }

    pub fn push(&mut self, renderer: Arc<dyn ChartRenderer>) {
        self.renderers.push(renderer);
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

#[async_trait]
impl ChartRenderer for MultiRenderer {
    async fn render(&self, spec: &PlotSpec) -> Result<RenderOutput> {
        let mut output = RenderOutput::new(spec.region);
        for renderer in &self.renderers {
            debug!("Rendering {} with {}", spec.region, renderer.name());
            let part = renderer.render(spec).await?;
            output.paths.extend(part.paths);
        }
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "multi"
    }
}

/// Renderer matching the configured output format
pub fn renderer_for(output: &OutputConfig, chart: &ChartConfig) -> Arc<dyn ChartRenderer> {
    let png = || -> Arc<dyn ChartRenderer> {
        Arc::new(PngRenderer::new(
            output.directory.clone(),
            PngStyle::from_config(output, chart),
        ))
    };
    let json = || -> Arc<dyn ChartRenderer> { Arc::new(JsonSpecRenderer::new(output.directory.clone())) };

    match output.format {
        OutputFormat::Png => png(),
        OutputFormat::Json => json(),
        OutputFormat::Both => Arc::new(MultiRenderer::new(vec![png(), json()])),
    }
}
