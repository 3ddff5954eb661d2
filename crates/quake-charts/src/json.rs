//! Plotly-compatible JSON output

use crate::{
    renderer::{ChartRenderer, RenderOutput},
    types::PlotSpec,
};
use async_trait::async_trait;
use quake_common::Result;
use std::path::PathBuf;
use tracing::info;

/// Writes `<directory>/<region>.json` holding `{data, layout, config}`
#[derive(Debug, Clone)]
pub struct JsonSpecRenderer {
    directory: PathBuf,
}

impl JsonSpecRenderer {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, spec: &PlotSpec) -> PathBuf {
        self.directory.join(format!("{}.json", spec.region.id()))
    }
}

#[async_trait]
impl ChartRenderer for JsonSpecRenderer {
    async fn render(&self, spec: &PlotSpec) -> Result<RenderOutput> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.path_for(spec);
        let body = serde_json::to_string_pretty(&spec.to_plotly())?;
        tokio::fs::write(&path, body).await?;

        info!("Wrote {} specification to {}", spec.region, path.display());
        Ok(RenderOutput::new(spec.region).with_path(path))
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
