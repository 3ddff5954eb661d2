//! Bitmap output drawn with plotters

use crate::{
    color_scale::ColorScale,
    histogram::Bins,
    renderer::{ChartRenderer, RenderOutput},
    types::{Axis, GeoSeries, HistogramSeries, Layout, PlotSpec, ScatterSeries, Series},
};
use async_trait::async_trait;
use plotters::coord::{types::RangedCoordf64, Shift};
use plotters::prelude::*;
use quake_common::Result;
use quake_config::{ChartConfig, OutputConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bins aimed for when the histogram is binned automatically
const TARGET_BINS: usize = 20;

/// Width reserved for the map colorbar, in pixels
const COLORBAR_WIDTH: i32 = 110;

/// Steps drawn in the colorbar gradient
const COLORBAR_STEPS: usize = 64;

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type PlotChart<'a, 'b> = ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Canvas settings for bitmap output
#[derive(Debug, Clone, PartialEq)]
pub struct PngStyle {
    pub width: u32,
    pub height: u32,
    /// Canvas color shown through the transparent plot and paper
    pub background_color: String,
    pub font_family: String,
    pub title_size: u32,
    pub label_size: u32,
    pub margin: u32,
}

impl Default for PngStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            background_color: "#1E1E2E".to_string(),
            font_family: "sans-serif".to_string(),
            title_size: 24,
            label_size: 14,
            margin: 20,
        }
    }
}

impl PngStyle {
    pub fn from_config(output: &OutputConfig, chart: &ChartConfig) -> Self {
        Self {
            width: output.width,
            height: output.height,
            background_color: chart.background_color.clone(),
            font_family: chart.font_family.clone(),
            ..Self::default()
        }
    }
}

/// Parse a CSS color as used in layouts: `#rrggbb`, `rgb(..)`, `rgba(..)` or
/// one of `white`, `black`, `transparent`
pub fn parse_color(value: &str) -> Option<RGBAColor> {
    let value = value.trim().to_ascii_lowercase();

    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        return Some(RGBAColor(channel(0..2)?, channel(2..4)?, channel(4..6)?, 1.0));
    }

    match value.as_str() {
        "white" => return Some(RGBAColor(255, 255, 255, 1.0)),
        "black" => return Some(RGBAColor(0, 0, 0, 1.0)),
        "transparent" => return Some(RGBAColor(0, 0, 0, 0.0)),
        _ => {}
    }

    let inner = value
        .strip_prefix("rgba(")
        .or_else(|| value.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();

    match parts.as_slice() {
        [r, g, b] => Some(RGBAColor(r.parse().ok()?, g.parse().ok()?, b.parse().ok()?, 1.0)),
        [r, g, b, a] => Some(RGBAColor(
            r.parse().ok()?,
            g.parse().ok()?,
            b.parse().ok()?,
            a.parse::<f64>().ok()?.clamp(0.0, 1.0),
        )),
        _ => None,
    }
}

/// Padded `(min, max)` of `values`, `(0, 1)` when there is nothing to show
fn padded_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let bounds = finite.fold(None, |acc: Option<(f64, f64)>, v| {
        Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
    });

    match bounds {
        None => (0.0, 1.0),
        Some((lo, hi)) if lo == hi => (lo - 1.0, hi + 1.0),
        Some((lo, hi)) => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
    }
}

/// Upper bound for a count axis
fn count_ceiling(max: f64) -> f64 {
    (max * 1.1).max(1.0)
}

/// Writes `<directory>/<region>.png`
#[derive(Debug, Clone)]
pub struct PngRenderer {
    directory: PathBuf,
    style: PngStyle,
}

impl PngRenderer {
    pub fn new(directory: impl Into<PathBuf>, style: PngStyle) -> Self {
        Self {
            directory: directory.into(),
            style,
        }
    }

    pub fn path_for(&self, spec: &PlotSpec) -> PathBuf {
        self.directory.join(format!("{}.png", spec.region.id()))
    }

    pub fn style(&self) -> &PngStyle {
        &self.style
    }

    fn draw(&self, spec: &PlotSpec, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (self.style.width, self.style.height)).into_drawing_area();

        let background = parse_color(&self.style.background_color).unwrap_or(RGBAColor(30, 30, 46, 1.0));
        root.fill(&background)?;

        match &spec.series {
            Series::ScatterGeo(series) => self.draw_map(&root, &spec.layout, series)?,
            Series::Histogram(series) => self.draw_histogram(&root, &spec.layout, series)?,
            Series::Line(series) => self.draw_line(&root, &spec.layout, &series.x, &series.y)?,
            Series::Scatter(series) => self.draw_scatter(&root, &spec.layout, series)?,
        }

        root.present()?;
        Ok(())
    }

    fn font_color(layout: &Layout) -> RGBAColor {
        parse_color(&layout.font.color).unwrap_or(RGBAColor(255, 255, 255, 1.0))
    }

    fn text_style(&self, layout: &Layout, size: u32) -> TextStyle<'_> {
        (self.style.font_family.as_str(), size)
            .into_font()
            .color(&Self::font_color(layout))
    }

    /// Draw axis descriptions, labels and optionally the grid
    fn draw_mesh(
        &self,
        chart: &mut PlotChart<'_, '_>,
        layout: &Layout,
        x_formatter: Option<&dyn Fn(&f64) -> String>,
    ) -> Result<()> {
        let font_color = Self::font_color(layout);
        let label_style = self.text_style(layout, self.style.label_size);
        let default_axis = Axis::new("", true);
        let x_axis = layout.xaxis.as_ref().unwrap_or(&default_axis);
        let y_axis = layout.yaxis.as_ref().unwrap_or(&default_axis);

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(x_axis.title.as_str())
            .y_desc(y_axis.title.as_str())
            .axis_desc_style(label_style.clone())
            .label_style(label_style)
            .axis_style(font_color.stroke_width(1))
            .bold_line_style(font_color.mix(0.2).stroke_width(1))
            .light_line_style(font_color.mix(0.05).stroke_width(1));

        if let Some(formatter) = x_formatter {
            mesh.x_label_formatter(formatter);
        }

        if !x_axis.showgrid && !y_axis.showgrid {
            mesh.disable_mesh();
        } else if !x_axis.showgrid {
            mesh.disable_x_mesh();
        } else if !y_axis.showgrid {
            mesh.disable_y_mesh();
        }

        mesh.draw()?;
        Ok(())
    }

    fn draw_map(&self, root: &Canvas<'_>, layout: &Layout, series: &GeoSeries) -> Result<()> {
        let (width, _) = root.dim_in_pixel();
        let (plot_area, bar_area) = root.split_horizontally((width as i32 - COLORBAR_WIDTH).max(1));

        let ocean = layout
            .geo
            .as_ref()
            .and_then(|geo| parse_color(&geo.oceancolor))
            .unwrap_or(RGBAColor(255, 255, 255, 1.0));
        let outline = layout
            .geo
            .as_ref()
            .and_then(|geo| parse_color(&geo.countrycolor))
            .unwrap_or(RGBAColor(0, 0, 0, 1.0));

        let mut chart = ChartBuilder::on(&plot_area)
            .caption(&layout.title, self.text_style(layout, self.style.title_size))
            .margin(self.style.margin as i32)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(-180f64..180f64, -90f64..90f64)?;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(-180.0, -90.0), (180.0, 90.0)],
                ocean.filled(),
            )))?;

        let mut mesh_layout = layout.clone();
        mesh_layout.xaxis = Some(Axis::new("Longitude", true));
        mesh_layout.yaxis = Some(Axis::new("Latitude", true));
        self.draw_mesh(&mut chart, &mesh_layout, None)?;

        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(-180.0, -90.0), (180.0, 90.0)],
                outline.stroke_width(1),
            )))?;

        let scale = series.color_scale;
        let markers = series
            .lon
            .iter()
            .zip(&series.lat)
            .zip(series.size.iter().zip(&series.color))
            .filter_map(|(position, (size, value))| value.map(|v| (position, size, v)))
            .map(|((lon, lat), size, value)| {
                let [r, g, b] = scale.rgb(value);
                let radius = (size / 2.0).max(1.0).round() as i32;
                Circle::new((*lon, *lat), radius, RGBAColor(r, g, b, 0.8).filled())
            });
        chart.draw_series(markers)?;

        self.draw_colorbar(&bar_area, layout, &series.colorbar_title, scale)
    }

    fn draw_colorbar(
        &self,
        area: &Canvas<'_>,
        layout: &Layout,
        title: &str,
        scale: ColorScale,
    ) -> Result<()> {
        let (lo, hi) = if scale.max() > scale.min() {
            (scale.min(), scale.max())
        } else {
            (scale.min(), scale.min() + 1.0)
        };

        let mut bar = ChartBuilder::on(area)
            .caption(title, self.text_style(layout, self.style.label_size))
            .margin(self.style.margin as i32)
            .margin_top(self.style.margin as i32 * 3)
            .set_label_area_size(LabelAreaPosition::Right, 40)
            .build_cartesian_2d(0f64..1f64, lo..hi)?;

        let font_color = Self::font_color(layout);
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(6)
            .label_style(self.text_style(layout, self.style.label_size))
            .axis_style(font_color.stroke_width(1))
            .draw()?;

        let step = (hi - lo) / COLORBAR_STEPS as f64;
        bar.draw_series((0..COLORBAR_STEPS).map(|i| {
            let from = lo + step * i as f64;
            let [r, g, b] = ColorScale::sample((i as f64 + 0.5) / COLORBAR_STEPS as f64);
            Rectangle::new([(0.0, from), (1.0, from + step)], RGBColor(r, g, b).filled())
        }))?;

        Ok(())
    }

    fn draw_histogram(
        &self,
        root: &Canvas<'_>,
        layout: &Layout,
        series: &HistogramSeries,
    ) -> Result<()> {
        let bins = Bins::auto(series.x.iter().copied(), TARGET_BINS);
        let (x_lo, x_hi) = if bins.is_empty() {
            (0.0, 1.0)
        } else {
            (bins.start, bins.end())
        };
        let y_max = count_ceiling(bins.counts.iter().copied().max().unwrap_or(0) as f64);

        let mut chart = ChartBuilder::on(root)
            .caption(&layout.title, self.text_style(layout, self.style.title_size))
            .margin(self.style.margin as i32)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, 0f64..y_max)?;

        self.draw_mesh(&mut chart, layout, None)?;

        let bar_color = parse_color(&series.color).unwrap_or(RGBAColor(255, 255, 255, 1.0));
        chart
            .draw_series(bins.iter().filter(|(_, _, count)| *count > 0).map(|(left, right, count)| {
                Rectangle::new([(left, 0.0), (right, f64::from(count))], bar_color.filled())
            }))?;

        Ok(())
    }

    fn draw_line(
        &self,
        root: &Canvas<'_>,
        layout: &Layout,
        labels: &[String],
        counts: &[u32],
    ) -> Result<()> {
        let last = labels.len().saturating_sub(1) as f64;
        let y_max = count_ceiling(counts.iter().copied().max().unwrap_or(0) as f64);

        let mut chart = ChartBuilder::on(root)
            .caption(&layout.title, self.text_style(layout, self.style.title_size))
            .margin(self.style.margin as i32)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(last + 0.5), 0f64..y_max)?;

        // Category axis: only integral positions carry a label
        let formatter = |x: &f64| {
            let idx = x.round();
            if (x - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        };
        self.draw_mesh(&mut chart, layout, Some(&formatter))?;

        let line_color = Self::font_color(layout);
        let points = counts.iter().enumerate().map(|(i, count)| (i as f64, f64::from(*count)));
        chart
            .draw_series(LineSeries::new(points, line_color.stroke_width(2)))?;

        Ok(())
    }

    fn draw_scatter(&self, root: &Canvas<'_>, layout: &Layout, series: &ScatterSeries) -> Result<()> {
        let points: Vec<(f64, f64)> = series
            .x
            .iter()
            .zip(&series.y)
            .filter_map(|(x, y)| x.zip(*y))
            .collect();
        let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
        let ys: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
        let (x_lo, x_hi) = padded_range(&xs);
        let (y_lo, y_hi) = padded_range(&ys);

        let mut chart = ChartBuilder::on(root)
            .caption(&layout.title, self.text_style(layout, self.style.title_size))
            .margin(self.style.margin as i32)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

        self.draw_mesh(&mut chart, layout, None)?;

        let fill = parse_color(&series.marker.color).unwrap_or(RGBAColor(156, 165, 196, 0.95));
        let line = parse_color(&series.marker.line_color).unwrap_or(RGBAColor(156, 165, 196, 1.0));
        let radius = ((series.marker.size as f64) / 2.0).ceil() as i32;
        let line_width = series.marker.line_width;

        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, radius, fill.filled())))?;
        chart
            .draw_series(points.iter().map(|p| Circle::new(*p, radius, line.stroke_width(line_width))))?;

        Ok(())
    }
}

#[async_trait]
impl ChartRenderer for PngRenderer {
    async fn render(&self, spec: &PlotSpec) -> Result<RenderOutput> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.path_for(spec);
        debug!(
            "Drawing {} {} points into {}",
            spec.series.len(),
            spec.series.kind(),
            path.display()
        );
        self.draw(spec, &path)?;

        info!("Successfully rendered {} chart to {}", spec.region, path.display());
        Ok(RenderOutput::new(spec.region).with_path(path))
    }

    fn name(&self) -> &'static str {
        "png"
    }
}
