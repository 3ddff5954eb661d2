//! Plot specification types
//!
//! A [`PlotSpec`] is the declarative bundle handed to a renderer: one series,
//! its layout and display options, addressed to a named [`Region`]. It
//! serializes to the `{data, layout, config}` shape Plotly accepts.

use crate::color_scale::ColorScale;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Fully transparent, used for plot and paper backgrounds
pub const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// Output slot a chart replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Map,
    Barchart,
    Linechart,
    Plotdot,
}

impl Region {
    /// Every region, in launch order
    pub const ALL: [Region; 4] = [
        Region::Map,
        Region::Barchart,
        Region::Linechart,
        Region::Plotdot,
    ];

    /// Target identifier, also used as the output file stem
    pub fn id(&self) -> &'static str {
        match self {
            Region::Map => "map",
            Region::Barchart => "barchart",
            Region::Linechart => "linechart",
            Region::Plotdot => "plotdot",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Geographic scatter: one marker per event
#[derive(Debug, Clone, PartialEq)]
pub struct GeoSeries {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    /// Hover text per marker
    pub text: Vec<String>,
    /// Marker diameters in pixels
    pub size: Vec<f64>,
    /// Values mapped through `color_scale`; `None` leaves the marker uncolored
    pub color: Vec<Option<f64>>,
    pub color_scale: ColorScale,
    pub colorbar_title: String,
}

/// Raw values; binning belongs to the renderer, which ignores `None`
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub x: Vec<Option<f64>>,
    pub color: String,
}

/// Category labels against counts
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub x: Vec<String>,
    pub y: Vec<u32>,
}

/// Marker styling for point scatters
#[derive(Debug, Clone, PartialEq)]
pub struct PointMarker {
    pub color: String,
    pub line_color: String,
    pub line_width: u32,
    pub symbol: String,
    pub size: u32,
}

/// Plain x/y scatter with uniform markers
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub name: String,
    /// A point with either coordinate missing is not drawn
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub marker: PointMarker,
}

/// The single trace a chart draws
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    ScatterGeo(GeoSeries),
    Histogram(HistogramSeries),
    Line(LineSeries),
    Scatter(ScatterSeries),
}

impl Series {
    /// Number of data elements in the trace
    pub fn len(&self) -> usize {
        match self {
            Series::ScatterGeo(s) => s.lon.len(),
            Series::Histogram(s) => s.x.len(),
            Series::Line(s) => s.x.len(),
            Series::Scatter(s) => s.x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the trace kind, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Series::ScatterGeo(_) => "scattergeo",
            Series::Histogram(_) => "histogram",
            Series::Line(_) => "line",
            Series::Scatter(_) => "scatter",
        }
    }

    /// Plotly trace object
    pub fn to_trace(&self) -> Value {
        match self {
            Series::ScatterGeo(s) => json!({
                "type": "scattergeo",
                "mode": "markers",
                "lon": s.lon,
                "lat": s.lat,
                "text": s.text,
                "marker": {
                    "size": s.size,
                    "color": s.color,
                    "colorscale": s.color_scale.name(),
                    "cmin": s.color_scale.min(),
                    "cmax": s.color_scale.max(),
                    "colorbar": { "title": s.colorbar_title },
                },
            }),
            Series::Histogram(s) => json!({
                "type": "histogram",
                "x": s.x,
                "marker": { "color": s.color },
            }),
            Series::Line(s) => json!({
                "type": "scatter",
                "mode": "lines",
                "x": s.x,
                "y": s.y,
            }),
            Series::Scatter(s) => json!({
                "type": "scatter",
                "mode": "markers",
                "name": s.name,
                "x": s.x,
                "y": s.y,
                "marker": {
                    "color": s.marker.color,
                    "line": { "color": s.marker.line_color, "width": s.marker.line_width },
                    "symbol": s.marker.symbol,
                    "size": s.marker.size,
                },
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub showgrid: bool,
}

impl Axis {
    pub fn new(title: impl Into<String>, showgrid: bool) -> Self {
        Self {
            title: title.into(),
            showgrid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Base map settings for geographic charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoLayout {
    pub projection: Projection,
    pub showcoastlines: bool,
    pub coastlinewidth: f64,
    pub showland: bool,
    pub landcolor: String,
    pub showocean: bool,
    pub oceancolor: String,
    pub showcountries: bool,
    pub countrycolor: String,
    pub countrywidth: f64,
    pub bgcolor: String,
}

impl Default for GeoLayout {
    fn default() -> Self {
        Self {
            projection: Projection {
                kind: "natural earth".to_string(),
            },
            showcoastlines: true,
            coastlinewidth: 0.3,
            showland: true,
            landcolor: TRANSPARENT.to_string(),
            showocean: true,
            oceancolor: "white".to_string(),
            showcountries: true,
            countrycolor: "black".to_string(),
            countrywidth: 0.3,
            bgcolor: TRANSPARENT.to_string(),
        }
    }
}

/// Chart layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoLayout>,
    pub font: Font,
    pub plot_bgcolor: String,
    pub paper_bgcolor: String,
}

impl Layout {
    /// Transparent backgrounds with the given text color
    pub fn new(title: impl Into<String>, font_color: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            xaxis: None,
            yaxis: None,
            geo: None,
            font: Font {
                color: font_color.into(),
            },
            plot_bgcolor: TRANSPARENT.to_string(),
            paper_bgcolor: TRANSPARENT.to_string(),
        }
    }

    pub fn with_axes(mut self, x: Axis, y: Axis) -> Self {
        self.xaxis = Some(x);
        self.yaxis = Some(y);
        self
    }

    pub fn with_geo(mut self, geo: GeoLayout) -> Self {
        self.geo = Some(geo);
        self
    }
}

/// Renderer display options
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayOptions {
    #[serde(rename = "displayModeBar")]
    pub display_mode_bar: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            display_mode_bar: false,
        }
    }
}

/// Everything a renderer needs to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub region: Region,
    pub series: Series,
    pub layout: Layout,
    pub options: DisplayOptions,
}

impl PlotSpec {
    pub fn new(region: Region, series: Series, layout: Layout) -> Self {
        Self {
            region,
            series,
            layout,
            options: DisplayOptions::default(),
        }
    }

    /// `{data, layout, config}` as consumed by `Plotly.newPlot`
    pub fn to_plotly(&self) -> Value {
        json!({
            "data": [self.series.to_trace()],
            "layout": self.layout,
            "config": self.options,
        })
    }
}
