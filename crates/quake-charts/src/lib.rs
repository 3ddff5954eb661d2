//! Earthquake chart generation for quakeplot
//!
//! Every chart follows the same path: fetch a [`FeedSnapshot`](quake_common::FeedSnapshot),
//! project it into a [`PlotSpec`] for one [`Region`], hand the spec to a
//! [`ChartRenderer`]. The [`Dashboard`] runs the four charts concurrently.

pub mod color_scale;
pub mod context;
pub mod daily_frequency;
pub mod dashboard;
pub mod depth_scatter;
pub mod histogram;
pub mod json;
pub mod map;
pub mod png;
pub mod projection;
pub mod renderer;
pub mod types;

pub use color_scale::ColorScale;
pub use context::{ChartContext, DayZone};
pub use daily_frequency::{format_day, DailyFrequencyChart, DailyFrequencyTable, DayCount};
pub use dashboard::{
    create_bar_chart, create_chart, create_dot_plot, create_line_chart, create_map, render_chart,
    Dashboard, DashboardReport, RegionOutcome,
};
pub use depth_scatter::DepthScatter;
pub use histogram::{Bins, MagnitudeHistogram};
pub use json::JsonSpecRenderer;
pub use map::{MapChart, MARKER_SCALE};
pub use png::{PngRenderer, PngStyle};
pub use projection::{projection_for, Projection};
pub use renderer::{renderer_for, ChartRenderer, MultiRenderer, RenderOutput};
pub use types::{
    Axis, DisplayOptions, GeoLayout, GeoSeries, HistogramSeries, Layout, LineSeries, PlotSpec,
    PointMarker, Region, ScatterSeries, Series, TRANSPARENT,
};
