//! Magnitude against depth

use crate::{
    context::ChartContext,
    projection::Projection,
    types::{Axis, Layout, PlotSpec, PointMarker, Region, ScatterSeries, Series},
};
use quake_common::FeedSnapshot;

pub const SCATTER_TITLE: &str = "Magnitude vs Depth";

const MARKER_FILL: &str = "rgba(156, 165, 196, 0.95)";
const MARKER_LINE: &str = "rgba(156, 165, 196, 1.0)";

#[derive(Debug, Clone, Copy, Default)]
pub struct DepthScatter;

impl DepthScatter {
    pub fn marker() -> PointMarker {
        PointMarker {
            color: MARKER_FILL.to_string(),
            line_color: MARKER_LINE.to_string(),
            line_width: 1,
            symbol: "circle".to_string(),
            size: 5,
        }
    }
}

impl Projection for DepthScatter {
    fn region(&self) -> Region {
        Region::Plotdot
    }

    fn build(&self, snapshot: &FeedSnapshot, context: &ChartContext) -> PlotSpec {
        let events = snapshot.events();
        let series = ScatterSeries {
            name: SCATTER_TITLE.to_string(),
            x: events.iter().map(|e| e.magnitude).collect(),
            y: events.iter().map(|e| e.depth).collect(),
            marker: Self::marker(),
        };

        let layout = Layout::new(SCATTER_TITLE, context.font_color.clone())
            .with_axes(Axis::new("Magnitude", false), Axis::new("Depth", false));

        PlotSpec::new(Region::Plotdot, Series::Scatter(series), layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quake_common::Event;

    fn event(magnitude: f64, depth: f64) -> Event {
        Event {
            longitude: 0.0,
            latitude: 0.0,
            depth: Some(depth),
            magnitude: Some(magnitude),
            place: String::new(),
            title: String::new(),
            time: Utc::now(),
        }
    }

    #[test]
    fn test_magnitude_on_x_depth_on_y() {
        let snapshot = FeedSnapshot::from_events(vec![event(3.0, 10.0), event(5.0, 35.5)]);
        let spec = DepthScatter.build(&snapshot, &ChartContext::default());

        let Series::Scatter(series) = &spec.series else {
            panic!("expected scatter, got {}", spec.series.kind());
        };
        assert_eq!(series.x, vec![Some(3.0), Some(5.0)]);
        assert_eq!(series.y, vec![Some(10.0), Some(35.5)]);
        assert_eq!(series.name, "Magnitude vs Depth");
        assert_eq!(series.marker, DepthScatter::marker());
    }

    #[test]
    fn test_missing_readings_stay_missing() {
        let no_magnitude = Event {
            magnitude: None,
            ..event(0.0, 12.0)
        };
        let no_depth = Event {
            depth: None,
            ..event(2.5, 0.0)
        };
        let snapshot = FeedSnapshot::from_events(vec![no_magnitude, no_depth, event(3.1, 7.0)]);
        let spec = DepthScatter.build(&snapshot, &ChartContext::default());

        assert_eq!(spec.series.len(), 3);
        let value = spec.to_plotly();
        assert_eq!(value["data"][0]["x"], serde_json::json!([null, 2.5, 3.1]));
        assert_eq!(value["data"][0]["y"], serde_json::json!([12.0, null, 7.0]));
    }

    #[test]
    fn test_plotly_trace() {
        let snapshot = FeedSnapshot::from_events(vec![event(2.0, 1.0)]);
        let value = DepthScatter.build(&snapshot, &ChartContext::default()).to_plotly();

        let trace = &value["data"][0];
        assert_eq!(trace["type"], "scatter");
        assert_eq!(trace["mode"], "markers");
        assert_eq!(trace["marker"]["color"], "rgba(156, 165, 196, 0.95)");
        assert_eq!(trace["marker"]["line"]["width"], 1);
        assert_eq!(trace["marker"]["symbol"], "circle");
        assert_eq!(value["layout"]["yaxis"]["title"], "Depth");
        assert_eq!(value["layout"]["xaxis"]["showgrid"], false);
    }
}
