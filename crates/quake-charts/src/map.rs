//! World map of events, sized and colored by magnitude

use crate::{
    color_scale::ColorScale,
    context::{ChartContext, DayZone},
    projection::Projection,
    types::{GeoLayout, GeoSeries, Layout, PlotSpec, Region, Series},
};
use quake_common::{Event, FeedSnapshot};

/// Marker diameter per unit of magnitude
pub const MARKER_SCALE: f64 = 5.0;

pub const MAP_TITLE: &str = "Earthquakes Around the World";

/// Geographic scatter with Viridis magnitude coloring
#[derive(Debug, Clone, Copy, Default)]
pub struct MapChart;

impl MapChart {
    /// Tooltip shown for one event
    pub fn hover_text(event: &Event, zone: &DayZone) -> String {
        let magnitude = event
            .magnitude
            .map_or_else(|| "unknown".to_string(), |m| m.to_string());
        format!(
            "{}<br>Magnitude: {}<br>Place: {}<br>Time: {}",
            event.title,
            magnitude,
            event.place,
            zone.format_time(&event.time)
        )
    }
}

impl Projection for MapChart {
    fn region(&self) -> Region {
        Region::Map
    }

    fn build(&self, snapshot: &FeedSnapshot, context: &ChartContext) -> PlotSpec {
        let events = snapshot.events();

        let series = GeoSeries {
            lon: events.iter().map(|e| e.longitude).collect(),
            lat: events.iter().map(|e| e.latitude).collect(),
            text: events
                .iter()
                .map(|e| Self::hover_text(e, &context.zone))
                .collect(),
            // Unknown magnitudes count as zero for size and scale
            size: events
                .iter()
                .map(|e| e.magnitude.unwrap_or(0.0) * MARKER_SCALE)
                .collect(),
            color: events.iter().map(|e| e.magnitude).collect(),
            color_scale: ColorScale::zero_to_max(events.iter().map(|e| e.magnitude.unwrap_or(0.0))),
            colorbar_title: "Magnitude".to_string(),
        };

        let layout = Layout::new(MAP_TITLE, context.font_color.clone()).with_geo(GeoLayout::default());

        PlotSpec::new(Region::Map, Series::ScatterGeo(series), layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(lon: f64, lat: f64, magnitude: f64) -> Event {
        Event {
            longitude: lon,
            latitude: lat,
            depth: Some(10.0),
            magnitude: Some(magnitude),
            place: "Somewhere".to_string(),
            title: format!("M {magnitude} - Somewhere"),
            time: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
        }
    }

    fn geo(spec: &PlotSpec) -> &GeoSeries {
        match &spec.series {
            Series::ScatterGeo(series) => series,
            other => panic!("expected scattergeo, got {}", other.kind()),
        }
    }

    #[test]
    fn test_markers_follow_magnitude() {
        let snapshot = FeedSnapshot::from_events(vec![event(10.0, 20.0, 3.0), event(-30.0, 40.0, 5.0)]);
        let spec = MapChart.build(&snapshot, &ChartContext::default());
        let series = geo(&spec);

        assert_eq!(series.lon, vec![10.0, -30.0]);
        assert_eq!(series.lat, vec![20.0, 40.0]);
        assert_eq!(series.size, vec![15.0, 25.0]);
        assert_eq!(series.color, vec![Some(3.0), Some(5.0)]);
        assert_eq!(series.color_scale.min(), 0.0);
        assert_eq!(series.color_scale.max(), 5.0);
        assert_eq!(series.colorbar_title, "Magnitude");
    }

    #[test]
    fn test_unknown_magnitude_keeps_its_marker() {
        let unknown = Event {
            magnitude: None,
            ..event(1.0, 2.0, 0.0)
        };
        let snapshot = FeedSnapshot::from_events(vec![event(10.0, 20.0, 2.5), unknown]);
        let spec = MapChart.build(&snapshot, &ChartContext::default());
        let series = geo(&spec);

        assert_eq!(series.lon.len(), 2);
        assert_eq!(series.size, vec![12.5, 0.0]);
        assert_eq!(series.color, vec![Some(2.5), None]);
        assert_eq!(series.color_scale.max(), 2.5);
        assert!(series.text[1].contains("Magnitude: unknown"));

        let value = spec.to_plotly();
        assert_eq!(value["data"][0]["marker"]["color"], serde_json::json!([2.5, null]));
    }

    #[test]
    fn test_hover_text() {
        let zone = DayZone::Named(chrono_tz::UTC);
        let text = MapChart::hover_text(&event(0.0, 0.0, 4.6), &zone);

        assert_eq!(
            text,
            "M 4.6 - Somewhere<br>Magnitude: 4.6<br>Place: Somewhere<br>Time: Tue Mar 05 2024 12:00:00 GMT+0000 (UTC)"
        );
    }

    #[test]
    fn test_layout() {
        let spec = MapChart.build(&FeedSnapshot::default(), &ChartContext::default());

        assert_eq!(spec.layout.title, MAP_TITLE);
        assert_eq!(spec.layout.font.color, "white");
        assert_eq!(spec.layout.geo, Some(GeoLayout::default()));
        assert!(spec.layout.xaxis.is_none());
        assert!(!spec.options.display_mode_bar);
    }

    #[test]
    fn test_empty_snapshot() {
        let spec = MapChart.build(&FeedSnapshot::default(), &ChartContext::default());
        let series = geo(&spec);

        assert!(series.lon.is_empty());
        assert_eq!(series.color_scale.max(), 0.0);
    }
}
