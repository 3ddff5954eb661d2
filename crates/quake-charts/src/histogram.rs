//! Distribution of event magnitudes

use crate::{
    context::ChartContext,
    projection::Projection,
    types::{Axis, HistogramSeries, Layout, PlotSpec, Region, Series},
};
use quake_common::FeedSnapshot;

pub const HISTOGRAM_TITLE: &str = "Histogram of Earthquake Magnitudes";

#[derive(Debug, Clone, Copy, Default)]
pub struct MagnitudeHistogram;

impl Projection for MagnitudeHistogram {
    fn region(&self) -> Region {
        Region::Barchart
    }

    fn build(&self, snapshot: &FeedSnapshot, context: &ChartContext) -> PlotSpec {
        let series = HistogramSeries {
            x: snapshot.events().iter().map(|e| e.magnitude).collect(),
            color: "white".to_string(),
        };

        let layout = Layout::new(HISTOGRAM_TITLE, context.font_color.clone()).with_axes(
            Axis::new("Magnitude", true),
            Axis::new("Number of Earthquakes", true),
        );

        PlotSpec::new(Region::Barchart, Series::Histogram(series), layout)
    }
}

/// Equal-width bins over a set of values, used when drawing bitmaps
#[derive(Debug, Clone, PartialEq)]
pub struct Bins {
    pub start: f64,
    pub width: f64,
    pub counts: Vec<u32>,
}

impl Bins {
    /// Upper bound on the number of bins drawn
    pub const MAX_BINS: usize = 1_000;

    /// Bin `values` at a width picked from `{1, 2, 5} x 10^k` so that roughly
    /// `target` bins cover the data. Missing and non-finite values are skipped.
    pub fn auto<I>(values: I, target: usize) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<f64>>,
    {
        let finite: Vec<f64> = values
            .into_iter()
            .filter_map(Into::<Option<f64>>::into)
            .filter(|v: &f64| v.is_finite())
            .collect();
        let (min, max) = match finite.iter().copied().fold(None, |acc: Option<(f64, f64)>, v| {
            Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
        }) {
            Some(range) => range,
            None => {
                return Self {
                    start: 0.0,
                    width: 1.0,
                    counts: Vec::new(),
                }
            }
        };

        let span = max - min;
        let width = nice_width(span / target.max(1) as f64);
        if !span.is_finite() || !width.is_finite() {
            return Self::single(min, finite.len());
        }

        // Offsets are taken in units of `width` so that wide ranges stay finite
        let start = (min / width).floor() * width;
        let offset = |value: f64| (value / width - start / width).floor();
        let last = offset(max).clamp(0.0, (Self::MAX_BINS - 1) as f64) as usize;

        let mut counts = vec![0u32; last + 1];
        for value in finite {
            let idx = offset(value).clamp(0.0, last as f64) as usize;
            counts[idx] += 1;
        }

        Self { start, width, counts }
    }

    /// One bin holding everything, for ranges too wide to subdivide
    fn single(start: f64, count: usize) -> Self {
        Self {
            start,
            width: f64::MAX,
            counts: vec![u32::try_from(count).unwrap_or(u32::MAX)],
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Right edge of the last bin
    pub fn end(&self) -> f64 {
        self.start + self.width * self.counts.len() as f64
    }

    /// `(left, right, count)` per bin
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, u32)> + '_ {
        self.counts.iter().enumerate().map(move |(i, count)| {
            let left = self.start + self.width * i as f64;
            (left, left + self.width, *count)
        })
    }
}

fn nice_width(raw: f64) -> f64 {
    if !(raw > 0.0) || !raw.is_finite() {
        return 1.0;
    }

    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quake_common::Event;

    fn event(magnitude: f64) -> Event {
        Event {
            longitude: 0.0,
            latitude: 0.0,
            depth: Some(0.0),
            magnitude: Some(magnitude),
            place: String::new(),
            title: String::new(),
            time: Utc::now(),
        }
    }

    #[test]
    fn test_one_value_per_event_in_order() {
        let snapshot = FeedSnapshot::from_events(vec![event(3.0), event(5.0), event(1.2)]);
        let spec = MagnitudeHistogram.build(&snapshot, &ChartContext::default());

        match spec.series {
            Series::Histogram(series) => {
                assert_eq!(series.x, vec![Some(3.0), Some(5.0), Some(1.2)]);
                assert_eq!(series.color, "white");
            }
            other => panic!("expected histogram, got {}", other.kind()),
        }
        assert_eq!(spec.layout.title, HISTOGRAM_TITLE);
        assert_eq!(spec.layout.yaxis.unwrap().title, "Number of Earthquakes");
    }

    #[test]
    fn test_auto_bins_count_every_value() {
        let values = [0.4, 1.1, 1.3, 2.5, 2.6, 2.7, 4.9];
        let bins = Bins::auto(values, 10);

        assert_eq!(bins.counts.iter().sum::<u32>(), values.len() as u32);
        assert!(bins.start <= 0.4);
        assert!(bins.end() > 4.9);
        assert!((bins.width - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_auto_bins_single_value() {
        let bins = Bins::auto([4.0, 4.0], 10);

        assert_eq!(bins.len(), 1);
        assert_eq!(bins.counts, vec![2]);
        assert_eq!(bins.width, 1.0);
    }

    #[test]
    fn test_auto_bins_empty_and_non_finite() {
        assert!(Bins::auto(Vec::<f64>::new(), 10).is_empty());
        assert!(Bins::auto([f64::NAN], 10).is_empty());

        let bins = Bins::auto([1.0, f64::INFINITY, 2.0], 10);
        assert_eq!(bins.counts.iter().sum::<u32>(), 2);
    }

    #[test]
    fn test_auto_bins_skip_missing_values() {
        let bins = Bins::auto([Some(2.0), None, Some(2.4), None], 10);

        assert_eq!(bins.counts.iter().sum::<u32>(), 2);
        assert!(bins.start > 1.0, "missing values must not pull a bin toward zero");

        assert!(Bins::auto([None::<f64>, None], 10).is_empty());
    }

    #[test]
    fn test_auto_bins_extreme_range() {
        let bins = Bins::auto([-1e308, 1e308], 20);

        assert_eq!(bins.len(), 1);
        assert_eq!(bins.counts, vec![2]);
        assert!(bins.start.is_finite());
        assert!(bins.end().is_finite());

        let wide = Bins::auto([-1e300, 0.0, 1e300], 20);
        assert_eq!(wide.counts.iter().sum::<u32>(), 3);
        assert!(wide.len() <= Bins::MAX_BINS);
    }

    #[test]
    fn test_auto_bins_count_is_capped() {
        let bins = Bins::auto([0.0, 1.0], usize::MAX);

        assert_eq!(bins.len(), Bins::MAX_BINS);
        assert_eq!(bins.counts.iter().sum::<u32>(), 2);
        assert_eq!(bins.counts[Bins::MAX_BINS - 1], 1);
    }

    #[test]
    fn test_unknown_magnitude_is_not_binned() {
        let unknown = Event {
            magnitude: None,
            ..event(0.0)
        };
        let snapshot = FeedSnapshot::from_events(vec![unknown, event(2.5)]);
        let spec = MagnitudeHistogram.build(&snapshot, &ChartContext::default());

        let Series::Histogram(series) = &spec.series else {
            panic!("expected histogram, got {}", spec.series.kind());
        };
        assert_eq!(series.x, vec![None, Some(2.5)]);

        let bins = Bins::auto(series.x.iter().copied(), 20);
        assert_eq!(bins.counts.iter().sum::<u32>(), 1);
        assert!(bins.iter().all(|(left, right, count)| count == 0 || (left <= 2.5 && 2.5 < right)));
    }

    #[test]
    fn test_nice_width() {
        assert!((nice_width(0.45) - 0.5).abs() < 1e-12);
        assert_eq!(nice_width(1.5), 2.0);
        assert_eq!(nice_width(3.0), 5.0);
        assert_eq!(nice_width(7.0), 10.0);
        assert_eq!(nice_width(0.0), 1.0);
    }
}
