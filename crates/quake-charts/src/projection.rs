//! Projection trait: feed snapshot in, plot specification out

use crate::{
    context::ChartContext,
    daily_frequency::DailyFrequencyChart,
    depth_scatter::DepthScatter,
    histogram::MagnitudeHistogram,
    map::MapChart,
    types::{PlotSpec, Region},
};
use quake_common::FeedSnapshot;

/// Turns a snapshot into the specification for one region.
///
/// Projections are pure: they never fetch, never render and accept empty
/// snapshots.
pub trait Projection: Send + Sync {
    /// Region the produced specification is addressed to
    fn region(&self) -> Region;

    /// Build the specification
    fn build(&self, snapshot: &FeedSnapshot, context: &ChartContext) -> PlotSpec;
}

/// The projection drawing into `region`
pub fn projection_for(region: Region) -> Box<dyn Projection> {
    match region {
        Region::Map => Box::new(MapChart),
        Region::Barchart => Box::new(MagnitudeHistogram),
        Region::Linechart => Box::new(DailyFrequencyChart),
        Region::Plotdot => Box::new(DepthScatter),
    }
}
