//! Events per calendar day

use crate::{
    context::{ChartContext, DayZone},
    projection::Projection,
    types::{Axis, Layout, LineSeries, PlotSpec, Region, Series},
};
use chrono::NaiveDate;
use quake_common::{Event, FeedSnapshot};
use std::collections::HashMap;

pub const LINE_TITLE: &str = "Line Chart of Earthquake Frequency by Day";

/// Day label, e.g. `24/03/05`
pub fn format_day(date: NaiveDate) -> String {
    date.format("%y/%m/%d").to_string()
}

/// Number of events on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Per-day counts, kept in first-seen order
#[derive(Debug, Clone, Default)]
pub struct DailyFrequencyTable {
    days: Vec<DayCount>,
    index: HashMap<NaiveDate, usize>,
}

impl DailyFrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `events` by their day in `zone`
    pub fn from_events(events: &[Event], zone: &DayZone) -> Self {
        let mut table = Self::new();
        for event in events {
            table.record(zone.date_of(&event.time));
        }
        table
    }

    /// Add one event on `date`
    pub fn record(&mut self, date: NaiveDate) {
        match self.index.get(&date) {
            Some(&idx) => self.days[idx].count += 1,
            None => {
                self.index.insert(date, self.days.len());
                self.days.push(DayCount { date, count: 1 });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u32 {
        self.days.iter().map(|d| d.count).sum()
    }

    /// Days in first-seen order
    pub fn days(&self) -> &[DayCount] {
        &self.days
    }

    /// Oldest day first.
    ///
    /// The feed lists newest events first, so reversing first-seen order is
    /// usually enough. Anything still out of order is sorted by date.
    pub fn chronological(&self) -> Vec<DayCount> {
        let mut days: Vec<DayCount> = self.days.iter().rev().copied().collect();
        if !days.windows(2).all(|w| w[0].date <= w[1].date) {
            days.sort_by_key(|d| d.date);
        }
        days
    }
}

/// Line of event counts per day
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyFrequencyChart;

impl Projection for DailyFrequencyChart {
    fn region(&self) -> Region {
        Region::Linechart
    }

    fn build(&self, snapshot: &FeedSnapshot, context: &ChartContext) -> PlotSpec {
        let days = DailyFrequencyTable::from_events(snapshot.events(), &context.zone).chronological();

        let series = LineSeries {
            x: days.iter().map(|d| format_day(d.date)).collect(),
            y: days.iter().map(|d| d.count).collect(),
        };

        let layout = Layout::new(LINE_TITLE, context.font_color.clone()).with_axes(
            Axis::new("Date", false),
            Axis::new("Number of Earthquakes", false),
        );

        PlotSpec::new(Region::Linechart, Series::Line(series), layout)
    }
}
