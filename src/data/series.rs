//! Chart-ready series built from raw history samples.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

use super::format::format_time_label;
use super::model::MetricSample;

/// Number of x-axis labels the history chart aims for.
pub const AXIS_LABELS: usize = 6;

/// A metric plotted on the history chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Memory,
    Disk,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Cpu, Metric::Memory, Metric::Disk];

    /// Returns the legend label for this metric.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU Usage",
            Metric::Memory => "Memory Usage",
            Metric::Disk => "Disk Usage",
        }
    }

    fn value(&self, point: &ChartPoint) -> f64 {
        match self {
            Metric::Cpu => point.cpu_percent,
            Metric::Memory => point.memory_percent,
            Metric::Disk => point.disk_percent,
        }
    }
}

/// One point on the history chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Original sample instant, kept for detail display.
    pub timestamp: DateTime<Utc>,
    /// Short time-of-day label.
    pub label: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

/// Samples ordered oldest first, ready to plot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Build a series from samples that arrive newest first, labelled in local time.
    pub fn from_samples(samples: &[MetricSample]) -> Self {
        Self::from_samples_in(samples, &Local)
    }

    /// Build a series with labels rendered in the given time zone.
    ///
    /// The newest-first input is reversed and then stably sorted by timestamp,
    /// so input in any order still yields an ascending series.
    pub fn from_samples_in<Tz>(samples: &[MetricSample], tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut points: Vec<ChartPoint> = samples
            .iter()
            .rev()
            .map(|s| ChartPoint {
                timestamp: s.timestamp,
                label: format_time_label(&s.timestamp, tz),
                cpu_percent: s.cpu_percent,
                memory_percent: s.memory_percent,
                disk_percent: s.disk_percent,
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);

        Self { points }
    }

    pub fn points(&self) -> &[ChartPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ChartPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ChartPoint> {
        self.points.last()
    }

    /// `(x, y)` pairs for one metric, x being seconds since the first point.
    pub fn dataset(&self, metric: Metric) -> Vec<(f64, f64)> {
        let Some(origin) = self.first().map(|p| p.timestamp) else {
            return Vec::new();
        };

        self.points
            .iter()
            .map(|p| (seconds_between(origin, p.timestamp), metric.value(p)))
            .collect()
    }

    /// X-axis bounds matching [`ChartSeries::dataset`].
    pub fn x_bounds(&self) -> [f64; 2] {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => {
                let span = seconds_between(first.timestamp, last.timestamp);
                [0.0, span.max(1.0)]
            }
            _ => [0.0, 1.0],
        }
    }

    /// Up to `count` labels spread evenly from the first to the last point.
    pub fn axis_labels(&self, count: usize) -> Vec<String> {
        let len = self.points.len();
        if len == 0 || count == 0 {
            return Vec::new();
        }
        if len <= count {
            return self.points.iter().map(|p| p.label.clone()).collect();
        }

        (0..count)
            .map(|i| {
                let index = if count == 1 { 0 } else { i * (len - 1) / (count - 1) };
                self.points[index].label.clone()
            })
            .collect()
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}
