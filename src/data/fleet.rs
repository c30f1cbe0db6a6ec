//! Fleet-wide aggregates shown in the header bar.

use super::model::{DashboardSnapshot, MetricSample};

/// Counts and averages derived from one [`DashboardSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FleetSummary {
    pub total_hosts: u64,
    pub online_hosts: u64,
    pub total_metrics: u64,
    /// Mean CPU across the latest sample of every host, `None` without samples.
    pub avg_cpu_percent: Option<f64>,
    /// Mean memory usage across the latest sample of every host.
    pub avg_memory_percent: Option<f64>,
}

impl FleetSummary {
    pub fn from_snapshot(snapshot: &DashboardSnapshot) -> Self {
        let samples = &snapshot.latest_metrics;
        let mean = |value: fn(&MetricSample) -> f64| {
            if samples.is_empty() {
                None
            } else {
                Some(samples.iter().map(value).sum::<f64>() / samples.len() as f64)
            }
        };

        Self {
            total_hosts: snapshot.total_hosts,
            online_hosts: snapshot.online_hosts,
            total_metrics: snapshot.total_metrics,
            avg_cpu_percent: mean(|s| s.cpu_percent),
            avg_memory_percent: mean(|s| s.memory_percent),
        }
    }

    /// Hosts reported offline.
    pub fn offline_hosts(&self) -> u64 {
        self.total_hosts.saturating_sub(self.online_hosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::sample_at;
    use chrono::Utc;

    #[test]
    fn test_averages_over_latest_metrics() {
        let snapshot = DashboardSnapshot {
            total_hosts: 3,
            online_hosts: 2,
            total_metrics: 500,
            latest_metrics: vec![sample_at(Utc::now(), 10.0), sample_at(Utc::now(), 30.0)],
            hosts: Vec::new(),
        };

        let summary = FleetSummary::from_snapshot(&snapshot);
        assert_eq!(summary.avg_cpu_percent, Some(20.0));
        assert_eq!(summary.avg_memory_percent, Some(40.0));
        assert_eq!(summary.offline_hosts(), 1);
    }

    #[test]
    fn test_empty_snapshot_has_no_averages() {
        let summary = FleetSummary::from_snapshot(&DashboardSnapshot::default());
        assert_eq!(summary.avg_cpu_percent, None);
        assert_eq!(summary.total_hosts, 0);
    }
}
