//! Rolling per-host CPU readings for sparklines in the host list.

use std::collections::{HashMap, VecDeque};

use super::model::DashboardSnapshot;

/// Maximum number of readings kept per host.
const MAX_TREND_SIZE: usize = 60;

/// Tracks recent CPU readings per host across fleet snapshots.
///
/// Hosts that disappear from the fleet keep their readings until they show up
/// again; hosts without a CPU reading contribute nothing for that snapshot.
#[derive(Debug, Clone, Default)]
pub struct TrendHistory {
    cpu: HashMap<String, VecDeque<f64>>,
}

impl TrendHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the CPU reading of every host in a snapshot.
    pub fn record(&mut self, snapshot: &DashboardSnapshot) {
        for host in &snapshot.hosts {
            let Some(cpu) = host.latest_cpu_percent else {
                continue;
            };
            let readings = self.cpu.entry(host.hostname.clone()).or_default();
            readings.push_back(cpu);
            if readings.len() > MAX_TREND_SIZE {
                readings.pop_front();
            }
        }
    }

    /// Number of readings held for a host.
    pub fn len(&self, hostname: &str) -> usize {
        self.cpu.get(hostname).map_or(0, VecDeque::len)
    }

    /// Get sparkline levels for a host's CPU (0-7 for 8 bar levels).
    ///
    /// CPU is a percentage, so levels are scaled against 0-100 rather than
    /// against the observed range. Returns an empty Vec with fewer than two
    /// readings.
    pub fn cpu_sparkline(&self, hostname: &str) -> Vec<u8> {
        let Some(values) = self.cpu.get(hostname) else {
            return Vec::new();
        };

        if values.len() < 2 {
            return Vec::new();
        }

        values
            .iter()
            .map(|&v| {
                let normalized = (v.clamp(0.0, 100.0) / 100.0 * 7.0).round() as u8;
                normalized.min(7)
            })
            .collect()
    }
}
