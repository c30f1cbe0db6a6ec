//! Wire types returned by the telemetry backend.
//!
//! These types mirror the JSON produced by the backend's read-only API and are
//! replaced wholesale on every successful poll; nothing here is mutated
//! locally.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monitored machine as reported in the fleet snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub hostname: String,
    #[serde(default)]
    pub is_online: bool,
    #[serde(default)]
    pub latest_cpu_percent: Option<f64>,
    #[serde(default)]
    pub latest_memory_percent: Option<f64>,
    /// Seconds since boot.
    #[serde(default)]
    pub latest_uptime: Option<u64>,
}

/// One timestamped resource sample for a host.
///
/// Percentages are expected in `0..=100` and `used <= total`, but values are
/// trusted from the source. See [`MetricSample::anomalies`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    #[serde(default)]
    pub memory_used: u64,
    #[serde(default)]
    pub memory_total: u64,
    #[serde(default)]
    pub disk_used: u64,
    #[serde(default)]
    pub disk_total: u64,
    #[serde(default)]
    pub network_bytes_sent: u64,
    #[serde(default)]
    pub network_bytes_recv: u64,
    #[serde(default)]
    pub network_packets_sent: u64,
    #[serde(default)]
    pub network_packets_recv: u64,
    /// 1, 5 and 15 minute load averages.
    #[serde(default)]
    pub load_average: Option<[f64; 3]>,
    #[serde(default)]
    pub cpu_cores: u32,
    /// Seconds since boot.
    #[serde(default)]
    pub uptime: u64,
}

/// Something implausible in a sample. Flagged and logged, never corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleAnomaly {
    MemoryOverCommitted { used: u64, total: u64 },
    DiskOverCommitted { used: u64, total: u64 },
    PercentOutOfRange { field: &'static str, value: f64 },
    NoCpuCores,
}

impl fmt::Display for SampleAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleAnomaly::MemoryOverCommitted { used, total } => {
                write!(f, "memory_used {} exceeds memory_total {}", used, total)
            }
            SampleAnomaly::DiskOverCommitted { used, total } => {
                write!(f, "disk_used {} exceeds disk_total {}", used, total)
            }
            SampleAnomaly::PercentOutOfRange { field, value } => {
                write!(f, "{} is {} (expected 0-100)", field, value)
            }
            SampleAnomaly::NoCpuCores => write!(f, "cpu_cores is 0"),
        }
    }
}

impl MetricSample {
    /// Report values that break the sample's documented invariants.
    pub fn anomalies(&self) -> Vec<SampleAnomaly> {
        let mut found = Vec::new();

        if self.memory_used > self.memory_total {
            found.push(SampleAnomaly::MemoryOverCommitted {
                used: self.memory_used,
                total: self.memory_total,
            });
        }
        if self.disk_used > self.disk_total {
            found.push(SampleAnomaly::DiskOverCommitted {
                used: self.disk_used,
                total: self.disk_total,
            });
        }
        for (field, value) in [
            ("cpu_percent", self.cpu_percent),
            ("memory_percent", self.memory_percent),
            ("disk_percent", self.disk_percent),
        ] {
            if !(0.0..=100.0).contains(&value) {
                found.push(SampleAnomaly::PercentOutOfRange { field, value });
            }
        }
        if self.cpu_cores == 0 {
            found.push(SampleAnomaly::NoCpuCores);
        }

        found
    }

    /// Memory usage ratio clamped to `0.0..=1.0` for gauges.
    pub fn memory_ratio(&self) -> f64 {
        percent_ratio(self.memory_percent)
    }

    /// Disk usage ratio clamped to `0.0..=1.0` for gauges.
    pub fn disk_ratio(&self) -> f64 {
        percent_ratio(self.disk_percent)
    }

    /// CPU usage ratio clamped to `0.0..=1.0` for gauges.
    pub fn cpu_ratio(&self) -> f64 {
        percent_ratio(self.cpu_percent)
    }
}

/// Convert a percentage into a gauge ratio, tolerating NaN and out-of-range input.
pub fn percent_ratio(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    (percent / 100.0).clamp(0.0, 1.0)
}

/// Fleet-wide snapshot from the dashboard endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub total_hosts: u64,
    #[serde(default)]
    pub online_hosts: u64,
    #[serde(default)]
    pub total_metrics: u64,
    /// Most recent sample per host.
    #[serde(default)]
    pub latest_metrics: Vec<MetricSample>,
    #[serde(default)]
    pub hosts: Vec<Host>,
}

/// Response body of the per-host history endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Samples ordered newest first.
    #[serde(default)]
    pub metrics: Vec<MetricSample>,
}

/// Timestamps arrive either as RFC 3339 or as naive ISO-8601 in UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
pub(crate) fn sample_at(timestamp: DateTime<Utc>, cpu_percent: f64) -> MetricSample {
    MetricSample {
        hostname: None,
        timestamp,
        cpu_percent,
        memory_percent: 40.0,
        disk_percent: 60.0,
        memory_used: 4 * 1024 * 1024 * 1024,
        memory_total: 8 * 1024 * 1024 * 1024,
        disk_used: 60 * 1024 * 1024 * 1024,
        disk_total: 100 * 1024 * 1024 * 1024,
        network_bytes_sent: 1_000,
        network_bytes_recv: 2_000,
        network_packets_sent: 10,
        network_packets_recv: 20,
        load_average: Some([0.5, 0.4, 0.3]),
        cpu_cores: 4,
        uptime: 90_061,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_json() -> &'static str {
        r#"{
            "hostname": "web-01",
            "timestamp": "2024-03-01T12:00:00.123456Z",
            "cpu_percent": 12.5,
            "memory_percent": 40.0,
            "disk_percent": 61.2,
            "memory_used": 4096,
            "memory_total": 8192,
            "disk_used": 100,
            "disk_total": 200,
            "network_bytes_sent": 1,
            "network_bytes_recv": 2,
            "network_packets_sent": 3,
            "network_packets_recv": 4,
            "load_average": [0.1, 0.2, 0.3],
            "cpu_cores": 8,
            "uptime": 3600
        }"#
    }

    #[test]
    fn test_parse_metric_sample() {
        let sample: MetricSample = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(sample.hostname.as_deref(), Some("web-01"));
        assert_eq!(sample.cpu_cores, 8);
        assert_eq!(sample.load_average, Some([0.1, 0.2, 0.3]));
        assert!(sample.anomalies().is_empty());
    }

    #[test]
    fn test_parse_naive_timestamp_as_utc() {
        let ts = timestamp::parse("2024-03-01T12:00:00.5").unwrap();
        let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(ts, noon + chrono::Duration::milliseconds(500));

        let offset = timestamp::parse("2024-03-01T14:00:00+02:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());

        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn test_parse_dashboard_snapshot() {
        let json = format!(
            r#"{{
                "total_hosts": 2,
                "online_hosts": 1,
                "total_metrics": 1200,
                "latest_metrics": [{}],
                "hosts": [
                    {{"hostname": "web-01", "is_online": true, "latest_cpu_percent": 12.5,
                      "latest_memory_percent": 40.0, "latest_uptime": 3600}},
                    {{"hostname": "db-01", "is_online": false, "latest_cpu_percent": null}}
                ]
            }}"#,
            sample_json()
        );
        let snapshot: DashboardSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.total_hosts, 2);
        assert_eq!(snapshot.hosts.len(), 2);
        assert_eq!(snapshot.hosts[1].latest_cpu_percent, None);
        assert_eq!(snapshot.hosts[1].latest_uptime, None);
        assert_eq!(snapshot.latest_metrics.len(), 1);
    }

    #[test]
    fn test_anomalies_are_flagged() {
        let mut sample = sample_at(Utc::now(), 150.0);
        sample.memory_used = sample.memory_total + 1;
        sample.cpu_cores = 0;

        let anomalies = sample.anomalies();
        assert_eq!(anomalies.len(), 3);
        assert!(matches!(anomalies[0], SampleAnomaly::MemoryOverCommitted { .. }));
        assert!(matches!(
            anomalies[1],
            SampleAnomaly::PercentOutOfRange { field: "cpu_percent", .. }
        ));
        assert_eq!(anomalies[2], SampleAnomaly::NoCpuCores);
        assert_eq!(sample.cpu_ratio(), 1.0);
    }

    #[test]
    fn test_percent_ratio_clamps() {
        assert_eq!(percent_ratio(-5.0), 0.0);
        assert_eq!(percent_ratio(50.0), 0.5);
        assert_eq!(percent_ratio(250.0), 1.0);
        assert_eq!(percent_ratio(f64::NAN), 0.0);
    }
}
