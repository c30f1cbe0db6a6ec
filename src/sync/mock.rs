//! Scripted backend for sync tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use super::{FetchError, Target, TelemetryApi};
use crate::data::model::sample_at;
use crate::data::{DashboardSnapshot, HistoryResponse, MetricSample, TimeRange};

#[derive(Debug, Clone, Copy)]
struct LatestScript {
    delay: Duration,
    cpu_percent: f64,
}

#[derive(Debug, Default)]
pub(crate) struct MockApi {
    dashboard: Mutex<Option<DashboardSnapshot>>,
    latest: Mutex<HashMap<String, LatestScript>>,
    history: Mutex<HashMap<String, Vec<MetricSample>>>,
    history_delay: Mutex<Duration>,
    pub(crate) dashboard_calls: AtomicU32,
    pub(crate) latest_calls: AtomicU32,
    pub(crate) history_calls: AtomicU32,
    history_ranges: Mutex<Vec<(String, TimeRange)>>,
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve `snapshot` from `/dashboard/`. Without one the endpoint fails.
    pub(crate) fn with_dashboard(self, snapshot: DashboardSnapshot) -> Self {
        *self.dashboard.lock() = Some(snapshot);
        self
    }

    /// Answer `latest(hostname)` after `delay` with a sample at `cpu_percent`.
    pub(crate) fn with_latest(self, hostname: &str, delay: Duration, cpu_percent: f64) -> Self {
        self.latest.lock().insert(
            hostname.to_string(),
            LatestScript {
                delay,
                cpu_percent,
            },
        );
        self
    }

    /// Serve `samples` (newest first) as the history of `hostname`.
    pub(crate) fn with_history(self, hostname: &str, samples: Vec<MetricSample>) -> Self {
        self.history.lock().insert(hostname.to_string(), samples);
        self
    }

    pub(crate) fn with_history_delay(self, delay: Duration) -> Self {
        *self.history_delay.lock() = delay;
        self
    }

    pub(crate) fn fail_dashboard(&self) {
        *self.dashboard.lock() = None;
    }

    pub(crate) fn calls(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }

    /// Every (hostname, range) history was requested for, in order.
    pub(crate) fn history_requests(&self) -> Vec<(String, TimeRange)> {
        self.history_ranges.lock().clone()
    }
}

/// `count` samples one minute apart for `hostname`, newest first.
pub(crate) fn history_for(hostname: &str, count: usize) -> Vec<MetricSample> {
    let base = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
    (0..count)
        .rev()
        .map(|i| {
            let mut sample = sample_at(base + chrono::Duration::minutes(i as i64), 10.0 + i as f64);
            sample.hostname = Some(hostname.to_string());
            sample
        })
        .collect()
}

#[async_trait]
impl TelemetryApi for MockApi {
    async fn dashboard(&self) -> Result<DashboardSnapshot, FetchError> {
        self.dashboard_calls.fetch_add(1, Ordering::SeqCst);
        self.dashboard.lock().clone().ok_or(FetchError::Status {
            target: Target::Dashboard,
            status: 500,
        })
    }

    async fn latest(&self, hostname: &str) -> Result<MetricSample, FetchError> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.latest.lock().get(hostname).copied();
        let Some(script) = script else {
            return Err(FetchError::Status {
                target: Target::Latest {
                    hostname: hostname.to_string(),
                },
                status: 404,
            });
        };

        tokio::time::sleep(script.delay).await;
        let mut sample = sample_at(Utc::now(), script.cpu_percent);
        sample.hostname = Some(hostname.to_string());
        Ok(sample)
    }

    async fn history(
        &self,
        hostname: &str,
        range: TimeRange,
    ) -> Result<HistoryResponse, FetchError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.history_ranges
            .lock()
            .push((hostname.to_string(), range));

        let delay = *self.history_delay.lock();
        tokio::time::sleep(delay).await;

        let metrics = self.history.lock().get(hostname).cloned();
        metrics
            .map(|metrics| HistoryResponse { metrics })
            .ok_or(FetchError::Status {
                target: Target::History {
                    hostname: hostname.to_string(),
                    range,
                },
                status: 404,
            })
    }

    fn description(&self) -> &str {
        "mock backend"
    }
}
