//! Polling loops that keep the local view of the fleet fresh.
//!
//! The backend is reached through the [`TelemetryApi`] trait; [`HttpApi`] is
//! the production implementation. Three independent syncs are built on the
//! generic [`Poller`]:
//!
//! ```text
//!                 ┌───────────────┐
//!                 │ DashboardSync │── every 5s ──▶ /dashboard/
//!                 └───────────────┘
//! SelectionStore ──┬──▶ HostDetailSync ── every 3s ──▶ /latest/?hostname=H
//!   (watch)        │
//!                  └──▶ HistorySync ──── every 30s ──▶ /hosts/H/history/?hours=R
//!                                              │
//!                                              ▼
//!                                         ChartSeries
//! ```
//!
//! Each sync owns its own [`PollState`]; a failure in one never touches the
//! others.

mod dashboard;
mod error;
mod history;
mod host;
mod http;
mod keyed;
mod poller;

#[cfg(test)]
pub(crate) mod mock;

pub use dashboard::DashboardSync;
pub use error::{FetchError, Target};
pub use history::HistorySync;
pub use host::HostDetailSync;
pub use http::{HttpApi, HttpApiBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use keyed::KeyedView;
pub use poller::{PollState, Poller, MIN_INTERVAL};

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::data::{DashboardSnapshot, HistoryResponse, MetricSample, TimeRange};

/// Read-only access to the telemetry backend.
///
/// Implementations must be cheap to share; the syncs hold them behind an
/// `Arc` and call them from their polling tasks.
#[async_trait]
pub trait TelemetryApi: Send + Sync + Debug {
    /// Fetch the fleet snapshot.
    async fn dashboard(&self) -> Result<DashboardSnapshot, FetchError>;

    /// Fetch the most recent sample for one host.
    async fn latest(&self, hostname: &str) -> Result<MetricSample, FetchError>;

    /// Fetch a host's samples over a range, newest first.
    async fn history(
        &self,
        hostname: &str,
        range: TimeRange,
    ) -> Result<HistoryResponse, FetchError>;

    /// Returns a human-readable description of the backend.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}

/// Polling intervals for the three syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub dashboard_interval: Duration,
    pub host_interval: Duration,
    pub history_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dashboard_interval: Duration::from_secs(5),
            host_interval: Duration::from_secs(3),
            history_interval: Duration::from_secs(30),
        }
    }
}
