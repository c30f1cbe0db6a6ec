//! Fleet snapshot polling.

use std::sync::Arc;
use std::time::Duration;

use super::{PollState, Poller, TelemetryApi};
use crate::data::DashboardSnapshot;

/// Keeps the fleet snapshot fresh. Runs from construction until dropped.
#[derive(Debug)]
pub struct DashboardSync {
    poller: Poller<DashboardSnapshot>,
}

impl DashboardSync {
    /// Start polling `/dashboard/` every `interval`. Must be called within a
    /// tokio runtime.
    pub fn start(api: Arc<dyn TelemetryApi>, interval: Duration) -> Self {
        let poller = Poller::new("dashboard");
        poller.start(
            move || {
                let api = api.clone();
                async move { api.dashboard().await }
            },
            interval,
        );
        Self { poller }
    }

    /// Latest snapshot, error and loading flag.
    pub fn state(&self) -> PollState<DashboardSnapshot> {
        self.poller.state()
    }

    /// Read the state without cloning the snapshot.
    pub fn with_state<R>(&self, f: impl FnOnce(&PollState<DashboardSnapshot>) -> R) -> R {
        self.poller.with_state(f)
    }

    pub fn refresh_now(&self) {
        self.poller.refresh_now();
    }

    pub fn stop(&self) {
        self.poller.stop();
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_running()
    }
}

impl Drop for DashboardSync {
    fn drop(&mut self) {
        self.poller.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::sample_at;
    use crate::data::Host;
    use crate::sync::mock::MockApi;
    use chrono::Utc;
    use tokio::time;

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            total_hosts: 2,
            online_hosts: 1,
            total_metrics: 1440,
            latest_metrics: vec![sample_at(Utc::now(), 35.0)],
            hosts: vec![
                Host {
                    hostname: "web-01".to_string(),
                    is_online: true,
                    latest_cpu_percent: Some(35.0),
                    latest_memory_percent: Some(40.0),
                    latest_uptime: Some(3600),
                },
                Host {
                    hostname: "db-01".to_string(),
                    is_online: false,
                    latest_cpu_percent: None,
                    latest_memory_percent: None,
                    latest_uptime: None,
                },
            ],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval() {
        let api = Arc::new(MockApi::new().with_dashboard(snapshot()));
        let sync = DashboardSync::start(api.clone(), Duration::from_secs(5));
        assert!(sync.state().is_loading);

        time::sleep(Duration::from_millis(10)).await;
        let state = sync.state();
        assert_eq!(state.data.map(|s| s.hosts.len()), Some(2));
        assert_eq!(MockApi::calls(&api.dashboard_calls), 1);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(MockApi::calls(&api.dashboard_calls), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_last_snapshot() {
        let api = Arc::new(MockApi::new().with_dashboard(snapshot()));
        let sync = DashboardSync::start(api.clone(), Duration::from_secs(5));
        time::sleep(Duration::from_millis(10)).await;

        api.fail_dashboard();
        time::sleep(Duration::from_secs(5)).await;

        let state = sync.state();
        assert_eq!(state.data.map(|s| s.total_hosts), Some(2));
        let error = state.error.unwrap();
        assert!(error.contains("dashboard data"));
        assert!(error.contains("HTTP 500"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_polling() {
        let api = Arc::new(MockApi::new().with_dashboard(snapshot()));
        let sync = DashboardSync::start(api.clone(), Duration::from_secs(5));
        time::sleep(Duration::from_millis(10)).await;

        sync.stop();
        assert!(!sync.is_running());
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(MockApi::calls(&api.dashboard_calls), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now() {
        let api = Arc::new(MockApi::new().with_dashboard(snapshot()));
        let sync = DashboardSync::start(api.clone(), Duration::from_secs(5));
        time::sleep(Duration::from_millis(10)).await;

        sync.refresh_now();
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(MockApi::calls(&api.dashboard_calls), 2);
    }
}
