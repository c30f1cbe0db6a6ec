//! Application state and navigation logic.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use ratatui::layout::Rect;
use tokio::time::Instant;

use crate::data::{
    DashboardSnapshot, FleetSummary, Host, Selection, SelectionStore, TimeRange, TrendHistory,
};
use crate::sync::{DashboardSync, HistorySync, HostDetailSync, SyncConfig, TelemetryApi};
use crate::ui::hosts::{sort_hosts_by, SortColumn};
use crate::ui::Theme;

/// How long a status message stays in the status bar.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
///
/// Owns the selection and the three syncs. The syncs poll on their own tasks;
/// the UI loop calls [`App::tick`] to pick up new fleet snapshots.
pub struct App {
    pub running: bool,
    pub show_help: bool,

    api: Arc<dyn TelemetryApi>,
    selection: SelectionStore,
    pub dashboard: DashboardSync,
    pub host_detail: HostDetailSync,
    pub history: HistorySync,

    /// Last successfully fetched fleet snapshot.
    pub snapshot: Option<DashboardSnapshot>,
    snapshot_at: Option<Instant>,
    pub trend: TrendHistory,

    // Host list navigation (visual row in the filtered, sorted list)
    pub cursor: usize,
    pub sort_column: SortColumn,
    pub sort_ascending: bool,
    pub filter_text: String,
    pub filter_active: bool,

    /// Where the host list was last drawn, for mouse hit-testing.
    pub host_list_area: Rect,
    /// First visible row of the host list after scrolling.
    pub host_list_offset: usize,

    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create the app and start polling. Must be called within a tokio runtime.
    pub fn new(api: Arc<dyn TelemetryApi>, range: TimeRange, config: SyncConfig) -> Self {
        Self::with_theme(api, range, config, Theme::auto_detect())
    }

    pub fn with_theme(
        api: Arc<dyn TelemetryApi>,
        range: TimeRange,
        config: SyncConfig,
        theme: Theme,
    ) -> Self {
        let selection = SelectionStore::new(range);
        let dashboard = DashboardSync::start(api.clone(), config.dashboard_interval);
        let host_detail =
            HostDetailSync::spawn(api.clone(), selection.subscribe(), config.host_interval);
        let history = HistorySync::spawn(api.clone(), selection.subscribe(), config.history_interval);

        Self {
            running: true,
            show_help: false,
            api,
            selection,
            dashboard,
            host_detail,
            history,
            snapshot: None,
            snapshot_at: None,
            trend: TrendHistory::new(),
            cursor: 0,
            sort_column: SortColumn::default(),
            sort_ascending: true,
            filter_text: String::new(),
            filter_active: false,
            host_list_area: Rect::default(),
            host_list_offset: 0,
            theme,
            status_message: None,
        }
    }

    /// Returns a description of the backend.
    pub fn source_description(&self) -> &str {
        self.api.description()
    }

    /// Pick up a new fleet snapshot if the dashboard sync published one.
    ///
    /// Returns true when the snapshot changed.
    pub fn tick(&mut self) -> bool {
        let seen = self.snapshot_at;
        let fresh = self.dashboard.with_state(|state| match (&state.data, state.updated_at) {
            (Some(data), Some(at)) if Some(at) != seen => Some((data.clone(), at)),
            _ => None,
        });

        let Some((snapshot, at)) = fresh else {
            return false;
        };
        self.trend.record(&snapshot);
        self.snapshot = Some(snapshot);
        self.snapshot_at = Some(at);
        self.clamp_cursor();
        true
    }

    /// Current selection and range.
    pub fn selection(&self) -> Selection {
        self.selection.current()
    }

    pub fn selected_hostname(&self) -> Option<String> {
        self.selection.hostname()
    }

    pub fn fleet_summary(&self) -> Option<FleetSummary> {
        self.snapshot.as_ref().map(FleetSummary::from_snapshot)
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Hosts in display order: filtered, then sorted.
    pub fn visible_hosts(&self) -> Vec<&Host> {
        let Some(ref snapshot) = self.snapshot else {
            return Vec::new();
        };
        let mut hosts: Vec<&Host> = snapshot
            .hosts
            .iter()
            .filter(|h| self.matches_filter(&h.hostname))
            .collect();
        sort_hosts_by(&mut hosts, self.sort_column, self.sort_ascending);
        hosts
    }

    /// The host under the cursor.
    pub fn highlighted_host(&self) -> Option<&Host> {
        self.visible_hosts().get(self.cursor).copied()
    }

    fn clamp_cursor(&mut self) {
        let count = self.visible_hosts().len();
        self.cursor = self.cursor.min(count.saturating_sub(1));
    }

    /// Move the cursor down by one row.
    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    /// Move the cursor up by one row.
    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        let max = self.visible_hosts().len().saturating_sub(1);
        self.cursor = (self.cursor + n).min(max);
    }

    pub fn select_prev_n(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_sub(n);
    }

    pub fn select_first(&mut self) {
        self.cursor = 0;
    }

    pub fn select_last(&mut self) {
        self.cursor = self.visible_hosts().len().saturating_sub(1);
    }

    /// Toggle-select the host under the cursor.
    pub fn toggle_selected(&mut self) {
        let Some(hostname) = self.highlighted_host().map(|h| h.hostname.clone()) else {
            return;
        };
        self.selection.select(&hostname);
    }

    /// Move the cursor to a visual row and toggle-select that host.
    pub fn click_row(&mut self, row: usize) {
        if row < self.visible_hosts().len() {
            self.cursor = row;
            self.toggle_selected();
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn next_range(&mut self) {
        self.selection.next_range();
    }

    pub fn prev_range(&mut self) {
        self.selection.prev_range();
    }

    pub fn set_range(&mut self, range: TimeRange) {
        self.selection.set_time_range(range);
    }

    /// Fetch everything now instead of waiting for the next tick.
    pub fn refresh_all(&mut self) {
        self.dashboard.refresh_now();
        self.host_detail.refresh_now();
        self.history.refresh_now();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Cycle to the next sort column.
    pub fn cycle_sort(&mut self) {
        self.sort_column = self.sort_column.next();
        self.clamp_cursor();
    }

    /// Toggle sort direction between ascending and descending.
    pub fn toggle_sort_direction(&mut self) {
        self.sort_ascending = !self.sort_ascending;
    }

    /// Enter filter input mode (starts capturing keystrokes for search).
    pub fn start_filter(&mut self) {
        self.filter_active = true;
    }

    /// Exit filter input mode without clearing the filter text.
    pub fn cancel_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter text and exit filter mode.
    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
    }

    /// Append a character to the filter text.
    pub fn filter_push(&mut self, c: char) {
        self.filter_text.push(c);
        self.clamp_cursor();
    }

    /// Remove the last character from the filter text.
    pub fn filter_pop(&mut self) {
        self.filter_text.pop();
        self.clamp_cursor();
    }

    /// Check if a hostname matches the current filter.
    pub fn matches_filter(&self, name: &str) -> bool {
        if self.filter_text.is_empty() {
            return true;
        }
        name.to_lowercase().contains(&self.filter_text.to_lowercase())
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current fleet snapshot and selection to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let Some(ref snapshot) = self.snapshot else {
            bail!("No data to export");
        };

        let summary = FleetSummary::from_snapshot(snapshot);
        let selection = self.selection.current();
        let export = serde_json::json!({
            "summary": {
                "total_hosts": summary.total_hosts,
                "online_hosts": summary.online_hosts,
                "offline_hosts": summary.offline_hosts(),
                "total_metrics": summary.total_metrics,
                "avg_cpu_percent": summary.avg_cpu_percent,
                "avg_memory_percent": summary.avg_memory_percent,
            },
            "selection": {
                "hostname": selection.hostname,
                "range_hours": selection.range.hours(),
            },
            "hosts": snapshot.hosts,
            "latest_metrics": snapshot.latest_metrics,
        });

        let json = serde_json::to_string_pretty(&export)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::sample_at;
    use crate::sync::mock::MockApi;
    use chrono::Utc;
    use tokio::time;

    fn host(name: &str, online: bool, cpu: Option<f64>, uptime: Option<u64>) -> Host {
        Host {
            hostname: name.to_string(),
            is_online: online,
            latest_cpu_percent: cpu,
            latest_memory_percent: cpu.map(|c| c / 2.0),
            latest_uptime: uptime,
        }
    }

    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            total_hosts: 3,
            online_hosts: 2,
            total_metrics: 4200,
            latest_metrics: vec![sample_at(Utc::now(), 20.0), sample_at(Utc::now(), 60.0)],
            hosts: vec![
                host("web-02", true, Some(60.0), Some(7200)),
                host("db-01", false, None, None),
                host("web-01", true, Some(20.0), Some(90_061)),
            ],
        }
    }

    async fn app() -> (App, Arc<MockApi>) {
        let api = Arc::new(
            MockApi::new()
                .with_dashboard(snapshot())
                .with_latest("db-01", Duration::from_millis(10), 5.0)
                .with_latest("web-01", Duration::from_millis(10), 20.0),
        );
        let app = App::with_theme(api.clone(), TimeRange::Day, SyncConfig::default(), Theme::dark());
        time::sleep(Duration::from_millis(10)).await;
        (app, api)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_picks_up_snapshot_once() {
        let (mut app, _api) = app().await;
        assert!(app.snapshot.is_none());

        assert!(app.tick());
        assert!(!app.tick());
        assert_eq!(app.fleet_summary().unwrap().online_hosts, 2);
        assert_eq!(app.trend.len("web-01"), 1);

        time::sleep(Duration::from_secs(5)).await;
        assert!(app.tick());
        assert_eq!(app.trend.len("web-01"), 2);
        assert_eq!(app.trend.len("db-01"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_hosts_sorted_by_name() {
        let (mut app, _api) = app().await;
        app.tick();
        let names: Vec<&str> = app.visible_hosts().iter().map(|h| h.hostname.as_str()).collect();
        assert_eq!(names, vec!["db-01", "web-01", "web-02"]);

        app.toggle_sort_direction();
        assert_eq!(app.visible_hosts()[0].hostname, "web-02");
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_and_cursor_clamp() {
        let (mut app, _api) = app().await;
        app.tick();
        app.select_last();
        assert_eq!(app.cursor, 2);

        for c in "web".chars() {
            app.filter_push(c);
        }
        assert_eq!(app.visible_hosts().len(), 2);
        assert_eq!(app.cursor, 1);

        app.clear_filter();
        assert_eq!(app.visible_hosts().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_selected_drives_host_detail() {
        let (mut app, api) = app().await;
        app.tick();
        app.select_next();

        app.toggle_selected();
        assert_eq!(app.selected_hostname().as_deref(), Some("web-01"));
        time::sleep(Duration::from_millis(50)).await;
        let view = app.host_detail.view().unwrap();
        assert_eq!(view.key, "web-01");
        assert_eq!(view.state.data.unwrap().cpu_percent, 20.0);

        // Same row again clears the selection.
        app.toggle_selected();
        assert_eq!(app.selected_hostname(), None);
        time::sleep(Duration::from_millis(10)).await;
        assert!(app.host_detail.view().is_none());
        assert_eq!(MockApi::calls(&api.latest_calls), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_row_selects_host() {
        let (mut app, _api) = app().await;
        app.tick();

        app.click_row(0);
        assert_eq!(app.cursor, 0);
        assert_eq!(app.selected_hostname().as_deref(), Some("db-01"));

        app.click_row(10);
        assert_eq!(app.selected_hostname().as_deref(), Some("db-01"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_range_changes() {
        let (mut app, _api) = app().await;
        app.next_range();
        assert_eq!(app.selection().range, TimeRange::Week);
        app.next_range();
        assert_eq!(app.selection().range, TimeRange::OneHour);
        app.prev_range();
        assert_eq!(app.selection().range, TimeRange::Week);
        app.set_range(TimeRange::SixHours);
        assert_eq!(app.selection().range, TimeRange::SixHours);
    }

    #[tokio::test(start_paused = true)]
    async fn test_export_state() {
        let (mut app, _api) = app().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.json");

        assert!(app.export_state(&path).is_err());

        app.tick();
        app.export_state(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["summary"]["total_hosts"], 3);
        assert_eq!(json["summary"]["offline_hosts"], 1);
        assert_eq!(json["summary"]["avg_cpu_percent"], 40.0);
        assert_eq!(json["selection"]["range_hours"], 24);
        assert_eq!(json["hosts"].as_array().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_message_shown() {
        let (mut app, _api) = app().await;
        app.set_status_message("Exported".to_string());
        assert_eq!(app.get_status_message(), Some("Exported"));
    }
}
