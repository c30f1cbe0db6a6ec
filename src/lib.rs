//! # fleetwatch
//!
//! A live terminal dashboard and library for fleet host telemetry.
//!
//! The crate polls a telemetry HTTP API for a fleet-wide dashboard, the
//! latest sample of one selected host, and that host's history over a chosen
//! time range. Each of the three runs on its own interval, and results that
//! arrive after the selection has moved on are discarded.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │ (models) │    │(render) │    │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │ SelectionStore (watch)                              │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │  sync   │◀── DashboardSync | HostDetailSync | HistorySync│
//! │  │ (poll)  │───▶ TelemetryApi (HttpApi)                     │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, host list navigation and user interaction logic
//! - **[`sync`]**: The generic [`Poller`], the three syncs built on it, and the
//!   [`TelemetryApi`] trait with its HTTP implementation [`HttpApi`]
//! - **[`data`]**: Wire models, the [`SelectionStore`], chart series and formatting
//! - **[`config`]**: Layered [`Settings`] from defaults, file, environment and CLI
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Poll the default API at http://localhost:8000/api
//! fleetwatch
//!
//! # Another backend, a week of history, faster dashboard refresh
//! fleetwatch --api-url http://metrics.internal/api --range 168 --dashboard-interval 2s
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use fleetwatch::{App, HttpApi, SyncConfig, TimeRange};
//!
//! # tokio_test::block_on(async {
//! let api = HttpApi::builder()
//!     .base_url("http://localhost:8000/api")
//!     .build()
//!     .unwrap();
//! let mut app = App::new(Arc::new(api), TimeRange::Day, SyncConfig::default());
//! app.tick();
//! # });
//! ```
//!
//! ### Formatting helpers
//!
//! ```
//! use fleetwatch::{format_bytes, format_percent, format_uptime};
//!
//! assert_eq!(format_bytes(1536), "1.5 KB");
//! assert_eq!(format_uptime(90_061), "1d 1h 1m");
//! assert_eq!(format_percent(None), "N/A");
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod sync;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::format::{format_bytes, format_percent, format_timestamp, format_uptime};
pub use data::{
    ChartPoint, ChartSeries, DashboardSnapshot, Host, MetricSample, Selection, SelectionStore,
    TimeRange,
};
pub use sync::{
    DashboardSync, FetchError, HistorySync, HostDetailSync, HttpApi, PollState, Poller,
    SyncConfig, TelemetryApi,
};
