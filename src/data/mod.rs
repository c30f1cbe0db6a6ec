//! Data models and pure transformations for fleet telemetry.
//!
//! This module holds the wire types returned by the backend and everything
//! that reshapes them for display without touching the network.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing of duration strings (e.g., "5s", "500ms") and update ages
//! - [`fleet`]: Fleet-wide counts and averages for the header bar
//! - [`format`]: Byte, uptime, percentage and timestamp formatting
//! - [`model`]: Wire types ([`DashboardSnapshot`], [`Host`], [`MetricSample`])
//! - [`selection`]: The [`SelectionStore`] driving host detail and history syncs
//! - [`series`]: Chart-ready [`ChartSeries`] built from history samples
//! - [`trend`]: Rolling per-host CPU readings for sparklines
//!
//! ## Data Flow
//!
//! ```text
//! HistoryResponse (raw JSON, newest first)
//!        │
//!        ▼
//! ChartSeries::from_samples()
//!        │
//!        └──▶ ChartPoint (oldest first, labelled)
//!
//! DashboardSnapshot
//!        │
//!        ├──▶ FleetSummary::from_snapshot() (header)
//!        │
//!        └──▶ TrendHistory::record() (sparklines)
//! ```

pub mod duration;
pub mod fleet;
pub mod format;
pub mod model;
pub mod selection;
pub mod series;
pub mod trend;

pub use fleet::FleetSummary;
pub use model::{DashboardSnapshot, HistoryResponse, Host, MetricSample, SampleAnomaly};
pub use selection::{Selection, SelectionStore, TimeRange};
pub use series::{ChartPoint, ChartSeries, Metric};
pub use trend::TrendHistory;
