//! Terminal UI rendering using ratatui.
//!
//! Each panel is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`hosts`]: Sortable, filterable host list with CPU sparklines
//! - [`overview`]: Latest sample of the selected host with usage gauges
//! - [`chart`]: CPU/memory/disk history of the selected host
//! - [`common`]: Shared components (header, range tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Header (common::render_header)               │
//! ├──────────────────────────────────────────────┤
//! │ Range tabs (common::render_range_tabs)       │
//! ├──────────────────┬───────────────────────────┤
//! │                  │ overview::render          │
//! │ hosts::render    ├───────────────────────────┤
//! │                  │ chart::render             │
//! ├──────────────────┴───────────────────────────┤
//! │ Status Bar (common::render_status_bar)       │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Without a selection the host list takes the full width. The help overlay
//! (`common::render_help`) is drawn on top.

pub mod chart;
pub mod common;
pub mod hosts;
pub mod overview;
pub mod theme;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use crate::app::App;

pub use hosts::SortColumn;
pub use theme::Theme;

/// Rows above the first host row: header, tabs, table border and table header.
pub const HOST_LIST_FIRST_ROW: u16 = 4;

/// Render the full screen.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Range tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_range_tabs(frame, app, chunks[1]);

    if app.selected_hostname().is_some() {
        let columns =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(chunks[2]);
        hosts::render(frame, app, columns[0]);

        let panels = Layout::vertical([
            Constraint::Length(overview::HEIGHT),
            Constraint::Min(6),
        ])
        .split(columns[1]);
        overview::render(frame, app, panels[0]);
        chart::render(frame, app, panels[1]);
    } else {
        hosts::render(frame, app, chunks[2]);
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
