//! Common UI components shared across panels.
//!
//! This module contains the header bar, range tabs, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_age;
use crate::data::format::format_thousands;
use crate::data::TimeRange;

/// Render the header bar with the fleet overview.
///
/// Displays: status indicator, online/total hosts, stored metrics, fleet
/// average CPU and memory.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let Some(summary) = app.fleet_summary() else {
        let line = Line::from(vec![
            Span::styled(" FLEETWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Loading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    };

    let offline = summary.offline_hosts();
    let status_style = if summary.total_hosts > 0 && summary.online_hosts == 0 {
        Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD)
    } else if offline > 0 {
        Style::default().fg(app.theme.warning)
    } else {
        Style::default().fg(app.theme.healthy)
    };

    let avg_cpu = summary.avg_cpu_percent.unwrap_or(0.0);
    let avg_mem = summary.avg_memory_percent.unwrap_or(0.0);

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("FLEETWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}", summary.online_hosts),
            Style::default().fg(app.theme.healthy),
        ),
        Span::raw(format!("/{} online ", summary.total_hosts)),
        if offline > 0 {
            Span::styled(format!("{}", offline), Style::default().fg(app.theme.warning))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" offline │ "),
        Span::styled(
            format_thousands(summary.total_metrics),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" metrics │ avg CPU "),
        Span::styled(format!("{:.1}%", avg_cpu), app.theme.usage_style(avg_cpu)),
        Span::raw(" mem "),
        Span::styled(format!("{:.1}%", avg_mem), app.theme.usage_style(avg_mem)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the history range tabs, highlighting the active range.
pub fn render_range_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = TimeRange::ALL
        .iter()
        .enumerate()
        .map(|(i, range)| Line::from(format!(" {}:{} ", i + 1, range.label())))
        .collect();

    let current = app.selection().range;
    let selected = TimeRange::ALL.iter().position(|r| *r == current).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows: backend, time since the last fleet update, available controls.
/// Also displays temporary status messages and the dashboard error.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let (error, updated_at) = app
        .dashboard
        .with_state(|s| (s.error.clone(), s.updated_at));

    let controls = if app.filter_active {
        "Type to search | Enter:apply Esc:cancel"
    } else if app.selected_hostname().is_some() {
        "Enter:toggle Esc:deselect t/T:range r:refresh ?:help q:quit"
    } else {
        "Enter:select /:search s:sort r:refresh ?:help q:quit"
    };

    let (status, style) = match (error, updated_at) {
        (Some(err), _) => (
            format!(" Error: {} | r:retry q:quit", err),
            app.theme.error_style(),
        ),
        (None, Some(at)) => (
            format!(
                " {} | Updated {} | {}",
                app.source_description(),
                format_age(at.elapsed()),
                controls
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
        (None, None) => (
            format!(" {} | Loading... | q:quit", app.source_description()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Hosts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter/Space Select/deselect host"),
        Line::from("  Esc         Clear selection"),
        Line::from("  /           Start filter/search"),
        Line::from("  c           Clear filter"),
        Line::from("  s           Cycle sort column"),
        Line::from("  S           Toggle sort direction"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " History",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  t/T         Next/previous range"),
        Line::from("  1-4         1h / 6h / 24h / 7d"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r           Refresh now"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 28u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
