//! Host list rendering.
//!
//! Displays a table of all hosts in the fleet with online state, latest usage,
//! uptime and a CPU sparkline trend.

use std::cmp::Ordering;

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::format::{format_percent, format_uptime_compact};
use crate::data::Host;

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Column to sort the host list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    Name,
    /// Online hosts before offline ones.
    Status,
    Cpu,
    Memory,
    Uptime,
}

impl SortColumn {
    /// Cycle to the next sort column.
    pub fn next(self) -> Self {
        match self {
            SortColumn::Name => SortColumn::Status,
            SortColumn::Status => SortColumn::Cpu,
            SortColumn::Cpu => SortColumn::Memory,
            SortColumn::Memory => SortColumn::Uptime,
            SortColumn::Uptime => SortColumn::Name,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Status => "status",
            SortColumn::Cpu => "cpu",
            SortColumn::Memory => "mem",
            SortColumn::Uptime => "uptime",
        }
    }
}

/// Render the host list. Records the drawn area and scroll offset on `app`
/// for mouse hit-testing.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let selected_host = app.selected_hostname();
    let (dashboard_error, dashboard_loading) =
        app.dashboard.with_state(|s| (s.error.clone(), s.is_loading));

    let hosts = app.visible_hosts();
    let total = app.snapshot.as_ref().map_or(0, |s| s.hosts.len());

    let header = Row::new(vec![
        Cell::from(format_header("Host", SortColumn::Name, app)),
        Cell::from(format_header("Status", SortColumn::Status, app)),
        Cell::from(format_header("CPU", SortColumn::Cpu, app)),
        Cell::from(format_header("Mem", SortColumn::Memory, app)),
        Cell::from(format_header("Uptime", SortColumn::Uptime, app)),
        Cell::from("Trend"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = hosts
        .iter()
        .map(|h| {
            let marker = if selected_host.as_deref() == Some(h.hostname.as_str()) {
                "● "
            } else {
                "  "
            };
            let status = if h.is_online { "online" } else { "offline" };
            let sparkline = render_sparkline(&app.trend.cpu_sparkline(&h.hostname));

            Row::new(vec![
                Cell::from(format!("{}{}", marker, h.hostname)),
                Cell::from(status).style(app.theme.online_style(h.is_online)),
                usage_cell(app, h.latest_cpu_percent),
                usage_cell(app, h.latest_memory_percent),
                Cell::from(
                    h.latest_uptime
                        .map(format_uptime_compact)
                        .unwrap_or_else(|| "Unknown".to_string()),
                ),
                Cell::from(sparkline).style(Style::default().fg(app.theme.cpu)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3), // Host
        Constraint::Min(8),  // Status
        Constraint::Min(7),  // CPU
        Constraint::Min(7),  // Mem
        Constraint::Min(8),  // Uptime
        Constraint::Min(8),  // Trend
    ];

    let selected_visual_index = app.cursor.min(hosts.len().saturating_sub(1));
    let sort_dir = if app.sort_ascending { "↑" } else { "↓" };

    let filter_info = if app.filter_active {
        format!(" /{}_", app.filter_text)
    } else if !app.filter_text.is_empty() {
        format!(" /{}/ [c:clear]", app.filter_text)
    } else {
        String::new()
    };

    let status_info = if let Some(ref err) = dashboard_error {
        format!(" [error: {}]", err)
    } else if dashboard_loading && app.snapshot.is_none() {
        " [loading]".to_string()
    } else {
        String::new()
    };

    let title = format!(
        " Hosts ({}/{}) [s:sort {}{}]{}{} ",
        hosts.len(),
        total,
        app.sort_column.label(),
        sort_dir,
        filter_info,
        status_info
    );

    let border_style = if dashboard_error.is_some() {
        app.theme.error_style()
    } else {
        Style::default().fg(app.theme.border)
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(border_style),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_offset(app.host_list_offset);
    if !hosts.is_empty() {
        state.select(Some(selected_visual_index));
    }

    frame.render_stateful_widget(table, area, &mut state);

    app.host_list_area = area;
    app.host_list_offset = state.offset();
}

fn usage_cell(app: &App, percent: Option<f64>) -> Cell<'static> {
    let text = format_percent(percent);
    match percent {
        Some(p) => Cell::from(text).style(app.theme.usage_style(p)),
        None => Cell::from(text).style(Style::default().add_modifier(Modifier::DIM)),
    }
}

fn format_header(name: &str, col: SortColumn, app: &App) -> Span<'static> {
    if app.sort_column == col {
        let arrow = if app.sort_ascending { "↑" } else { "↓" };
        Span::raw(format!("{}{}", name, arrow))
    } else {
        Span::raw(name.to_string())
    }
}

/// Sort hosts by the given column and direction. Missing values sort lowest.
pub fn sort_hosts_by(hosts: &mut [&Host], column: SortColumn, ascending: bool) {
    hosts.sort_by(|a, b| {
        let primary = match column {
            SortColumn::Name => a.hostname.cmp(&b.hostname),
            SortColumn::Status => b.is_online.cmp(&a.is_online),
            SortColumn::Cpu => cmp_optional(a.latest_cpu_percent, b.latest_cpu_percent),
            SortColumn::Memory => cmp_optional(a.latest_memory_percent, b.latest_memory_percent),
            SortColumn::Uptime => a.latest_uptime.cmp(&b.latest_uptime),
        };

        let primary = if ascending {
            primary
        } else {
            primary.reverse()
        };

        // Secondary sort by name for stability when primary values are equal
        if primary == Ordering::Equal {
            a.hostname.cmp(&b.hostname)
        } else {
            primary
        }
    });
}

fn cmp_optional(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return "        ".to_string(); // 8 spaces placeholder
    }

    // Take last 8 values
    let values: Vec<u8> = data.iter().rev().take(8).rev().copied().collect();

    values
        .iter()
        .map(|&v| SPARKLINE_CHARS[v.min(7) as usize])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(name: &str, online: bool, cpu: Option<f64>, uptime: Option<u64>) -> Host {
        Host {
            hostname: name.to_string(),
            is_online: online,
            latest_cpu_percent: cpu,
            latest_memory_percent: None,
            latest_uptime: uptime,
        }
    }

    fn names(hosts: &[&Host]) -> Vec<String> {
        hosts.iter().map(|h| h.hostname.clone()).collect()
    }

    #[test]
    fn test_sort_by_cpu_missing_lowest() {
        let a = host("a", true, Some(50.0), None);
        let b = host("b", false, None, None);
        let c = host("c", true, Some(10.0), None);
        let mut hosts = vec![&a, &b, &c];

        sort_hosts_by(&mut hosts, SortColumn::Cpu, true);
        assert_eq!(names(&hosts), vec!["b", "c", "a"]);

        sort_hosts_by(&mut hosts, SortColumn::Cpu, false);
        assert_eq!(names(&hosts), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_sort_by_status_online_first_then_name() {
        let a = host("a", false, None, None);
        let b = host("b", true, None, None);
        let c = host("c", true, None, None);
        let mut hosts = vec![&a, &c, &b];

        sort_hosts_by(&mut hosts, SortColumn::Status, true);
        assert_eq!(names(&hosts), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_uptime() {
        let a = host("a", true, None, Some(100));
        let b = host("b", true, None, None);
        let c = host("c", true, None, Some(5));
        let mut hosts = vec![&a, &b, &c];

        sort_hosts_by(&mut hosts, SortColumn::Uptime, true);
        assert_eq!(names(&hosts), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_column_cycles() {
        let mut col = SortColumn::default();
        for _ in 0..5 {
            col = col.next();
        }
        assert_eq!(col, SortColumn::Name);
    }

    #[test]
    fn test_render_sparkline() {
        assert_eq!(render_sparkline(&[]), "        ");
        assert_eq!(render_sparkline(&[0, 7]), "▁█");
        assert_eq!(render_sparkline(&[0, 1, 2, 3, 4, 5, 6, 7, 7]).chars().count(), 8);
    }
}
