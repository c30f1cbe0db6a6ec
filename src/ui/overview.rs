//! Overview panel for the selected host.
//!
//! Shows the latest sample from the host detail sync: cores, uptime, load,
//! usage gauges, network counters and when the sample was taken.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_age;
use crate::data::format::{format_bytes, format_thousands, format_timestamp, format_uptime};
use crate::data::MetricSample;

/// Height of the panel including borders.
pub const HEIGHT: u16 = 10;

/// Render the overview of the selected host. Does nothing without a selection.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = app.host_detail.view() else {
        return;
    };
    let state = view.state;

    let mut title = vec![Span::styled(
        format!(" {} ", view.key),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(at) = state.updated_at {
        title.push(Span::styled(
            format!("updated {} ", format_age(at.elapsed())),
            Style::default().add_modifier(Modifier::DIM),
        ));
    }

    let border_style = if state.error.is_some() {
        app.theme.error_style()
    } else {
        Style::default().fg(app.theme.highlight)
    };
    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(sample) = state.data else {
        let text = match state.error {
            Some(err) => Line::styled(format!(" {}", err), app.theme.error_style()),
            None => Line::styled(" Loading...", Style::default().add_modifier(Modifier::DIM)),
        };
        frame.render_widget(Paragraph::new(text), inner);
        return;
    };

    let rows = Layout::vertical([
        Constraint::Length(1), // Cores, uptime
        Constraint::Length(1), // Load average
        Constraint::Length(1), // CPU
        Constraint::Length(1), // Memory
        Constraint::Length(1), // Disk
        Constraint::Length(1), // Network
        Constraint::Length(1), // Sample time / error
        Constraint::Min(0),
    ])
    .split(inner);

    frame.render_widget(Paragraph::new(system_line(&sample)), rows[0]);
    frame.render_widget(Paragraph::new(load_line(&sample)), rows[1]);

    render_gauge(
        frame,
        app,
        rows[2],
        "CPU ",
        sample.cpu_percent,
        sample.cpu_ratio(),
        None,
    );
    render_gauge(
        frame,
        app,
        rows[3],
        "Mem ",
        sample.memory_percent,
        sample.memory_ratio(),
        Some((sample.memory_used, sample.memory_total)),
    );
    render_gauge(
        frame,
        app,
        rows[4],
        "Disk",
        sample.disk_percent,
        sample.disk_ratio(),
        Some((sample.disk_used, sample.disk_total)),
    );

    frame.render_widget(Paragraph::new(network_line(&sample)), rows[5]);

    // A failed refresh keeps the last sample on screen with the error below it.
    let footer = match state.error {
        Some(err) => Line::styled(format!(" {}", err), app.theme.error_style()),
        None => Line::styled(
            format!(" Sampled {}", format_timestamp(&sample.timestamp)),
            Style::default().add_modifier(Modifier::DIM),
        ),
    };
    frame.render_widget(Paragraph::new(footer), rows[6]);
}

fn system_line(sample: &MetricSample) -> Line<'static> {
    Line::from(vec![
        Span::raw(" Cores: "),
        Span::styled(
            sample.cpu_cores.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("    Uptime: "),
        Span::styled(
            format_uptime(sample.uptime),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

fn load_line(sample: &MetricSample) -> Line<'static> {
    let load = match sample.load_average {
        Some([one, five, fifteen]) => format!("{:.2} {:.2} {:.2}", one, five, fifteen),
        None => "N/A".to_string(),
    };
    Line::from(vec![Span::raw(" Load: "), Span::raw(load)])
}

fn network_line(sample: &MetricSample) -> Line<'static> {
    Line::from(format!(
        " Net: ↑ {} ({} pkts)  ↓ {} ({} pkts)",
        format_bytes(sample.network_bytes_sent),
        format_thousands(sample.network_packets_sent),
        format_bytes(sample.network_bytes_recv),
        format_thousands(sample.network_packets_recv),
    ))
}

fn render_gauge(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    name: &str,
    percent: f64,
    ratio: f64,
    usage: Option<(u64, u64)>,
) {
    let label = match usage {
        Some((used, total)) => format!(
            "{} {:.1}%  {} / {}",
            name,
            percent,
            format_bytes(used),
            format_bytes(total)
        ),
        None => format!("{} {:.1}%", name, percent),
    };

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(app.theme.usage_color(percent)))
        .ratio(ratio)
        .label(label);

    // Leave a one-column margin on each side
    let area = Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(2),
        ..area
    };
    frame.render_widget(gauge, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::sample_at;
    use chrono::Utc;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_system_line() {
        let sample = sample_at(Utc::now(), 10.0);
        assert_eq!(text(&system_line(&sample)), " Cores: 4    Uptime: 1d 1h 1m");
    }

    #[test]
    fn test_load_line() {
        let mut sample = sample_at(Utc::now(), 10.0);
        assert_eq!(text(&load_line(&sample)), " Load: 0.50 0.40 0.30");
        sample.load_average = None;
        assert_eq!(text(&load_line(&sample)), " Load: N/A");
    }

    #[test]
    fn test_network_line() {
        let sample = sample_at(Utc::now(), 10.0);
        assert_eq!(
            text(&network_line(&sample)),
            " Net: ↑ 1000 B (10 pkts)  ↓ 2 KB (20 pkts)"
        );
    }
}
