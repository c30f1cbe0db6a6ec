//! History chart for the selected host.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::series::AXIS_LABELS;
use crate::data::{ChartSeries, Metric};

/// Render CPU, memory and disk usage over the selected range. Does nothing
/// without a selection.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(view) = app.history.view() else {
        return;
    };
    let (hostname, range) = view.key;
    let state = view.state;

    let points = state.data.as_ref().map_or(0, ChartSeries::len);
    let mut title = format!(" History: {} ({}) {} points ", hostname, range.label(), points);
    if state.is_loading {
        title.push_str("[loading] ");
    }

    let border_style = if state.error.is_some() {
        app.theme.error_style()
    } else {
        Style::default().fg(app.theme.border)
    };
    let mut block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border_style);
    if let Some(ref err) = state.error {
        block = block.title_bottom(Line::styled(format!(" {} ", err), app.theme.error_style()));
    }

    let series = match state.data {
        Some(series) if !series.is_empty() => series,
        _ => {
            let message = if state.is_loading {
                "Loading history..."
            } else if state.error.is_some() {
                "History unavailable"
            } else {
                "No samples in this range"
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::DIM))
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }
    };

    let data: Vec<(Metric, Vec<(f64, f64)>)> = Metric::ALL
        .iter()
        .map(|&metric| (metric, series.dataset(metric)))
        .collect();

    let datasets: Vec<Dataset> = data
        .iter()
        .map(|(metric, points)| {
            Dataset::default()
                .name(metric.label())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(app.theme.metric_color(*metric)))
                .data(points)
        })
        .collect();

    let x_labels: Vec<Span> = series
        .axis_labels(AXIS_LABELS)
        .into_iter()
        .map(Span::raw)
        .collect();
    let y_labels = vec![Span::raw("0%"), Span::raw("50%"), Span::raw("100%")];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds(series.x_bounds())
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.border))
                .bounds([0.0, 100.0])
                .labels(y_labels),
        )
        .legend_position(Some(LegendPosition::TopLeft));

    frame.render_widget(chart, area);
}
