//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Metric;

/// Usage below this percentage is shown as healthy.
pub const USAGE_WARNING: f64 = 50.0;
/// Usage at or above this percentage is shown as critical.
pub const USAGE_CRITICAL: f64 = 80.0;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for usage between the warning and critical thresholds.
    pub warning: Color,
    /// Color for usage above the critical threshold and for errors.
    pub critical: Color,
    /// Color for low usage and online hosts.
    pub healthy: Color,
    /// Color for offline hosts.
    pub offline: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Chart line colors.
    pub cpu: Color,
    pub memory: Color,
    pub disk: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active range tab.
    pub tab_active: Style,
    /// Style for inactive range tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            offline: Color::DarkGray,
            border: Color::Gray,
            cpu: Color::Cyan,
            memory: Color::Magenta,
            disk: Color::Yellow,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            offline: Color::Gray,
            border: Color::DarkGray,
            cpu: Color::Blue,
            memory: Color::Magenta,
            disk: Color::Rgb(180, 120, 0),
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color for a usage percentage.
    pub fn usage_color(&self, percent: f64) -> Color {
        if percent < USAGE_WARNING {
            self.healthy
        } else if percent < USAGE_CRITICAL {
            self.warning
        } else {
            self.critical
        }
    }

    /// Style for a usage percentage; critical usage is bold.
    pub fn usage_style(&self, percent: f64) -> Style {
        let style = Style::default().fg(self.usage_color(percent));
        if percent >= USAGE_CRITICAL {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }

    /// Style for a host's online state.
    pub fn online_style(&self, is_online: bool) -> Style {
        if is_online {
            Style::default().fg(self.healthy)
        } else {
            Style::default().fg(self.offline)
        }
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.critical)
    }

    pub fn metric_color(&self, metric: Metric) -> Color {
        match metric {
            Metric::Cpu => self.cpu,
            Metric::Memory => self.memory,
            Metric::Disk => self.disk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_thresholds() {
        let theme = Theme::dark();
        assert_eq!(theme.usage_color(0.0), theme.healthy);
        assert_eq!(theme.usage_color(49.9), theme.healthy);
        assert_eq!(theme.usage_color(50.0), theme.warning);
        assert_eq!(theme.usage_color(79.9), theme.warning);
        assert_eq!(theme.usage_color(80.0), theme.critical);
        assert!(theme.usage_style(95.0).add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_online_style() {
        let theme = Theme::light();
        assert_eq!(theme.online_style(true).fg, Some(theme.healthy));
        assert_eq!(theme.online_style(false).fg, Some(theme.offline));
    }
}
