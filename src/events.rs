use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::App;
use crate::data::TimeRange;

const EXPORT_PATH: &str = "fleet_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Navigation
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Selection
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Esc => app.clear_selection(),

        // History range
        KeyCode::Char('t') => app.next_range(),
        KeyCode::Char('T') => app.prev_range(),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            app.set_range(TimeRange::ALL[index]);
        }

        KeyCode::Char('r') => app.refresh_all(),
        KeyCode::Char('?') => app.toggle_help(),

        // Sorting
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('S') => app.toggle_sort_direction(),

        // Filter (start typing to filter)
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') => {
            if !app.filter_text.is_empty() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        // Confirm filter
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Cancel filter (keep text but exit input mode)
        KeyCode::Esc => {
            app.cancel_filter();
        }

        // Clear and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.filter_text.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
///
/// `first_row` is the terminal row of the first host in the list.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, first_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        // Click a host row to select it
        MouseEventKind::Down(MouseButton::Left) => {
            let list = app.host_list_area;
            let in_list = mouse.column >= list.x
                && mouse.column < list.x + list.width
                && mouse.row >= first_row
                && mouse.row + 1 < list.y + list.height;
            if in_list {
                let row = (mouse.row - first_row) as usize + app.host_list_offset;
                app.click_row(row);
            }
        }

        // Right-click clears the selection
        MouseEventKind::Down(MouseButton::Right) => app.clear_selection(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::{KeyEventKind, KeyEventState};
    use ratatui::layout::Rect;
    use tokio::time;

    use crate::data::model::sample_at;
    use crate::data::{DashboardSnapshot, Host};
    use crate::sync::mock::MockApi;
    use crate::sync::SyncConfig;
    use crate::ui::Theme;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn click(app: &mut App, button: MouseButton, column: u16, row: u16) {
        let mouse = MouseEvent {
            kind: MouseEventKind::Down(button),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse_event(app, mouse, 4);
    }

    async fn app() -> App {
        let hosts = ["alpha", "bravo", "charlie"]
            .iter()
            .map(|name| Host {
                hostname: name.to_string(),
                is_online: true,
                latest_cpu_percent: Some(10.0),
                latest_memory_percent: Some(20.0),
                latest_uptime: Some(600),
            })
            .collect();
        let snapshot = DashboardSnapshot {
            total_hosts: 3,
            online_hosts: 3,
            total_metrics: 30,
            latest_metrics: vec![sample_at(chrono::Utc::now(), 10.0)],
            hosts,
        };
        let api = Arc::new(MockApi::new().with_dashboard(snapshot));
        let mut app = App::with_theme(
            api,
            TimeRange::Day,
            SyncConfig::default(),
            Theme::dark(),
        );
        time::sleep(Duration::from_millis(10)).await;
        app.tick();
        app
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_and_selection_keys() {
        let mut app = app().await;

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.cursor, 2);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.cursor, 1);
        press(&mut app, KeyCode::End);
        assert_eq!(app.cursor, 2);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.cursor, 0);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.selected_hostname().as_deref(), Some("alpha"));
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.selected_hostname(), None);

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.selected_hostname(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_range_keys() {
        let mut app = app().await;

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.selection().range, TimeRange::OneHour);
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.selection().range, TimeRange::Week);
        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.selection().range, TimeRange::OneHour);
        press(&mut app, KeyCode::Char('T'));
        assert_eq!(app.selection().range, TimeRange::Week);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_mode_captures_keys() {
        let mut app = app().await;

        press(&mut app, KeyCode::Char('/'));
        assert!(app.filter_active);
        // 'q' is text while filtering, not quit
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        press(&mut app, KeyCode::Backspace);
        assert!(!app.filter_active);

        press(&mut app, KeyCode::Char('/'));
        for c in "brav".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(!app.filter_active);
        assert_eq!(app.visible_hosts().len(), 1);

        press(&mut app, KeyCode::Char('c'));
        assert!(app.filter_text.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_swallows_next_key() {
        let mut app = app().await;
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sort_keys() {
        let mut app = app().await;
        press(&mut app, KeyCode::Char('S'));
        assert!(!app.sort_ascending);
        assert_eq!(app.visible_hosts()[0].hostname, "charlie");
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.sort_column, crate::ui::SortColumn::Status);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mouse_click_selects_row() {
        let mut app = app().await;
        app.host_list_area = Rect::new(0, 2, 80, 20);

        click(&mut app, MouseButton::Left, 10, 5);
        assert_eq!(app.cursor, 1);
        assert_eq!(app.selected_hostname().as_deref(), Some("bravo"));

        // Header row and clicks outside the list are ignored
        click(&mut app, MouseButton::Left, 10, 3);
        click(&mut app, MouseButton::Left, 90, 5);
        assert_eq!(app.selected_hostname().as_deref(), Some("bravo"));

        click(&mut app, MouseButton::Right, 10, 5);
        assert_eq!(app.selected_hostname(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ctrl_c_quits() {
        let mut app = app().await;
        let key = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, key);
        assert!(!app.running);
    }
}
