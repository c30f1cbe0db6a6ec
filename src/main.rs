use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use fleetwatch::config::Settings;
use fleetwatch::sync::HttpApi;
use fleetwatch::{events, ui, App};

/// Environment variable holding the log filter directives.
const LOG_ENV: &str = "FLEETWATCH_LOG";

#[derive(Parser, Debug)]
#[command(name = "fleetwatch")]
#[command(about = "Live terminal dashboard for fleet host telemetry")]
struct Args {
    /// Base URL of the telemetry API
    #[arg(short, long)]
    api_url: Option<String>,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fleet dashboard refresh interval (e.g., "5s", "500ms")
    #[arg(long)]
    dashboard_interval: Option<String>,

    /// Selected host refresh interval
    #[arg(long)]
    host_interval: Option<String>,

    /// History chart refresh interval
    #[arg(long)]
    history_interval: Option<String>,

    /// Initial history range in hours (1, 6, 24 or 168)
    #[arg(short, long)]
    range: Option<u32>,

    /// HTTP request timeout
    #[arg(short, long)]
    timeout: Option<String>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    /// Command line values as configuration overrides.
    fn overrides(&self) -> Vec<(&'static str, String)> {
        let mut overrides = Vec::new();
        if let Some(ref url) = self.api_url {
            overrides.push(("api_url", url.clone()));
        }
        if let Some(ref interval) = self.dashboard_interval {
            overrides.push(("dashboard_interval", interval.clone()));
        }
        if let Some(ref interval) = self.host_interval {
            overrides.push(("host_interval", interval.clone()));
        }
        if let Some(ref interval) = self.history_interval {
            overrides.push(("history_interval", interval.clone()));
        }
        if let Some(range) = self.range {
            overrides.push(("default_range", range.to_string()));
        }
        if let Some(ref timeout) = self.timeout {
            overrides.push(("request_timeout", timeout.clone()));
        }
        overrides
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration errors are reported before the terminal is taken over
    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;
    let range = settings.time_range()?;

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let api = HttpApi::builder()
        .base_url(settings.api_url.clone())
        .timeout(settings.request_timeout)
        .build()?;

    // Pollers run on the runtime while the UI owns the main thread
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("fleetwatch-sync")
        .enable_all()
        .build()?;
    let _guard = rt.enter();

    tracing::info!(api = %settings.api_url, range = range.hours(), "starting");
    let app = App::new(Arc::new(api), range, settings.sync_config());

    run_tui(app)
}

/// Send logs to `path`. The terminal belongs to the UI, so nothing is
/// logged without a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    tracing::info!("stopped");
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        app.tick();

        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = (area.height / 2).saturating_sub(2);
                let centered = ratatui::layout::Rect::new(0, top, area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::render(frame, app, area);
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => {
                    events::handle_mouse_event(app, mouse, ui::HOST_LIST_FIRST_ROW);
                }
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
