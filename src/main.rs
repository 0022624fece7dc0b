//! GeniusMind - A terminal chat client for stock recommendations.

mod api;
mod app;
mod cli;
mod config;
mod dashboard;
mod error;
mod export;
mod format;
mod models;
mod results;
mod runtime;
mod session;
mod transcript;
mod ui;

use anyhow::{Context, Result};
use api::{Backend, GeniusMindClient};
use app::App;
use cli::Args;
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dashboard::DetailView;
use models::DetailMode;
use ratatui::{Terminal, backend::CrosstermBackend};
use results::render_results;
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::UiColors;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    if args.init_config {
        let path = args
            .config
            .clone()
            .or_else(Config::default_config_path)
            .context("Could not determine a configuration directory")?;
        Config::default().save(&path)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    // Load configuration
    let mut config = if let Some(ref path) = args.config {
        Config::load(path)?
    } else {
        Config::load_or_default()
    };
    args.apply_to(&mut config);

    init_logging(&args)?;

    let client = GeniusMindClient::new(&config.server)
        .with_context(|| format!("Invalid server address: {}", config.server.base_url))?;
    info!(server = %config.server.base_url, batch = args.is_batch(), "starting geniusmind");

    // Run in batch mode or interactive mode
    match args.ask {
        Some(ref query) => run_batch(&client, &args, &config, query).await,
        None => run_interactive(client, &config).await,
    }
}

/// Route tracing output: a log file for the TUI, stderr for batch runs.
fn init_logging(args: &Args) -> Result<()> {
    let default_level = if args.verbose {
        "geniusmind=debug"
    } else {
        "geniusmind=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if args.is_batch() && args.log_file.is_none() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
        return Ok(());
    }

    // Drawing to the terminal would corrupt the TUI, so skip logging without a file
    let Some(path) = args.log_file.clone().or_else(Config::default_log_path) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

/// Run a single query without the TUI, like `top -b`.
async fn run_batch(
    client: &GeniusMindClient,
    args: &Args,
    config: &Config,
    query: &str,
) -> Result<()> {
    let items = client
        .recommend(query)
        .await
        .map_err(|e| anyhow::anyhow!("Could not get recommendations: {}", e.user_message()))?;

    match args.export {
        Some(format) => print!("{}", export::export_results(&items, format)),
        None => ui::render_batch(query, &items),
    }

    if args.details {
        let mode = config.display.detail_mode;
        // Follow what was printed: a system notice means no stocks to detail
        let view = render_results(Some(&items));
        let symbols = view.tickers();

        let details = futures::future::join_all(
            symbols.iter().map(|symbol| fetch_detail_view(client, symbol, mode)),
        )
        .await;

        for detail in &details {
            println!("{}", export::detail_summary(detail));
        }
    }

    Ok(())
}

async fn fetch_detail_view(
    client: &GeniusMindClient,
    symbol: &str,
    mode: DetailMode,
) -> DetailView {
    let mut view = DetailView::loading(symbol, mode);
    match client.fetch_detail(symbol, mode).await {
        Ok(payload) => view.populate(&payload),
        Err(e) => {
            warn!(symbol, error = %e, "detail request failed");
            view.fail(e.user_message());
        }
    }
    view
}

/// Run in interactive mode with TUI.
async fn run_interactive(client: GeniusMindClient, config: &Config) -> Result<()> {
    let mut app = App::new(client, config)?;
    let colors = UiColors::from_config(&config.colors);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app, &colors);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Main application loop.
fn run_app<B: Backend>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<B>,
    colors: &UiColors,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        // Draw UI
        terminal.draw(|f| ui::render(f, app, colors))?;

        // Handle events with timeout
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }

        // Apply finished requests and price ticks
        app.drain_background();

        // Check if we should quit
        if app.should_quit() {
            break;
        }
    }

    Ok(())
}
