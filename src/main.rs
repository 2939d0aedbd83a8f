use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tweetgen::api::{HttpTweetApi, TweetService};
use tweetgen::app::{ApiEvent, App};
use tweetgen::config::{Config, Theme};
use tweetgen::ui;

#[derive(Parser)]
#[command(name = "tweetgen")]
#[command(author, version, about = "Terminal client for an AI tweet generator", long_about = None)]
struct Cli {
    /// Path to a config file (default: <config dir>/tweetgen/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API base URL, overriding config and TWEETGEN_API_URL
    #[arg(long)]
    api_url: Option<String>,

    /// Color theme
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Write logs to this file (stderr would corrupt the terminal UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(log_file: Option<&PathBuf>, verbose: bool) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = if verbose { "tweetgen=debug" } else { "tweetgen=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file)
                .with_ansi(false),
        )
        .init();
    Ok(())
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("create terminal")?;
        terminal.clear().context("clear terminal")?;
        Ok(Self { terminal })
    }

    fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<io::Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref(), cli.verbose)?;

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_overrides(cli.api_url.as_deref(), cli.theme);
    tracing::info!(base_url = %config.api.base_url, "starting");

    let service: Arc<dyn TweetService> =
        Arc::new(HttpTweetApi::new(&config.api.base_url, config.api.timeout()));
    let (mut app, api_rx) = App::new(service, config.ui.theme);
    app.check_health();

    let mut term = TerminalGuard::enter()?;
    let result = run(&mut app, api_rx, term.terminal_mut(), config.ui.tick_ms).await;
    drop(term);
    result
}

async fn run(
    app: &mut App,
    mut api_rx: mpsc::UnboundedReceiver<ApiEvent>,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    tick_ms: u64,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut ticker = time::interval(Duration::from_millis(tick_ms.max(50)));

    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        tokio::select! {
            event = events.next() => {
                match event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        return Err(err).context("terminal event stream failed");
                    }
                    None => break,
                }
            }
            completion = api_rx.recv() => {
                // the app holds a sender, so the channel cannot close
                if let Some(event) = completion {
                    app.apply(event);
                }
            }
            _ = ticker.tick() => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
