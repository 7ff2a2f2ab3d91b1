mod app;
mod config;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use crossterm::event::{self, Event, KeyEventKind};
use scriptview_ingest::{Loader, RawInput};
use scriptview_session::SpeakerOrder;
use tracing_subscriber::EnvFilter;

use app::App;
use config::ViewerConfig;

#[derive(Parser)]
#[command(name = "scriptview", version, about = "Terminal viewer for dialogue script files")]
struct Cli {
    /// Script files to load (JSON arrays of {"character", "text"} objects)
    files: Vec<PathBuf>,
    /// Config file (default: <config dir>/scriptview/config.json)
    #[arg(long, env = "SCRIPTVIEW_CONFIG")]
    config: Option<PathBuf>,
    /// Append logs to this file (filter with SCRIPTVIEW_LOG, default: info)
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Speaker list order: first_seen or alphabetical
    #[arg(long)]
    speaker_order: Option<SpeakerOrder>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = ViewerConfig::load(cli.config.as_deref())?;
    let loader = Loader::new(&config.ingest).map_err(|e| eyre!("{e:#}"))?;
    let speaker_order = cli.speaker_order.unwrap_or(config.speaker_order);

    let mut app = App::new(loader, speaker_order);
    app.submit(cli.files.into_iter().map(RawInput::from_path).collect());

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &mut app);
    ratatui::restore();

    result
}

fn run(terminal: &mut ratatui::DefaultTerminal, app: &mut App) -> color_eyre::Result<()> {
    loop {
        app.poll_loads();
        terminal.draw(|f| ui::render(f, &*app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn init_logging(path: &Path) -> color_eyre::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env("SCRIPTVIEW_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "scriptview starting");
    Ok(())
}
