pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use signal_decoder::{
    app::App,
    app_dirs::AppDirs,
    config::{persist_theme, Config, ConfigStore, FileConfigStore, Theme},
    rules::{Level, LEVEL_COUNT},
    runtime::{CrosstermEventSource, Runner},
    scheduler::WallClockScheduler,
    session::{Session, Timings},
};
use std::{
    error::Error,
    fs::{self, File},
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME_MS: u64 = 50;

/// watch the board flash, then pick the squares from memory
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "A short-term memory trainer: a 5x5 board flashes a pattern chosen by the level's rule, then you reproduce it from memory."
)]
pub struct Cli {
    /// level to start on
    #[clap(short = 'l', long, value_parser = clap::value_parser!(u32).range(1..=LEVEL_COUNT as i64))]
    level: Option<u32>,

    /// how long the pattern is shown, in milliseconds
    #[clap(long)]
    show_ms: Option<u64>,

    /// blink period while the pattern is shown, in milliseconds
    #[clap(long)]
    flash_ms: Option<u64>,

    /// delay before moving on after a perfect answer, in milliseconds
    #[clap(long)]
    advance_ms: Option<u64>,

    /// color theme (saved for next time)
    #[clap(long, value_enum)]
    theme: Option<Theme>,

    /// where to write the log (default: ~/.local/state/signal-decoder/signal-decoder.log)
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Layer command line overrides on top of the stored config for this run.
    /// Returns true when the theme changed and should be saved.
    fn apply(&self, cfg: &mut Config) -> bool {
        if let Some(level) = self.level {
            cfg.start_level = level;
        }
        if let Some(ms) = self.show_ms {
            cfg.show_duration_ms = ms;
        }
        if let Some(ms) = self.flash_ms {
            cfg.flash_interval_ms = ms;
        }
        if let Some(ms) = self.advance_ms {
            cfg.auto_advance_ms = ms;
        }
        match self.theme {
            Some(theme) if theme != cfg.theme => {
                cfg.theme = theme;
                true
            }
            _ => false,
        }
    }
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| -> Box<dyn Error> { e })?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let log_path = cli.log_file.clone().unwrap_or_else(AppDirs::log_path);
    if let Err(e) = init_logging(&log_path) {
        eprintln!("logging disabled ({}): {}", log_path.display(), e);
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    if cli.apply(&mut config) {
        persist_theme(&store, config.theme);
    }
    info!(path = %store.path().display(), ?config, "starting");

    let session = Session::new(
        WallClockScheduler::new(),
        Timings::from(&config),
        Level::new(config.start_level),
    );
    let mut app = App::new(session, config, store);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("bye");
    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App<WallClockScheduler, FileConfigStore>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(FRAME_MS),
    );

    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit {
        if app.handle_event(runner.step(app.until_next_timer())) {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    Ok(())
}
