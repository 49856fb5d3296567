pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use pairmatch::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    leaderboard::{BestTimeStore, MemoryStore, ScoreDb},
    logging,
    runtime::{CrosstermEventSource, FixedFrameRate, GameEvent, Runner},
    score::RatingPolicy,
    Session, SessionState,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const FRAME_INTERVAL_MS: u64 = 100;
pub const COLUMNS: usize = 4;

/// memory matching card game for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Flip cards two at a time and match every pair. Fewer moves keep more stars; the fastest win is kept as your best time."
)]
pub struct Cli {
    /// seed for a reproducible shuffle
    #[clap(long)]
    seed: Option<u64>,

    /// how the move breakpoints for losing stars are derived
    #[clap(short = 'r', long, value_enum)]
    rating: Option<RatingArg>,

    /// lose the first star at this many moves, the second at twice as many (overrides --rating)
    #[clap(short = 'b', long)]
    breakpoint: Option<u32>,

    /// milliseconds a mismatched pair stays face up
    #[clap(short = 'd', long)]
    mismatch_delay_ms: Option<u64>,

    /// write the win history as CSV to PATH and exit
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,

    /// print the most recent wins and exit
    #[clap(long)]
    history: bool,

    /// forget the best time and every recorded win, then exit
    #[clap(long)]
    clear_history: bool,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum, strum_macros::Display)]
pub enum RatingArg {
    DeckLength,
    HalfPairs,
}

impl Cli {
    /// Overlay command line flags on the stored configuration
    fn apply(&self, mut config: Config) -> Config {
        if let Some(rating) = self.rating {
            config.rating = match rating {
                RatingArg::DeckLength => RatingPolicy::DeckLength,
                RatingArg::HalfPairs => RatingPolicy::HalfPairs,
            };
        }
        if let Some(breakpoint) = self.breakpoint {
            config.rating = RatingPolicy::Fixed { breakpoint };
        }
        if let Some(ms) = self.mismatch_delay_ms {
            config.mismatch_delay_ms = ms;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct App {
    pub session: Session,
    pub cursor: usize,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self { session, cursor: 0 }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }

        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1, 0),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(0, 1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.session.reveal_card(self.cursor);
            }
            KeyCode::Char('s') => {
                if self.session.start() {
                    self.cursor = 0;
                }
            }
            KeyCode::Char('n') => {
                self.session.restart();
                self.cursor = 0;
            }
            KeyCode::Char('p') => match self.session.state() {
                SessionState::Running => {
                    self.session.pause();
                }
                SessionState::Paused => {
                    self.session.resume();
                }
                _ => {}
            },
            KeyCode::Char('r') => {
                self.session.reset();
                self.cursor = 0;
            }
            _ => {}
        }
        Control::Continue
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let len = self.session.deck().len();
        if len == 0 {
            return;
        }
        let cols = COLUMNS as isize;
        let rows = len.div_ceil(COLUMNS) as isize;
        let row = (self.cursor as isize / cols + dy).clamp(0, rows - 1);
        let col = (self.cursor as isize % cols + dx).clamp(0, cols - 1);
        self.cursor = ((row * cols + col) as usize).min(len - 1);
    }
}

fn open_store() -> Box<dyn BestTimeStore> {
    match ScoreDb::new() {
        Ok(db) => Box::new(db),
        Err(e) => {
            tracing::warn!(error = %e, "score database unavailable, best time will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

fn print_history(store: &dyn BestTimeStore) {
    let best = store.best_time().ok().flatten();
    println!(
        "best time: {}",
        best.map_or_else(|| "-".to_string(), |b| format!("{}s", b))
    );
    for win in store.recent_wins(10).unwrap_or_default() {
        println!(
            "{}  {:>4}s  {:>3} moves  {}",
            win.finished_at.format("%Y-%m-%d %H:%M"),
            win.elapsed_secs,
            win.moves,
            ui::stars(win.stars)
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        logging::init(&path);
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
        println!("saved settings to {}", config_store.path().display());
    }

    if cli.clear_history {
        ScoreDb::new()?.clear()?;
        tracing::info!("win history cleared");
        println!("cleared best time and win history");
        return Ok(());
    }

    if let Some(path) = &cli.export_history {
        let db = ScoreDb::new()?;
        let exported = db.export_csv(File::create(path)?)?;
        println!("exported {} wins to {}", exported, path.display());
        return Ok(());
    }

    if cli.history {
        print_history(open_store().as_ref());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = open_store();
    let session = match cli.seed {
        Some(seed) => Session::seeded(&config, store, seed)?,
        None => Session::new(&config, store)?,
    };
    let mut app = App::new(session);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedFrameRate::new(Duration::from_millis(FRAME_INTERVAL_MS)),
    );

    terminal.draw(|f| ui(app, f))?;

    loop {
        let (event, dt) = runner.wait();
        app.session.advance(dt);

        if let GameEvent::Key(key) = event {
            if app.on_key(key) == Control::Quit {
                break;
            }
        }

        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
