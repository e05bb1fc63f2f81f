use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

use spar::config::{Config, ConfigStore, FileConfigStore};
use spar::cues::{Cues, TerminalBell};
use spar::engine::SessionEngine;
use spar::moves::{catalog, Drill};
use spar::runtime::{AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker};
use spar::session::{is_supported_speed, speed_step, SessionConfig, SPEED_STEPS};
use spar::ui::FightView;
use spar::TICK_RATE_MS;

/// shadow boxing trainer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A shadow boxing training TUI: timed rounds with rest periods, a rotating combo prompt paced by a speed multiplier, and bell cues at every transition. Settings persist between runs; flags override them for one session."
)]
pub struct Cli {
    /// number of rounds
    #[clap(short = 'r', long)]
    rounds: Option<u32>,

    /// round length in seconds
    #[clap(long)]
    round_secs: Option<u32>,

    /// rest length in seconds
    #[clap(long)]
    rest_secs: Option<u32>,

    /// speed multiplier for move pacing
    #[clap(short = 's', long, value_parser = parse_speed)]
    speed: Option<f32>,

    /// drill category to pull moves from
    #[clap(short = 'c', long, value_enum)]
    category: Option<DrillCategory>,

    /// drill difficulty (falls back to beginner if the category has no such drill)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<DrillDifficulty>,

    /// shuffle the drill's move order
    #[clap(long)]
    shuffle: bool,

    /// keep the drill's authored move order (overrides a saved shuffle)
    #[clap(long, conflicts_with = "shuffle")]
    no_shuffle: bool,

    /// list the embedded drills and exit
    #[clap(long)]
    list_drills: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum DrillCategory {
    Boxing,
    Kickboxing,
    Defense,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum DrillDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

fn parse_speed(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("invalid speed: {s}"))?;
    if is_supported_speed(value) {
        Ok(value)
    } else {
        Err(format!("speed must be one of {SPEED_STEPS:?}"))
    }
}

impl Cli {
    /// Persisted config overridden by whatever flags were given.
    fn merge_into(&self, mut cfg: Config) -> Config {
        if let Some(rounds) = self.rounds {
            cfg.rounds = rounds;
        }
        if let Some(secs) = self.round_secs {
            cfg.round_secs = secs;
        }
        if let Some(secs) = self.rest_secs {
            cfg.rest_secs = secs;
        }
        if let Some(speed) = self.speed {
            cfg.speed = speed;
        }
        if let Some(category) = self.category {
            cfg.category = category.to_string().to_lowercase();
        }
        if let Some(difficulty) = self.difficulty {
            cfg.difficulty = difficulty.to_string().to_lowercase();
        }
        if self.shuffle {
            cfg.shuffle = true;
        }
        if self.no_shuffle {
            cfg.shuffle = false;
        }
        cfg
    }
}

fn session_config(cfg: &Config, drill: &Drill) -> SessionConfig {
    let moves = if cfg.shuffle {
        drill.shuffled_moves()
    } else {
        drill.ordered_moves()
    };
    SessionConfig {
        round_duration_ms: cfg.round_secs.saturating_mul(1000),
        rest_duration_ms: cfg.rest_secs.saturating_mul(1000),
        total_rounds: cfg.rounds,
        speed_multiplier: cfg.speed,
        moves,
    }
}

pub struct App {
    pub engine: SessionEngine,
    pub cues: Cues<TerminalBell>,
    pub drill: Drill,
    pub config: Config,
}

impl App {
    pub fn new(cli: &Cli, config: Config) -> Result<Self, Box<dyn Error>> {
        let config = cli.merge_into(config);
        let drill = Drill::load(&config.category, &config.difficulty);
        let engine = SessionEngine::new(session_config(&config, &drill))?;
        Ok(Self {
            engine,
            cues: Cues::new(TerminalBell),
            drill,
            config,
        })
    }

    /// Fresh ready state for the same drill; `reshuffle` rerolls the move
    /// order when shuffling is on.
    pub fn reset(&mut self, reshuffle: bool) -> Result<(), Box<dyn Error>> {
        if reshuffle {
            self.config.shuffle = true;
        }
        self.engine
            .configure(session_config(&self.config, &self.drill))?;
        self.cues = Cues::new(TerminalBell);
        Ok(())
    }
}

fn list_drills() {
    for drill in catalog() {
        println!(
            "{:<12} {:<14} {:<28} {} moves",
            drill.category,
            drill.difficulty,
            drill.name,
            drill.moves.len()
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_drills {
        list_drills();
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut app = match App::new(&cli, store.load()) {
        Ok(app) => app,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err.to_string()).exit();
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)?;
    terminal.show_cursor()?;

    // Remember the last-used settings for next time.
    let _ = store.save(&app.config);

    result
}

#[derive(Debug)]
enum ExitType {
    Restart,
    Reshuffle,
    Quit,
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        let exit_type = run_session(terminal, app, &runner)?;
        match exit_type {
            ExitType::Restart => app.reset(false)?,
            ExitType::Reshuffle => app.reset(true)?,
            ExitType::Quit => {
                app.engine.teardown();
                break;
            }
        }
    }

    Ok(())
}

fn run_session<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<ExitType, Box<dyn Error>> {
    draw(terminal, app)?;

    loop {
        let size = terminal.size().unwrap_or_default();
        match runner.step() {
            AppEvent::Tick => {
                let events = app.engine.tick(Instant::now());
                app.cues.handle(&events, size.width, size.height);
                app.cues.on_tick(TICK_RATE_MS as f64 / 1000.0);

                let busy = !app.engine.is_paused() || app.cues.burst.is_active;
                if !events.is_empty() || busy {
                    draw(terminal, app)?;
                }
            }
            AppEvent::Resize => draw(terminal, app)?,
            AppEvent::FocusLost => {
                let events = app.engine.on_external_interrupt(Instant::now());
                app.cues.handle(&events, size.width, size.height);
                draw(terminal, app)?;
            }
            AppEvent::FocusGained => {
                app.engine.on_external_resume_allowed();
                draw(terminal, app)?;
            }
            AppEvent::Key(key) => {
                match key.code {
                    KeyCode::Esc => return Ok(ExitType::Quit),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(ExitType::Quit);
                    }
                    KeyCode::Char('q') => return Ok(ExitType::Quit),
                    KeyCode::Char('r') => return Ok(ExitType::Restart),
                    KeyCode::Char('n') => return Ok(ExitType::Reshuffle),
                    KeyCode::Char(' ') => {
                        let events = app.engine.toggle_pause(Instant::now());
                        app.cues.handle(&events, size.width, size.height);
                    }
                    KeyCode::Char(c @ ('[' | ']')) => {
                        if app.engine.is_paused() && !app.engine.is_complete() {
                            let next =
                                speed_step(app.engine.config().speed_multiplier, c == ']');
                            if app.engine.set_speed(next).is_ok() {
                                app.config.speed = next;
                            }
                        }
                    }
                    _ => {}
                }
                draw(terminal, app)?;
            }
        }
    }
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> Result<(), Box<dyn Error>> {
    let snap = app.engine.snapshot(Instant::now());
    terminal.draw(|f| {
        let view = FightView {
            snap: &snap,
            flash: &app.cues.flash,
            burst: &app.cues.burst,
            drill_name: &app.drill.name,
        };
        f.render_widget(view, f.area());
    })?;
    Ok(())
}
