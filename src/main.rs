use boxbreath::{
    app::{App, Control},
    app_dirs::AppDirs,
    breath::BreathSession,
    clock::{Clock, SystemClock},
    config::{Config, ConfigStore, FileConfigStore},
    cue::TerminalBell,
    error::AppError,
    power::LoggedPowerHint,
    runtime::{BreathEvent, CrosstermEventSource, FixedTicker, Runner},
    session::SessionConfig,
    ui::Screen,
    viewport::MotionPreference,
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    env,
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How long the loop sleeps when no session timer is armed
const IDLE_POLL_MS: u64 = 250;

const DEBUG_LOG_ENV: &str = "BOXBREATH_DEBUG_LOG";

/// calm box breathing in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guided box breathing: inhale, hold, exhale and wait for a few seconds each, following a dot around an animated square. Set an optional session length and the current cycle is finished before the session ends."
)]
pub struct Cli {
    /// seconds per phase
    #[clap(short = 'd', long, value_parser = clap::value_parser!(u8).range(3..=6))]
    phase_duration: Option<u8>,

    /// session length in minutes (the last cycle is always completed)
    #[clap(short = 't', long)]
    time_limit: Option<u32>,

    /// ring the terminal bell at the start and on every phase change
    #[clap(long)]
    sound: bool,

    /// hold the box still between breaths and skip the phase-change pulse
    #[clap(long)]
    reduced_motion: bool,

    /// start right away with a preset session length
    #[clap(long, value_enum)]
    preset: Option<Preset>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum Preset {
    #[value(name = "2")]
    #[strum(serialize = "2 min")]
    Two,
    #[value(name = "5")]
    #[strum(serialize = "5 min")]
    Five,
    #[value(name = "10")]
    #[strum(serialize = "10 min")]
    Ten,
}

impl Preset {
    fn minutes(self) -> u32 {
        match self {
            Preset::Two => 2,
            Preset::Five => 5,
            Preset::Ten => 10,
        }
    }
}

impl Cli {
    /// Flags win over saved preferences
    fn session_config(&self, saved: &Config) -> SessionConfig {
        SessionConfig::new(
            self.phase_duration.unwrap_or(saved.phase_duration_secs),
            self.time_limit,
        )
    }

    fn sound_enabled(&self, saved: &Config) -> bool {
        self.sound || saved.sound_enabled
    }

    /// An explicit request for reduced motion, if either source made one
    fn motion_choice(&self, saved: &Config) -> Option<bool> {
        (self.reduced_motion || saved.reduced_motion).then_some(true)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // the app runs without a log if the file cannot be opened
    init_logging().ok();

    let store = FileConfigStore::new();
    let saved = store.load();
    let clock = SystemClock;

    let mut session = BreathSession::new(
        cli.session_config(&saved),
        Box::new(TerminalBell),
        Box::new(LoggedPowerHint::default()),
    );
    session.set_sound_enabled(cli.sound_enabled(&saved));

    let motion = MotionPreference::detect(cli.motion_choice(&saved));
    let mut app = App::new(session, motion, clock.now());

    if let Some(preset) = cli.preset {
        info!(%preset, "starting preset session");
        app.start_preset(preset.minutes(), clock.now());
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &clock);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // releases the power hint if a session was still running
    app.session.stop();
    if let Err(err) = store.save(&Config::from(&app)) {
        warn!(error = %err, path = %store.path().display(), "failed to save preferences");
    }

    result.map_err(Into::into)
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    clock: &impl Clock,
) -> Result<(), AppError> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(IDLE_POLL_MS)),
    );

    terminal.draw(|f| ui(app, f, clock.now()))?;

    loop {
        let redraw = match runner.step(app.session.next_deadline(), clock.now()) {
            BreathEvent::Wake => false,
            BreathEvent::Resize => true,
            BreathEvent::Closed => {
                warn!("terminal input closed, leaving");
                break;
            }
            BreathEvent::Key(key) => {
                if app.on_key(key, clock.now()) == Control::Quit {
                    break;
                }
                true
            }
        };

        // timers are serviced after every event so steady input cannot starve them
        let wake = app.session.on_timers(clock.now());
        if redraw || wake.needs_redraw() {
            terminal.draw(|f| ui(app, f, clock.now()))?;
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame, now: Instant) {
    f.render_widget(Screen::new(app, now), f.area());
}

fn init_logging() -> Result<(), AppError> {
    let Some(path) = AppDirs::log_path() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| AppError::LogFile {
            path: path.clone(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| AppError::LogFile {
            path: path.clone(),
            source,
        })?;

    let debug_enabled = env::var(DEBUG_LOG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["boxbreath"]);

        assert_eq!(cli.phase_duration, None);
        assert_eq!(cli.time_limit, None);
        assert!(!cli.sound);
        assert!(!cli.reduced_motion);
        assert_eq!(cli.preset, None);
    }

    #[test]
    fn test_cli_phase_duration() {
        let cli = Cli::parse_from(["boxbreath", "-d", "6"]);
        assert_eq!(cli.phase_duration, Some(6));

        let cli = Cli::parse_from(["boxbreath", "--phase-duration", "3"]);
        assert_eq!(cli.phase_duration, Some(3));
    }

    #[test]
    fn test_cli_phase_duration_out_of_range() {
        assert!(Cli::try_parse_from(["boxbreath", "-d", "2"]).is_err());
        assert!(Cli::try_parse_from(["boxbreath", "-d", "7"]).is_err());
    }

    #[test]
    fn test_cli_time_limit() {
        let cli = Cli::parse_from(["boxbreath", "-t", "10"]);
        assert_eq!(cli.time_limit, Some(10));

        let cli = Cli::parse_from(["boxbreath", "--time-limit", "3"]);
        assert_eq!(cli.time_limit, Some(3));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["boxbreath", "--sound", "--reduced-motion"]);
        assert!(cli.sound);
        assert!(cli.reduced_motion);
    }

    #[test]
    fn test_cli_presets() {
        for (arg, minutes) in [("2", 2), ("5", 5), ("10", 10)] {
            let cli = Cli::parse_from(["boxbreath", "--preset", arg]);
            assert_eq!(cli.preset.map(Preset::minutes), Some(minutes));
        }
        assert!(Cli::try_parse_from(["boxbreath", "--preset", "7"]).is_err());
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(Preset::Two.to_string(), "2 min");
        assert_eq!(Preset::Ten.to_string(), "10 min");
    }

    #[test]
    fn test_flags_override_saved_config() {
        let saved = Config {
            phase_duration_secs: 5,
            sound_enabled: false,
            reduced_motion: false,
        };

        let cli = Cli::parse_from(["boxbreath"]);
        assert_eq!(cli.session_config(&saved), SessionConfig::new(5, None));
        assert!(!cli.sound_enabled(&saved));
        assert_eq!(cli.motion_choice(&saved), None);

        let cli = Cli::parse_from(["boxbreath", "-d", "3", "-t", "4", "--sound"]);
        assert_eq!(cli.session_config(&saved), SessionConfig::new(3, Some(4)));
        assert!(cli.sound_enabled(&saved));
    }

    #[test]
    fn test_saved_preferences_apply_without_flags() {
        let saved = Config {
            phase_duration_secs: 6,
            sound_enabled: true,
            reduced_motion: true,
        };
        let cli = Cli::parse_from(["boxbreath"]);
        assert!(cli.sound_enabled(&saved));
        assert_eq!(cli.motion_choice(&saved), Some(true));
        assert_eq!(cli.session_config(&saved).phase_duration_secs, 6);
    }

    #[test]
    fn test_zero_time_limit_ends_after_one_cycle() {
        use boxbreath::cue::SilentCue;
        use boxbreath::power::LoggedPowerHint;
        use std::time::{Duration, Instant};

        let cli = Cli::parse_from(["boxbreath", "-d", "4", "-t", "0"]);
        let config = cli.session_config(&Config::default());
        assert_eq!(config.time_limit_minutes, Some(0));

        let mut session = BreathSession::new(
            config,
            Box::new(SilentCue),
            Box::new(LoggedPowerHint::default()),
        );
        let t0 = Instant::now();
        session.start(t0);
        for i in 1..=15u64 {
            session.tick(t0 + Duration::from_secs(i));
        }
        assert!(session.state().is_running);
        session.tick(t0 + Duration::from_secs(16));
        assert!(session.state().session_complete);
    }

    #[test]
    fn test_ui_renders_idle_screen() {
        use boxbreath::cue::SilentCue;
        use ratatui::{backend::TestBackend, Terminal};

        let session = BreathSession::new(
            SessionConfig::default(),
            Box::new(SilentCue),
            Box::new(LoggedPowerHint::default()),
        );
        let now = Instant::now();
        let app = App::new(session, MotionPreference::default(), now);

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(&app, f, now)).unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(content.contains("Box Breathing"));
    }
}
