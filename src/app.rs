use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::breath::BreathSession;
use crate::interpolate::Interpolator;
use crate::util::parse_minutes;
use crate::viewport::MotionPreference;

/// Session presets bound to F2, F5 and F10
pub const PRESET_MINUTES: [u32; 3] = [2, 5, 10];

/// Longest value the time-limit field accepts
const MAX_LIMIT_DIGITS: usize = 4;

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Presentation-side state wrapped around the session controller
pub struct App {
    pub session: BreathSession,
    pub motion: MotionPreference,
    pub interpolator: Interpolator,
    /// Raw contents of the session duration field, digits only
    pub limit_input: String,
}

impl App {
    pub fn new(session: BreathSession, motion: MotionPreference, epoch: Instant) -> Self {
        let limit_input = session
            .config()
            .time_limit_minutes
            .map(|m| m.to_string())
            .unwrap_or_default();

        Self {
            session,
            motion,
            interpolator: Interpolator::new(epoch),
            limit_input,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> Control {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Control::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Control::Quit,
            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_running(now),
            KeyCode::Char('r') => self.new_session(),
            KeyCode::Char('s') => {
                let enabled = !self.session.sound_enabled();
                self.session.set_sound_enabled(enabled);
                debug!(enabled, "sound toggled");
            }
            KeyCode::Char('m') => {
                let reduced = !self.motion.reduced();
                self.motion.set(reduced);
                debug!(reduced, "reduced motion toggled");
            }
            KeyCode::Left => self.nudge_phase_duration(-1),
            KeyCode::Right => self.nudge_phase_duration(1),
            KeyCode::Char(c) if c.is_ascii_digit() => self.push_limit_digit(c),
            KeyCode::Backspace => self.pop_limit_digit(),
            KeyCode::F(2) => self.start_preset(PRESET_MINUTES[0], now),
            KeyCode::F(5) => self.start_preset(PRESET_MINUTES[1], now),
            KeyCode::F(10) => self.start_preset(PRESET_MINUTES[2], now),
            _ => {}
        }

        Control::Continue
    }

    /// Settings can only be edited between sessions, never on the
    /// completion screen
    pub fn settings_editable(&self) -> bool {
        let state = self.session.state();
        !state.is_running && !state.session_complete
    }

    fn toggle_running(&mut self, now: Instant) {
        if self.session.state().is_running {
            self.session.stop();
        } else {
            self.session.set_time_limit(parse_minutes(&self.limit_input));
            self.session.start(now);
        }
    }

    fn new_session(&mut self) {
        self.session.reset();
        self.limit_input.clear();
    }

    fn nudge_phase_duration(&mut self, delta: i8) {
        if !self.settings_editable() {
            return;
        }
        let current = self.session.config().phase_duration_secs;
        let next = current.saturating_add_signed(delta);
        self.session.set_phase_duration(next);
    }

    fn push_limit_digit(&mut self, c: char) {
        if !self.settings_editable() || self.limit_input.len() >= MAX_LIMIT_DIGITS {
            return;
        }
        // a lone zero is a limit of its own; any further digit replaces it
        if self.limit_input == "0" {
            self.limit_input.clear();
        }
        self.limit_input.push(c);
        self.session.set_time_limit(parse_minutes(&self.limit_input));
    }

    fn pop_limit_digit(&mut self) {
        if !self.settings_editable() {
            return;
        }
        self.limit_input.pop();
        self.session.set_time_limit(parse_minutes(&self.limit_input));
    }

    /// Fill the limit field with a preset and start straight away
    pub fn start_preset(&mut self, minutes: u32, now: Instant) {
        if !self.settings_editable() {
            return;
        }
        self.limit_input = minutes.to_string();
        self.session.start_with_preset(minutes, now);
    }
}
