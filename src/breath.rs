use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::clock::{Timer, FRAME_INTERVAL_MS, TICK_PERIOD};
use crate::cue::CuePlayer;
use crate::power::PowerHint;
use crate::session::{clamp_phase_duration, Phase, SessionConfig, SessionState, SessionStatus};

/// What a pass over the timers produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wake {
    pub ticks: u32,
    pub frame: bool,
}

impl Wake {
    pub fn needs_redraw(&self) -> bool {
        self.ticks > 0 || self.frame
    }
}

/// Session controller: owns the canonical state, both timers and the
/// side-effecting collaborators.
///
/// Timer discipline: `start` cancels both timers before arming them;
/// `stop`, `reset` and completion cancel both before returning.
pub struct BreathSession {
    config: SessionConfig,
    state: SessionState,
    sound_enabled: bool,
    halted: bool,
    power_held: bool,
    tick_timer: Timer,
    frame_timer: Timer,
    cue: Box<dyn CuePlayer>,
    power: Box<dyn PowerHint>,
}

impl BreathSession {
    pub fn new(config: SessionConfig, cue: Box<dyn CuePlayer>, power: Box<dyn PowerHint>) -> Self {
        let config = SessionConfig::new(config.phase_duration_secs, config.time_limit_minutes);
        Self {
            state: SessionState::idle(config.phase_duration_secs),
            config,
            sound_enabled: false,
            halted: false,
            power_held: false,
            tick_timer: Timer::new(TICK_PERIOD),
            frame_timer: Timer::new(Duration::from_millis(FRAME_INTERVAL_MS)),
            cue,
            power,
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_timer = Timer::new(interval);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_timer.is_armed()
    }

    pub fn frame_scheduled(&self) -> bool {
        self.frame_timer.is_armed()
    }

    pub fn status(&self) -> SessionStatus {
        let s = &self.state;
        if s.session_complete {
            SessionStatus::Complete
        } else if s.is_running && s.time_limit_reached {
            SessionStatus::Completing
        } else if s.is_running {
            SessionStatus::Running
        } else if self.halted {
            SessionStatus::Stopped
        } else {
            SessionStatus::Idle
        }
    }

    pub fn start(&mut self, now: Instant) {
        if self.state.is_running {
            return;
        }

        self.cancel_timers();
        self.state = SessionState::started(self.config.phase_duration_secs, now);
        self.halted = false;
        self.tick_timer.arm(now);
        self.frame_timer.arm(now);

        info!(
            phase_secs = self.config.phase_duration_secs,
            limit_minutes = ?self.config.time_limit_minutes,
            "session started"
        );

        self.play_cue();
        self.acquire_power();
    }

    pub fn start_with_preset(&mut self, minutes: u32, now: Instant) {
        if self.state.is_running {
            return;
        }
        self.config.time_limit_minutes = Some(minutes);
        self.start(now);
    }

    /// Halt a running session. Duration and limit survive for the next start.
    pub fn stop(&mut self) {
        if !self.state.is_running {
            return;
        }

        self.cancel_timers();
        info!(elapsed_secs = self.state.elapsed_total_secs, "session stopped");
        self.state = SessionState::idle(self.config.phase_duration_secs);
        self.halted = true;
        self.release_power();
    }

    /// Back to a blank slate, clearing the time limit as well.
    pub fn reset(&mut self) {
        self.cancel_timers();
        self.config.time_limit_minutes = None;
        self.state = SessionState::idle(self.config.phase_duration_secs);
        self.halted = false;
        self.release_power();
        debug!("session reset");
    }

    /// Advance the session by one authoritative second
    pub fn tick(&mut self, now: Instant) {
        if !self.state.is_running {
            return;
        }

        let duration = self.config.phase_duration_secs;
        let limit = self.config.time_limit_secs();
        let s = &mut self.state;

        s.elapsed_total_secs += 1;

        if let Some(limit) = limit {
            if !s.time_limit_reached && s.elapsed_total_secs >= limit {
                s.time_limit_reached = true;
                info!(
                    elapsed_secs = s.elapsed_total_secs,
                    "time limit reached, finishing current cycle"
                );
            }
        }

        if s.phase_remaining <= 1 {
            let finished = s.phase;
            s.last_phase_change_at = Some(now);
            s.last_tick_at = Some(now);

            // Cutover happens when Wait runs out, not when it begins: a
            // zero limit at 4 s phases completes on tick 16, a full cycle.
            if finished == Phase::Wait && s.time_limit_reached {
                s.phase_remaining = 0;
                self.complete();
                self.play_cue();
                return;
            }

            s.phase = finished.next();
            s.phase_remaining = duration;
            debug!(phase = %s.phase, "phase changed");
            self.play_cue();
        } else {
            s.phase_remaining -= 1;
            s.last_tick_at = Some(now);
        }
    }

    /// Service whichever timers have come due by `now`.
    ///
    /// Each owed second produces one tick; a frame is reported at most once
    /// and only while the session is still running afterwards.
    pub fn on_timers(&mut self, now: Instant) -> Wake {
        let mut wake = Wake::default();

        for _ in 0..self.tick_timer.take_elapsed(now) {
            if !self.state.is_running {
                break;
            }
            self.tick(now);
            wake.ticks += 1;
        }

        if self.frame_timer.take_elapsed(now) > 0 && self.state.is_running {
            wake.frame = true;
        }
        if !self.state.is_running {
            self.frame_timer.cancel();
        }

        wake
    }

    /// Earliest pending timer deadline, if any timer is armed
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.tick_timer.deadline(), self.frame_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn set_phase_duration(&mut self, secs: u8) {
        if self.state.is_running {
            return;
        }
        self.config.phase_duration_secs = clamp_phase_duration(secs);
        // a completed snapshot keeps its final countdown of zero
        if !self.state.session_complete {
            self.state.phase_remaining = self.config.phase_duration_secs;
        }
    }

    pub fn set_time_limit(&mut self, minutes: Option<u32>) {
        if self.state.is_running {
            return;
        }
        self.config.time_limit_minutes = minutes;
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    fn complete(&mut self) {
        self.cancel_timers();
        self.state.session_complete = true;
        self.state.is_running = false;
        self.state.has_started = false;
        info!(
            elapsed_secs = self.state.elapsed_total_secs,
            "session complete"
        );
        self.release_power();
    }

    fn cancel_timers(&mut self) {
        self.tick_timer.cancel();
        self.frame_timer.cancel();
    }

    fn play_cue(&mut self) {
        if !self.sound_enabled {
            return;
        }
        if let Err(err) = self.cue.play() {
            warn!(error = %err, "cue playback failed");
        }
    }

    fn acquire_power(&mut self) {
        if self.power_held {
            return;
        }
        match self.power.acquire() {
            Ok(()) => self.power_held = true,
            Err(err) => warn!(error = %err, "failed to acquire power hint"),
        }
    }

    fn release_power(&mut self) {
        if !self.power_held {
            return;
        }
        self.power_held = false;
        if let Err(err) = self.power.release() {
            warn!(error = %err, "failed to release power hint");
        }
    }
}
