// Continuous progress between authoritative ticks.
//
// Everything here is a pure read of a `SessionState` snapshot plus an
// explicit timestamp; nothing mutates the session.

use std::f64::consts::PI;
use std::time::{Duration, Instant};

use crate::session::SessionState;

/// How long the emphasis burst after a phase change lasts
pub const PULSE_WINDOW: Duration = Duration::from_millis(500);

/// Ease-in-out on [0, 1]
#[inline]
pub fn ease(p: f64) -> f64 {
    0.5 - (PI * p.clamp(0.0, 1.0)).cos() / 2.0
}

/// Raw progress through the current phase, in [0, 1].
///
/// The last tick is the anchor: the countdown it left behind is reduced by
/// the time since, so a late or early tick snaps the estimate back in line.
pub fn phase_progress(state: &SessionState, phase_duration_secs: u8, now: Instant) -> f64 {
    if phase_duration_secs == 0 {
        return 1.0;
    }
    let duration = f64::from(phase_duration_secs);
    let elapsed = state
        .last_tick_at
        .map(|at| now.saturating_duration_since(at).as_secs_f64())
        .unwrap_or(0.0);
    let effective_remaining = f64::from(state.phase_remaining) - elapsed;

    ((duration - effective_remaining) / duration).clamp(0.0, 1.0)
}

/// Emphasis burst following a phase change: a half sine over `PULSE_WINDOW`
pub fn pulse_intensity(state: &SessionState, now: Instant) -> f64 {
    let Some(changed_at) = state.last_phase_change_at else {
        return 0.0;
    };
    let since = now.saturating_duration_since(changed_at);
    if since >= PULSE_WINDOW {
        return 0.0;
    }
    (PI * since.as_secs_f64() / PULSE_WINDOW.as_secs_f64()).sin()
}

/// One interpolated reading, ready for the render planner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub progress: f64,
    pub eased: f64,
    pub pulse: f64,
    /// Milliseconds since the interpolator's epoch; drives idle oscillation
    pub clock_ms: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    epoch: Instant,
}

impl Interpolator {
    pub fn new(epoch: Instant) -> Self {
        Self { epoch }
    }

    pub fn sample(
        &self,
        state: &SessionState,
        phase_duration_secs: u8,
        now: Instant,
        reduced_motion: bool,
    ) -> FrameSample {
        let progress = if state.is_running {
            phase_progress(state, phase_duration_secs, now)
        } else if state.session_complete {
            1.0
        } else {
            0.0
        };
        let pulse = if reduced_motion {
            0.0
        } else {
            pulse_intensity(state, now)
        };

        FrameSample {
            progress,
            eased: ease(progress),
            pulse,
            clock_ms: now.saturating_duration_since(self.epoch).as_secs_f64() * 1000.0,
        }
    }
}
