use std::ops::RangeInclusive;
use std::time::Instant;

pub const PHASE_DURATION_RANGE: RangeInclusive<u8> = 3..=6;
pub const DEFAULT_PHASE_DURATION: u8 = 4;

/// Clamp a requested phase length into the supported range
pub fn clamp_phase_duration(secs: u8) -> u8 {
    secs.clamp(*PHASE_DURATION_RANGE.start(), *PHASE_DURATION_RANGE.end())
}

/// One side of the breathing box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum Phase {
    #[default]
    Inhale,
    Hold,
    Exhale,
    Wait,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Inhale, Phase::Hold, Phase::Exhale, Phase::Wait];

    pub fn index(self) -> usize {
        match self {
            Phase::Inhale => 0,
            Phase::Hold => 1,
            Phase::Exhale => 2,
            Phase::Wait => 3,
        }
    }

    pub fn from_index(idx: usize) -> Phase {
        Self::ALL[idx % 4]
    }

    pub fn next(self) -> Phase {
        Self::from_index(self.index() + 1)
    }

    /// Hold and Wait are the still sides of the box
    pub fn is_still(self) -> bool {
        matches!(self, Phase::Hold | Phase::Wait)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub phase_duration_secs: u8,
    pub time_limit_minutes: Option<u32>,
}

impl SessionConfig {
    pub fn new(phase_duration_secs: u8, time_limit_minutes: Option<u32>) -> Self {
        Self {
            phase_duration_secs: clamp_phase_duration(phase_duration_secs),
            time_limit_minutes,
        }
    }

    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_minutes.map(|m| u64::from(m) * 60)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            phase_duration_secs: DEFAULT_PHASE_DURATION,
            time_limit_minutes: None,
        }
    }
}

/// Derived lifecycle position of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    /// Limit crossed, finishing the current cycle
    Completing,
    Complete,
    Stopped,
}

/// Canonical session state. Only `BreathSession` mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub is_running: bool,
    pub has_started: bool,
    pub phase: Phase,
    pub phase_remaining: u8,
    pub elapsed_total_secs: u64,
    pub time_limit_reached: bool,
    pub session_complete: bool,
    pub last_tick_at: Option<Instant>,
    pub last_phase_change_at: Option<Instant>,
}

impl SessionState {
    /// Resting state: countdown shows the configured duration, nothing drawn
    pub fn idle(phase_duration_secs: u8) -> Self {
        Self {
            is_running: false,
            has_started: false,
            phase: Phase::Inhale,
            phase_remaining: phase_duration_secs,
            elapsed_total_secs: 0,
            time_limit_reached: false,
            session_complete: false,
            last_tick_at: None,
            last_phase_change_at: None,
        }
    }

    /// Fresh running state anchored at `now`
    pub fn started(phase_duration_secs: u8, now: Instant) -> Self {
        Self {
            is_running: true,
            has_started: true,
            last_tick_at: Some(now),
            last_phase_change_at: Some(now),
            ..Self::idle(phase_duration_secs)
        }
    }

    pub fn phase_index(&self) -> usize {
        self.phase.index()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::idle(DEFAULT_PHASE_DURATION)
    }
}
