use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum BreathEvent {
    Key(KeyEvent),
    Resize,
    /// A timer deadline (or the idle poll interval) passed with no input
    Wake,
    /// The input source is gone; no further keys can arrive
    Closed,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait BreathEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError>;
}

/// Production event source using crossterm.
///
/// Terminal reads block, so they happen on a helper thread that only
/// forwards events; session state stays on the main loop.
pub struct CrosstermEventSource {
    rx: Receiver<BreathEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    tx.send(BreathEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(BreathEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BreathEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// How long the loop may sleep when no timer is armed
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<BreathEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<BreathEvent>) -> Self {
        Self { rx }
    }
}

impl BreathEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<BreathEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/wake-up at a time
pub struct Runner<E: BreathEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: BreathEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// How long to wait from `now`: until `deadline` if one is armed,
    /// otherwise the idle interval.
    pub fn wait_for(&self, deadline: Option<Instant>, now: Instant) -> Duration {
        match deadline {
            Some(at) => at.saturating_duration_since(now),
            None => self.ticker.interval(),
        }
    }

    /// Blocks until input arrives or the wait expires, returning Wake on
    /// timeout and Closed once the source has hung up
    pub fn step(&self, deadline: Option<Instant>, now: Instant) -> BreathEvent {
        match self.event_source.recv_timeout(self.wait_for(deadline, now)) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => BreathEvent::Wake,
            Err(RecvTimeoutError::Disconnected) => BreathEvent::Closed,
        }
    }
}
