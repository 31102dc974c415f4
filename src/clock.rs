use std::cell::Cell;
use std::time::{Duration, Instant};

/// Period of the authoritative session tick
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Default cadence of interpolated frames (~30 fps, plenty for a terminal)
pub const FRAME_INTERVAL_MS: u64 = 33;

/// Source of monotonic timestamps
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Production clock backed by `Instant::now`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// A cancelable periodic deadline.
///
/// Deadlines advance on a fixed cadence from the moment the timer was armed,
/// so a late wake-up never shifts later firings.
#[derive(Clone, Copy, Debug)]
pub struct Timer {
    period: Duration,
    next_due: Option<Instant>,
}

impl Timer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the timer so it first fires one period after `now`.
    /// Any previously pending deadline is dropped.
    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next_due
    }

    /// Number of whole periods that have come due by `now`.
    /// Consumes them, moving the deadline past `now`.
    pub fn take_elapsed(&mut self, now: Instant) -> u32 {
        let Some(due) = self.next_due else {
            return 0;
        };
        if now < due || self.period.is_zero() {
            return 0;
        }

        let behind = now.duration_since(due).as_nanos() / self.period.as_nanos();
        let fired = u32::try_from(behind + 1).unwrap_or(u32::MAX);
        self.next_due = Some(due + self.period * fired);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let start = Instant::now();
        let clock = ManualClock::new(start);
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), start + Duration::from_millis(250));
    }

    #[test]
    fn unarmed_timer_never_fires() {
        let mut timer = Timer::new(TICK_PERIOD);
        assert!(!timer.is_armed());
        assert_eq!(timer.take_elapsed(Instant::now() + Duration::from_secs(10)), 0);
    }

    #[test]
    fn timer_fires_once_per_period() {
        let t0 = Instant::now();
        let mut timer = Timer::new(TICK_PERIOD);
        timer.arm(t0);

        assert_eq!(timer.take_elapsed(t0 + Duration::from_millis(999)), 0);
        assert_eq!(timer.take_elapsed(t0 + Duration::from_millis(1000)), 1);
        assert_eq!(timer.take_elapsed(t0 + Duration::from_millis(1500)), 0);
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn late_wakeup_catches_up_without_drift() {
        let t0 = Instant::now();
        let mut timer = Timer::new(TICK_PERIOD);
        timer.arm(t0);

        // Woken 3.2s late: three periods are owed, cadence stays on whole seconds
        assert_eq!(timer.take_elapsed(t0 + Duration::from_millis(3200)), 3);
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(4)));
    }

    #[test]
    fn cancel_clears_deadline() {
        let t0 = Instant::now();
        let mut timer = Timer::new(Duration::from_millis(FRAME_INTERVAL_MS));
        timer.arm(t0);
        timer.cancel();
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.take_elapsed(t0 + Duration::from_secs(1)), 0);
    }

    #[test]
    fn rearming_replaces_pending_deadline() {
        let t0 = Instant::now();
        let mut timer = Timer::new(TICK_PERIOD);
        timer.arm(t0);
        timer.arm(t0 + Duration::from_millis(400));
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_millis(1400)));
    }
}
