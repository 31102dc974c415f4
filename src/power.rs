use tracing::debug;

use crate::error::PowerHintError;

/// Keep-awake hint held for the duration of a running session
pub trait PowerHint {
    fn acquire(&mut self) -> Result<(), PowerHintError>;
    fn release(&mut self) -> Result<(), PowerHintError>;
}

/// Terminals have no screen wake lock; this records the request in the log.
#[derive(Debug, Default)]
pub struct LoggedPowerHint {
    held: bool,
}

impl LoggedPowerHint {
    pub fn is_held(&self) -> bool {
        self.held
    }
}

impl PowerHint for LoggedPowerHint {
    fn acquire(&mut self) -> Result<(), PowerHintError> {
        self.held = true;
        debug!("power hint acquired");
        Ok(())
    }

    fn release(&mut self) -> Result<(), PowerHintError> {
        self.held = false;
        debug!("power hint released");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_hint_tracks_hold() {
        let mut hint = LoggedPowerHint::default();
        assert!(!hint.is_held());
        hint.acquire().unwrap();
        assert!(hint.is_held());
        hint.release().unwrap();
        assert!(!hint.is_held());
    }
}
