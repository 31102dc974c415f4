use std::io::{self, Write};

use crossterm::{execute, style::Print};

use crate::error::CueError;

/// Plays the short cue marking a session start or phase change.
/// Calls are fire-and-forget; the session only logs failures.
pub trait CuePlayer {
    fn play(&mut self) -> Result<(), CueError>;
}

/// Rings the terminal bell
#[derive(Debug, Default)]
pub struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn play(&mut self) -> Result<(), CueError> {
        let mut out = io::stdout();
        execute!(out, Print('\x07'))?;
        out.flush()?;
        Ok(())
    }
}

/// Silent player used headless
#[derive(Debug, Default)]
pub struct SilentCue;

impl CuePlayer for SilentCue {
    fn play(&mut self) -> Result<(), CueError> {
        Ok(())
    }
}
