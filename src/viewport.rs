use std::env;

use ratatui::layout::Rect;

/// Logical pixels per terminal column / row. Cells are roughly twice as tall
/// as they are wide, so this keeps the box square on screen.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub const MAX_PIXEL_RATIO: f64 = 2.5;

pub const REDUCED_MOTION_ENV: &str = "BOXBREATH_REDUCED_MOTION";

/// Drawing surface size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            pixel_ratio: pixel_ratio.clamp(1.0, MAX_PIXEL_RATIO),
        }
    }

    /// Viewport covering a terminal area
    pub fn from_area(area: Rect) -> Self {
        Self::new(
            f64::from(area.width) * CELL_WIDTH_PX,
            f64::from(area.height) * CELL_HEIGHT_PX,
            1.0,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Reduced-motion preference: an explicit choice wins, then the environment,
/// and platforms with no way to ask default to full motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotionPreference {
    reduced: bool,
}

impl MotionPreference {
    pub fn new(reduced: bool) -> Self {
        Self { reduced }
    }

    pub fn detect(explicit: Option<bool>) -> Self {
        let reduced = explicit
            .or_else(|| env::var(REDUCED_MOTION_ENV).ok().map(|v| parse_flag(&v)))
            .unwrap_or(false);
        Self { reduced }
    }

    pub fn reduced(&self) -> bool {
        self.reduced
    }

    pub fn set(&mut self, reduced: bool) {
        self.reduced = reduced;
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}
