// Declarative description of the breathing box.
//
// `plan` is a pure function of a session snapshot, an interpolated sample
// and the viewport. Painting the result is left to a thin renderer.

use crate::interpolate::FrameSample;
use crate::session::{Phase, SessionState};
use crate::viewport::Viewport;

const SIZE_RATIO: f64 = 0.55;
const TOP_MARGIN: f64 = 20.0;
const MAX_VERTICAL_OFFSET: f64 = 80.0;
const CORNER_RATIO: f64 = 0.08;
const STILL_BREATH_BASE: f64 = 0.3;
const STILL_BREATH_SWING: f64 = 0.2;
const BREATH_WAVE_MS: f64 = 350.0;
const DOT_WAVE_MS: f64 = 180.0;
const PULSE_GAIN: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn alpha(self, a: f64) -> Rgba {
        Rgba {
            rgb: self,
            a: a.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        rgb: Rgb::new(0, 0, 0),
        a: 0.0,
    };
}

/// Inhale, Hold, Exhale, Wait
pub const PHASE_PALETTE: [Rgb; 4] = [
    Rgb::from_hex(0xff9f43),
    Rgb::from_hex(0xfeca57),
    Rgb::from_hex(0x54a0ff),
    Rgb::from_hex(0x5ed5a8),
];

pub fn phase_color(phase: Phase) -> Rgb {
    PHASE_PALETTE[phase.index()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

const fn stop(offset: f64, color: Rgba) -> GradientStop {
    GradientStop { offset, color }
}

/// Radial wash behind the box
#[derive(Debug, Clone, PartialEq)]
pub struct Glow {
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub stops: [GradientStop; 3],
}

/// The breathing square, top-left anchored, y grows downwards
#[derive(Debug, Clone, PartialEq)]
pub struct BreathSquare {
    pub left: f64,
    pub top: f64,
    pub size: f64,
    pub corner_radius: f64,
    pub stroke: Rgba,
    pub line_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
}

/// Stroke over the completed sides of the current cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    pub path: Vec<PathCommand>,
    pub line_width: f64,
    /// Linear gradient from the square's top-left to bottom-right
    pub from: Rgba,
    pub to: Rgba,
    pub shadow: Rgba,
    pub shadow_blur: f64,
    /// Whether the partial current side is included
    pub live: bool,
}

/// The moving dot tracing the perimeter
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub center: Point,
    pub radius: f64,
    pub glow_radius: f64,
    pub glow: [GradientStop; 3],
    pub body: [GradientStop; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
    pub phase: Phase,
    pub accent: Rgb,
    pub breath_influence: f64,
    pub pulse_boost: f64,
    pub glow: Glow,
    pub square: BreathSquare,
    pub trail: Trail,
    pub indicator: Indicator,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawPlan {
    Empty,
    Scene(Scene),
}

impl DrawPlan {
    pub fn scene(&self) -> Option<&Scene> {
        match self {
            DrawPlan::Scene(scene) => Some(scene),
            DrawPlan::Empty => None,
        }
    }
}

/// How far the square is breathed out, in [0, 1]
pub fn breath_influence(phase: Phase, eased: f64, clock_ms: f64, reduced_motion: bool) -> f64 {
    match phase {
        Phase::Inhale => eased,
        Phase::Exhale => 1.0 - eased,
        Phase::Hold | Phase::Wait if reduced_motion => STILL_BREATH_BASE,
        Phase::Hold | Phase::Wait => {
            STILL_BREATH_BASE
                + STILL_BREATH_SWING * (0.5 + 0.5 * (clock_ms / BREATH_WAVE_MS).sin())
        }
    }
}

pub fn plan(
    state: &SessionState,
    sample: &FrameSample,
    viewport: Viewport,
    reduced_motion: bool,
) -> DrawPlan {
    if !state.has_started && !state.session_complete {
        return DrawPlan::Empty;
    }
    let (width, height) = (viewport.width, viewport.height);
    if width <= 0.0 || height <= 0.0 {
        return DrawPlan::Empty;
    }

    let phase = state.phase;
    let eased = sample.eased;
    let allow_motion = !reduced_motion;

    let base_size = width.min(height) * SIZE_RATIO;
    let resting_size = base_size.min(height - TOP_MARGIN * 2.0).max(0.0);
    let vertical_offset = (height * 0.12).min(MAX_VERTICAL_OFFSET);
    let preferred_top = height / 2.0 + vertical_offset - resting_size / 2.0;
    let top = preferred_top
        .min(height - resting_size - TOP_MARGIN)
        .max(TOP_MARGIN);
    let left = (width - resting_size) / 2.0;

    let breath = breath_influence(phase, eased, sample.clock_ms, reduced_motion);
    let pulse_boost = if allow_motion {
        sample.pulse * PULSE_GAIN
    } else {
        0.0
    };

    let size = resting_size * (1.0 + 0.06 * breath + 0.02 * pulse_boost);
    let left = left + (resting_size - size) / 2.0;
    let top = top + (resting_size - size) / 2.0;
    let radius = size * CORNER_RATIO;

    let accent = phase_color(phase);
    let next_accent = phase_color(phase.next());

    // Inset corners the indicator travels between: bottom-left, top-left,
    // top-right, bottom-right.
    let waypoints = [
        Point::new(left + radius, top + size - radius),
        Point::new(left + radius, top + radius),
        Point::new(left + size - radius, top + radius),
        Point::new(left + size - radius, top + size - radius),
    ];
    let dot = waypoints[phase.index()].lerp(waypoints[phase.next().index()], eased);

    let live = allow_motion && state.is_running;
    let center = Point::new(left + size / 2.0, top + size / 2.0);

    let glow = Glow {
        center,
        inner_radius: size * 0.1,
        outer_radius: size * 1.2,
        stops: [
            stop(0.0, accent.alpha(0.12)),
            stop(0.5, accent.alpha(0.04)),
            stop(1.0, Rgba::TRANSPARENT),
        ],
    };

    let square = BreathSquare {
        left,
        top,
        size,
        corner_radius: radius,
        stroke: Rgb::WHITE.alpha(0.06),
        line_width: 1.0,
    };

    let mut path = trail_path(left, top, size, radius, phase);
    if live {
        path.push(PathCommand::LineTo(dot));
    }
    let trail_alpha = if live { 0.9 } else { 0.5 };
    let trail = Trail {
        path,
        line_width: (size * 0.018).max(3.0),
        from: accent.alpha(trail_alpha),
        to: next_accent.alpha(trail_alpha),
        shadow: accent.alpha(0.6),
        shadow_blur: if live { 20.0 } else { 10.0 },
        live,
    };

    let base_dot = (size * 0.028).max(6.0);
    let mut dot_radius = base_dot * (1.0 + 0.3 * breath + 0.2 * pulse_boost);
    if allow_motion && phase.is_still() {
        dot_radius += base_dot * 0.1 * (0.5 + 0.5 * (sample.clock_ms / DOT_WAVE_MS).sin());
    }

    let indicator = Indicator {
        center: dot,
        radius: dot_radius,
        glow_radius: dot_radius * 3.0,
        glow: [
            stop(0.0, accent.alpha(0.4)),
            stop(0.5, accent.alpha(0.1)),
            stop(1.0, Rgba::TRANSPARENT),
        ],
        body: [
            stop(0.0, Rgb::WHITE.alpha(1.0)),
            stop(0.3, accent.alpha(1.0)),
            stop(1.0, accent.alpha(0.8)),
        ],
    };

    DrawPlan::Scene(Scene {
        width,
        height,
        pixel_ratio: viewport.pixel_ratio,
        phase,
        accent,
        breath_influence: breath,
        pulse_boost,
        glow,
        square,
        trail,
        indicator,
    })
}

/// Path over every side finished earlier in this cycle, with rounded corners
fn trail_path(left: f64, top: f64, size: f64, r: f64, phase: Phase) -> Vec<PathCommand> {
    let bottom = top + size;
    let right = left + size;

    let mut path = vec![PathCommand::MoveTo(Point::new(left + r, bottom - r))];
    let sides = [
        // up the left side, round the top-left corner
        (
            Point::new(left + r, top + r),
            Point::new(left, top),
            Point::new(left + r, top),
        ),
        // along the top, round the top-right corner
        (
            Point::new(right - r, top),
            Point::new(right, top),
            Point::new(right, top + r),
        ),
        // down the right side, round the bottom-right corner
        (
            Point::new(right, bottom - r),
            Point::new(right, bottom),
            Point::new(right - r, bottom),
        ),
    ];

    for &(line_to, control, to) in sides.iter().take(phase.index()) {
        path.push(PathCommand::LineTo(line_to));
        path.push(PathCommand::QuadTo { control, to });
    }
    path
}
