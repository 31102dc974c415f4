use std::f64::consts::FRAC_PI_2;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context, Line, Points},
        Widget,
    },
};

use crate::plan::{BreathSquare, DrawPlan, Indicator, PathCommand, Point, Rgb, Rgba, Scene, Trail};

/// Segments used to approximate a quadratic corner or a quarter arc
const CURVE_STEPS: usize = 8;

/// Paints a `DrawPlan` with braille dots. Plan coordinates grow downwards,
/// canvas coordinates grow upwards, so every y is flipped on the way in.
pub struct BreathCanvas<'a> {
    plan: &'a DrawPlan,
}

impl<'a> BreathCanvas<'a> {
    pub fn new(plan: &'a DrawPlan) -> Self {
        Self { plan }
    }
}

impl Widget for BreathCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(scene) = self.plan.scene() else {
            return;
        };
        if area.width == 0 || area.height == 0 {
            return;
        }

        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, scene.width])
            .y_bounds([0.0, scene.height])
            .paint(|ctx| paint_scene(ctx, scene))
            .render(area, buf);
    }
}

fn paint_scene(ctx: &mut Context, scene: &Scene) {
    // Radial washes have no braille equivalent; the glow is left out.
    paint_square(ctx, scene.height, &scene.square);
    ctx.layer();
    paint_trail(ctx, scene.height, &scene.square, &scene.trail);
    ctx.layer();
    paint_indicator(ctx, scene.height, &scene.indicator);
}

fn paint_square(ctx: &mut Context, h: f64, sq: &BreathSquare) {
    let color = to_color(sq.stroke);
    let r = sq.corner_radius;
    let (l, t) = (sq.left, sq.top);
    let (right, bottom) = (l + sq.size, t + sq.size);

    let edges = [
        (Point::new(l + r, t), Point::new(right - r, t)),
        (Point::new(right, t + r), Point::new(right, bottom - r)),
        (Point::new(right - r, bottom), Point::new(l + r, bottom)),
        (Point::new(l, bottom - r), Point::new(l, t + r)),
    ];
    for (a, b) in edges {
        segment(ctx, h, a, b, color);
    }

    // corner centres with the angle each quarter arc starts at
    let corners = [
        (Point::new(l + r, t + r), 2.0 * FRAC_PI_2),
        (Point::new(right - r, t + r), 3.0 * FRAC_PI_2),
        (Point::new(right - r, bottom - r), 0.0),
        (Point::new(l + r, bottom - r), FRAC_PI_2),
    ];
    for (centre, start) in corners {
        let mut prev = arc_point(centre, r, start);
        for step in 1..=CURVE_STEPS {
            let angle = start + FRAC_PI_2 * step as f64 / CURVE_STEPS as f64;
            let next = arc_point(centre, r, angle);
            segment(ctx, h, prev, next, color);
            prev = next;
        }
    }
}

fn arc_point(centre: Point, r: f64, angle: f64) -> Point {
    Point::new(centre.x + r * angle.cos(), centre.y + r * angle.sin())
}

fn paint_trail(ctx: &mut Context, h: f64, sq: &BreathSquare, trail: &Trail) {
    let shade = |a: Point, b: Point| {
        let mid = a.lerp(b, 0.5);
        let t = if sq.size > 0.0 {
            ((mid.x - sq.left) + (mid.y - sq.top)) / (2.0 * sq.size)
        } else {
            0.0
        };
        to_color(mix(trail.from, trail.to, t))
    };

    let mut cursor: Option<Point> = None;
    for cmd in &trail.path {
        match *cmd {
            PathCommand::MoveTo(p) => cursor = Some(p),
            PathCommand::LineTo(p) => {
                if let Some(from) = cursor {
                    segment(ctx, h, from, p, shade(from, p));
                }
                cursor = Some(p);
            }
            PathCommand::QuadTo { control, to } => {
                if let Some(from) = cursor {
                    let mut prev = from;
                    for step in 1..=CURVE_STEPS {
                        let next = quad_point(from, control, to, step as f64 / CURVE_STEPS as f64);
                        segment(ctx, h, prev, next, shade(prev, next));
                        prev = next;
                    }
                }
                cursor = Some(to);
            }
        }
    }
}

fn quad_point(from: Point, control: Point, to: Point, t: f64) -> Point {
    from.lerp(control, t).lerp(control.lerp(to, t), t)
}

fn paint_indicator(ctx: &mut Context, h: f64, dot: &Indicator) {
    let (x, y) = (dot.center.x, h - dot.center.y);

    ctx.draw(&Circle {
        x,
        y,
        radius: dot.glow_radius * 0.6,
        color: to_color(dot.glow[1].color),
    });
    ctx.draw(&Circle {
        x,
        y,
        radius: dot.glow_radius * 0.35,
        color: to_color(dot.glow[0].color),
    });

    // outer ring in the body's edge colour, then inwards to the white core
    for (scale, stop) in [(1.0, 2), (0.66, 1), (0.33, 1)] {
        ctx.draw(&Circle {
            x,
            y,
            radius: dot.radius * scale,
            color: to_color(dot.body[stop].color),
        });
    }
    ctx.draw(&Points {
        coords: &[(x, y)],
        color: to_color(dot.body[0].color),
    });
}

fn segment(ctx: &mut Context, h: f64, a: Point, b: Point, color: Color) {
    ctx.draw(&Line::new(a.x, h - a.y, b.x, h - b.y, color));
}

fn mix(a: Rgba, b: Rgba, t: f64) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let channel = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * t).round() as u8;
    Rgba {
        rgb: Rgb::new(
            channel(a.rgb.r, b.rgb.r),
            channel(a.rgb.g, b.rgb.g),
            channel(a.rgb.b, b.rgb.b),
        ),
        a: a.a + (b.a - a.a) * t,
    }
}

/// Terminal cells have no alpha: blend over a black background
pub fn to_color(c: Rgba) -> Color {
    let scale = |v: u8| (f64::from(v) * c.a.clamp(0.0, 1.0)).round() as u8;
    Color::Rgb(scale(c.rgb.r), scale(c.rgb.g), scale(c.rgb.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::Interpolator;
    use crate::plan::plan;
    use crate::session::SessionState;
    use crate::viewport::Viewport;
    use std::time::{Duration, Instant};

    fn drawn_cells(buffer: &Buffer) -> usize {
        buffer
            .content()
            .iter()
            .filter(|c| c.symbol() != " ")
            .count()
    }

    #[test]
    fn test_empty_plan_draws_nothing() {
        let area = Rect::new(0, 0, 40, 20);
        let mut buffer = Buffer::empty(area);
        BreathCanvas::new(&DrawPlan::Empty).render(area, &mut buffer);
        assert_eq!(drawn_cells(&buffer), 0);
    }

    #[test]
    fn test_running_scene_draws_box_and_dot() {
        let t0 = Instant::now();
        let state = SessionState::started(4, t0);
        let now = t0 + Duration::from_millis(700);
        let sample = Interpolator::new(t0).sample(&state, 4, now, false);

        let area = Rect::new(0, 0, 40, 20);
        let drawn = plan(&state, &sample, Viewport::from_area(area), false);
        assert!(drawn.scene().is_some());

        let mut buffer = Buffer::empty(area);
        BreathCanvas::new(&drawn).render(area, &mut buffer);
        assert!(drawn_cells(&buffer) > 20);
    }

    #[test]
    fn test_zero_area_is_skipped() {
        let t0 = Instant::now();
        let state = SessionState::started(4, t0);
        let sample = Interpolator::new(t0).sample(&state, 4, t0, false);
        let drawn = plan(&state, &sample, Viewport::new(320.0, 320.0, 1.0), false);

        let area = Rect::new(0, 0, 0, 0);
        let mut buffer = Buffer::empty(area);
        BreathCanvas::new(&drawn).render(area, &mut buffer);
        assert!(buffer.content().is_empty());
    }

    #[test]
    fn test_alpha_blends_towards_black() {
        assert_eq!(to_color(Rgb::WHITE.alpha(1.0)), Color::Rgb(255, 255, 255));
        assert_eq!(to_color(Rgb::WHITE.alpha(0.5)), Color::Rgb(128, 128, 128));
        assert_eq!(to_color(Rgba::TRANSPARENT), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_quad_point_endpoints() {
        let from = Point::new(0.0, 0.0);
        let control = Point::new(10.0, 0.0);
        let to = Point::new(10.0, 10.0);
        assert_eq!(quad_point(from, control, to, 0.0), from);
        assert_eq!(quad_point(from, control, to, 1.0), to);
        assert_eq!(quad_point(from, control, to, 0.5), Point::new(7.5, 2.5));
    }

    #[test]
    fn test_mix_midpoint() {
        let a = Rgb::new(0, 0, 0).alpha(0.0);
        let b = Rgb::new(200, 100, 50).alpha(1.0);
        let m = mix(a, b, 0.5);
        assert_eq!(m.rgb, Rgb::new(100, 50, 25));
        assert!((m.a - 0.5).abs() < 1e-9);
    }
}
