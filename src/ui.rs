pub mod canvas;

use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::{
    app::{App, PRESET_MINUTES},
    plan::{phase_color, plan, DrawPlan},
    session::{Phase, SessionStatus, PHASE_DURATION_RANGE},
    ui::canvas::{to_color, BreathCanvas},
    util::format_time,
    viewport::Viewport,
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Full-screen view of the app at a given instant
pub struct Screen<'a> {
    app: &'a App,
    now: Instant,
}

impl<'a> Screen<'a> {
    pub fn new(app: &'a App, now: Instant) -> Self {
        Self { app, now }
    }

    /// Interpolate and plan the breathing box for `area`
    pub fn draw_plan(&self, area: Rect) -> DrawPlan {
        let session = &self.app.session;
        let reduced = self.app.motion.reduced();
        let sample = self.app.interpolator.sample(
            session.state(),
            session.config().phase_duration_secs,
            self.now,
            reduced,
        );
        plan(session.state(), &sample, Viewport::from_area(area), reduced)
    }
}

impl Widget for Screen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.app.session;
        let state = session.state();
        let status = session.status();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_dim_style = Style::default().patch(dim_style).add_modifier(Modifier::ITALIC);
        let warning_style = Style::default().patch(bold_style).fg(Color::Yellow);

        let mut lines: Vec<Line> = vec![
            Line::from(Span::styled("Box Breathing", bold_style)),
            Line::from(Span::styled("Find your calm", italic_dim_style)),
            Line::default(),
        ];

        if state.is_running {
            let accent = to_color(phase_color(state.phase).alpha(1.0));
            lines.push(Line::from(Span::styled(
                format_time(state.elapsed_total_secs),
                bold_style,
            )));
            lines.push(Line::from(Span::styled(
                state.phase.to_string(),
                Style::default().patch(bold_style).fg(accent),
            )));
            lines.push(Line::from(Span::styled(
                state.phase_remaining.to_string(),
                bold_style,
            )));
            lines.push(phase_tracker(state.phase, dim_style));
        }

        match status {
            SessionStatus::Completing => {
                lines.push(Line::from(Span::styled("Completing cycle…", warning_style)));
            }
            _ if state.time_limit_reached && !state.session_complete => {
                lines.push(Line::from(Span::styled("Time limit reached", warning_style)));
            }
            _ => {}
        }

        if !state.is_running && !state.session_complete {
            lines.extend(self.settings_lines(bold_style, dim_style));
        }

        if state.session_complete {
            lines.push(Line::from(Span::styled(
                "✓ Session Complete",
                Style::default().patch(bold_style).fg(Color::Green),
            )));
            lines.push(Line::from(vec![
                Span::styled("(r)", bold_style),
                Span::styled(" New Session", dim_style),
            ]));
        }

        let footer = Line::from(Span::styled(
            footer_hint(status),
            Style::default().patch(dim_style).add_modifier(Modifier::ITALIC),
        ));

        let text_height = lines.len() as u16;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(text_height),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let drawn = self.draw_plan(chunks[1]);
        BreathCanvas::new(&drawn).render(chunks[1], buf);

        Paragraph::new(footer)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }
}

impl Screen<'_> {
    fn settings_lines(&self, bold_style: Style, dim_style: Style) -> Vec<Line<'static>> {
        let session = &self.app.session;
        let sound = if session.sound_enabled() { "on" } else { "off" };
        let motion = if self.app.motion.reduced() {
            "reduced"
        } else {
            "full"
        };
        let minutes = if self.app.limit_input.is_empty() {
            Span::styled("Enter minutes", dim_style)
        } else {
            Span::styled(format!("{} min", self.app.limit_input), bold_style)
        };

        let presets = PRESET_MINUTES
            .iter()
            .zip(["F2", "F5", "F10"])
            .map(|(m, key)| format!("({key}) {m} min"))
            .collect::<Vec<_>>()
            .join("   ");

        vec![
            Line::from(vec![
                Span::styled("(s)", bold_style),
                Span::raw(format!(" Sound: {sound}   ")),
                Span::styled("(m)", bold_style),
                Span::raw(format!(" Motion: {motion}")),
            ]),
            Line::from(vec![
                Span::raw("Session Duration (optional): "),
                minutes,
            ]),
            Line::from(vec![
                Span::raw("Phase Duration: "),
                Span::styled("←", dim_style),
                Span::styled(format!(" {}s ", session.config().phase_duration_secs), bold_style),
                Span::styled("→", dim_style),
                Span::styled(
                    format!(
                        "  ({}s–{}s)",
                        PHASE_DURATION_RANGE.start(),
                        PHASE_DURATION_RANGE.end()
                    ),
                    dim_style,
                ),
            ]),
            Line::default(),
            Line::from(Span::styled(
                "Press space to begin your session",
                Style::default().add_modifier(Modifier::ITALIC),
            )),
            Line::from(Span::styled(presets, dim_style)),
        ]
    }
}

/// The four phase labels, the active one lit in its own colour
fn phase_tracker(active: Phase, dim_style: Style) -> Line<'static> {
    let mut spans = Vec::with_capacity(Phase::ALL.len() * 2);
    for (i, phase) in Phase::ALL.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        let color = to_color(phase_color(phase).alpha(1.0));
        let style = if phase == active {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            dim_style
        };
        spans.push(Span::styled(format!("● {phase}"), style));
    }
    Line::from(spans)
}

fn footer_hint(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Running | SessionStatus::Completing => {
            "(space) stop   (s)ound   (m)otion   (esc)ape"
        }
        SessionStatus::Complete => "(r) new session   (space) again   (esc)ape",
        SessionStatus::Idle | SessionStatus::Stopped => {
            "(space) start   (←/→) phase   (0-9) minutes   (r)eset   (esc)ape"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breath::BreathSession;
    use crate::cue::SilentCue;
    use crate::power::LoggedPowerHint;
    use crate::session::SessionConfig;
    use crate::viewport::MotionPreference;
    use std::time::Duration;

    fn create_test_app(phase_secs: u8, limit: Option<u32>, epoch: Instant) -> App {
        let session = BreathSession::new(
            SessionConfig::new(phase_secs, limit),
            Box::new(SilentCue),
            Box::new(LoggedPowerHint::default()),
        );
        App::new(session, MotionPreference::default(), epoch)
    }

    fn render_to_string(app: &App, now: Instant, area: Rect) -> String {
        let mut buffer = Buffer::empty(area);
        Screen::new(app, now).render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_idle_screen_shows_settings() {
        let t0 = Instant::now();
        let app = create_test_app(5, None, t0);
        let rendered = render_to_string(&app, t0, Rect::new(0, 0, 90, 30));

        assert!(rendered.contains("Box Breathing"));
        assert!(rendered.contains("Find your calm"));
        assert!(rendered.contains("Press space to begin your session"));
        assert!(rendered.contains("Enter minutes"));
        assert!(rendered.contains("5s"));
        assert!(rendered.contains("Sound: off"));
        assert!(!rendered.contains("Inhale"));
    }

    #[test]
    fn test_idle_screen_has_empty_canvas() {
        let t0 = Instant::now();
        let app = create_test_app(4, None, t0);
        let screen = Screen::new(&app, t0);
        assert_eq!(screen.draw_plan(Rect::new(0, 0, 40, 20)), DrawPlan::Empty);
    }

    #[test]
    fn test_running_screen_shows_timer_and_phase() {
        let t0 = Instant::now();
        let mut app = create_test_app(4, None, t0);
        app.session.start(t0);
        for i in 1..=5u64 {
            app.session.tick(t0 + Duration::from_secs(i));
        }

        let now = t0 + Duration::from_millis(5300);
        let rendered = render_to_string(&app, now, Rect::new(0, 0, 90, 30));

        assert!(rendered.contains("00:05"));
        assert!(rendered.contains("Hold"));
        assert!(rendered.contains("Exhale"));
        assert!(!rendered.contains("Press space"));
        assert!(Screen::new(&app, now)
            .draw_plan(Rect::new(0, 0, 40, 20))
            .scene()
            .is_some());
    }

    #[test]
    fn test_completing_message_after_limit() {
        let t0 = Instant::now();
        let mut app = create_test_app(3, Some(0), t0);
        app.session.start(t0);
        app.session.tick(t0 + Duration::from_secs(1));

        let rendered = render_to_string(&app, t0, Rect::new(0, 0, 90, 30));
        assert!(rendered.contains("Completing cycle…"));
    }

    #[test]
    fn test_complete_screen() {
        let t0 = Instant::now();
        let mut app = create_test_app(3, Some(0), t0);
        app.session.start(t0);
        for i in 1..=12u64 {
            app.session.tick(t0 + Duration::from_secs(i));
        }
        assert!(app.session.state().session_complete);

        let now = t0 + Duration::from_secs(13);
        let rendered = render_to_string(&app, now, Rect::new(0, 0, 90, 30));
        assert!(rendered.contains("✓ Session Complete"));
        assert!(rendered.contains("New Session"));
        assert!(!rendered.contains("Press space"));
        assert!(!rendered.contains("Completing cycle"));
    }

    #[test]
    fn test_limit_input_is_displayed() {
        let t0 = Instant::now();
        let mut app = create_test_app(4, None, t0);
        app.limit_input = "12".to_string();
        let rendered = render_to_string(&app, t0, Rect::new(0, 0, 90, 30));
        assert!(rendered.contains("12 min"));
    }

    #[test]
    fn test_small_and_extreme_areas_do_not_panic() {
        let t0 = Instant::now();
        let mut app = create_test_app(4, None, t0);
        app.session.start(t0);

        for (w, h) in [(1, 1), (10, 3), (20, 5), (200, 60), (300, 10)] {
            let area = Rect::new(0, 0, w, h);
            let mut buffer = Buffer::empty(area);
            Screen::new(&app, t0 + Duration::from_millis(400)).render(area, &mut buffer);
        }
    }

    #[test]
    fn test_phase_tracker_highlights_active() {
        let line = phase_tracker(Phase::Exhale, Style::default());
        let active = line
            .spans
            .iter()
            .find(|s| s.content.contains("Exhale"))
            .map(|s| s.style);
        assert_eq!(
            active.and_then(|s| s.fg),
            Some(Color::Rgb(0x54, 0xa0, 0xff))
        );
    }

    #[test]
    fn test_footer_follows_status() {
        assert!(footer_hint(SessionStatus::Idle).contains("start"));
        assert!(footer_hint(SessionStatus::Running).contains("stop"));
        assert!(footer_hint(SessionStatus::Complete).contains("new session"));
    }
}
