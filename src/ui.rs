use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::cues::{CompletionBurst, PulseFlash};
use crate::session::{Direction, Phase, SessionSnapshot};

const HORIZONTAL_MARGIN: u16 = 4;

const PARTICLE_COLORS: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

/// One frame of the fight screen, assembled from read-only state.
pub struct FightView<'a> {
    pub snap: &'a SessionSnapshot,
    pub flash: &'a PulseFlash,
    pub burst: &'a CompletionBurst,
    pub drill_name: &'a str,
}

impl Widget for FightView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.snap.is_complete {
            render_summary(&self, area, buf);
        } else if !self.snap.started {
            render_ready(&self, area, buf);
        } else {
            render_active(&self, area, buf);
        }
    }
}

/// The round number shown to the user. The engine's counter increments when
/// a round ends, so the round in progress reads one ahead, clamped to the
/// configured total.
pub fn display_round(snap: &SessionSnapshot) -> u32 {
    (snap.current_round + 1).min(snap.total_rounds)
}

/// mm:ss, rounding partial seconds up so the clock only shows 0:00 when the
/// phase is actually over.
pub fn format_clock(remaining_ms: u64) -> String {
    let total_secs = remaining_ms.div_ceil(1000);
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

pub fn direction_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Left => "◀",
        Direction::Right => "▶",
        Direction::Up => "▲",
        Direction::Down => "▼",
        Direction::Pulse => "◆",
    }
}

fn direction_color(direction: Direction) -> Color {
    match direction {
        Direction::Left => Color::Cyan,
        Direction::Right => Color::Magenta,
        Direction::Up => Color::Green,
        Direction::Down => Color::Yellow,
        Direction::Pulse => Color::White,
    }
}

fn header_line(view: &FightView) -> Line<'static> {
    let snap = view.snap;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    if !snap.started {
        return Line::from(Span::styled(
            format!("READY · {} rounds", snap.total_rounds),
            bold.fg(Color::Yellow),
        ));
    }
    let phase_span = match snap.phase {
        Phase::RoundActive => Span::styled(
            format!("ROUND {}/{}", display_round(snap), snap.total_rounds),
            bold.fg(Color::Green),
        ),
        Phase::RestActive => Span::styled(
            format!("REST · next: round {}/{}", display_round(snap), snap.total_rounds),
            bold.fg(Color::Blue),
        ),
        Phase::Complete => Span::styled("COMPLETE".to_string(), bold.fg(Color::Green)),
    };

    let mut spans = vec![phase_span, Span::raw("   ")];
    spans.push(Span::styled(
        format!("{}x", snap.speed_multiplier),
        Style::default().fg(Color::DarkGray),
    ));
    if snap.interrupted {
        spans.push(Span::styled(
            "   PAUSED (focus lost)",
            bold.fg(Color::Red),
        ));
    } else if snap.is_paused && !snap.is_complete {
        spans.push(Span::styled("   PAUSED", bold.fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn help_line(snap: &SessionSnapshot) -> Line<'static> {
    let text = if snap.is_complete {
        "(r) again  (n) reshuffle  (esc/q) quit"
    } else if !snap.started {
        "(space) start  ([ / ]) speed  (esc/q) quit"
    } else if snap.is_paused {
        "(space) resume  ([ / ]) speed  (r) restart  (esc/q) quit"
    } else {
        "(space) pause  (r) restart  (esc/q) quit"
    };
    Line::from(Span::styled(
        text,
        Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
    ))
}

fn centered_chunks(area: Rect, content_lines: u16) -> [Rect; 3] {
    let top = area.height.saturating_sub(content_lines + 2) / 2;
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(top),
            Constraint::Min(content_lines),
        ])
        .split(area);
    [chunks[0], chunks[2], bottom_line(area)]
}

fn bottom_line(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    }
}

fn render_ready(view: &FightView, area: Rect, buf: &mut Buffer) {
    let snap = view.snap;
    let [header, center, footer] = centered_chunks(area, 6);

    Paragraph::new(header_line(view)).render(header, buf);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let work = (snap.remaining_ms / 1000) * snap.total_rounds as u64;
    let lines = vec![
        Line::from(Span::styled(view.drill_name.to_string(), bold)),
        Line::from(""),
        Line::from(format!(
            "{} rounds of {} · {}x speed · ~{} min work",
            snap.total_rounds,
            format_clock(snap.remaining_ms),
            snap.speed_multiplier,
            (work / 60).max(1),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "press SPACE to start",
            bold.fg(Color::Yellow),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(center, buf);

    Paragraph::new(help_line(snap))
        .alignment(Alignment::Center)
        .render(footer, buf);
}

fn render_active(view: &FightView, area: Rect, buf: &mut Buffer) {
    let snap = view.snap;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    // Long combo texts wrap; size the center block for them.
    let usable = area.width.saturating_sub(HORIZONTAL_MARGIN * 2 + 8).max(1);
    let move_lines = (snap.current_move.text.width() as u16).div_ceil(usable).max(1);
    let [header, center, footer] = centered_chunks(area, 4 + move_lines);

    Paragraph::new(header_line(view)).render(header, buf);

    let clock_color = match snap.phase {
        Phase::RestActive => Color::Blue,
        _ => Color::White,
    };
    let mut lines = vec![
        Line::from(Span::styled(
            format_clock(snap.remaining_ms),
            bold.fg(clock_color).add_modifier(Modifier::UNDERLINED),
        )),
        Line::from(""),
    ];

    match snap.phase {
        Phase::RoundActive => {
            let mv = &snap.current_move;
            // Tilt scales how hard the direction marker leans.
            let reps = 1 + (mv.tilt_magnitude * 2.0).round() as usize;
            let glyph = direction_glyph(mv.direction).repeat(reps.min(3));
            let mut style = bold.fg(direction_color(mv.direction));
            if view.flash.active() == Some(mv.direction) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            lines.push(Line::from(Span::styled(
                format!("{glyph}  {}  {glyph}", mv.text),
                style,
            )));
        }
        Phase::RestActive => {
            lines.push(Line::from(Span::styled(
                "shake it out".to_string(),
                Style::default().fg(Color::Blue).add_modifier(Modifier::ITALIC),
            )));
        }
        Phase::Complete => {}
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(center, buf);

    Paragraph::new(help_line(snap))
        .alignment(Alignment::Center)
        .render(footer, buf);
}

fn render_summary(view: &FightView, area: Rect, buf: &mut Buffer) {
    let snap = view.snap;
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let [header, center, footer] = centered_chunks(area, 5);

    Paragraph::new(header_line(view)).render(header, buf);

    let banner = if view.burst.is_active {
        view.burst.banner()
    } else {
        "SESSION COMPLETE"
    };
    let lines = vec![
        Line::from(Span::styled(banner.to_string(), bold.fg(Color::Green))),
        Line::from(""),
        Line::from(format!(
            "{} rounds · {} · {}x speed",
            snap.current_round,
            view.drill_name,
            snap.speed_multiplier,
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(center, buf);

    Paragraph::new(help_line(snap))
        .alignment(Alignment::Center)
        .render(footer, buf);

    for particle in view.burst.particles() {
        let x = particle.x.round();
        let y = particle.y.round();
        if x < 0.0 || y < 0.0 {
            continue;
        }
        let (x, y) = (x as u16, y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }
        if let Some(cell) = buf.cell_mut(Position::new(area.x + x, area.y + y)) {
            cell.set_char(particle.symbol)
                .set_fg(PARTICLE_COLORS[particle.color_index % PARTICLE_COLORS.len()]);
        }
    }
}
