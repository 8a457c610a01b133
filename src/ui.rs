use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
    Frame,
};

use signal_decoder::{
    app::App,
    board::{self, EDGE},
    config::{ConfigStore, Theme},
    evaluate::Verdict,
    scheduler::Scheduler,
    session::{Phase, Session},
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const CELL_WIDTH: u16 = 7;
const CELL_HEIGHT: u16 = 3;

struct Palette {
    fg: Color,
    bg: Color,
    dim: Color,
    accent: Color,
    flash: Color,
    highlight: Color,
    selected: Color,
    correct: Color,
    wrong: Color,
    missed: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                fg: Color::White,
                bg: Color::Reset,
                dim: Color::DarkGray,
                accent: Color::Cyan,
                flash: Color::Yellow,
                highlight: Color::Rgb(110, 95, 20),
                selected: Color::Blue,
                correct: Color::Green,
                wrong: Color::Red,
                missed: Color::Yellow,
            },
            Theme::Light => Self {
                fg: Color::Black,
                bg: Color::Rgb(245, 245, 240),
                dim: Color::Gray,
                accent: Color::Rgb(0, 95, 135),
                flash: Color::Rgb(255, 200, 0),
                highlight: Color::Rgb(250, 230, 150),
                selected: Color::Rgb(100, 150, 240),
                correct: Color::Rgb(60, 170, 90),
                wrong: Color::Rgb(220, 70, 70),
                missed: Color::Rgb(200, 140, 0),
            },
        }
    }
}

pub fn draw<S: Scheduler, C: ConfigStore>(app: &App<S, C>, f: &mut Frame) {
    f.render_widget(GameView(app), f.area());
}

pub struct GameView<'a, S: Scheduler, C: ConfigStore>(pub &'a App<S, C>);

impl<S: Scheduler, C: ConfigStore> Widget for GameView<'_, S, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let session = &app.session;
        let palette = Palette::for_theme(app.theme());

        buf.set_style(area, Style::default().fg(palette.fg).bg(palette.bg));

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().fg(palette.dim);
        let italic_style = Style::default()
            .fg(palette.dim)
            .add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),                        // title
                Constraint::Length(1),                        // level
                Constraint::Length(1),                        // phase
                Constraint::Length(1),                        // padding
                Constraint::Length(CELL_HEIGHT * EDGE as u16), // board
                Constraint::Length(1),                        // padding
                Constraint::Min(3),                           // info
                Constraint::Length(2),                        // help
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("Signal Decoder", bold_style.fg(palette.accent)),
            Span::styled(format!("   theme: {}", app.theme()), dim_style),
        ]))
        .alignment(Alignment::Center);
        title.render(chunks[0], buf);

        let rule = session
            .level()
            .rule()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "no rule".to_string());
        Paragraph::new(Span::styled(
            format!("Level {} - {}", session.level(), rule),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("Phase: ", bold_style),
            Span::raw(phase_label(session.phase())),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        render_board(app, &palette, chunks[4], buf);

        Paragraph::new(info_lines(session, &palette))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);

        Paragraph::new(Text::styled(help_text(session), italic_style))
            .alignment(Alignment::Center)
            .render(chunks[7], buf);
    }
}

fn render_board<S: Scheduler, C: ConfigStore>(
    app: &App<S, C>,
    palette: &Palette,
    area: Rect,
    buf: &mut Buffer,
) {
    let width = CELL_WIDTH * EDGE as u16;
    let origin_x = area.x + area.width.saturating_sub(width) / 2;

    for i in 0..board::CELLS {
        let (row, col) = board::row_col(i);
        let cell = Rect {
            x: origin_x + col as u16 * CELL_WIDTH,
            y: area.y + row as u16 * CELL_HEIGHT,
            width: CELL_WIDTH,
            height: CELL_HEIGHT,
        }
        .intersection(area);
        if cell.width < CELL_WIDTH || cell.height < CELL_HEIGHT {
            continue;
        }

        let (fill, border, symbol) = cell_look(&app.session, palette, i);
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(fill));
        if i == app.cursor {
            block = block
                .border_type(BorderType::Thick)
                .border_style(
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                );
        }

        Paragraph::new(Span::styled(
            symbol,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(block)
        .render(cell, buf);
    }
}

/// Fill, border and label for one cell
fn cell_look<S: Scheduler>(
    session: &Session<S>,
    palette: &Palette,
    i: usize,
) -> (Color, Color, &'static str) {
    if session.flashing(i) {
        return (palette.flash, palette.flash, "");
    }
    if session.visible_active(i) {
        return (palette.highlight, palette.flash, "");
    }
    match session.verdict(i) {
        Some(Verdict::Correct) => (palette.correct, palette.correct, "✓"),
        Some(Verdict::Wrong) => (palette.wrong, palette.wrong, "✗"),
        Some(Verdict::Missed) => (palette.bg, palette.missed, "?"),
        None if session.is_selected(i) => (palette.selected, palette.selected, "●"),
        None => (palette.bg, palette.dim, ""),
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Idle (press s to start)",
        Phase::Showing => "Showing (watch the flash)",
        Phase::Selection => "Selection (pick squares)",
        Phase::Result => "Result (feedback)",
    }
}

fn list_or_dash<'a>(mut positions: impl Iterator<Item = &'a usize>) -> String {
    let joined = positions.join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

fn info_lines<S: Scheduler>(session: &Session<S>, palette: &Palette) -> Vec<Line<'static>> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();

    if session.phase() == Phase::Showing {
        lines.push(Line::from(vec![
            Span::styled("Active indices (rule): ", bold_style),
            Span::raw(list_or_dash(session.active_set().iter())),
        ]));
    }

    lines.push(Line::from(vec![
        Span::styled("Your selections: ", bold_style),
        Span::raw(list_or_dash(session.selection().iter())),
    ]));

    if session.phase() == Phase::Result {
        let tally = session.tally();
        lines.push(Line::from(vec![
            Span::styled("Results: ", bold_style),
            Span::styled(
                format!("✓ {}", tally.correct),
                Style::default().fg(palette.correct),
            ),
            Span::raw("   "),
            Span::styled(
                format!("✗ {}", tally.wrong),
                Style::default().fg(palette.wrong),
            ),
            Span::raw("   "),
            Span::styled(
                format!("missed {}", tally.missed),
                Style::default().fg(palette.missed),
            ),
        ]));
        if session.auto_advance_pending() {
            lines.push(Line::from(Span::styled(
                "Perfect! Next level coming up...",
                bold_style.fg(palette.correct),
            )));
        }
    }

    lines
}

fn help_text<S: Scheduler>(session: &Session<S>) -> String {
    let phase_keys = match session.phase() {
        Phase::Idle => "(s) start",
        Phase::Showing => "(e) stop and select early",
        Phase::Selection => "(space) toggle  (c) check  (x) clear  (e) replay",
        Phase::Result => "(x) clear  (e) replay",
    };
    format!(
        "{}\n(n) next level  (r) reset  (1-5) level  (arrows) move  (t) theme  (q) quit",
        phase_keys
    )
}
