use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use pairmatch::{score::MAX_STARS, Card, CardState, SessionState, Symbol};

use crate::{App, COLUMNS};

const HORIZONTAL_MARGIN: u16 = 2;
const CARD_WIDTH: u16 = 14;
const CARD_HEIGHT: u16 = 4;

/// Picture for the built-in symbols; custom ones render by name only.
pub fn glyph(symbol: &Symbol) -> &'static str {
    match symbol.name() {
        "anchor" => "⚓",
        "bicycle" => "🚲",
        "bolt" => "⚡",
        "bomb" => "💣",
        "cube" => "🧊",
        "diamond" => "💎",
        "leaf" => "🍃",
        "paper-plane" => "✈",
        _ => "",
    }
}

/// Cut `s` to at most `width` terminal columns.
fn fit(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

pub fn stars(rating: u8) -> String {
    (0..MAX_STARS)
        .map(|i| if i < rating { '★' } else { '☆' })
        .collect()
}

fn card_widget(card: &Card, selected: bool) -> Paragraph<'static> {
    let inner = (CARD_WIDTH - 2) as usize;
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let (lines, face_style) = match card.state {
        CardState::Hidden => (vec![Line::from("?"), Line::from("")], Style::default().fg(Color::DarkGray)),
        CardState::Revealed => (
            vec![
                Line::from(glyph(&card.symbol)),
                Line::from(fit(card.symbol.name(), inner)),
            ],
            bold.fg(Color::Yellow),
        ),
        CardState::Matched => (
            vec![
                Line::from(glyph(&card.symbol)),
                Line::from(fit(card.symbol.name(), inner)),
            ],
            bold.fg(Color::Green),
        ),
    };

    let border_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    Paragraph::new(lines)
        .style(face_style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        )
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let score = session.score();
        let deck = session.deck();

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_italic_style = Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC);

        let rows = deck.len().div_ceil(COLUMNS) as u16;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(3),
                    Constraint::Length(rows * CARD_HEIGHT),
                    Constraint::Min(3),
                    Constraint::Length(1),
                ]
                .as_ref(),
            )
            .split(area);

        // score panel
        let best = session
            .best_time()
            .map_or_else(|| "-".to_string(), |b| format!("{}s", b));
        let panel = Paragraph::new(Line::from(vec![
            Span::styled(stars(score.star_rating), bold_style.fg(Color::Yellow)),
            Span::raw(format!("   moves {}", score.move_count)),
            Span::raw(format!("   time {}s", score.elapsed_secs)),
            Span::raw(format!("   pairs {}/{}", score.match_count, session.pairs())),
            Span::styled(format!("   best {}", best), Style::default().fg(Color::Magenta)),
        ]))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" pairmatch · {} ", session.state())),
        );
        panel.render(chunks[0], buf);

        // board
        let board_width = (COLUMNS as u16 * CARD_WIDTH).min(chunks[1].width);
        let board = Rect {
            x: chunks[1].x + (chunks[1].width - board_width) / 2,
            width: board_width,
            ..chunks[1]
        };
        if session.state() != SessionState::Paused {
            for card in deck.cards() {
                let row = (card.position / COLUMNS) as u16;
                let col = (card.position % COLUMNS) as u16;
                let cell = Rect {
                    x: board.x + col * CARD_WIDTH,
                    y: board.y + row * CARD_HEIGHT,
                    width: CARD_WIDTH,
                    height: CARD_HEIGHT,
                };
                if cell.right() > area.right() || cell.bottom() > area.bottom() {
                    continue;
                }
                card_widget(card, card.position == self.cursor).render(cell, buf);
            }
        }

        // message area
        let message: Vec<Line> = match session.state() {
            SessionState::Idle => vec![Line::from(Span::styled(
                "Press s to deal a new deck",
                bold_style.fg(Color::Cyan),
            ))],
            SessionState::Paused => vec![Line::from(Span::styled(
                "PAUSED - press p to resume",
                bold_style.fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            ))],
            SessionState::Running => vec![],
            SessionState::Won => match session.last_win() {
                Some(win) => {
                    let mut lines = vec![
                        Line::from(Span::styled(
                            "You matched every pair!",
                            bold_style.fg(Color::Green),
                        )),
                        Line::from(format!(
                            "{}s · {} moves · {}",
                            win.elapsed_secs,
                            win.move_count,
                            stars(win.star_rating)
                        )),
                    ];
                    if win.new_record {
                        lines.push(Line::from(Span::styled(
                            "New best time!",
                            bold_style.fg(Color::Magenta),
                        )));
                    } else if let Some(best) = win.best_time {
                        lines.push(Line::from(format!("Best time: {}s", best)));
                    }
                    lines
                }
                None => vec![],
            },
        };
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        let help = match session.state() {
            SessionState::Running => "(←↓↑→/hjkl) move · (space) flip · (p)ause · (n)ew · (r)eset · (esc)ape",
            SessionState::Paused => "(p) resume · (n)ew · (r)eset · (esc)ape",
            SessionState::Idle | SessionState::Won => "(s)tart · (esc)ape",
        };
        Paragraph::new(Span::styled(help, dim_italic_style))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}
