use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use std::time::SystemTime;
use unicode_width::UnicodeWidthStr;

use swifttype::{
    controller::CompletionPolicy,
    keyboard::{finger_for_key, QWERTY_ROWS},
    settings::Theme,
};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;

fn accent(theme: Theme) -> Color {
    match theme {
        Theme::Light => Color::Blue,
        Theme::Dark => Color::Green,
        Theme::Neon => Color::Magenta,
        Theme::Retro => Color::Yellow,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.controller.session();
    let now = SystemTime::now();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let accent_bold_style = bold_style.fg(accent(app.settings.theme));
    let red_bold_style = bold_style.fg(Color::Red);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let cursor_style = dim_bold_style.add_modifier(Modifier::UNDERLINED);
    let faint_style = Style::default()
        .add_modifier(Modifier::DIM)
        .add_modifier(Modifier::ITALIC);

    // Countdown header. Display-only: the authoritative limit checks run on
    // event timestamps inside the controller.
    let (label, value) = match app.controller.policy() {
        CompletionPolicy::Time { .. } => (
            "TIMER",
            format!(
                "{:02}",
                app.controller
                    .seconds_remaining(now)
                    .unwrap_or(0.0)
                    .ceil() as u64
            ),
        ),
        CompletionPolicy::Words { .. } => (
            "WORDS",
            format!("{:02}", app.controller.words_remaining().unwrap_or(0)),
        ),
        CompletionPolicy::Custom => {
            ("ELAPSED", format!("{:02}", session.elapsed_secs(now) as u64))
        }
    };

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_width = session.reference().width();
    let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
        1
    } else {
        ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };

    // Rows plus a leading blank and the finger-hint line.
    let keyboard_lines = if app.settings.show_keyboard {
        QWERTY_ROWS.len() as u16 + 2
    } else {
        0
    };

    let fixed = 6 + prompt_occupied_lines + keyboard_lines;
    let top_pad = area.height.saturating_sub(fixed) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(top_pad),
                Constraint::Length(1), // mode label
                Constraint::Length(1), // countdown
                Constraint::Length(1),
                Constraint::Length(prompt_occupied_lines),
                Constraint::Length(1),
                Constraint::Length(1), // live stats
                Constraint::Length(1), // passage context
                Constraint::Length(keyboard_lines),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    Paragraph::new(Span::styled(label, faint_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    Paragraph::new(Span::styled(value, bold_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    // The passage, colored per character against the input so far.
    let input_chars: Vec<char> = session.input().chars().collect();
    let spans: Vec<Span> = session
        .reference()
        .chars()
        .enumerate()
        .map(|(idx, expected)| {
            if idx < input_chars.len() {
                if input_chars[idx] == expected {
                    Span::styled(expected.to_string(), accent_bold_style)
                } else {
                    // A missed space still needs a visible glyph.
                    let shown = if expected == ' ' {
                        "·".to_string()
                    } else {
                        expected.to_string()
                    };
                    Span::styled(shown, red_bold_style)
                }
            } else if idx == input_chars.len() {
                Span::styled(expected.to_string(), cursor_style)
            } else {
                Span::styled(expected.to_string(), dim_bold_style)
            }
        })
        .collect();

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[4], buf);

    let stats = session.stats();
    Paragraph::new(Span::styled(
        format!("{} wpm   {}% acc", stats.wpm, stats.accuracy),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[6], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} · {} · {}",
            session.text().difficulty,
            session.text().category,
            session.text().id
        ),
        faint_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[7], buf);

    if app.settings.show_keyboard {
        render_keyboard(app, chunks[8], buf);
    }
}

/// On-screen QWERTY rows with the next expected key highlighted and a
/// touch-typing hint naming the finger that should strike it.
fn render_keyboard(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.controller.session();
    let next_key = session
        .reference()
        .chars()
        .nth(session.input_len())
        .map(|c| c.to_ascii_lowercase());

    let key_style = Style::default().add_modifier(Modifier::DIM);
    let highlight_style = Style::default()
        .add_modifier(Modifier::BOLD)
        .fg(Color::Black)
        .bg(accent(app.settings.theme));

    let mut lines: Vec<Line> = vec![Line::default()];
    for row in QWERTY_ROWS {
        let mut spans = Vec::new();
        for key in row.chars() {
            let shown = if key == ' ' {
                "  space  ".to_string()
            } else {
                format!(" {key} ")
            };
            let style = if next_key == Some(key) {
                highlight_style
            } else {
                key_style
            };
            spans.push(Span::styled(shown, style));
        }
        lines.push(Line::from(spans));
    }

    let hint_style = Style::default()
        .add_modifier(Modifier::DIM)
        .add_modifier(Modifier::ITALIC);
    match next_key.and_then(finger_for_key) {
        Some(finger) => lines.push(Line::from(Span::styled(
            format!("({})", finger.label()),
            hint_style,
        ))),
        // Next key off the layout: keep the pane height stable.
        None => lines.push(Line::default()),
    }

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.controller.session();
    let stats = session.stats();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let faint_style = Style::default()
        .add_modifier(Modifier::DIM)
        .add_modifier(Modifier::ITALIC);
    let best_style = Style::default()
        .add_modifier(Modifier::BOLD)
        .fg(Color::Yellow);

    let top_pad = area.height.saturating_sub(9) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(top_pad),
                Constraint::Length(1), // title
                Constraint::Length(1),
                Constraint::Length(1), // headline stats
                Constraint::Length(1), // detail
                Constraint::Length(1), // test context
                Constraint::Length(1),
                Constraint::Length(1), // personal best
                Constraint::Length(1),
                Constraint::Length(1), // legend
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    Paragraph::new(Span::styled("test complete", faint_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} wpm   {}% acc   {} errors",
            stats.wpm, stats.accuracy, stats.errors
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        format!(
            "gross {} wpm · {}/{} chars · {}s",
            stats.gross_wpm, stats.correct_characters, stats.characters_typed, stats.time_elapsed
        ),
        Style::default(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} mode · {} · {}",
            app.settings.mode,
            session.text().difficulty,
            session.text().id
        ),
        faint_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    let best_line = if app.new_best {
        Span::styled("new personal best!", best_style)
    } else if let Some(best) = app.best_wpm {
        Span::styled(format!("personal best: {best} wpm"), faint_style)
    } else {
        Span::raw("")
    };
    Paragraph::new(best_line)
        .alignment(Alignment::Center)
        .render(chunks[7], buf);

    Paragraph::new(Span::styled("(n) new test  (r) retry  (esc) quit", faint_style))
        .alignment(Alignment::Center)
        .render(chunks[9], buf);
}
