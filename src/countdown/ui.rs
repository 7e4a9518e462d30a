use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use super::glyphs::glyph_lines;

/// Blank rows between the title and the clock.
const TITLE_SPACING: usize = 2;

/// Draws the title and the big `MM:SS` clock centred in the frame.
pub fn draw(f: &mut Frame, remaining: i64, title: &str) {
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::styled(
        format!(" {} ", title),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    lines.extend(std::iter::repeat(Line::from("")).take(TITLE_SPACING));
    lines.extend(glyph_lines(remaining).into_iter().map(Line::from));
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "q / Esc to stop",
        Style::default().fg(Color::DarkGray),
    ));

    let height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(f.area());

    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), chunks[1]);
}
