//! Text input line with a mode badge, shown while the user is typing.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, InputMode};

/// Render the input line for whichever entry mode is active
pub fn render_input_line(frame: &mut Frame, area: Rect, app: &App) {
    let (input_text, mode_text, mode_style) = match app.input_mode {
        InputMode::Command => (
            format!(":{}", app.command_input),
            "COMMAND",
            Style::default().fg(Color::Yellow),
        ),
        InputMode::RemoteName => (
            app.name_input.clone(),
            "REMOTE",
            Style::default().fg(Color::Cyan),
        ),
        InputMode::SaveLabel => (
            app.label_input.clone(),
            "LABEL",
            Style::default().fg(Color::Green),
        ),
        // Not an entry mode; the caller only draws this widget for the
        // three above.
        _ => (String::new(), "", Style::default()),
    };

    let input_line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode_text),
            mode_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::raw(input_text),
        Span::styled("█", Style::default().fg(Color::White)),
    ]);

    let input = Paragraph::new(input_line)
        .block(Block::default().borders(Borders::ALL).title("input"));

    frame.render_widget(input, area);
}
