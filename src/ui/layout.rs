//! Main UI layout.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, InputMode};

use super::buttons_list::render_buttons_list;
use super::input_line::render_input_line;
use super::remote_browser::render_remote_browser;
use super::status_bar::render_status_bar;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draw the entire UI
pub fn draw_ui(frame: &mut Frame, app: &App) {
    let show_input = matches!(
        app.input_mode,
        InputMode::Command | InputMode::RemoteName | InputMode::SaveLabel
    );

    let main_area = frame.area();
    let mut v_constraints = vec![
        Constraint::Length(3), // Header
        Constraint::Min(8),    // Buttons table + detail panel
        Constraint::Length(3), // Status bar
        Constraint::Length(1), // Help bar
    ];
    if show_input {
        v_constraints.insert(v_constraints.len() - 1, Constraint::Length(3));
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(v_constraints)
        .split(main_area);

    let mut idx = 0;
    render_header(frame, rows[idx], app);
    idx += 1;

    render_buttons_list(frame, rows[idx], app);
    idx += 1;

    render_status_bar(frame, rows[idx], app);
    idx += 1;

    if show_input {
        render_input_line(frame, rows[idx], app);
        idx += 1;
    }

    render_help_bar(frame, rows[idx], app);

    if app.input_mode == InputMode::LoadBrowser {
        render_remote_browser(frame, app);
    }
}

/// Header: title, version, active remote, scan state
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let remote = match app.session.remote_name() {
        Some(name) => Span::styled(
            name.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("<no remote set>", Style::default().fg(Color::DarkGray)),
    };

    let scan = match app.scanning {
        Some(transport) => Span::styled(
            format!("  SCAN {}", transport),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        None => Span::raw(""),
    };

    let header_line = Line::from(vec![
        Span::styled(
            format!(" Remote Possibility v{} ", VERSION),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("| Remote: "),
        remote,
        scan,
    ]);

    let header = Paragraph::new(header_line)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

/// One-line key reference at the bottom
fn render_help_bar(frame: &mut Frame, area: Rect, app: &App) {
    let text = match app.input_mode {
        InputMode::Normal => {
            " 1/2/3 scan IR/RF24/RF433 | S-1/2/3 auto-scan | n name | c clear | l load | s save | Enter play | j/k move | : cmd | q quit"
        }
        InputMode::Command => " Enter run | Esc cancel",
        InputMode::RemoteName => " Enter set remote name | Esc cancel",
        InputMode::SaveLabel => " Enter save button under label | Esc cancel",
        InputMode::LoadBrowser => " j/k move | Enter load remote | Esc close",
    };

    let help = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(help, area);
}
