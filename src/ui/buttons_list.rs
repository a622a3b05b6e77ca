//! Saved-buttons table with a detail panel for the selected record.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::signal::Signal;

/// Render the buttons area: table + detail panel
pub fn render_buttons_list(frame: &mut Frame, area: Rect, app: &App) {
    let has_selection = app
        .selected_button
        .map(|i| i < app.buttons.len())
        .unwrap_or(false);

    let chunks = if has_selection {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(6)])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4)])
            .split(area)
    };

    render_table(frame, chunks[0], app);

    if has_selection && chunks.len() > 1 {
        render_detail_panel(frame, chunks[1], app);
    }
}

fn render_table(frame: &mut Frame, area: Rect, app: &App) {
    let header_cells = ["#", "Label", "Transport", "Signal"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows = app
        .buttons
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .map(|(i, record)| {
            let signal = Signal::from_stored(&record.signal);
            let (transport_text, transport_style) = match signal.transport() {
                Some(t) => (t.to_string(), Style::default().fg(Color::Cyan)),
                None => ("legacy".to_string(), Style::default().fg(Color::DarkGray)),
            };
            Row::new(vec![
                Cell::from(format!("{:02}", i + 1)),
                Cell::from(record.label.clone()),
                Cell::from(transport_text).style(transport_style),
                Cell::from(signal.summary()),
            ])
        });

    let title = match app.session.remote_name() {
        Some(name) => format!("buttons — {}", name),
        None => "buttons".to_string(),
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(20),
            Constraint::Length(10),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .block(Block::default().borders(Borders::ALL).title(title));

    let mut state = TableState::default();
    state.select(app.selected_button.map(|i| i.saturating_sub(app.scroll_offset)));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail_panel(frame: &mut Frame, area: Rect, app: &App) {
    let Some(record) = app.selected_button.and_then(|i| app.buttons.get(i)) else {
        return;
    };
    let signal = Signal::from_stored(&record.signal);

    let lines = vec![
        Line::from(vec![
            Span::styled("Label:   ", Style::default().fg(Color::DarkGray)),
            Span::raw(record.label.clone()),
        ]),
        Line::from(vec![
            Span::styled("Signal:  ", Style::default().fg(Color::DarkGray)),
            Span::raw(signal.summary()),
        ]),
        Line::from(vec![
            Span::styled("Stored:  ", Style::default().fg(Color::DarkGray)),
            Span::raw(record.signal.clone()),
        ]),
        Line::from(vec![
            Span::styled("Replay:  ", Style::default().fg(Color::DarkGray)),
            Span::raw(match signal.transport() {
                Some(t) => format!("{} only", t),
                None => "all transports (legacy record)".to_string(),
            }),
        ]),
    ];

    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("detail"));

    frame.render_widget(detail, area);
}
