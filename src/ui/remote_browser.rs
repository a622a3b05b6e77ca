//! Centered overlay listing saved remote files to load.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

use crate::app::App;

/// Render the load-remote overlay
pub fn render_remote_browser(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Centered box: 50% width, tall enough for the entries
    let width = (area.width / 2).max(24).min(area.width);
    let height = (app.browser_entries.len() as u16 + 2)
        .min(area.height.saturating_sub(4))
        .max(3);
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let items: Vec<ListItem> = app
        .browser_entries
        .iter()
        .map(|name| ListItem::new(name.as_str()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("load remote")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.browser_selected));

    frame.render_stateful_widget(list, overlay_area, &mut state);
}
