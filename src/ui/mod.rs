//! Terminal UI components.

mod buttons_list;
mod input_line;
mod layout;
mod remote_browser;
mod status_bar;

pub use layout::draw_ui;
