//! rpos - Remote Possibility
//!
//! A terminal UI application for capturing, storing, and replaying
//! IR and RF remote-control signals, keyed by remote name.

mod app;
mod session;
mod signal;
mod storage;
mod store;
mod transport;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::panic;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, InputMode};
use signal::Transport;
use storage::Storage;
use ui::draw_ui;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Restore the terminal to normal state (for panic handler)
fn restore_terminal_panic() {
    // Disable raw mode first
    let _ = disable_raw_mode();

    // Write escape sequences directly to stdout
    let mut stdout = io::stdout();

    // Leave alternate screen: ESC [ ? 1049 l
    let _ = stdout.write_all(b"\x1b[?1049l");

    // Show cursor: ESC [ ? 25 h
    let _ = stdout.write_all(b"\x1b[?25h");

    let _ = stdout.flush();
}

fn main() -> Result<()> {
    // Check if we have a TTY first
    if !atty::is(atty::Stream::Stdout) {
        eprintln!("Error: rpos requires a terminal (TTY) to run.");
        eprintln!("Please run this program in a real terminal, not via a script or IDE runner.");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal on panic
    let default_panic = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        default_panic(panic_info);
    }));

    // Initialize logging to a file (not stdout, which would corrupt TUI)
    let log_file = storage::resolve_config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from(".").join("rpos"))
        .join("rpos.log");

    if let Some(parent) = log_file.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    if let Ok(file) = std::fs::File::create(&log_file) {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "rpos=info".into()),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    }

    tracing::info!("Starting rpos v{}", VERSION);

    // Storage failure is fatal: the program is unusable without its store.
    let storage = Storage::new()?;
    let mut app = App::new(&storage)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal properly using the terminal's backend
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
        return Err(err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, app))?;

        if event::poll(std::time::Duration::from_millis(app.poll_interval_ms()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.input_mode {
                        InputMode::Normal => match key.code {
                            KeyCode::Char('q') => return Ok(()),
                            KeyCode::Char(':') => {
                                app.input_mode = InputMode::Command;
                                app.command_input.clear();
                            }
                            KeyCode::Char('j') | KeyCode::Down => {
                                app.next_button();
                            }
                            KeyCode::Char('k') | KeyCode::Up => {
                                app.previous_button();
                            }
                            // One-shot scans, one key per radio
                            KeyCode::Char('1') => app.scan_once(Transport::Infrared),
                            KeyCode::Char('2') => app.scan_once(Transport::ShortRange),
                            KeyCode::Char('3') => app.scan_once(Transport::SubGhz),
                            // Shifted digits toggle continuous scanning
                            KeyCode::Char('!') => app.toggle_scan(Transport::Infrared),
                            KeyCode::Char('@') => app.toggle_scan(Transport::ShortRange),
                            KeyCode::Char('#') => app.toggle_scan(Transport::SubGhz),
                            KeyCode::Char('n') => {
                                app.name_input.clear();
                                app.input_mode = InputMode::RemoteName;
                            }
                            KeyCode::Char('c') => {
                                app.clear_remote();
                            }
                            KeyCode::Char('l') => {
                                app.open_load_browser();
                            }
                            KeyCode::Char('s') => {
                                app.begin_save();
                            }
                            KeyCode::Char('p') | KeyCode::Enter => {
                                app.play_selected();
                            }
                            _ => {}
                        },

                        InputMode::Command => match key.code {
                            KeyCode::Enter => {
                                let command = app.command_input.clone();
                                app.execute_command(&command)?;
                                if app.quit_requested {
                                    return Ok(());
                                }
                                app.command_input.clear();
                                if app.input_mode == InputMode::Command {
                                    app.input_mode = InputMode::Normal;
                                }
                            }
                            KeyCode::Char(c) => {
                                app.command_input.push(c);
                            }
                            KeyCode::Backspace => {
                                app.command_input.pop();
                            }
                            KeyCode::Esc => {
                                app.command_input.clear();
                                app.input_mode = InputMode::Normal;
                            }
                            _ => {}
                        },

                        InputMode::RemoteName => match key.code {
                            KeyCode::Enter => {
                                let name = app.name_input.clone();
                                app.set_remote(&name);
                                app.name_input.clear();
                                app.input_mode = InputMode::Normal;
                            }
                            KeyCode::Char(c) => {
                                app.name_input.push(c);
                            }
                            KeyCode::Backspace => {
                                app.name_input.pop();
                            }
                            KeyCode::Esc => {
                                app.name_input.clear();
                                app.input_mode = InputMode::Normal;
                            }
                            _ => {}
                        },

                        InputMode::SaveLabel => match key.code {
                            KeyCode::Enter => {
                                app.commit_save();
                            }
                            KeyCode::Char(c) => {
                                app.label_input.push(c);
                            }
                            KeyCode::Backspace => {
                                app.label_input.pop();
                            }
                            KeyCode::Esc => {
                                app.label_input.clear();
                                app.input_mode = InputMode::Normal;
                            }
                            _ => {}
                        },

                        InputMode::LoadBrowser => match key.code {
                            KeyCode::Esc => {
                                app.close_load_browser();
                            }
                            KeyCode::Enter => {
                                app.load_browser_enter();
                            }
                            KeyCode::Up | KeyCode::Char('k') => {
                                app.browser_selected = app.browser_selected.saturating_sub(1);
                            }
                            KeyCode::Down | KeyCode::Char('j') => {
                                let max = app.browser_entries.len().saturating_sub(1);
                                if app.browser_selected < max {
                                    app.browser_selected += 1;
                                }
                            }
                            _ => {}
                        },
                    }
                }
            }
        }

        // While a scan is active, poll that radio once per tick
        app.tick();
    }
}
