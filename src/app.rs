//! Application state management.

use anyhow::{anyhow, Result};

use crate::session::{CaptureEvent, Session};
use crate::signal::{Signal, Transport, MAX_SHORT_RANGE_PAYLOAD};
use crate::storage::{Config, Storage};
use crate::store::{ButtonRecord, ButtonStore, RemoteName, StoreError};
use crate::transport::{default_label, DemoTransceiver, Transceiver};

/// Input mode for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Command input mode (after pressing :)
    Command,
    /// Typing the active remote's name
    RemoteName,
    /// Typing a label for the last captured signal
    SaveLabel,
    /// Browsing saved remote files
    LoadBrowser,
}

/// Main application state
pub struct App {
    /// Current input mode
    pub input_mode: InputMode,
    /// Command input buffer
    pub command_input: String,
    /// Remote-name input buffer
    pub name_input: String,
    /// Button-label input buffer
    pub label_input: String,
    /// Saved buttons of the active remote, in file order
    pub buttons: Vec<ButtonRecord>,
    /// Currently selected button index
    pub selected_button: Option<usize>,
    /// Scroll offset for the buttons list
    pub scroll_offset: usize,
    /// Transport being polled every tick, if a scan is active
    pub scanning: Option<Transport>,
    /// Last error message
    pub last_error: Option<String>,
    /// Last status message
    pub status_message: Option<String>,
    /// Remote files shown in the load browser
    pub browser_entries: Vec<String>,
    /// Selected row in the load browser
    pub browser_selected: usize,
    /// Set by :q; the main loop exits on it
    pub quit_requested: bool,

    /// Active remote and last capture
    pub session: Session,
    /// Runtime configuration
    config: Config,
    /// The button store
    store: ButtonStore,
    /// One transceiver per transport
    transceivers: Vec<Box<dyn Transceiver>>,
}

impl App {
    /// Create the application with the demo radio set.
    pub fn new(storage: &Storage) -> Result<Self> {
        let transceivers = Transport::ALL
            .iter()
            .map(|&t| Box::new(DemoTransceiver::new(t)) as Box<dyn Transceiver>)
            .collect();
        Self::with_transceivers(storage.config.clone(), transceivers)
    }

    /// Create the application with explicit transceivers.
    pub fn with_transceivers(
        config: Config,
        transceivers: Vec<Box<dyn Transceiver>>,
    ) -> Result<Self> {
        let store = ButtonStore::open(&config.data_directory)
            .map_err(|e| anyhow!("Cannot open button store: {}", e))?;

        Ok(Self {
            input_mode: InputMode::Normal,
            command_input: String::new(),
            name_input: String::new(),
            label_input: String::new(),
            buttons: Vec::new(),
            selected_button: None,
            scroll_offset: 0,
            scanning: None,
            last_error: None,
            status_message: None,
            browser_entries: Vec::new(),
            browser_selected: 0,
            quit_requested: false,
            session: Session::new(),
            config,
            store,
            transceivers,
        })
    }

    /// Polling-loop interval in milliseconds.
    pub fn poll_interval_ms(&self) -> u64 {
        self.config.poll_interval_ms
    }

    // ─── Remote selection ────────────────────────────────────────────────

    /// Set the active remote. Unsafe names are rejected, not rewritten.
    pub fn set_remote(&mut self, name: &str) {
        self.last_error = None;
        match RemoteName::new(name) {
            Ok(remote) => {
                self.status_message = Some(format!("Remote set: {}", remote));
                self.session.set_remote(remote);
                self.refresh_buttons();
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn clear_remote(&mut self) {
        self.session.clear_remote();
        self.buttons.clear();
        self.selected_button = None;
        self.scroll_offset = 0;
        self.status_message = Some("Cleared remote name".to_string());
    }

    /// Reload the button list of the active remote from its file.
    fn refresh_buttons(&mut self) {
        match self.session.remote() {
            Ok(remote) => match self.store.records(remote) {
                Ok(records) => {
                    self.buttons = records;
                    if self.buttons.is_empty() {
                        self.selected_button = None;
                    } else if let Some(i) = self.selected_button {
                        self.selected_button = Some(i.min(self.buttons.len() - 1));
                    }
                }
                Err(e) => self.last_error = Some(e.to_string()),
            },
            Err(_) => {
                self.buttons.clear();
                self.selected_button = None;
            }
        }
    }

    // ─── Scanning ────────────────────────────────────────────────────────

    /// Poll one transport once, reporting a miss in the status bar.
    pub fn scan_once(&mut self, transport: Transport) {
        self.last_error = None;
        self.poll_transport(transport, true);
    }

    /// Start or stop the continuous scan of one transport.
    pub fn toggle_scan(&mut self, transport: Transport) {
        self.last_error = None;
        if self.scanning == Some(transport) {
            self.scanning = None;
            self.status_message = Some(format!("Stopped scanning {}", transport));
        } else {
            self.scanning = Some(transport);
            self.status_message = Some(format!("Scanning {}...", transport));
        }
    }

    /// One tick of the polling loop: while a scan is active, poll that
    /// radio exactly once. A miss is silent; the next tick retries.
    pub fn tick(&mut self) {
        if let Some(transport) = self.scanning {
            self.poll_transport(transport, false);
        }
    }

    fn poll_transport(&mut self, transport: Transport, report_miss: bool) {
        let polled = self
            .transceivers
            .iter_mut()
            .find(|t| t.transport() == transport)
            .and_then(|t| t.poll_once());

        match polled {
            Some(signal) => self.handle_capture(transport, signal),
            None if report_miss => {
                self.status_message = Some(format!("No {} signal detected.", transport));
            }
            None => {}
        }
    }

    /// A signal arrived: remember it, optionally auto-save it under the
    /// transport's default label, optionally echo it back out.
    fn handle_capture(&mut self, transport: Transport, signal: Signal) {
        tracing::info!("{} capture: {}", transport, signal.summary());
        self.status_message = Some(format!(
            "{} Button Detected: {}",
            transport,
            signal.summary()
        ));
        self.session
            .record_capture(CaptureEvent::new(signal.clone(), transport));

        if self.config.auto_save_captures {
            match self.append_for_session(default_label(transport), &signal.to_stored()) {
                Ok(()) => self.refresh_buttons(),
                Err(StoreError::NoActiveRemote) => {
                    // Capture is kept in the session; the user can still
                    // name a remote and save it with a label.
                    self.last_error = Some("No remote name set!".to_string());
                }
                Err(e) => self.last_error = Some(e.to_string()),
            }
        }

        if self.config.echo_transmit {
            if let Err(e) = self.transmit_signal(&signal) {
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn append_for_session(&mut self, label: &str, signal: &str) -> Result<(), StoreError> {
        let remote = self.session.remote()?.clone();
        self.store.append(&remote, label, signal)
    }

    // ─── Saving ──────────────────────────────────────────────────────────

    /// Enter label entry for the last capture, prefilled with the
    /// transport's default label.
    pub fn begin_save(&mut self) {
        self.last_error = None;
        match self.session.last_capture() {
            Some(event) => {
                self.label_input = default_label(event.transport).to_string();
                self.input_mode = InputMode::SaveLabel;
            }
            None => {
                self.last_error = Some("No captured signal to save".to_string());
            }
        }
    }

    /// Append the last capture under the typed label.
    pub fn commit_save(&mut self) {
        let label = self.label_input.clone();
        let Some(event) = self.session.last_capture().cloned() else {
            self.last_error = Some("No captured signal to save".to_string());
            return;
        };
        match self.append_for_session(&label, &event.signal.to_stored()) {
            Ok(()) => {
                self.status_message = Some("Button Saved!".to_string());
                self.refresh_buttons();
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
        self.label_input.clear();
        self.input_mode = InputMode::Normal;
    }

    // ─── Playback ────────────────────────────────────────────────────────

    /// Replay the currently selected button.
    pub fn play_selected(&mut self) {
        let Some(label) = self
            .selected_button
            .and_then(|i| self.buttons.get(i))
            .map(|r| r.label.clone())
        else {
            self.last_error = Some("No button selected".to_string());
            return;
        };
        self.play_label(&label);
    }

    /// Look a label up under the active remote and transmit its signal.
    pub fn play_label(&mut self, label: &str) {
        self.last_error = None;
        let remote = match self.session.remote() {
            Ok(r) => r.clone(),
            Err(e) => {
                self.last_error = Some(e.to_string());
                return;
            }
        };
        match self.store.playback(&remote, label) {
            Ok(text) => {
                let signal = Signal::from_stored(&text);
                match self.transmit_signal(&signal) {
                    Ok(()) => {
                        self.status_message =
                            Some(format!("Played back {:?}: {}", label, signal.summary()));
                    }
                    Err(e) => self.last_error = Some(e.to_string()),
                }
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
    }

    /// Send a signal on its owning transport. Legacy values carry no tag,
    /// so they are replayed the way the handheld firmware did: parse as
    /// hex and send on every radio.
    fn transmit_signal(&mut self, signal: &Signal) -> Result<()> {
        match signal {
            Signal::Legacy(text) => self.transmit_legacy(text),
            typed => {
                // transport() is Some for every non-Legacy variant
                let transport = typed
                    .transport()
                    .ok_or_else(|| anyhow!("signal has no transport"))?;
                self.transceiver(transport)?.transmit(typed)?;
                Ok(())
            }
        }
    }

    fn transmit_legacy(&mut self, text: &str) -> Result<()> {
        let code = u32::from_str_radix(text.trim(), 16).ok();
        let bits = self.config.ir_default_bits;

        if let Some(code) = code {
            self.transceiver(Transport::Infrared)?
                .transmit(&Signal::Infrared { code, bits })?;
        }

        let payload: Vec<u8> = text
            .as_bytes()
            .iter()
            .take(MAX_SHORT_RANGE_PAYLOAD)
            .copied()
            .collect();
        self.transceiver(Transport::ShortRange)?
            .transmit(&Signal::ShortRange(payload))?;

        if let Some(code) = code {
            self.transceiver(Transport::SubGhz)?
                .transmit(&Signal::SubGhz(code & 0x00FF_FFFF))?;
        }
        Ok(())
    }

    fn transceiver(&mut self, transport: Transport) -> Result<&mut Box<dyn Transceiver>> {
        self.transceivers
            .iter_mut()
            .find(|t| t.transport() == transport)
            .ok_or_else(|| anyhow!("no {} transceiver", transport))
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select the next button in the list
    pub fn next_button(&mut self) {
        if self.buttons.is_empty() {
            return;
        }
        self.selected_button = Some(match self.selected_button {
            Some(i) => (i + 1).min(self.buttons.len() - 1),
            None => 0,
        });
        self.ensure_selection_visible();
    }

    /// Select the previous button in the list
    pub fn previous_button(&mut self) {
        if self.buttons.is_empty() {
            return;
        }
        self.selected_button = Some(match self.selected_button {
            Some(i) => i.saturating_sub(1),
            None => 0,
        });
        self.ensure_selection_visible();
    }

    /// Keep the selected row inside the scroll view
    fn ensure_selection_visible(&mut self) {
        if let Some(selected) = self.selected_button {
            let visible_rows = 15;
            if selected < self.scroll_offset {
                self.scroll_offset = selected;
            } else if selected >= self.scroll_offset + visible_rows {
                self.scroll_offset = selected.saturating_sub(visible_rows - 1);
            }
        }
    }

    // ─── Load browser ────────────────────────────────────────────────────

    pub fn open_load_browser(&mut self) {
        self.last_error = None;
        match self.store.remotes() {
            Ok(entries) => {
                if entries.is_empty() {
                    self.status_message = Some("No saved remotes".to_string());
                    return;
                }
                self.browser_entries = entries;
                self.browser_selected = 0;
                self.input_mode = InputMode::LoadBrowser;
            }
            Err(e) => self.last_error = Some(e.to_string()),
        }
    }

    pub fn close_load_browser(&mut self) {
        self.browser_entries.clear();
        self.input_mode = InputMode::Normal;
    }

    /// Activate the remote selected in the browser.
    pub fn load_browser_enter(&mut self) {
        if let Some(name) = self.browser_entries.get(self.browser_selected).cloned() {
            self.set_remote(&name);
        }
        self.close_load_browser();
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Execute a `:` command
    pub fn execute_command(&mut self, command: &str) -> Result<()> {
        let parts: Vec<&str> = command.trim().split_whitespace().collect();
        if parts.is_empty() {
            return Ok(());
        }

        self.last_error = None;
        self.status_message = None;

        match parts[0] {
            "q" | "quit" => {
                self.quit_requested = true;
            }
            "remote" => {
                if parts.len() < 2 {
                    self.last_error = Some("Usage: :remote <name>".to_string());
                    return Ok(());
                }
                let name = parts[1..].join(" ");
                self.set_remote(&name);
            }
            "clear" => {
                self.clear_remote();
            }
            "save" => {
                if parts.len() < 2 {
                    self.last_error = Some("Usage: :save <label>".to_string());
                    return Ok(());
                }
                self.label_input = parts[1..].join(" ");
                self.commit_save();
            }
            "play" => {
                if parts.len() < 2 {
                    self.last_error = Some("Usage: :play <label>".to_string());
                    return Ok(());
                }
                let label = parts[1..].join(" ");
                self.play_label(&label);
            }
            "scan" => {
                if parts.len() < 2 {
                    self.last_error = Some("Usage: :scan <ir|rf24|rf433>".to_string());
                    return Ok(());
                }
                match transport_from_str(parts[1]) {
                    Some(transport) => self.scan_once(transport),
                    None => {
                        self.last_error =
                            Some(format!("Unknown transport: {}", parts[1]));
                    }
                }
            }
            other => {
                self.last_error = Some(format!("Unknown command: {}", other));
            }
        }
        Ok(())
    }
}

fn transport_from_str(s: &str) -> Option<Transport> {
    match s {
        "ir" => Some(Transport::Infrared),
        "rf24" => Some(Transport::ShortRange),
        "rf433" => Some(Transport::SubGhz),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    use crate::transport::TransportError;

    type SentLog = Rc<RefCell<Vec<(Transport, Signal)>>>;

    /// Transceiver fed from a script; records everything it transmits.
    struct ScriptedTransceiver {
        transport: Transport,
        pending: Vec<Signal>,
        sent: SentLog,
    }

    impl Transceiver for ScriptedTransceiver {
        fn transport(&self) -> Transport {
            self.transport
        }

        fn poll_once(&mut self) -> Option<Signal> {
            self.pending.pop()
        }

        fn transmit(&mut self, signal: &Signal) -> Result<(), TransportError> {
            self.sent.borrow_mut().push((self.transport, signal.clone()));
            Ok(())
        }
    }

    fn test_config(dir: &TempDir) -> Config {
        Config {
            data_directory: dir.path().join("remote_names"),
            auto_save_captures: true,
            echo_transmit: false,
            poll_interval_ms: 100,
            ir_default_bits: 32,
        }
    }

    fn test_app(dir: &TempDir, scripts: Vec<(Transport, Vec<Signal>)>) -> (App, SentLog) {
        let sent: SentLog = Rc::new(RefCell::new(Vec::new()));
        let transceivers: Vec<Box<dyn Transceiver>> = Transport::ALL
            .iter()
            .map(|&transport| {
                let pending = scripts
                    .iter()
                    .find(|(t, _)| *t == transport)
                    .map(|(_, s)| s.clone())
                    .unwrap_or_default();
                Box::new(ScriptedTransceiver {
                    transport,
                    pending,
                    sent: sent.clone(),
                }) as Box<dyn Transceiver>
            })
            .collect();
        let app = App::with_transceivers(test_config(dir), transceivers).unwrap();
        (app, sent)
    }

    #[test]
    fn test_capture_auto_saves_under_default_label() {
        let dir = TempDir::new().unwrap();
        let signal = Signal::Infrared { code: 0x20DF10EF, bits: 32 };
        let (mut app, _sent) = test_app(&dir, vec![(Transport::Infrared, vec![signal])]);

        app.set_remote("Living Room TV");
        app.scan_once(Transport::Infrared);

        assert_eq!(app.buttons.len(), 1);
        assert_eq!(app.buttons[0].label, "IRButton");
        assert_eq!(app.buttons[0].signal, "ir:20df10ef:32");
    }

    #[test]
    fn test_capture_without_remote_is_kept_but_not_saved() {
        let dir = TempDir::new().unwrap();
        let signal = Signal::SubGhz(0x5D1C34);
        let (mut app, _sent) = test_app(&dir, vec![(Transport::SubGhz, vec![signal])]);

        app.scan_once(Transport::SubGhz);

        assert!(app.last_error.is_some());
        assert!(app.buttons.is_empty());
        assert!(app.session.last_capture().is_some());

        // Naming a remote afterwards lets the capture be saved.
        app.set_remote("gate");
        app.label_input = "Open".to_string();
        app.commit_save();
        assert_eq!(app.buttons.len(), 1);
        assert_eq!(app.buttons[0].label, "Open");
    }

    #[test]
    fn test_scan_miss_reports_status() {
        let dir = TempDir::new().unwrap();
        let (mut app, _sent) = test_app(&dir, vec![]);

        app.set_remote("tv");
        app.scan_once(Transport::Infrared);

        assert_eq!(
            app.status_message.as_deref(),
            Some("No IR signal detected.")
        );
    }

    #[test]
    fn test_playback_typed_signal_uses_owning_transport() {
        let dir = TempDir::new().unwrap();
        let signal = Signal::SubGhz(0x5D1C34);
        let (mut app, sent) = test_app(&dir, vec![(Transport::SubGhz, vec![signal.clone()])]);

        app.set_remote("gate");
        app.scan_once(Transport::SubGhz);
        app.play_label("RF433Button");

        let sent = sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], (Transport::SubGhz, signal));
    }

    #[test]
    fn test_playback_legacy_broadcasts_on_all_radios() {
        let dir = TempDir::new().unwrap();
        let (mut app, sent) = test_app(&dir, vec![]);

        app.set_remote("old tv");
        // A record written by the handheld firmware: bare hex, no tag.
        app.append_for_session("Power", "a1b2c3").unwrap();
        app.refresh_buttons();
        app.play_label("Power");

        let sent = sent.borrow();
        assert_eq!(sent.len(), 3);
        assert_eq!(
            sent[0],
            (
                Transport::Infrared,
                Signal::Infrared { code: 0xA1B2C3, bits: 32 }
            )
        );
        assert_eq!(
            sent[1],
            (
                Transport::ShortRange,
                Signal::ShortRange(b"a1b2c3".to_vec())
            )
        );
        assert_eq!(sent[2], (Transport::SubGhz, Signal::SubGhz(0xA1B2C3)));
    }

    #[test]
    fn test_playback_unknown_label_is_reported_not_fatal() {
        let dir = TempDir::new().unwrap();
        let (mut app, sent) = test_app(&dir, vec![]);

        app.set_remote("Bedroom AC");
        app.play_label("Power");

        assert!(app
            .last_error
            .as_deref()
            .unwrap()
            .contains("not found"));
        assert!(sent.borrow().is_empty());
    }

    #[test]
    fn test_continuous_scan_saves_on_a_later_tick() {
        let dir = TempDir::new().unwrap();
        let signal = Signal::Infrared { code: 0x1, bits: 32 };
        // One scripted signal: the first tick captures it, later ticks
        // miss silently and keep the loop going.
        let (mut app, _sent) = test_app(&dir, vec![(Transport::Infrared, vec![signal])]);

        app.set_remote("tv");
        app.toggle_scan(Transport::Infrared);
        app.tick();
        app.tick();
        app.tick();

        assert_eq!(app.buttons.len(), 1);
        app.toggle_scan(Transport::Infrared);
        assert_eq!(app.scanning, None);
    }

    #[test]
    fn test_unsafe_remote_name_rejected() {
        let dir = TempDir::new().unwrap();
        let (mut app, _sent) = test_app(&dir, vec![]);

        app.set_remote("../evil");
        assert!(app.last_error.is_some());
        assert!(app.session.remote_name().is_none());
    }

    #[test]
    fn test_commands() {
        let dir = TempDir::new().unwrap();
        let (mut app, _sent) = test_app(&dir, vec![]);

        app.execute_command("remote Living Room TV").unwrap();
        assert_eq!(app.session.remote_name(), Some("Living Room TV"));

        app.execute_command("bogus").unwrap();
        assert!(app.last_error.as_deref().unwrap().contains("Unknown command"));

        app.execute_command("q").unwrap();
        assert!(app.quit_requested);
    }
}
