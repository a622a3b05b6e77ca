//! Storage management for configuration and the remote-name data directory.
//!
//! All application data lives under `~/.config/rpos/`:
//!
//! ```text
//! ~/.config/rpos/
//!   config.ini          — User configuration
//!   rpos.log            — Log output (stdout would corrupt the TUI)
//!   remote_names/       — One <RemoteName>.txt button file per remote
//! ```
//!
//! Button files are the durable store; they are only ever appended to and
//! are never compacted or migrated by this program.

use anyhow::{Context, Result};
use configparser::ini::Ini;
use std::fs;
use std::path::PathBuf;

// ─── Config ──────────────────────────────────────────────────────────────────

/// Application configuration loaded from `~/.config/rpos/config.ini`
#[derive(Debug, Clone)]
pub struct Config {
    // [general]
    /// Directory holding the per-remote button files
    pub data_directory: PathBuf,
    /// Append a capture under the transport's default label as soon as it
    /// arrives (requires an active remote)
    pub auto_save_captures: bool,
    /// Retransmit a capture immediately after receiving it
    pub echo_transmit: bool,

    // [capture]
    /// Polling-loop interval in milliseconds
    pub poll_interval_ms: u64,
    /// Bit width used when replaying legacy IR values that carry none
    pub ir_default_bits: u16,
}

impl Config {
    /// Build the default config, using the given config_dir as the base.
    /// This keeps everything under `~/.config/rpos/` by default.
    fn default_for(config_dir: &PathBuf) -> Self {
        Self {
            data_directory: config_dir.join("remote_names"),
            auto_save_captures: true,
            echo_transmit: true,
            poll_interval_ms: 100,
            ir_default_bits: 32,
        }
    }

    /// Load config from an INI file, falling back to defaults for missing keys.
    fn load_from_ini(path: &std::path::Path, config_dir: &PathBuf) -> Result<Self> {
        let mut ini = Ini::new();
        ini.load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        let defaults = Config::default_for(config_dir);

        let data_directory = ini
            .get("general", "data_directory")
            .map(|s| expand_tilde(&s))
            .unwrap_or(defaults.data_directory);

        let auto_save_captures = ini
            .getbool("general", "auto_save_captures")
            .ok()
            .flatten()
            .unwrap_or(defaults.auto_save_captures);

        let echo_transmit = ini
            .getbool("general", "echo_transmit")
            .ok()
            .flatten()
            .unwrap_or(defaults.echo_transmit);

        let poll_interval_ms = ini
            .getuint("capture", "poll_interval_ms")
            .ok()
            .flatten()
            .unwrap_or(defaults.poll_interval_ms);

        let ir_default_bits = ini
            .getuint("capture", "ir_default_bits")
            .ok()
            .flatten()
            .map(|v| v as u16)
            .unwrap_or(defaults.ir_default_bits);

        Ok(Self {
            data_directory,
            auto_save_captures,
            echo_transmit,
            poll_interval_ms,
            ir_default_bits,
        })
    }

    /// Save config to an INI-style file with comments explaining each field.
    fn save_to_ini(&self, path: &std::path::Path) -> Result<()> {
        let data_str = self.data_directory.to_string_lossy();

        let content = format!(
            r#"; rpos — Remote Possibility configuration
; Location: {path}
;
; Edit this file to change default settings.
; Lines starting with ; or # are comments.

[general]
; Directory where remote button files (<RemoteName>.txt) are kept.
; One line per saved button: <label>,<signal>
; Supports ~ for home directory.
data_directory = {data_dir}

; When on, a captured signal is appended immediately under the
; transport's default label (IRButton / RF24Button / RF433Button),
; provided a remote name is active.
auto_save_captures = {auto_save}

; When on, a captured signal is retransmitted right after capture,
; the way the handheld firmware echoed everything it heard.
echo_transmit = {echo}

[capture]
; Polling-loop interval in milliseconds. Each tick polls the keypad and,
; while a scan is active, the scanning radio exactly once.
poll_interval_ms = {poll_ms}

; Bit width used when replaying legacy IR values saved without one.
ir_default_bits = {ir_bits}
"#,
            path = path.display(),
            data_dir = data_str,
            auto_save = self.auto_save_captures,
            echo = self.echo_transmit,
            poll_ms = self.poll_interval_ms,
            ir_bits = self.ir_default_bits,
        );

        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }
}

/// Fallback Default (without knowing config_dir). Only used if something goes
/// very wrong and we need a Config without a Storage instance.
impl Default for Config {
    fn default() -> Self {
        let fallback = resolve_config_dir()
            .unwrap_or_else(|| PathBuf::from(".").join("rpos"));
        Config::default_for(&fallback)
    }
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_tilde(s: &str) -> PathBuf {
    if s.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(&s[2..]);
        }
    }
    PathBuf::from(s)
}

/// Resolve the rpos config directory to `~/.config/rpos/` regardless of OS.
pub fn resolve_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("rpos"))
}

// ─── Storage ─────────────────────────────────────────────────────────────────

/// Storage manager for configuration and the button-file directory.
///
/// On construction it ensures the directory tree exists:
///
/// ```text
/// ~/.config/rpos/
///   config.ini
///   remote_names/
/// ```
///
/// A failure here is fatal at startup: without its store the device is
/// unusable, so initialization halts instead of limping on.
pub struct Storage {
    /// Base config directory (~/.config/rpos)
    config_dir: PathBuf,
    /// Configuration
    pub config: Config,
}

impl Storage {
    /// Create a new storage manager.
    ///
    /// 1. Resolves the config directory (`~/.config/rpos`).
    /// 2. Creates it if missing.
    /// 3. Loads `config.ini` if it exists, otherwise writes a default one.
    /// 4. Creates the remote-name data directory if missing.
    pub fn new() -> Result<Self> {
        let config_dir = resolve_config_dir()
            .context("Could not determine home directory (is $HOME set?)")?;

        let config_path = config_dir.join("config.ini");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config dir: {:?}", config_dir))?;
            tracing::info!("Created config directory: {:?}", config_dir);
        }

        let config = if config_path.exists() {
            tracing::info!("Loading config from {:?}", config_path);
            match Config::load_from_ini(&config_path, &config_dir) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse config.ini, using defaults: {}", e);
                    Config::default_for(&config_dir)
                }
            }
        } else {
            tracing::info!("No config.ini found — creating default at {:?}", config_path);
            let config = Config::default_for(&config_dir);
            if let Err(e) = config.save_to_ini(&config_path) {
                tracing::warn!("Could not write default config.ini: {}", e);
            }
            config
        };

        if !config.data_directory.exists() {
            fs::create_dir_all(&config.data_directory).with_context(|| {
                format!("Failed to create data dir: {:?}", config.data_directory)
            })?;
            tracing::info!("Created data directory: {:?}", config.data_directory);
        }

        tracing::info!("Config dir: {:?}", config_dir);
        tracing::info!("Data dir: {:?}", config.data_directory);

        Ok(Self { config_dir, config })
    }

    /// Save the current configuration back to `config.ini`.
    #[allow(dead_code)]
    pub fn save_config(&self) -> Result<()> {
        let config_path = self.config_dir.join("config.ini");
        self.config.save_to_ini(&config_path)?;
        tracing::info!("Saved config to {:?}", config_path);
        Ok(())
    }

    /// Get the config directory path (`~/.config/rpos`)
    #[allow(dead_code)]
    pub fn config_dir(&self) -> &PathBuf {
        &self.config_dir
    }
}
