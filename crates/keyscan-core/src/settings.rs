// Keyscan Settings Module
// Persisted scanner settings, kept outside the decoder

use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::scanner::config::{
    ConfigError, ScannerConfig, DEFAULT_FLUSH_TIMEOUT_FACTOR, DEFAULT_MAX_KEYSTROKE_DELAY_MS,
    DEFAULT_MIN_BARCODE_LENGTH,
};
use crate::Key;

/// Settings for keyscan
///
/// Loaded from a TOML file (default: ~/.config/keyscan/settings.toml).
/// The decoder never reads this directly; hosts convert it with
/// [`Settings::to_scanner_config`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub devices: DeviceSettings,

    /// Path to the settings file (for reload)
    #[serde(skip)]
    source_path: Option<PathBuf>,
}

/// `[scanner]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerSettings {
    pub enabled: bool,
    pub max_keystroke_delay_ms: u64,
    pub min_barcode_length: usize,
    pub terminator_key: String,
    pub audio_feedback: bool,
    pub flush_timeout_factor: u32,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_keystroke_delay_ms: DEFAULT_MAX_KEYSTROKE_DELAY_MS,
            min_barcode_length: DEFAULT_MIN_BARCODE_LENGTH,
            terminator_key: Key::ENTER.to_string(),
            audio_feedback: true,
            flush_timeout_factor: DEFAULT_FLUSH_TIMEOUT_FACTOR,
        }
    }
}

/// `[devices]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceSettings {
    /// Explicit device names/paths to use
    pub only: Vec<String>,
    /// Autodetect only devices whose name looks like a scanner
    pub scanners_only: bool,
    /// Grab devices so their keystrokes reach no other application
    pub grab: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            only: Vec::new(),
            scanners_only: true,
            grab: false,
        }
    }
}

/// Errors that can occur when loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),

    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::TomlSerialize(e.to_string()))
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keyscan").join("settings.toml"))
    }

    /// Load from default location (~/.config/keyscan/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Self::new())
    }

    /// File these settings were loaded from, if any
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Reload settings from the original file
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(ref path) = self.source_path {
            let new_settings = Self::from_file(path)?;
            *self = new_settings;
            Ok(())
        } else {
            Err(SettingsError::InvalidValue("No source path set".to_string()))
        }
    }

    /// Build a validated decoder configuration
    pub fn to_scanner_config(&self) -> Result<ScannerConfig, SettingsError> {
        let s = &self.scanner;
        let terminator: Key = s
            .terminator_key
            .parse()
            .map_err(|e: crate::key::KeyParseError| ConfigError::InvalidTerminator(e.to_string()))?;

        let config = ScannerConfig::new()
            .with_enabled(s.enabled)
            .with_max_keystroke_delay(Duration::from_millis(s.max_keystroke_delay_ms))
            .with_min_barcode_length(s.min_barcode_length)
            .with_terminator_key(terminator)
            .with_audio_feedback(s.audio_feedback)
            .with_flush_timeout_factor(s.flush_timeout_factor);
        config.validate()?;
        Ok(config)
    }

    /// Copy a decoder configuration into the `[scanner]` table
    pub fn set_scanner_config(&mut self, config: &ScannerConfig) {
        self.scanner = ScannerSettings {
            enabled: config.enabled,
            max_keystroke_delay_ms: config.max_keystroke_delay.as_millis() as u64,
            min_barcode_length: config.min_barcode_length,
            terminator_key: config.terminator_key.to_string(),
            audio_feedback: config.audio_feedback,
            flush_timeout_factor: config.flush_timeout_factor,
        };
    }
}

/// Where settings live between runs
pub trait SettingsStore {
    fn load(&self) -> Result<Settings, SettingsError>;
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// TOML file store; a missing file loads as defaults
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`Settings::default_path`]
    pub fn at_default_path() -> Option<Self> {
        Settings::default_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            return Ok(Settings::new());
        }
        Settings::from_file(&self.path)
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, settings.to_toml()?)?;
        Ok(())
    }
}

/// In-memory store for tests and embedding hosts
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self.settings.lock().clone().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        *self.settings.lock() = Some(settings.clone());
        Ok(())
    }
}

/// Create default settings content for a new installation
pub fn default_settings_content() -> &'static str {
    r#"# Keyscan Settings
# Place this file at: ~/.config/keyscan/settings.toml

[scanner]
enabled = true
# Maximum gap between characters of one scan (1-1000 ms)
max_keystroke_delay_ms = 50
# Shorter bursts are treated as noise
min_barcode_length = 4
# Key the scanner sends after each code: "Enter" or "Tab"
terminator_key = "Enter"
audio_feedback = true
# Flush an unterminated burst after factor x max_keystroke_delay
flush_timeout_factor = 2

[devices]
# Explicit device names or /dev/input paths; empty means autodetect
only = []
# Autodetect only devices named like barcode scanners
scanners_only = true
# Keep scanner keystrokes away from other applications
grab = false
"#
}
