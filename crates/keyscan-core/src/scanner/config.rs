// Keyscan Scanner Configuration
// Caller-supplied decoder settings with defaults and range checks

use std::time::Duration;

use crate::Key;

/// Default maximum gap between two characters of the same scan
pub const DEFAULT_MAX_KEYSTROKE_DELAY_MS: u64 = 50;
/// Default minimum accumulated length for a valid scan
pub const DEFAULT_MIN_BARCODE_LENGTH: usize = 4;
/// Default flush timer length, as a multiple of the keystroke delay
pub const DEFAULT_FLUSH_TIMEOUT_FACTOR: u32 = 2;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Timeout value out of range: {0}")]
    TimeoutOutOfRange(String),

    #[error("Invalid minimum barcode length: {0}")]
    InvalidMinLength(usize),

    #[error("Invalid terminator key: {0}")]
    InvalidTerminator(String),
}

/// Configuration for [`BarcodeDecoder`](super::BarcodeDecoder)
#[derive(Debug, Clone, PartialEq)]
pub struct ScannerConfig {
    /// When false the decoder captures nothing and emits nothing
    pub enabled: bool,
    /// Maximum gap between consecutive characters of one scan
    pub max_keystroke_delay: Duration,
    /// Minimum accumulated length to treat the buffer as a scan
    pub min_barcode_length: usize,
    /// Key that ends and flushes the buffer immediately
    pub terminator_key: Key,
    /// Play a confirmation tone on each decoded scan
    pub audio_feedback: bool,
    /// Flush timer length as a multiple of `max_keystroke_delay`
    pub flush_timeout_factor: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_keystroke_delay: Duration::from_millis(DEFAULT_MAX_KEYSTROKE_DELAY_MS),
            min_barcode_length: DEFAULT_MIN_BARCODE_LENGTH,
            terminator_key: Key::ENTER,
            audio_feedback: true,
            flush_timeout_factor: DEFAULT_FLUSH_TIMEOUT_FACTOR,
        }
    }
}

impl ScannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_max_keystroke_delay(mut self, delay: Duration) -> Self {
        self.max_keystroke_delay = delay;
        self
    }

    pub fn with_min_barcode_length(mut self, length: usize) -> Self {
        self.min_barcode_length = length;
        self
    }

    pub fn with_terminator_key(mut self, key: Key) -> Self {
        self.terminator_key = key;
        self
    }

    pub fn with_audio_feedback(mut self, audio_feedback: bool) -> Self {
        self.audio_feedback = audio_feedback;
        self
    }

    pub fn with_flush_timeout_factor(mut self, factor: u32) -> Self {
        self.flush_timeout_factor = factor;
        self
    }

    /// How long a buffer may sit without a new character before it is flushed
    pub fn flush_timeout(&self) -> Duration {
        self.max_keystroke_delay * self.flush_timeout_factor
    }

    /// Check ranges; decoders accept any config, hosts should call this on user input
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delay_ms = self.max_keystroke_delay.as_millis();
        if !(1..=1000).contains(&delay_ms) {
            return Err(ConfigError::TimeoutOutOfRange(format!(
                "max_keystroke_delay must be 1-1000ms, got {}",
                delay_ms
            )));
        }
        if !(1..=20).contains(&self.flush_timeout_factor) {
            return Err(ConfigError::TimeoutOutOfRange(format!(
                "flush_timeout_factor must be 1-20, got {}",
                self.flush_timeout_factor
            )));
        }
        if self.min_barcode_length == 0 {
            return Err(ConfigError::InvalidMinLength(self.min_barcode_length));
        }
        Ok(())
    }
}
