// Keyscan Barcode Decoder
// Separates scanner keystroke bursts from human typing
//
// States:
//   Idle      - empty buffer, no flush pending
//   Buffering - characters collected, flush deadline armed
//
// Transitions are driven by qualifying key events, flush deadline expiry,
// the terminator key, and enable/disable toggles. Time is always supplied
// by the caller, so the host event loop owns the clock.

use std::fmt;
use std::time::{Instant, SystemTime};

use super::config::ScannerConfig;
use super::feedback::{Feedback, SilentFeedback};
use super::history::{ScanHistory, ScanRecord};
use crate::input::{KeyEvent, TargetFilter, TextEntryFilter};

/// Result of flushing the scan buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Buffer was long enough; carries the trimmed barcode
    Emitted(String),
    /// Buffer was too short and was dropped as noise
    Discarded(String),
    /// Nothing was buffered
    Empty,
}

impl FlushOutcome {
    pub fn barcode(&self) -> Option<&str> {
        match self {
            FlushOutcome::Emitted(code) => Some(code.as_str()),
            _ => None,
        }
    }
}

/// What a single key did to the scan buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Decoder disabled, text-entry target, or a key that adds nothing
    Ignored,
    /// Character appended, flush deadline re-armed
    Buffered,
    /// Terminator key; the host must suppress the key's default action
    Terminated(FlushOutcome),
}

/// Result of handling a single key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Flush of a deadline that lapsed unpolled before this key arrived
    pub expired: Option<FlushOutcome>,
    pub action: KeyAction,
}

impl KeyOutcome {
    fn ignored() -> Self {
        Self {
            expired: None,
            action: KeyAction::Ignored,
        }
    }

    /// Whether the host should prevent the key's default action
    pub fn prevents_default(&self) -> bool {
        matches!(self.action, KeyAction::Terminated(_))
    }

    /// Barcodes emitted while handling this key, oldest first
    pub fn barcodes(&self) -> impl Iterator<Item = &str> {
        let terminated = match &self.action {
            KeyAction::Terminated(flush) => Some(flush),
            _ => None,
        };
        self.expired
            .iter()
            .chain(terminated)
            .filter_map(|flush| flush.barcode())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DecoderState {
    Idle,
    Buffering { buffer: String, deadline: Instant },
}

type ScanCallback = Box<dyn FnMut(&str)>;

/// Keystroke barcode decoder.
///
/// Single-owner, single-threaded. Feed it key-down events in arrival order
/// with [`handle_key`](Self::handle_key) and call
/// [`poll_timeout`](Self::poll_timeout) whenever
/// [`next_deadline`](Self::next_deadline) has passed.
pub struct BarcodeDecoder {
    config: ScannerConfig,
    state: DecoderState,
    last_key_at: Option<Instant>,
    target_filter: Box<dyn TargetFilter>,
    feedback: Box<dyn Feedback>,
    on_scan: Option<ScanCallback>,
    history: ScanHistory,
    scans_emitted: u64,
}

impl BarcodeDecoder {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            state: DecoderState::Idle,
            last_key_at: None,
            target_filter: Box::new(TextEntryFilter),
            feedback: Box::new(SilentFeedback),
            on_scan: None,
            history: ScanHistory::new(),
            scans_emitted: 0,
        }
    }

    /// Replace the text-entry predicate
    pub fn with_target_filter(mut self, filter: impl TargetFilter + 'static) -> Self {
        self.target_filter = Box::new(filter);
        self
    }

    /// Replace the confirmation feedback backend
    pub fn with_feedback(mut self, feedback: impl Feedback + 'static) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history = ScanHistory::with_capacity(capacity);
        self
    }

    /// Register the scan callback, replacing any previous one
    pub fn on_scan(&mut self, callback: impl FnMut(&str) + 'static) {
        self.on_scan = Some(Box::new(callback));
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Replace the configuration. Always resets buffered state.
    pub fn set_config(&mut self, config: ScannerConfig) {
        self.config = config;
        self.reset();
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enable or disable capture. Pending input and the flush deadline are dropped.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.config.enabled != enabled {
            log::debug!("Scanner {}", if enabled { "enabled" } else { "disabled" });
        }
        self.config.enabled = enabled;
        self.reset();
    }

    /// Drop buffered characters, the flush deadline and the keystroke clock
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
        self.last_key_at = None;
    }

    /// True while characters are being buffered
    pub fn is_listening(&self) -> bool {
        matches!(self.state, DecoderState::Buffering { .. })
    }

    /// Characters collected so far
    pub fn buffer(&self) -> &str {
        match &self.state {
            DecoderState::Idle => "",
            DecoderState::Buffering { buffer, .. } => buffer,
        }
    }

    /// When the pending flush fires, if one is armed
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            DecoderState::Idle => None,
            DecoderState::Buffering { deadline, .. } => Some(*deadline),
        }
    }

    pub fn last_scan(&self) -> Option<&ScanRecord> {
        self.history.latest()
    }

    pub fn history(&self) -> &ScanHistory {
        &self.history
    }

    /// Process one key-down event received at `now`
    pub fn handle_key(&mut self, event: &KeyEvent, now: Instant) -> KeyOutcome {
        if !self.config.enabled {
            return KeyOutcome::ignored();
        }

        if self.target_filter.is_text_entry(&event.target) {
            log::trace!("Ignoring {} from text entry {:?}", event.key, event.target);
            return KeyOutcome::ignored();
        }

        // A deadline that passed without being polled still fires first.
        let expired = self.poll_timeout(now);
        let action = self.apply_key(event, now);
        KeyOutcome { expired, action }
    }

    fn apply_key(&mut self, event: &KeyEvent, now: Instant) -> KeyAction {
        if let Some(last) = self.last_key_at {
            let gap = now.saturating_duration_since(last);
            if gap > self.config.max_keystroke_delay && self.is_listening() {
                log::debug!(
                    "Keystroke gap of {:?} exceeds {:?}, dropping '{}'",
                    gap,
                    self.config.max_keystroke_delay,
                    self.buffer()
                );
                self.state = DecoderState::Idle;
            }
        }
        self.last_key_at = Some(now);

        if event.key == self.config.terminator_key {
            return KeyAction::Terminated(self.flush());
        }

        let Some(c) = event.printable() else {
            log::trace!("Ignoring non-printable {}", event.key);
            return KeyAction::Ignored;
        };

        let deadline = now + self.config.flush_timeout();
        match &mut self.state {
            DecoderState::Idle => {
                self.state = DecoderState::Buffering {
                    buffer: c.to_string(),
                    deadline,
                };
            }
            DecoderState::Buffering {
                buffer,
                deadline: pending,
            } => {
                buffer.push(c);
                *pending = deadline;
            }
        }
        log::trace!("Buffered '{}' -> '{}'", c, self.buffer());
        KeyAction::Buffered
    }

    /// Fire the flush deadline if it has passed at `now`
    pub fn poll_timeout(&mut self, now: Instant) -> Option<FlushOutcome> {
        match self.next_deadline() {
            Some(deadline) if now >= deadline => Some(self.flush()),
            _ => None,
        }
    }

    fn flush(&mut self) -> FlushOutcome {
        let buffer = match std::mem::replace(&mut self.state, DecoderState::Idle) {
            DecoderState::Idle => return FlushOutcome::Empty,
            DecoderState::Buffering { buffer, .. } => buffer,
        };

        if buffer.chars().count() < self.config.min_barcode_length {
            log::debug!("Discarding short input '{}'", buffer);
            return FlushOutcome::Discarded(buffer);
        }

        let barcode = buffer.trim();
        if barcode.is_empty() {
            log::debug!("Discarding whitespace-only input");
            return FlushOutcome::Discarded(buffer);
        }
        let barcode = barcode.to_string();

        self.scans_emitted += 1;
        self.history.push(ScanRecord {
            barcode: barcode.clone(),
            sequence: self.scans_emitted,
            scanned_at: SystemTime::now(),
        });
        log::info!("Scanned barcode #{}: {}", self.scans_emitted, barcode);

        if self.config.audio_feedback {
            if let Err(e) = self.feedback.confirm() {
                log::debug!("Scan feedback failed: {}", e);
            }
        }

        if let Some(callback) = self.on_scan.as_mut() {
            callback(&barcode);
        }

        FlushOutcome::Emitted(barcode)
    }
}

impl Default for BarcodeDecoder {
    fn default() -> Self {
        Self::new(ScannerConfig::default())
    }
}

impl fmt::Debug for BarcodeDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarcodeDecoder")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("last_key_at", &self.last_key_at)
            .field("scans_emitted", &self.scans_emitted)
            .finish_non_exhaustive()
    }
}
