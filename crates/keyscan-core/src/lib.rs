// Keyscan Core Library
// Keystroke barcode decoding for keyboard-wedge scanners

pub mod input;
pub mod key;
pub mod scanner;
pub mod settings;

#[cfg(feature = "hid")]
pub mod event;

pub use input::{
    is_scanner_capable, is_virtual_device, looks_like_scanner, Action, DeviceCandidate,
    DeviceCapabilities, DeviceSelection, EventClock, InputTarget, KeyEvent, KeyTranslator,
    Modifiers, NoTextEntry, TargetFilter, TextEntryFilter,
};
pub use key::{Key, KeyParseError, NamedKey};
pub use scanner::{
    BarcodeDecoder, ConfigError, Feedback, FeedbackError, FlushOutcome, KeyAction, KeyOutcome,
    ScanHistory, ScanRecord, ScannerConfig, SilentFeedback,
};
pub use settings::{FileSettingsStore, MemorySettingsStore, Settings, SettingsError, SettingsStore};

#[cfg(feature = "audio")]
pub use scanner::{ToneFeedback, ToneSettings};

#[cfg(feature = "hid")]
pub use event::{EventLoop, EventLoopError, EventLoopResult, PolledEvent};
