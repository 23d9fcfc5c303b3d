// Keyscan Scanner
// Keystroke barcode decoding

pub mod config;
pub mod decoder;
pub mod feedback;
pub mod history;

pub use config::{ConfigError, ScannerConfig};
pub use decoder::{BarcodeDecoder, FlushOutcome, KeyAction, KeyOutcome};
pub use feedback::{Feedback, FeedbackError, SilentFeedback};
pub use history::{ScanHistory, ScanRecord};

#[cfg(feature = "audio")]
pub use feedback::{ToneFeedback, ToneSettings};
