// Keyscan Scan Feedback
// Optional confirmation tone played after a successful decode

/// Errors from a feedback backend. The decoder logs and drops these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackError {
    #[error("Audio output unavailable: {0}")]
    Unavailable(String),

    #[error("Feedback thread stopped")]
    Disconnected,
}

/// Something that confirms a scan to the operator
pub trait Feedback {
    fn confirm(&self) -> Result<(), FeedbackError>;
}

/// No-op feedback
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn confirm(&self) -> Result<(), FeedbackError> {
        Ok(())
    }
}

#[cfg(feature = "audio")]
pub use tone::{ToneFeedback, ToneSettings};

#[cfg(feature = "audio")]
mod tone {
    use std::sync::mpsc::{self, Sender};
    use std::thread;
    use std::time::Duration;

    use parking_lot::Mutex;
    use rodio::source::{SineWave, Source};
    use rodio::{OutputStream, Sink};

    use super::{Feedback, FeedbackError};

    /// Tone parameters
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ToneSettings {
        pub frequency_hz: f32,
        pub duration: Duration,
        pub volume: f32,
    }

    impl Default for ToneSettings {
        fn default() -> Self {
            Self {
                frequency_hz: 1000.0,
                duration: Duration::from_millis(120),
                volume: 0.2,
            }
        }
    }

    /// Short sine beep on a dedicated audio thread.
    ///
    /// rodio output streams are not `Send`, so the stream lives on its own
    /// thread, which is started on the first `confirm` call.
    pub struct ToneFeedback {
        settings: ToneSettings,
        tx: Mutex<Option<Sender<()>>>,
    }

    impl ToneFeedback {
        pub fn new(settings: ToneSettings) -> Self {
            Self {
                settings,
                tx: Mutex::new(None),
            }
        }

        fn ensure_thread(&self) -> Result<Sender<()>, FeedbackError> {
            let mut guard = self.tx.lock();
            if let Some(tx) = guard.as_ref() {
                return Ok(tx.clone());
            }

            let (tx, rx) = mpsc::channel::<()>();
            let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();
            let settings = self.settings;

            thread::Builder::new()
                .name("scan-feedback".to_string())
                .spawn(move || {
                    let (_stream, handle) = match OutputStream::try_default() {
                        Ok(pair) => pair,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e.to_string()));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(()));

                    while rx.recv().is_ok() {
                        match Sink::try_new(&handle) {
                            Ok(sink) => {
                                sink.set_volume(settings.volume.clamp(0.0, 1.0));
                                sink.append(
                                    SineWave::new(settings.frequency_hz)
                                        .take_duration(settings.duration),
                                );
                                sink.detach();
                            }
                            Err(e) => log::debug!("Could not create audio sink: {}", e),
                        }
                    }
                })
                .map_err(|e| FeedbackError::Unavailable(e.to_string()))?;

            match ready_rx.recv() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(FeedbackError::Unavailable(e)),
                Err(_) => return Err(FeedbackError::Disconnected),
            }

            *guard = Some(tx.clone());
            Ok(tx)
        }
    }

    impl Default for ToneFeedback {
        fn default() -> Self {
            Self::new(ToneSettings::default())
        }
    }

    impl Feedback for ToneFeedback {
        fn confirm(&self) -> Result<(), FeedbackError> {
            let tx = self.ensure_thread()?;
            if tx.send(()).is_err() {
                self.tx.lock().take();
                return Err(FeedbackError::Disconnected);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_feedback_never_fails() {
        assert!(SilentFeedback.confirm().is_ok());
    }

    #[test]
    fn test_feedback_error_messages() {
        assert_eq!(
            FeedbackError::Unavailable("no device".to_string()).to_string(),
            "Audio output unavailable: no device"
        );
        assert_eq!(FeedbackError::Disconnected.to_string(), "Feedback thread stopped");
    }
}
