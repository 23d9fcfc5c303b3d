// Keyscan Input Layer
// Key events, focus filtering, key code translation, event timing and
// device detection

mod clock;
mod device;
mod event;
mod filter;
pub mod keycode;
mod target;

pub use clock::EventClock;
pub use device::{is_scanner_capable, is_virtual_device, looks_like_scanner, DeviceCapabilities};
pub use event::{Action, InputTarget, KeyEvent, Modifiers};
pub use filter::{DeviceCandidate, DeviceSelection};
pub use keycode::KeyTranslator;
pub use target::{NoTextEntry, TargetFilter, TextEntryFilter};
