// Keyscan Key Type
// Key identifiers as reported by a host input surface

use std::fmt;
use std::str::FromStr;

use strum_macros::{AsRefStr, Display, EnumString};

/// Non-printing keys a host can report.
///
/// Names follow the W3C `KeyboardEvent.key` values, which is what most
/// hosts (browsers, toolkits) already hand out. Parsing is case-insensitive
/// and accepts a few common aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum NamedKey {
    #[strum(to_string = "Enter", serialize = "Return")]
    Enter,
    Tab,
    #[strum(to_string = "Escape", serialize = "Esc")]
    Escape,
    Backspace,
    #[strum(to_string = "Delete", serialize = "Del")]
    Delete,
    Insert,
    Shift,
    #[strum(to_string = "Control", serialize = "Ctrl")]
    Control,
    Alt,
    #[strum(to_string = "Meta", serialize = "Super")]
    Meta,
    CapsLock,
    NumLock,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Unidentified,
}

impl NamedKey {
    /// Returns true for Shift/Control/Alt/Meta
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            NamedKey::Shift | NamedKey::Control | NamedKey::Alt | NamedKey::Meta
        )
    }
}

/// A single key identifier.
///
/// Either the character the key produced or a named, non-printing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Named(NamedKey),
}

/// Error returned when a key identifier cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("Empty key identifier")]
    Empty,

    #[error("Unknown key: {0}")]
    Unknown(String),
}

impl Key {
    pub const ENTER: Key = Key::Named(NamedKey::Enter);
    pub const TAB: Key = Key::Named(NamedKey::Tab);

    /// The single printable character this key produces, if any
    pub fn printable(self) -> Option<char> {
        match self {
            Key::Char(c) if !c.is_control() => Some(c),
            _ => None,
        }
    }

    /// Get the named key, if this is one
    pub fn named(self) -> Option<NamedKey> {
        match self {
            Key::Named(named) => Some(named),
            Key::Char(_) => None,
        }
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Char(c)
    }
}

impl From<NamedKey> for Key {
    fn from(named: NamedKey) -> Self {
        Key::Named(named)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Named(named) => write!(f, "{}", named),
        }
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(KeyParseError::Empty),
            (Some(c), None) => Ok(Key::Char(c)),
            _ => NamedKey::from_str(s.trim())
                .map(Key::Named)
                .map_err(|_| KeyParseError::Unknown(s.to_string())),
        }
    }
}
