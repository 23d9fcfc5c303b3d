// Keyscan Input Layer - Key Events
// Key-down events as delivered by the host input surface

use crate::Key;

/// Represents the action state of a raw device key event.
///
/// From `evtest` output:
///   0 == 'released'
///   1 == 'pressed'
///   2 == 'repeated'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl Action {
    /// Create Action from i32 value (from evdev)
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Action::Release),
            1 => Some(Action::Press),
            2 => Some(Action::Repeat),
            _ => None,
        }
    }

    /// Returns true only if this is a PRESS event (not REPEAT)
    pub fn just_pressed(self) -> bool {
        matches!(self, Action::Press)
    }
}

/// Modifier keys held while a key was pressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    /// True when ctrl, alt or meta is held.
    ///
    /// Shift alone does not count: scanners hold it for upper-case output.
    pub fn is_shortcut(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// Where a key event originated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputTarget {
    /// Nothing focused (document body, raw device, terminal)
    #[default]
    Document,
    /// Host has already classified the target as a free-typing surface
    TextEntry,
    /// Host-specific element name, e.g. "INPUT" or "button"
    Element(String),
}

impl InputTarget {
    pub fn element(name: impl Into<String>) -> Self {
        InputTarget::Element(name.into())
    }
}

/// A single key-down event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    pub target: InputTarget,
}

impl KeyEvent {
    /// Key-down with no modifiers and no focused element
    pub fn new(key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::none(),
            target: InputTarget::Document,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_target(mut self, target: InputTarget) -> Self {
        self.target = target;
        self
    }

    /// The character this event appends to a scan buffer, if any
    pub fn printable(&self) -> Option<char> {
        if self.modifiers.is_shortcut() {
            return None;
        }
        self.key.printable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::NamedKey;

    #[test]
    fn test_action_from_i32() {
        assert_eq!(Action::from_i32(0), Some(Action::Release));
        assert_eq!(Action::from_i32(1), Some(Action::Press));
        assert_eq!(Action::from_i32(2), Some(Action::Repeat));
        assert_eq!(Action::from_i32(3), None);
        assert!(Action::Press.just_pressed());
        assert!(!Action::Repeat.just_pressed());
    }

    #[test]
    fn test_shift_is_not_a_shortcut() {
        assert!(!Modifiers::shift().is_shortcut());
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::none()
        };
        assert!(ctrl.is_shortcut());
    }

    #[test]
    fn test_printable_respects_shortcuts() {
        assert_eq!(KeyEvent::new('A').with_modifiers(Modifiers::shift()).printable(), Some('A'));

        let ctrl_c = KeyEvent::new('c').with_modifiers(Modifiers {
            ctrl: true,
            ..Modifiers::none()
        });
        assert_eq!(ctrl_c.printable(), None);

        assert_eq!(KeyEvent::new(NamedKey::Enter).printable(), None);
    }

    #[test]
    fn test_default_target_is_document() {
        let event = KeyEvent::new('1');
        assert_eq!(event.target, InputTarget::Document);
    }
}
