// Keyscan Input Layer - Key Code Translation
// Raw Linux input-event-codes.h key codes to key identifiers (US layout)

use smallvec::SmallVec;

use super::event::{Action, KeyEvent, Modifiers};
use crate::key::NamedKey;
use crate::Key;

const KEY_LEFTSHIFT: u16 = 42;
const KEY_RIGHTSHIFT: u16 = 54;
const KEY_LEFTCTRL: u16 = 29;
const KEY_RIGHTCTRL: u16 = 97;
const KEY_LEFTALT: u16 = 56;
const KEY_RIGHTALT: u16 = 100;
const KEY_LEFTMETA: u16 = 125;
const KEY_RIGHTMETA: u16 = 126;
const KEY_CAPSLOCK: u16 = 58;

/// Printable character for a key code as `(plain, shifted)`
fn char_for_code(code: u16) -> Option<(char, char)> {
    let pair = match code {
        2 => ('1', '!'),
        3 => ('2', '@'),
        4 => ('3', '#'),
        5 => ('4', '$'),
        6 => ('5', '%'),
        7 => ('6', '^'),
        8 => ('7', '&'),
        9 => ('8', '*'),
        10 => ('9', '('),
        11 => ('0', ')'),
        12 => ('-', '_'),
        13 => ('=', '+'),
        16 => ('q', 'Q'),
        17 => ('w', 'W'),
        18 => ('e', 'E'),
        19 => ('r', 'R'),
        20 => ('t', 'T'),
        21 => ('y', 'Y'),
        22 => ('u', 'U'),
        23 => ('i', 'I'),
        24 => ('o', 'O'),
        25 => ('p', 'P'),
        26 => ('[', '{'),
        27 => (']', '}'),
        30 => ('a', 'A'),
        31 => ('s', 'S'),
        32 => ('d', 'D'),
        33 => ('f', 'F'),
        34 => ('g', 'G'),
        35 => ('h', 'H'),
        36 => ('j', 'J'),
        37 => ('k', 'K'),
        38 => ('l', 'L'),
        39 => (';', ':'),
        40 => ('\'', '"'),
        41 => ('`', '~'),
        43 => ('\\', '|'),
        44 => ('z', 'Z'),
        45 => ('x', 'X'),
        46 => ('c', 'C'),
        47 => ('v', 'V'),
        48 => ('b', 'B'),
        49 => ('n', 'N'),
        50 => ('m', 'M'),
        51 => (',', '<'),
        52 => ('.', '>'),
        53 => ('/', '?'),
        57 => (' ', ' '),
        // Keypad, read as if Num Lock were on
        55 => ('*', '*'),
        71 => ('7', '7'),
        72 => ('8', '8'),
        73 => ('9', '9'),
        74 => ('-', '-'),
        75 => ('4', '4'),
        76 => ('5', '5'),
        77 => ('6', '6'),
        78 => ('+', '+'),
        79 => ('1', '1'),
        80 => ('2', '2'),
        81 => ('3', '3'),
        82 => ('0', '0'),
        83 => ('.', '.'),
        98 => ('/', '/'),
        _ => return None,
    };
    Some(pair)
}

/// Named key for a non-printing key code
fn named_for_code(code: u16) -> NamedKey {
    match code {
        1 => NamedKey::Escape,
        14 => NamedKey::Backspace,
        15 => NamedKey::Tab,
        28 | 96 => NamedKey::Enter,
        KEY_LEFTCTRL | KEY_RIGHTCTRL => NamedKey::Control,
        KEY_LEFTSHIFT | KEY_RIGHTSHIFT => NamedKey::Shift,
        KEY_LEFTALT | KEY_RIGHTALT => NamedKey::Alt,
        KEY_LEFTMETA | KEY_RIGHTMETA => NamedKey::Meta,
        KEY_CAPSLOCK => NamedKey::CapsLock,
        59 => NamedKey::F1,
        60 => NamedKey::F2,
        61 => NamedKey::F3,
        62 => NamedKey::F4,
        63 => NamedKey::F5,
        64 => NamedKey::F6,
        65 => NamedKey::F7,
        66 => NamedKey::F8,
        67 => NamedKey::F9,
        68 => NamedKey::F10,
        69 => NamedKey::NumLock,
        87 => NamedKey::F11,
        88 => NamedKey::F12,
        102 => NamedKey::Home,
        103 => NamedKey::ArrowUp,
        104 => NamedKey::PageUp,
        105 => NamedKey::ArrowLeft,
        106 => NamedKey::ArrowRight,
        107 => NamedKey::End,
        108 => NamedKey::ArrowDown,
        109 => NamedKey::PageDown,
        110 => NamedKey::Insert,
        111 => NamedKey::Delete,
        _ => NamedKey::Unidentified,
    }
}

fn is_modifier_code(code: u16) -> bool {
    matches!(
        code,
        KEY_LEFTSHIFT
            | KEY_RIGHTSHIFT
            | KEY_LEFTCTRL
            | KEY_RIGHTCTRL
            | KEY_LEFTALT
            | KEY_RIGHTALT
            | KEY_LEFTMETA
            | KEY_RIGHTMETA
    )
}

/// Turns raw press/release/repeat codes from one device into key-down events.
///
/// Tracks held modifiers and the Caps Lock toggle. Keep one translator per
/// device so modifiers held on a keyboard never leak into scanner input.
#[derive(Debug, Clone, Default)]
pub struct KeyTranslator {
    held: SmallVec<[u16; 4]>,
    caps_lock: bool,
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current modifier snapshot
    pub fn modifiers(&self) -> Modifiers {
        let held = |a: u16, b: u16| self.held.iter().any(|&c| c == a || c == b);
        Modifiers {
            shift: held(KEY_LEFTSHIFT, KEY_RIGHTSHIFT),
            ctrl: held(KEY_LEFTCTRL, KEY_RIGHTCTRL),
            alt: held(KEY_LEFTALT, KEY_RIGHTALT),
            meta: held(KEY_LEFTMETA, KEY_RIGHTMETA),
        }
    }

    pub fn caps_lock(&self) -> bool {
        self.caps_lock
    }

    /// Feed one raw key event (`value` is the evdev 0/1/2 action).
    ///
    /// Returns a key-down event for presses only.
    pub fn translate(&mut self, code: u16, value: i32) -> Option<KeyEvent> {
        let action = Action::from_i32(value)?;

        if is_modifier_code(code) {
            match action {
                Action::Press => {
                    if !self.held.contains(&code) {
                        self.held.push(code);
                    }
                }
                Action::Release => self.held.retain(|c| *c != code),
                Action::Repeat => {}
            }
        }

        if !action.just_pressed() {
            return None;
        }

        if code == KEY_CAPSLOCK {
            self.caps_lock = !self.caps_lock;
        }

        let modifiers = self.modifiers();
        let key = match char_for_code(code) {
            Some((plain, shifted)) => {
                let upper = if plain.is_ascii_alphabetic() {
                    modifiers.shift ^ self.caps_lock
                } else {
                    modifiers.shift
                };
                Key::Char(if upper { shifted } else { plain })
            }
            None => Key::Named(named_for_code(code)),
        };

        Some(KeyEvent::new(key).with_modifiers(modifiers))
    }

    /// Forget held modifiers, e.g. after a device is re-opened
    pub fn reset(&mut self) {
        self.held.clear();
        self.caps_lock = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(t: &mut KeyTranslator, code: u16) -> Option<KeyEvent> {
        t.translate(code, 1)
    }

    fn release(t: &mut KeyTranslator, code: u16) -> Option<KeyEvent> {
        t.translate(code, 0)
    }

    #[test]
    fn test_digits_and_enter() {
        let mut t = KeyTranslator::new();
        assert_eq!(press(&mut t, 9).map(|e| e.key), Some(Key::Char('8')));
        assert_eq!(press(&mut t, 11).map(|e| e.key), Some(Key::Char('0')));
        assert_eq!(press(&mut t, 28).map(|e| e.key), Some(Key::ENTER));
        assert_eq!(press(&mut t, 96).map(|e| e.key), Some(Key::ENTER));
    }

    #[test]
    fn test_release_and_repeat_produce_nothing() {
        let mut t = KeyTranslator::new();
        assert!(release(&mut t, 30).is_none());
        assert!(t.translate(30, 2).is_none());
        assert!(t.translate(30, 7).is_none());
    }

    #[test]
    fn test_shift_uppercases_letters_and_symbols() {
        let mut t = KeyTranslator::new();
        let shift = press(&mut t, KEY_LEFTSHIFT).unwrap();
        assert_eq!(shift.key, Key::Named(NamedKey::Shift));

        let a = press(&mut t, 30).unwrap();
        assert_eq!(a.key, Key::Char('A'));
        assert!(a.modifiers.shift);

        assert_eq!(press(&mut t, 2).map(|e| e.key), Some(Key::Char('!')));

        release(&mut t, KEY_LEFTSHIFT);
        assert_eq!(press(&mut t, 30).map(|e| e.key), Some(Key::Char('a')));
    }

    #[test]
    fn test_caps_lock_only_affects_letters() {
        let mut t = KeyTranslator::new();
        press(&mut t, KEY_CAPSLOCK);
        release(&mut t, KEY_CAPSLOCK);
        assert!(t.caps_lock());
        assert_eq!(press(&mut t, 48).map(|e| e.key), Some(Key::Char('B')));
        assert_eq!(press(&mut t, 5).map(|e| e.key), Some(Key::Char('4')));

        // Shift inverts caps lock for letters
        press(&mut t, KEY_RIGHTSHIFT);
        assert_eq!(press(&mut t, 48).map(|e| e.key), Some(Key::Char('b')));
    }

    #[test]
    fn test_both_shift_keys_tracked_independently() {
        let mut t = KeyTranslator::new();
        press(&mut t, KEY_LEFTSHIFT);
        press(&mut t, KEY_RIGHTSHIFT);
        release(&mut t, KEY_LEFTSHIFT);
        assert!(t.modifiers().shift);
        release(&mut t, KEY_RIGHTSHIFT);
        assert!(!t.modifiers().shift);
    }

    #[test]
    fn test_ctrl_marks_shortcut() {
        let mut t = KeyTranslator::new();
        press(&mut t, KEY_LEFTCTRL);
        let event = press(&mut t, 46).unwrap();
        assert_eq!(event.key, Key::Char('c'));
        assert_eq!(event.printable(), None);
    }

    #[test]
    fn test_keypad_digits() {
        let mut t = KeyTranslator::new();
        assert_eq!(press(&mut t, 79).map(|e| e.key), Some(Key::Char('1')));
        assert_eq!(press(&mut t, 82).map(|e| e.key), Some(Key::Char('0')));
    }

    #[test]
    fn test_unknown_code_is_unidentified() {
        let mut t = KeyTranslator::new();
        assert_eq!(
            press(&mut t, 240).map(|e| e.key),
            Some(Key::Named(NamedKey::Unidentified))
        );
    }

    #[test]
    fn test_reset() {
        let mut t = KeyTranslator::new();
        press(&mut t, KEY_LEFTSHIFT);
        press(&mut t, KEY_CAPSLOCK);
        t.reset();
        assert_eq!(t.modifiers(), Modifiers::none());
        assert!(!t.caps_lock());
    }
}
