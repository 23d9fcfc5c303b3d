// Keyscan Input Layer - Device Detection
// Device capability analysis and scanner detection

use std::collections::HashSet;

/// Device capabilities extracted from evdev device.capabilities()
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    /// Whether the device supports EV_KEY events
    pub has_ev_key: bool,
    /// List of supported key codes (EV_KEY capability codes)
    pub supported_keys: Vec<u16>,
}

impl DeviceCapabilities {
    /// Create a new DeviceCapabilities struct
    pub fn new(has_ev_key: bool, supported_keys: Vec<u16>) -> Self {
        Self {
            has_ev_key,
            supported_keys,
        }
    }

    /// Check if a specific key code is supported
    pub fn supports_key(&self, key_code: u16) -> bool {
        self.supported_keys.contains(&key_code)
    }

    /// Create a HashSet from supported keys for O(1) lookups
    pub fn key_set(&self) -> HashSet<u16> {
        self.supported_keys.iter().copied().collect()
    }
}

// Digit row 1..0
pub(crate) const DIGIT_CODES: &[u16] = &[2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

// ENTER
pub(crate) const ENTER_CODE: u16 = 28;

/// Name fragments that identify HID barcode scanners
const SCANNER_NAME_HINTS: &[&str] = &[
    "barcode",
    "scanner",
    "scan",
    "honeywell",
    "zebra",
    "symbol",
    "datalogic",
    "metrologic",
    "newland",
    "netum",
];

/// Determine if a device can act as a keyboard-wedge scanner.
///
/// Scanners present themselves as keyboards, but many only declare the keys
/// they can actually type. The minimum we need is EV_KEY, the digit row and
/// ENTER.
pub fn is_scanner_capable(capabilities: &DeviceCapabilities) -> bool {
    if !capabilities.has_ev_key {
        return false;
    }

    let key_set = capabilities.key_set();
    DIGIT_CODES.iter().all(|code| key_set.contains(code)) && key_set.contains(&ENTER_CODE)
}

/// Check if a device name looks like a barcode scanner.
pub fn looks_like_scanner(device_name: &str) -> bool {
    let lower = device_name.to_lowercase();
    SCANNER_NAME_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Check if a device is a virtual device based on its name.
///
/// Virtual devices (uinput remappers, our own test devices) are skipped
/// during autodetection.
pub fn is_virtual_device(device_name: &str, virtual_prefix: &str) -> bool {
    device_name.starts_with(virtual_prefix) || device_name.contains("(virtual)")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_keyboard() -> DeviceCapabilities {
        DeviceCapabilities::new(true, (1..=120).collect())
    }

    #[test]
    fn test_full_keyboard_is_capable() {
        assert!(is_scanner_capable(&full_keyboard()));
    }

    #[test]
    fn test_digits_and_enter_are_enough() {
        let mut keys: Vec<u16> = DIGIT_CODES.to_vec();
        keys.push(ENTER_CODE);
        assert!(is_scanner_capable(&DeviceCapabilities::new(true, keys)));
    }

    #[test]
    fn test_missing_enter_is_not_capable() {
        let caps = DeviceCapabilities::new(true, DIGIT_CODES.to_vec());
        assert!(!is_scanner_capable(&caps));
    }

    #[test]
    fn test_no_ev_key() {
        let caps = DeviceCapabilities::new(false, (1..=120).collect());
        assert!(!is_scanner_capable(&caps));
    }

    #[test]
    fn test_supports_key() {
        let caps = full_keyboard();
        assert!(caps.supports_key(ENTER_CODE));
        assert!(!caps.supports_key(500));
    }

    #[test]
    fn test_looks_like_scanner() {
        assert!(looks_like_scanner("Honeywell Imaging & Mobility 1900"));
        assert!(looks_like_scanner("USB Barcode Reader"));
        assert!(looks_like_scanner("Symbol Technologies, Inc, 2008 Symbol Bar Code Scanner"));
        assert!(!looks_like_scanner("Logitech USB Keyboard"));
    }

    #[test]
    fn test_is_virtual_device() {
        assert!(is_virtual_device("Keyscan (virtual) test", "Keyscan (virtual)"));
        assert!(is_virtual_device("uinput (virtual) keyboard", "Keyscan (virtual)"));
        assert!(!is_virtual_device("USB Barcode Reader", "Keyscan (virtual)"));
    }
}
