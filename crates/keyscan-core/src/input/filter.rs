// Keyscan Input Layer - Device Selection
// Which enumerated input devices feed the decoder

use super::device::looks_like_scanner;

/// An enumerated input device, as seen by the selection rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCandidate<'a> {
    pub name: &'a str,
    pub path: &'a str,
    /// Reports the digit row and ENTER
    pub capable: bool,
    /// Created by a remapper or other uinput tool
    pub is_virtual: bool,
}

/// Device selection rules from `[devices]` and `--device`.
///
/// An explicit `only` list wins outright and may name any device, virtual
/// or not, by name or by `/dev/input` path. With an empty list, physical
/// devices that can type a barcode are autodetected, optionally narrowed
/// to those whose name looks like a scanner.
#[derive(Debug, Clone, Copy)]
pub struct DeviceSelection<'a> {
    pub only: &'a [String],
    pub scanners_only: bool,
}

impl<'a> DeviceSelection<'a> {
    pub fn new(only: &'a [String], scanners_only: bool) -> Self {
        Self { only, scanners_only }
    }

    pub fn is_explicit(&self) -> bool {
        !self.only.is_empty()
    }

    pub fn accepts(&self, candidate: &DeviceCandidate<'_>) -> bool {
        if self.is_explicit() {
            return self
                .only
                .iter()
                .any(|wanted| wanted == candidate.path || wanted == candidate.name);
        }

        candidate.capable
            && !candidate.is_virtual
            && (!self.scanners_only || looks_like_scanner(candidate.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physical<'a>(name: &'a str, path: &'a str) -> DeviceCandidate<'a> {
        DeviceCandidate {
            name,
            path,
            capable: true,
            is_virtual: false,
        }
    }

    #[test]
    fn test_explicit_path_selects_plain_keyboard() {
        let only = vec!["/dev/input/event4".to_string()];
        let selection = DeviceSelection::new(&only, true);
        assert!(selection.accepts(&physical("AT Translated Set 2 keyboard", "/dev/input/event4")));
        assert!(!selection.accepts(&physical("Zebra DS2208", "/dev/input/event9")));
    }

    #[test]
    fn test_explicit_name_ignores_capability_and_virtual() {
        let only = vec!["Honeywell 1900G".to_string()];
        let selection = DeviceSelection::new(&only, true);
        let odd = DeviceCandidate {
            name: "Honeywell 1900G",
            path: "/dev/input/event12",
            capable: false,
            is_virtual: true,
        };
        assert!(selection.is_explicit());
        assert!(selection.accepts(&odd));
    }

    #[test]
    fn test_autodetect_scanners_only() {
        let selection = DeviceSelection::new(&[], true);
        assert!(!selection.is_explicit());
        assert!(selection.accepts(&physical("NETUM USB Barcode Reader", "/dev/input/event3")));
        assert!(!selection.accepts(&physical("Logitech USB Keyboard", "/dev/input/event0")));
    }

    #[test]
    fn test_autodetect_any_wedge_device() {
        let selection = DeviceSelection::new(&[], false);
        assert!(selection.accepts(&physical("Logitech USB Keyboard", "/dev/input/event0")));

        let mouse = DeviceCandidate {
            capable: false,
            ..physical("Logitech USB Receiver Mouse", "/dev/input/event1")
        };
        assert!(!selection.accepts(&mouse));

        let remapped = DeviceCandidate {
            is_virtual: true,
            ..physical("Barcode Scanner (virtual)", "/dev/input/event20")
        };
        assert!(!selection.accepts(&remapped));
    }
}
