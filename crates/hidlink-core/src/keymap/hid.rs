//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! The appliance speaks raw HID usage codes in both directions: outbound
//! keyboard payloads carry them in the ten key slots, and inbound hardware
//! reports carry the codes of whatever keys are physically held. HID codes
//! identify physical key positions, not characters: `KeyA` is the same code
//! on QWERTY and AZERTY hardware even though the printed letter differs.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! The eight modifier keys occupy the dedicated range 0xE0–0xE7 and travel
//! as a bitmask rather than as key slots; [`HidKey::modifier_bit`] maps a
//! modifier to its bit.

use serde::{Deserialize, Serialize};

/// USB HID usage ID for keyboard keys (page 0x07).
///
/// The numeric value of each variant is its HID usage ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HidKey {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control keys (HID 0x28–0x38)
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    // Lock keys
    CapsLock = 0x39,

    // Function keys (HID 0x3A–0x45)
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation cluster (HID 0x46–0x52)
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    // Numpad (HID 0x53–0x63)
    NumLock = 0x53,
    NumpadDivide = 0x54,
    NumpadMultiply = 0x55,
    NumpadSubtract = 0x56,
    NumpadAdd = 0x57,
    NumpadEnter = 0x58,
    Numpad1 = 0x59,
    Numpad2 = 0x5A,
    Numpad3 = 0x5B,
    Numpad4 = 0x5C,
    Numpad5 = 0x5D,
    Numpad6 = 0x5E,
    Numpad7 = 0x5F,
    Numpad8 = 0x60,
    Numpad9 = 0x61,
    Numpad0 = 0x62,
    NumpadDecimal = 0x63,

    // Modifiers (HID 0xE0–0xE7); transmitted as a bitmask, never as slots
    LeftCtrl = 0xE0,
    LeftShift = 0xE1,
    LeftAlt = 0xE2,
    LeftMeta = 0xE3,
    RightCtrl = 0xE4,
    RightShift = 0xE5,
    RightAlt = 0xE6,
    RightMeta = 0xE7,
}

impl HidKey {
    /// Returns whether this key is one of the eight modifiers.
    pub fn is_modifier(self) -> bool {
        (self as u8) >= 0xE0
    }

    /// For a modifier key, the bit it occupies in the modifier bitmask
    /// (`LeftCtrl` is bit 0, `RightMeta` is bit 7); `None` for ordinary keys.
    pub fn modifier_bit(self) -> Option<u8> {
        if self.is_modifier() {
            Some(1 << ((self as u8) - 0xE0))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_codes_start_at_0x04() {
        assert_eq!(HidKey::KeyA as u8, 0x04);
        assert_eq!(HidKey::KeyZ as u8, 0x1D);
    }

    #[test]
    fn test_modifier_bits_cover_all_eight_positions() {
        let modifiers = [
            (HidKey::LeftCtrl, 0x01),
            (HidKey::LeftShift, 0x02),
            (HidKey::LeftAlt, 0x04),
            (HidKey::LeftMeta, 0x08),
            (HidKey::RightCtrl, 0x10),
            (HidKey::RightShift, 0x20),
            (HidKey::RightAlt, 0x40),
            (HidKey::RightMeta, 0x80),
        ];

        for (key, expected) in modifiers {
            assert!(key.is_modifier());
            assert_eq!(key.modifier_bit(), Some(expected), "{key:?}");
        }
    }

    #[test]
    fn test_ordinary_keys_have_no_modifier_bit() {
        assert!(!HidKey::KeyA.is_modifier());
        assert_eq!(HidKey::KeyA.modifier_bit(), None);
        assert_eq!(HidKey::Space.modifier_bit(), None);
        assert_eq!(HidKey::NumpadDecimal.modifier_bit(), None);
    }
}
