//! Outbound command payload builders.
//!
//! The appliance presents itself to the target machine as a composite USB
//! device, so the payloads mirror HID boot reports: a mouse payload of 14
//! signed 32-bit fields and a keyboard payload of a modifier bitmask plus
//! ten key slots. The driver keeps one instance of each alive per session
//! ("soft" state) so that, for example, holding the left button down while
//! moving keeps the button bit set in every subsequent move payload.

use crate::keymap::hid::HidKey;

/// Size of the mouse command payload in bytes (14 × i32).
pub const MOUSE_PAYLOAD_SIZE: usize = 56;

/// Size of the keyboard command payload in bytes.
pub const KEYBOARD_PAYLOAD_SIZE: usize = 12;

/// Mouse button bits as used in both outbound payloads and inbound reports.
pub mod button {
    pub const LEFT: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const MIDDLE: u8 = 0x04;
    pub const SIDE1: u8 = 0x08;
    pub const SIDE2: u8 = 0x10;
}

/// The driver-side mouse state sent with every mouse command.
///
/// `x`, `y`, and `wheel` are *relative* values and are expected to be cleared
/// after each send via [`MouseState::clear_motion`]; `buttons` persists until
/// the button is released. The ten `aux` fields carry curve control points
/// for the interpolated-move commands and are zero otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseState {
    pub buttons: u8,
    pub x: i32,
    pub y: i32,
    pub wheel: i32,
    pub aux: [i32; 10],
}

impl MouseState {
    /// Encodes the state into the 56-byte wire payload.
    pub fn to_payload(&self) -> [u8; MOUSE_PAYLOAD_SIZE] {
        let mut buf = [0u8; MOUSE_PAYLOAD_SIZE];
        buf[0..4].copy_from_slice(&i32::from(self.buttons).to_le_bytes());
        buf[4..8].copy_from_slice(&self.x.to_le_bytes());
        buf[8..12].copy_from_slice(&self.y.to_le_bytes());
        buf[12..16].copy_from_slice(&self.wheel.to_le_bytes());
        for (i, aux) in self.aux.iter().enumerate() {
            let offset = 16 + i * 4;
            buf[offset..offset + 4].copy_from_slice(&aux.to_le_bytes());
        }
        buf
    }

    /// Sets or clears one of the [`button`] bits.
    pub fn set_button(&mut self, mask: u8, down: bool) {
        if down {
            self.buttons |= mask;
        } else {
            self.buttons &= !mask;
        }
    }

    /// Returns whether one of the [`button`] bits is currently set.
    pub fn is_down(&self, mask: u8) -> bool {
        self.buttons & mask != 0
    }

    /// Zeroes the relative-motion fields after a send.
    pub fn clear_motion(&mut self) {
        self.x = 0;
        self.y = 0;
        self.wheel = 0;
    }
}

/// The driver-side keyboard state sent with every keyboard command.
///
/// Modifier keys (HID 0xE0–0xE7) live in the bitmask; every other key
/// occupies one of the ten slots, matching the HID boot protocol limit of
/// ten concurrently held ordinary keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardState {
    pub modifiers: u8,
    pub keys: [u8; 10],
}

impl KeyboardState {
    /// Encodes the state into the 12-byte wire payload.
    ///
    /// Layout: `modifiers:u8, reserved:u8, keys:10×u8`.
    pub fn to_payload(&self) -> [u8; KEYBOARD_PAYLOAD_SIZE] {
        let mut buf = [0u8; KEYBOARD_PAYLOAD_SIZE];
        buf[0] = self.modifiers;
        // buf[1] is the HID reserved byte, always zero
        buf[2..12].copy_from_slice(&self.keys);
        buf
    }

    /// Records `key` as held.
    ///
    /// Returns `false` only when `key` is an ordinary key and all ten slots
    /// are already occupied; pressing a key that is already held is a no-op
    /// that returns `true`.
    pub fn press(&mut self, key: HidKey) -> bool {
        if let Some(bit) = key.modifier_bit() {
            self.modifiers |= bit;
            return true;
        }
        let code = key as u8;
        if self.keys.contains(&code) {
            return true;
        }
        match self.keys.iter_mut().find(|slot| **slot == 0) {
            Some(slot) => {
                *slot = code;
                true
            }
            None => false,
        }
    }

    /// Records `key` as released. Releasing a key that is not held is a no-op.
    pub fn release(&mut self, key: HidKey) {
        if let Some(bit) = key.modifier_bit() {
            self.modifiers &= !bit;
            return;
        }
        let code = key as u8;
        for slot in self.keys.iter_mut() {
            if *slot == code {
                *slot = 0;
            }
        }
    }

    /// Releases every held key and modifier.
    pub fn clear(&mut self) {
        self.modifiers = 0;
        self.keys = [0; 10];
    }

    /// Returns whether no key or modifier is currently held.
    pub fn is_empty(&self) -> bool {
        self.modifiers == 0 && self.keys.iter().all(|&k| k == 0)
    }

    /// Returns whether `key` is currently recorded as held.
    pub fn is_pressed(&self, key: HidKey) -> bool {
        match key.modifier_bit() {
            Some(bit) => self.modifiers & bit != 0,
            None => self.keys.contains(&(key as u8)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
