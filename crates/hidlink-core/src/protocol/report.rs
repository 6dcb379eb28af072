//! Decoder for the periodic hardware-state report the appliance streams to
//! the monitor port.
//!
//! Wire format (little-endian, 20 bytes minimum):
//! ```text
//! bytes 0..8   mouse:    [report_id:1][buttons:1][x:i16][y:i16][wheel:i16]
//! bytes 8..20  keyboard: [report_id:1][modifiers:1][keys:10×u8]
//! ```
//!
//! `x`, `y`, and `wheel` are displacements since the previous report, not
//! absolute coordinates. The decoder never accumulates them; what a consumer
//! does with the deltas is its own business.

use crate::keymap::hid::HidKey;
use crate::protocol::ProtocolError;

/// Minimum size of a hardware report datagram in bytes.
pub const REPORT_SIZE: usize = 20;

/// Decoded physical mouse state from one hardware report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseReport {
    pub report_id: u8,
    /// Button bitmask; see [`crate::protocol::payload::button`].
    pub buttons: u8,
    /// Horizontal displacement since the previous report.
    pub x: i16,
    /// Vertical displacement since the previous report.
    pub y: i16,
    /// Wheel displacement since the previous report.
    pub wheel: i16,
}

impl MouseReport {
    /// Returns whether the given [`crate::protocol::payload::button`] bit is set.
    pub fn is_down(&self, mask: u8) -> bool {
        self.buttons & mask != 0
    }
}

/// Decoded physical keyboard state from one hardware report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardReport {
    pub report_id: u8,
    /// One bit per modifier key, HID 0xE0 (bit 0) through 0xE7 (bit 7).
    pub modifiers: u8,
    /// Up to ten concurrently held ordinary key codes; empty slots are zero.
    pub keys: [u8; 10],
}

impl KeyboardReport {
    /// Returns whether `key` is held: a bitmask test for modifier keys and a
    /// slot-membership test for everything else.
    pub fn is_key_down(&self, key: HidKey) -> bool {
        match key.modifier_bit() {
            Some(bit) => self.modifiers & bit != 0,
            None => self.keys.contains(&(key as u8)),
        }
    }
}

/// Decodes one hardware report into its mouse and keyboard halves.
///
/// Trailing bytes beyond the first 20 are ignored.
///
/// # Errors
///
/// Returns [`ProtocolError::TruncatedReport`] if fewer than 20 bytes are
/// supplied. One short datagram on a lossy link is routine, so callers are
/// expected to drop the packet and keep receiving.
pub fn parse_report(bytes: &[u8]) -> Result<(MouseReport, KeyboardReport), ProtocolError> {
    if bytes.len() < REPORT_SIZE {
        return Err(ProtocolError::TruncatedReport {
            needed: REPORT_SIZE,
            available: bytes.len(),
        });
    }

    let mouse = MouseReport {
        report_id: bytes[0],
        buttons: bytes[1],
        x: i16::from_le_bytes([bytes[2], bytes[3]]),
        y: i16::from_le_bytes([bytes[4], bytes[5]]),
        wheel: i16::from_le_bytes([bytes[6], bytes[7]]),
    };

    let mut keys = [0u8; 10];
    keys.copy_from_slice(&bytes[10..20]);
    let keyboard = KeyboardReport {
        report_id: bytes[8],
        modifiers: bytes[9],
        keys,
    };

    Ok((mouse, keyboard))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
