//! The appliance's device identity.
//!
//! Every appliance ships with a 4-byte identifier printed on its display,
//! conventionally written as 8 hexadecimal digits (e.g. `"3E4A9C21"`). The
//! appliance ignores any command whose header does not open with this value,
//! so a wrong identity looks exactly like a dead device: every command times
//! out. Validating the string eagerly at construction turns that silent
//! failure mode into an immediate, explicit error.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors produced when parsing a device identity string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The identity string is not exactly 8 characters long.
    #[error("device identity must be exactly 8 hexadecimal digits, got {0} characters")]
    WrongLength(usize),

    /// The identity string contains a character outside `[0-9a-fA-F]`.
    #[error("device identity contains a non-hexadecimal character")]
    NotHex,
}

/// The 4-byte identity of one appliance, parsed from its hex form.
///
/// Immutable for the lifetime of a session; placed as the first field of
/// every outbound command header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(u32);

impl DeviceId {
    /// Parses an identity from its 8-hex-digit display form.
    ///
    /// The digits are interpreted big-endian, matching the order printed on
    /// the appliance: `"3E4A9C21"` becomes `0x3E4A9C21`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] for a wrong-length or non-hex string.
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        if s.len() != 8 {
            return Err(IdentityError::WrongLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdentityError::NotHex);
        }
        let value = u32::from_str_radix(s, 16).map_err(|_| IdentityError::NotHex)?;
        Ok(DeviceId(value))
    }

    /// Returns the identity as the u32 placed in the header.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceId::from_hex(s)
    }
}
