//! Binary codec for the fixed command header.
//!
//! Wire format:
//! ```text
//! [identity:4][nonce:4][sequence:4][command:4]
//! ```
//! Total size: 16 bytes. All fields are little-endian unsigned 32-bit.
//!
//! Every command datagram starts with this header, and the appliance echoes
//! it back at the front of its reply. UDP has no connections, so the echoed
//! header is the *only* thing that ties a reply to the request that caused
//! it: the driver checks that the reply's command and sequence fields match
//! the ones it just sent before trusting the reply at all.

use crate::protocol::ProtocolError;

/// Size of the command header in bytes.
pub const HEADER_SIZE: usize = 16;

/// The correlation header carried by every command datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// 4-byte device identity flashed into the appliance.
    pub identity: u32,
    /// Per-call randomization field.
    ///
    /// Defaults to a random 31-bit value; a handful of commands carry
    /// auxiliary data here instead (a stream port, a mask bitmask, a
    /// duration in milliseconds).
    pub nonce: u32,
    /// Monotonically increasing per-session sequence number.
    pub sequence: u32,
    /// One of the [`crate::protocol::CommandId`] magic values.
    pub command: u32,
}

impl PacketHeader {
    /// Encodes the header into its 16-byte wire representation.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.identity.to_le_bytes());
        buf[4..8].copy_from_slice(&self.nonce.to_le_bytes());
        buf[8..12].copy_from_slice(&self.sequence.to_le_bytes());
        buf[12..16].copy_from_slice(&self.command.to_le_bytes());
        buf
    }

    /// Decodes a header from the beginning of `bytes`.
    ///
    /// Trailing bytes after the header are ignored; replies carry the header
    /// followed by command-specific data.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::TruncatedHeader`] if fewer than 16 bytes are
    /// supplied.
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ProtocolError::TruncatedHeader {
                needed: HEADER_SIZE,
                available: bytes.len(),
            });
        }
        Ok(Self {
            identity: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
            nonce: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            sequence: u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            command: u32::from_le_bytes(bytes[12..16].try_into().unwrap()),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CommandId;

    #[test]
    fn test_header_round_trip_preserves_all_fields() {
        // Arrange
        let header = PacketHeader {
            identity: 0xDEAD_BEEF,
            nonce: 0x1234_5678,
            sequence: 42,
            command: CommandId::MouseMove as u32,
        };

        // Act
        let bytes = header.to_bytes();
        let parsed = PacketHeader::parse(&bytes).expect("parse must succeed");

        // Assert
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_header_layout_is_little_endian_in_field_order() {
        let header = PacketHeader {
            identity: 0x0403_0201,
            nonce: 0x0807_0605,
            sequence: 0x0C0B_0A09,
            command: 0x100F_0E0D,
        };

        let bytes = header.to_bytes();

        assert_eq!(
            bytes,
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
            "fields must be serialized little-endian in declaration order"
        );
    }

    #[test]
    fn test_parse_ignores_trailing_reply_data() {
        let header = PacketHeader {
            identity: 1,
            nonce: 2,
            sequence: 3,
            command: 4,
        };
        let mut bytes = header.to_bytes().to_vec();
        bytes.extend_from_slice(&[0xAA; 32]);

        let parsed = PacketHeader::parse(&bytes).expect("parse must succeed");

        assert_eq!(parsed, header);
    }

    #[test]
    fn test_parse_fails_on_short_input() {
        let result = PacketHeader::parse(&[0u8; 15]);

        assert_eq!(
            result,
            Err(ProtocolError::TruncatedHeader {
                needed: 16,
                available: 15
            })
        );
    }

    #[test]
    fn test_parse_fails_on_empty_input() {
        let result = PacketHeader::parse(&[]);

        assert!(matches!(
            result,
            Err(ProtocolError::TruncatedHeader { available: 0, .. })
        ));
    }
}
