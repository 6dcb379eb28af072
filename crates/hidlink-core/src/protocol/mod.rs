//! Protocol module containing the command header codec, the command-id
//! table, outbound payload builders, and the hardware report decoder.

pub mod commands;
pub mod header;
pub mod payload;
pub mod report;
pub mod sequence;

use thiserror::Error;

/// Errors that can occur while encoding or decoding protocol data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the fixed 16-byte command header.
    #[error("truncated header: need {needed} bytes, got {available}")]
    TruncatedHeader { needed: usize, available: usize },

    /// The byte slice is shorter than the fixed 20-byte hardware report.
    #[error("truncated hardware report: need {needed} bytes, got {available}")]
    TruncatedReport { needed: usize, available: usize },

    /// The command-id field is not one of the appliance's known magic values.
    #[error("unknown command id: 0x{0:08X}")]
    UnknownCommand(u32),
}

pub use commands::CommandId;
pub use header::{PacketHeader, HEADER_SIZE};
pub use payload::{KeyboardState, MouseState, KEYBOARD_PAYLOAD_SIZE, MOUSE_PAYLOAD_SIZE};
pub use report::{parse_report, KeyboardReport, MouseReport, REPORT_SIZE};
pub use sequence::SequenceCounter;
