//! # hidlink-core
//!
//! Shared library for the HIDLink appliance driver containing the wire
//! protocol codec, the hardware report decoder, and the HID key tables.
//!
//! This crate is pure data-in/data-out: it has zero dependencies on sockets,
//! threads, or OS APIs. The `hidlink-driver` crate supplies the I/O.
//!
//! # Architecture overview
//!
//! The HIDLink appliance is a small box that sits between a computer and its
//! USB input devices. A controller process on another machine drives it over
//! UDP: it can inject pointer moves, clicks, and keystrokes into the target
//! machine, and it can watch what the *physical* mouse and keyboard plugged
//! into the appliance are doing.
//!
//! This crate defines:
//!
//! - **`protocol`** – the 16-byte command header that correlates requests
//!   with replies on a connectionless transport, the closed table of command
//!   magic values, the outbound mouse/keyboard payload builders, the decoder
//!   for inbound hardware-state reports, and the session sequence counter.
//!
//! - **`domain`** – the 4-byte device identity, parsed and validated from
//!   its 8-hex-digit display form.
//!
//! - **`keymap`** – USB HID usage IDs for keyboard keys, including the
//!   modifier-bitmask mapping used on both the command and report paths.

pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `hidlink_core::PacketHeader` instead of spelling out the module path.
pub use domain::identity::{DeviceId, IdentityError};
pub use keymap::hid::HidKey;
pub use protocol::commands::CommandId;
pub use protocol::header::{PacketHeader, HEADER_SIZE};
pub use protocol::payload::{KeyboardState, MouseState, KEYBOARD_PAYLOAD_SIZE, MOUSE_PAYLOAD_SIZE};
pub use protocol::report::{parse_report, KeyboardReport, MouseReport, REPORT_SIZE};
pub use protocol::sequence::SequenceCounter;
pub use protocol::ProtocolError;
