//! Command identifiers understood by the appliance firmware.
//!
//! Each operation is selected by a fixed 32-bit magic value in the header's
//! command field. The values are baked into the appliance firmware and must
//! be preserved bit-for-bit to interoperate with real hardware.

use crate::protocol::ProtocolError;

/// The closed set of appliance commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CommandId {
    /// Session handshake; must be the first command on a fresh socket.
    Connect = 0xAF3C_2828,
    /// Relative pointer move.
    MouseMove = 0xAEDE_7345,
    /// Left button state change.
    MouseLeft = 0x9823_AE8D,
    /// Middle button state change.
    MouseMiddle = 0x97A3_AE8D,
    /// Right button state change.
    MouseRight = 0x238D_8212,
    /// Wheel scroll.
    MouseWheel = 0xFFEE_AD38,
    /// Firmware-interpolated move; duration rides in the nonce field.
    MouseAutoMove = 0xAEDE_7346,
    /// Full 10-slot keyboard report.
    KeyboardAll = 0x123C_2C2F,
    /// Reboot the appliance.
    Reboot = 0xAA88_55AA,
    /// Firmware-interpolated curve move with control points.
    BezierMove = 0xA238_455A,
    /// Start streaming hardware reports; destination port rides in the nonce.
    Monitor = 0x2738_8020,
    /// Toggle the firmware debug channel.
    Debug = 0x2738_2021,
    /// Suppress physical input channels; mask bitmask rides in the nonce.
    MaskInput = 0x2323_4343,
    /// Release every masked channel.
    UnmaskAll = 0x2334_4343,
    /// Reprogram the appliance's own address and port.
    SetConfig = 0x1D3D_3323,
    /// Reprogram the USB vendor/product identity.
    SetVidPid = 0xFFED_3232,
    /// Paint the LCD panel; frames larger than one datagram are chunked.
    ShowPicture = 0x1233_4883,
    /// Toggle firmware packet tracing.
    TraceEnable = 0xBBCD_DDAC,
}

impl CommandId {
    /// All known command ids, in a fixed order. Useful for table-driven tests
    /// and for decoding logs.
    pub const ALL: [CommandId; 18] = [
        CommandId::Connect,
        CommandId::MouseMove,
        CommandId::MouseLeft,
        CommandId::MouseMiddle,
        CommandId::MouseRight,
        CommandId::MouseWheel,
        CommandId::MouseAutoMove,
        CommandId::KeyboardAll,
        CommandId::Reboot,
        CommandId::BezierMove,
        CommandId::Monitor,
        CommandId::Debug,
        CommandId::MaskInput,
        CommandId::UnmaskAll,
        CommandId::SetConfig,
        CommandId::SetVidPid,
        CommandId::ShowPicture,
        CommandId::TraceEnable,
    ];
}

impl TryFrom<u32> for CommandId {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        CommandId::ALL
            .into_iter()
            .find(|&cmd| cmd as u32 == value)
            .ok_or(ProtocolError::UnknownCommand(value))
    }
}
