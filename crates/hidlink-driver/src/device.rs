//! The session handle: one connected appliance.
//!
//! A [`Device`] composes the command channel and (optionally) the input
//! monitor behind a single handle. Construction performs the connect
//! handshake and refuses to hand out a half-working session: if the
//! appliance does not acknowledge `Connect`, construction fails and every
//! socket opened along the way is released with the dropped values. Monitor
//! startup, by contrast, is deliberately non-fatal: an appliance with its
//! report stream disabled is still perfectly capable of executing commands,
//! so that failure downgrades to a warning and a command-only session.
//!
//! The gesture methods mirror what the appliance firmware can do: they
//! update the session's soft mouse/keyboard state, send the corresponding
//! command, and report the appliance's accept/reject answer as a plain
//! `bool`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use hidlink_core::{
    protocol::payload::button, CommandId, DeviceId, HidKey, KeyboardState, MouseState,
};
use tracing::{info, warn};

use crate::config::DeviceConfig;
use crate::error::DriverError;
use crate::net::command::{CommandChannel, CommandOutcome};
use crate::net::monitor::InputMonitor;

/// Marker placed in the upper half of the `Monitor` command nonce, next to
/// the report port in the lower half.
const MONITOR_STREAM_MARKER: u32 = 0xAA55;

/// LCD panel geometry: 128×160 pixels, RGB565.
pub const LCD_WIDTH: usize = 128;
pub const LCD_HEIGHT: usize = 160;
/// Size of one full LCD frame in bytes.
pub const LCD_FRAME_BYTES: usize = LCD_WIDTH * LCD_HEIGHT * 2;

/// Physical input channels the appliance can suppress.
///
/// While a channel is masked the appliance swallows that part of the
/// physical device's traffic instead of forwarding it to the target
/// machine; injected commands are unaffected. The active set travels as a
/// bitmask in the `MaskInput` nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MaskTarget {
    LeftButton = 0x0001,
    RightButton = 0x0002,
    MiddleButton = 0x0004,
    SideButton1 = 0x0008,
    SideButton2 = 0x0010,
    AxisX = 0x0020,
    AxisY = 0x0040,
    Wheel = 0x0080,
    Keyboard = 0x0100,
}

/// A connected appliance session.
pub struct Device {
    channel: CommandChannel,
    monitor: Option<InputMonitor>,
    mouse: MouseState,
    keyboard: KeyboardState,
    masked: u16,
}

impl Device {
    /// Connects to the appliance described by `config`.
    ///
    /// Performs the connect handshake, then (when `config.monitor.enabled`)
    /// asks the appliance to stream hardware reports to the configured local
    /// port and starts the monitor. A monitor that cannot be started leaves
    /// the session command-only with a logged warning.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Identity`] / [`DriverError::InvalidAddress`]
    /// for malformed configuration, [`DriverError::BindFailed`] /
    /// [`DriverError::Socket`] for transport setup failures, and
    /// [`DriverError::HandshakeFailed`] when the appliance does not
    /// acknowledge `Connect`.
    pub fn connect(config: &DeviceConfig) -> Result<Self, DriverError> {
        let identity = DeviceId::from_hex(&config.device.identity)?;
        let ip: IpAddr =
            config
                .device
                .address
                .parse()
                .map_err(|_| DriverError::InvalidAddress {
                    value: config.device.address.clone(),
                })?;
        let peer = SocketAddr::new(ip, config.device.port);
        let timeout = Duration::from_millis(config.driver.command_timeout_ms);

        let mut channel = CommandChannel::open(peer, identity, timeout)?;
        let outcome = channel.send(CommandId::Connect, &[], None)?;
        if !outcome.accepted() {
            return Err(DriverError::HandshakeFailed { peer });
        }
        info!(%peer, identity = %identity, "appliance accepted connect handshake");

        let mut device = Self {
            channel,
            monitor: None,
            mouse: MouseState::default(),
            keyboard: KeyboardState::default(),
            masked: 0,
        };

        if config.monitor.enabled {
            let idle_timeout = Duration::from_millis(config.monitor.idle_timeout_ms);
            if let Err(e) = device.start_monitor(config.monitor.port, idle_timeout) {
                warn!("monitor startup failed, session is command-only: {e}");
            }
        }

        Ok(device)
    }

    /// Asks the appliance to stream reports to `port`, then starts the
    /// listener. The port and a fixed marker ride in the nonce field.
    fn start_monitor(&mut self, port: u16, idle_timeout: Duration) -> Result<(), DriverError> {
        let nonce = u32::from(port) | (MONITOR_STREAM_MARKER << 16);
        let outcome = self.channel.send(CommandId::Monitor, &[], Some(nonce))?;
        if !outcome.accepted() {
            return Err(DriverError::MonitorRefused);
        }

        let mut monitor = InputMonitor::new(port, idle_timeout);
        monitor.start()?;
        self.monitor = Some(monitor);
        Ok(())
    }

    /// The live input monitor.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::MonitorUnavailable`] for a command-only
    /// session.
    pub fn monitor(&self) -> Result<&InputMonitor, DriverError> {
        self.monitor
            .as_ref()
            .ok_or(DriverError::MonitorUnavailable)
    }

    /// Sends a raw command, exposing the full [`CommandOutcome`].
    ///
    /// The gesture methods below are all thin wrappers over this.
    pub fn send_command(
        &mut self,
        command: CommandId,
        payload: &[u8],
        nonce_override: Option<u32>,
    ) -> Result<CommandOutcome, DriverError> {
        self.channel.send(command, payload, nonce_override)
    }

    // ── Pointer gestures ──────────────────────────────────────────────────────

    /// Moves the pointer by a relative offset.
    pub fn move_rel(&mut self, x: i32, y: i32) -> Result<bool, DriverError> {
        self.mouse.x = x;
        self.mouse.y = y;
        let result = self.send_mouse(CommandId::MouseMove, None);
        self.mouse.clear_motion();
        result
    }

    /// Moves the pointer with firmware-side interpolation over `duration_ms`.
    pub fn auto_move(&mut self, x: i32, y: i32, duration_ms: u32) -> Result<bool, DriverError> {
        self.mouse.x = x;
        self.mouse.y = y;
        let result = self.send_mouse(CommandId::MouseAutoMove, Some(duration_ms));
        self.mouse.clear_motion();
        result
    }

    /// Moves the pointer along a firmware-interpolated curve.
    ///
    /// Up to five `(x, y)` control points are carried in the payload's
    /// auxiliary fields; extra points are ignored.
    pub fn bezier_move(
        &mut self,
        x: i32,
        y: i32,
        control_points: &[(i32, i32)],
    ) -> Result<bool, DriverError> {
        self.mouse.x = x;
        self.mouse.y = y;
        for (i, (cx, cy)) in control_points.iter().take(5).enumerate() {
            self.mouse.aux[2 * i] = *cx;
            self.mouse.aux[2 * i + 1] = *cy;
        }
        let result = self.send_mouse(CommandId::BezierMove, None);
        self.mouse.aux = [0; 10];
        self.mouse.clear_motion();
        result
    }

    /// Presses or releases the left button.
    pub fn left(&mut self, down: bool) -> Result<bool, DriverError> {
        self.mouse.set_button(button::LEFT, down);
        self.send_mouse(CommandId::MouseLeft, None)
    }

    /// Presses or releases the right button.
    pub fn right(&mut self, down: bool) -> Result<bool, DriverError> {
        self.mouse.set_button(button::RIGHT, down);
        self.send_mouse(CommandId::MouseRight, None)
    }

    /// Presses or releases the middle button.
    pub fn middle(&mut self, down: bool) -> Result<bool, DriverError> {
        self.mouse.set_button(button::MIDDLE, down);
        self.send_mouse(CommandId::MouseMiddle, None)
    }

    /// Scrolls the wheel by `delta` detents.
    pub fn wheel(&mut self, delta: i32) -> Result<bool, DriverError> {
        self.mouse.wheel = delta;
        let result = self.send_mouse(CommandId::MouseWheel, None);
        self.mouse.wheel = 0;
        result
    }

    fn send_mouse(
        &mut self,
        command: CommandId,
        nonce_override: Option<u32>,
    ) -> Result<bool, DriverError> {
        let payload = self.mouse.to_payload();
        let outcome = self.channel.send(command, &payload, nonce_override)?;
        Ok(outcome.accepted())
    }

    // ── Keyboard gestures ─────────────────────────────────────────────────────

    /// Presses a key (modifier or ordinary) and sends the full report.
    ///
    /// Returns `Ok(false)` without sending when all ten ordinary-key slots
    /// are already occupied.
    pub fn key_down(&mut self, key: HidKey) -> Result<bool, DriverError> {
        if !self.keyboard.press(key) {
            warn!(?key, "all ten key slots are in use, key not sent");
            return Ok(false);
        }
        self.send_keyboard()
    }

    /// Releases a key and sends the full report.
    pub fn key_up(&mut self, key: HidKey) -> Result<bool, DriverError> {
        self.keyboard.release(key);
        self.send_keyboard()
    }

    /// Releases every held key and modifier.
    pub fn release_all_keys(&mut self) -> Result<bool, DriverError> {
        self.keyboard.clear();
        self.send_keyboard()
    }

    fn send_keyboard(&mut self) -> Result<bool, DriverError> {
        let payload = self.keyboard.to_payload();
        let outcome = self.channel.send(CommandId::KeyboardAll, &payload, None)?;
        Ok(outcome.accepted())
    }

    // ── Input masking ─────────────────────────────────────────────────────────

    /// Suppresses (or releases) one physical input channel.
    pub fn mask(&mut self, target: MaskTarget, on: bool) -> Result<bool, DriverError> {
        if on {
            self.masked |= target as u16;
        } else {
            self.masked &= !(target as u16);
        }
        let outcome =
            self.channel
                .send(CommandId::MaskInput, &[], Some(u32::from(self.masked)))?;
        Ok(outcome.accepted())
    }

    /// Releases every masked channel.
    pub fn unmask_all(&mut self) -> Result<bool, DriverError> {
        self.masked = 0;
        let outcome = self.channel.send(CommandId::UnmaskAll, &[], None)?;
        Ok(outcome.accepted())
    }

    /// The channels currently masked, as the wire bitmask.
    pub fn masked_channels(&self) -> u16 {
        self.masked
    }

    // ── Display ───────────────────────────────────────────────────────────────

    /// Paints a full RGB565 frame onto the LCD panel.
    ///
    /// The frame is larger than one datagram and goes out chunked; the
    /// nonce carries the first row of the transfer (always 0 for a full
    /// frame).
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::FrameSize`] if `frame` is not exactly
    /// [`LCD_FRAME_BYTES`] long.
    pub fn show_picture(&mut self, frame: &[u8]) -> Result<bool, DriverError> {
        if frame.len() != LCD_FRAME_BYTES {
            return Err(DriverError::FrameSize {
                expected: LCD_FRAME_BYTES,
                actual: frame.len(),
            });
        }
        let outcome = self.channel.send(CommandId::ShowPicture, frame, Some(0))?;
        Ok(outcome.accepted())
    }

    /// Fills the LCD panel with one RGB565 color.
    pub fn lcd_fill(&mut self, color: u16) -> Result<bool, DriverError> {
        let mut frame = Vec::with_capacity(LCD_FRAME_BYTES);
        for _ in 0..(LCD_FRAME_BYTES / 2) {
            frame.extend_from_slice(&color.to_le_bytes());
        }
        self.show_picture(&frame)
    }

    // ── Device administration ─────────────────────────────────────────────────

    /// Reprograms the appliance's own IP address and command port.
    ///
    /// Takes effect after a reboot; the current session keeps talking to the
    /// old address.
    pub fn set_config(&mut self, address: Ipv4Addr, port: u16) -> Result<bool, DriverError> {
        let mut payload = [0u8; 8];
        payload[0..4].copy_from_slice(&address.octets());
        payload[4..8].copy_from_slice(&u32::from(port).to_le_bytes());
        let outcome = self.channel.send(CommandId::SetConfig, &payload, None)?;
        Ok(outcome.accepted())
    }

    /// Reprograms the USB vendor/product identity the appliance presents to
    /// the target machine.
    pub fn set_vid_pid(&mut self, vid: u16, pid: u16) -> Result<bool, DriverError> {
        let mut payload = [0u8; 8];
        payload[0..4].copy_from_slice(&u32::from(vid).to_le_bytes());
        payload[4..8].copy_from_slice(&u32::from(pid).to_le_bytes());
        let outcome = self.channel.send(CommandId::SetVidPid, &payload, None)?;
        Ok(outcome.accepted())
    }

    /// Reboots the appliance. The session is useless afterwards.
    pub fn reboot(&mut self) -> Result<bool, DriverError> {
        let outcome = self.channel.send(CommandId::Reboot, &[], None)?;
        Ok(outcome.accepted())
    }

    /// Toggles the firmware debug channel.
    pub fn enable_debug(&mut self, on: bool) -> Result<bool, DriverError> {
        let outcome = self
            .channel
            .send(CommandId::Debug, &[], Some(u32::from(on)))?;
        Ok(outcome.accepted())
    }

    /// Toggles firmware packet tracing.
    pub fn enable_trace(&mut self, on: bool) -> Result<bool, DriverError> {
        let outcome = self
            .channel
            .send(CommandId::TraceEnable, &[], Some(u32::from(on)))?;
        Ok(outcome.accepted())
    }
}

impl Drop for Device {
    /// Best-effort teardown. Each step is guarded on its own so that one
    /// failure does not block the rest, and nothing escapes the drop.
    fn drop(&mut self) {
        if self.masked != 0 {
            if let Err(e) = self.unmask_all() {
                warn!("failed to release input masks during teardown: {e}");
            }
        }
        if !self.keyboard.is_empty() {
            if let Err(e) = self.release_all_keys() {
                warn!("failed to release held keys during teardown: {e}");
            }
        }
        if let Some(monitor) = self.monitor.as_mut() {
            monitor.stop();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
