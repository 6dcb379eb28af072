//! # hidlink-driver
//!
//! Client-side driver for the HIDLink input-injection appliance.
//!
//! The appliance is driven over UDP, an inherently lossy and connectionless
//! link, by two cooperating engines:
//!
//! - **`net::command`** – the command channel. Every outbound command gets a
//!   16-byte header carrying the device identity, a nonce, a fresh sequence
//!   number, and the command id; the reply must echo the command and
//!   sequence and arrive from the configured peer to be accepted. Timeouts
//!   and mismatched replies are reported as data, not errors.
//!
//! - **`net::monitor`** – a background listener that decodes the appliance's
//!   hardware report stream into mouse/keyboard snapshots, queues every
//!   change as an event, and synthesizes a single "motion stopped" event
//!   after a silence window.
//!
//! **`device`** composes both behind a session handle with gesture wrappers
//! (moves, clicks, keystrokes, input masking, LCD painting), and
//! **`config`** supplies the TOML configuration they are built from.
//!
//! # Example
//!
//! ```rust,no_run
//! use hidlink_driver::{Device, DeviceConfig};
//!
//! # fn main() -> Result<(), hidlink_driver::DriverError> {
//! let mut config = DeviceConfig::default();
//! config.device.address = "192.168.2.188".to_string();
//! config.device.identity = "3E4A9C21".to_string();
//!
//! let mut device = Device::connect(&config)?;
//! device.move_rel(150, 0)?;
//! device.left(true)?;
//! device.left(false)?;
//!
//! let monitor = device.monitor()?;
//! if monitor.is_left()? {
//!     println!("the physical left button is held");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod net;

pub use config::{ConfigError, DeviceConfig};
pub use device::{Device, MaskTarget, LCD_FRAME_BYTES, LCD_HEIGHT, LCD_WIDTH};
pub use error::DriverError;
pub use net::command::{CommandChannel, CommandOutcome};
pub use net::monitor::{InputMonitor, MonitorEvent, DEFAULT_IDLE_TIMEOUT};
