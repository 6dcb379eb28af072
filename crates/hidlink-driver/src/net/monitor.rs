//! The input monitor: a background listener for the appliance's hardware
//! report stream.
//!
//! Once told to (via the monitor handshake), the appliance streams a 20-byte
//! report to a local UDP port every time the *physical* mouse or keyboard
//! plugged into it does something. The monitor binds that port, decodes each
//! report, keeps the latest snapshot pair available to any thread, and
//! queues every change as a [`MonitorEvent`].
//!
//! # Why synthesize a "neutral" event?
//!
//! The appliance goes silent when input is idle. Report motion fields are
//! *relative*, so without intervention the last snapshot would claim the
//! mouse is moving forever: a consumer polling "current x" after motion
//! stopped would read the final delta over and over. The receive loop runs
//! with a short read timeout (the idle window, default 3 ms); the first
//! timeout after real traffic synthesizes a single event that zeroes x/y
//! while preserving buttons, wheel, and keyboard state, turning "no new
//! report" into an explicit "motion has stopped". Repeated timeouts do not
//! repeat the event, and no neutral event is ever produced before the first
//! real report has arrived.
//!
//! # Shutdown
//!
//! The loop re-checks its state flag on every receive timeout, so it
//! observes a stop request within one idle window; [`InputMonitor::stop`]
//! joins the thread before returning, guaranteeing that no event is
//! produced after `stop()` completes.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use hidlink_core::{parse_report, HidKey, KeyboardReport, MouseReport};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::DriverError;
use crate::net::is_timeout_error;

/// Silence window after which a neutral event is synthesized.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(3);

const REPORT_BUFFER: usize = 1024;

// Lifecycle states, stored in an AtomicU8.
const STOPPED: u8 = 0;
const STARTING: u8 = 1;
const RUNNING: u8 = 2;
const STOPPING: u8 = 3;

/// One observed change of the appliance's physical input state.
///
/// Events are queued in arrival order and never dropped; synthesized neutral
/// events are ordered immediately after the real event that preceded the
/// idle gap.
#[derive(Debug, Clone)]
pub struct MonitorEvent {
    pub mouse: MouseReport,
    pub keyboard: KeyboardReport,
    /// When the report was received (or, for a neutral event, synthesized).
    pub at: Instant,
}

/// The snapshot cell: everything the receive loop writes, under one lock.
///
/// Kept deliberately small so reads copy out and never hold the lock across
/// anything slow.
#[derive(Debug, Default)]
struct SnapshotCell {
    mouse: MouseReport,
    keyboard: KeyboardReport,
    /// At least one real report has been decoded since `start()`.
    seen_report: bool,
    /// A neutral event has been sent since the last real report.
    neutral_sent: bool,
    /// Motion accumulated since the last `motion()` poll.
    pending_x: i32,
    pending_y: i32,
    /// Wheel travel accumulated since the last `wheel()` poll.
    pending_wheel: i32,
}

struct Shared {
    state: AtomicU8,
    cell: Mutex<SnapshotCell>,
}

impl Shared {
    fn lock_cell(&self) -> MutexGuard<'_, SnapshotCell> {
        // A panic while holding this lock leaves the cell intact; recover
        // rather than propagating the poison to every reader.
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background listener for the hardware report stream.
///
/// At most one receive loop is active per instance. `start()` on a running
/// monitor is a no-op; `stop()` blocks until the loop thread has exited.
pub struct InputMonitor {
    port: u16,
    idle_timeout: Duration,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
    events: Option<Mutex<mpsc::UnboundedReceiver<MonitorEvent>>>,
    local_addr: Option<SocketAddr>,
}

impl InputMonitor {
    /// Creates a stopped monitor for the given local port.
    pub fn new(port: u16, idle_timeout: Duration) -> Self {
        Self {
            port,
            idle_timeout,
            shared: Arc::new(Shared {
                state: AtomicU8::new(STOPPED),
                cell: Mutex::new(SnapshotCell::default()),
            }),
            handle: None,
            events: None,
            local_addr: None,
        }
    }

    /// Binds the report port and launches the receive loop.
    ///
    /// A no-op if the monitor is already running.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::BindFailed`] or [`DriverError::Socket`] if the
    /// socket cannot be set up; the monitor settles back to stopped.
    pub fn start(&mut self) -> Result<(), DriverError> {
        if self.shared.state.load(Ordering::Relaxed) == RUNNING {
            return Ok(());
        }
        self.shared.state.store(STARTING, Ordering::Relaxed);

        let addr: SocketAddr = (Ipv4Addr::UNSPECIFIED, self.port).into();
        let socket = match UdpSocket::bind(addr) {
            Ok(socket) => socket,
            Err(source) => {
                self.shared.state.store(STOPPED, Ordering::Relaxed);
                return Err(DriverError::BindFailed { addr, source });
            }
        };
        if let Err(source) = socket.set_read_timeout(Some(self.idle_timeout)) {
            self.shared.state.store(STOPPED, Ordering::Relaxed);
            return Err(DriverError::Socket { peer: addr, source });
        }
        self.local_addr = socket.local_addr().ok();

        // Fresh stream, fresh state: drop anything left from a previous run.
        *self.shared.lock_cell() = SnapshotCell::default();

        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(Mutex::new(rx));

        self.shared.state.store(RUNNING, Ordering::Relaxed);
        let shared = Arc::clone(&self.shared);
        let handle = std::thread::Builder::new()
            .name("hidlink-monitor".to_string())
            .spawn(move || receive_loop(socket, shared, tx))
            .expect("failed to spawn monitor thread");
        self.handle = Some(handle);

        info!(port = self.port, "input monitor listening");
        Ok(())
    }

    /// Stops the receive loop and joins it. A no-op on a stopped monitor.
    pub fn stop(&mut self) {
        if self.shared.state.load(Ordering::Relaxed) == STOPPED {
            return;
        }
        self.shared.state.store(STOPPING, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("monitor thread panicked");
            }
        }
        self.events = None;
        self.local_addr = None;
        self.shared.state.store(STOPPED, Ordering::Relaxed);
        info!(port = self.port, "input monitor stopped");
    }

    /// Returns whether the receive loop is currently active.
    pub fn is_running(&self) -> bool {
        self.shared.state.load(Ordering::Relaxed) == RUNNING
    }

    /// The bound address of the report socket, while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    // ── Snapshot accessors ────────────────────────────────────────────────────
    //
    // All accessors copy out under the lock and never touch the socket, so
    // they cannot block the receive loop for longer than the lock width.

    /// Physical left button state.
    pub fn is_left(&self) -> Result<bool, DriverError> {
        self.button(hidlink_core::protocol::payload::button::LEFT)
    }

    /// Physical right button state.
    pub fn is_right(&self) -> Result<bool, DriverError> {
        self.button(hidlink_core::protocol::payload::button::RIGHT)
    }

    /// Physical middle button state.
    pub fn is_middle(&self) -> Result<bool, DriverError> {
        self.button(hidlink_core::protocol::payload::button::MIDDLE)
    }

    /// Physical first side button state.
    pub fn is_side1(&self) -> Result<bool, DriverError> {
        self.button(hidlink_core::protocol::payload::button::SIDE1)
    }

    /// Physical second side button state.
    pub fn is_side2(&self) -> Result<bool, DriverError> {
        self.button(hidlink_core::protocol::payload::button::SIDE2)
    }

    fn button(&self, mask: u8) -> Result<bool, DriverError> {
        self.ensure_running()?;
        Ok(self.shared.lock_cell().mouse.is_down(mask))
    }

    /// Relative motion accumulated since the previous `motion()` call.
    ///
    /// Draining on read means two polls never report the same travel twice.
    pub fn motion(&self) -> Result<(i32, i32), DriverError> {
        self.ensure_running()?;
        let mut cell = self.shared.lock_cell();
        let motion = (cell.pending_x, cell.pending_y);
        cell.pending_x = 0;
        cell.pending_y = 0;
        Ok(motion)
    }

    /// Wheel travel accumulated since the previous `wheel()` call.
    pub fn wheel(&self) -> Result<i32, DriverError> {
        self.ensure_running()?;
        let mut cell = self.shared.lock_cell();
        let wheel = cell.pending_wheel;
        cell.pending_wheel = 0;
        Ok(wheel)
    }

    /// Whether `key` is physically held: a bitmask test for modifiers, a
    /// slot-membership test for ordinary keys.
    pub fn is_key_down(&self, key: HidKey) -> Result<bool, DriverError> {
        self.ensure_running()?;
        Ok(self.shared.lock_cell().keyboard.is_key_down(key))
    }

    /// Blocks until the next event is available.
    ///
    /// Returns `None` once the monitor has been stopped and the queue has
    /// drained.
    pub fn next_event(&self) -> Result<Option<MonitorEvent>, DriverError> {
        let events = self.events.as_ref().ok_or(DriverError::MonitorUnavailable)?;
        let mut rx = events.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rx.blocking_recv())
    }

    /// Returns the next queued event without blocking, or `None` when the
    /// queue is empty.
    pub fn try_next_event(&self) -> Result<Option<MonitorEvent>, DriverError> {
        let events = self.events.as_ref().ok_or(DriverError::MonitorUnavailable)?;
        let mut rx = events.lock().unwrap_or_else(PoisonError::into_inner);
        match rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Ok(None),
        }
    }

    fn ensure_running(&self) -> Result<(), DriverError> {
        if self.shared.state.load(Ordering::Relaxed) == RUNNING {
            Ok(())
        } else {
            Err(DriverError::MonitorUnavailable)
        }
    }
}

impl Drop for InputMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The receive loop executed on the monitor thread.
fn receive_loop(
    socket: UdpSocket,
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<MonitorEvent>,
) {
    let mut buf = [0u8; REPORT_BUFFER];

    while shared.state.load(Ordering::Relaxed) == RUNNING {
        let len = match socket.recv_from(&mut buf) {
            Ok((len, _src)) => len,
            Err(e) if is_timeout_error(&e) => {
                synthesize_neutral(&shared, &events);
                continue;
            }
            Err(e) => {
                // A hard socket failure is fatal for this monitor; it does
                // not restart itself.
                if shared.state.load(Ordering::Relaxed) == RUNNING {
                    error!("monitor socket failed: {e}");
                }
                break;
            }
        };

        let (mouse, keyboard) = match parse_report(&buf[..len]) {
            Ok(pair) => pair,
            Err(e) => {
                // One corrupt datagram must not interrupt the stream.
                debug!("dropping undecodable report: {e}");
                continue;
            }
        };

        let event = MonitorEvent {
            mouse,
            keyboard,
            at: Instant::now(),
        };
        {
            let mut cell = shared.lock_cell();
            cell.mouse = mouse;
            cell.keyboard = keyboard;
            cell.seen_report = true;
            cell.neutral_sent = false;
            cell.pending_x += i32::from(mouse.x);
            cell.pending_y += i32::from(mouse.y);
            cell.pending_wheel += i32::from(mouse.wheel);
        }
        // The receiver only disappears during stop(); nothing to do then.
        let _ = events.send(event);
    }

    info!("monitor receive loop exited");
}

/// Emits at most one neutral event per silence window.
fn synthesize_neutral(shared: &Shared, events: &mpsc::UnboundedSender<MonitorEvent>) {
    let event = {
        let mut cell = shared.lock_cell();
        if !cell.seen_report || cell.neutral_sent {
            return;
        }
        cell.mouse.x = 0;
        cell.mouse.y = 0;
        cell.neutral_sent = true;
        MonitorEvent {
            mouse: cell.mouse,
            keyboard: cell.keyboard,
            at: Instant::now(),
        }
    };
    let _ = events.send(event);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
