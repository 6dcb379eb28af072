//! Socket-facing components: the command channel and the input monitor.

pub mod command;
pub mod monitor;

pub use command::{CommandChannel, CommandOutcome};
pub use monitor::{InputMonitor, MonitorEvent};

/// Returns `true` for OS timeout / would-block errors that a timed receive
/// produces when nothing arrived.
pub(crate) fn is_timeout_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
