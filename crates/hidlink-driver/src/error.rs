//! Error type for the driver crate.
//!
//! Only conditions that are fatal for a call (or for session construction)
//! live here. A command that timed out or drew a mismatched reply is *not*
//! an error; it is an ordinary outcome of talking over a lossy link, and it
//! is reported as data via [`crate::net::command::CommandOutcome`] so that
//! callers branch on it instead of catching it.

use std::net::SocketAddr;

use hidlink_core::IdentityError;
use thiserror::Error;

/// Errors surfaced by the driver crate.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The configured device identity string is malformed.
    #[error("invalid device identity: {0}")]
    Identity(#[from] IdentityError),

    /// The configured appliance address could not be parsed.
    #[error("invalid appliance address: {value}")]
    InvalidAddress { value: String },

    /// A UDP socket could not be bound.
    #[error("failed to bind UDP socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The socket failed while sending to or receiving from the appliance.
    #[error("socket error talking to {peer}: {source}")]
    Socket {
        peer: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The appliance did not accept the connect handshake.
    #[error("appliance at {peer} rejected the connect handshake")]
    HandshakeFailed { peer: SocketAddr },

    /// The appliance refused to start streaming hardware reports.
    #[error("appliance refused to start the report stream")]
    MonitorRefused,

    /// A monitor query was issued but no monitor is running.
    #[error("input monitor is not running")]
    MonitorUnavailable,

    /// An LCD frame of the wrong size was submitted.
    #[error("LCD frame must be {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },
}
