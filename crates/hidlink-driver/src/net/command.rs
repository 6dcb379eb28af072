//! The command channel: request/reply correlation over UDP.
//!
//! UDP offers no session concept, so nothing at the transport level ties a
//! reply to the request that caused it. The appliance's convention is to
//! echo the 16-byte request header at the front of its reply; the channel
//! therefore stamps every request with a fresh sequence number and accepts a
//! reply only if it carries the same command id, the same sequence number,
//! *and* arrived from the configured peer address. Anything else (a stale
//! reply from a call that already timed out, a datagram from a stranger, a
//! truncated header) is logged and counted as a failed outcome, never
//! mistaken for the real reply.
//!
//! # Oversized payloads
//!
//! A payload that does not fit in one 1500-byte datagram (in practice only
//! LCD frames) is split into successive chunks, each prefixed with the
//! *same* header: the sequence number identifies the logical command, while
//! each datagram remains independently subject to loss. Chunks go out
//! back-to-back with no per-chunk acknowledgment; the first send failure
//! aborts the remainder of the transfer.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use hidlink_core::{CommandId, DeviceId, PacketHeader, SequenceCounter, HEADER_SIZE};
use rand::Rng;
use tracing::{debug, warn};

use crate::error::DriverError;
use crate::net::is_timeout_error;

/// Largest datagram the appliance accepts.
pub const MAX_DATAGRAM: usize = 1500;

/// Payload bytes that fit in one datagram next to the 16-byte header.
pub const MAX_CHUNK_PAYLOAD: usize = MAX_DATAGRAM - HEADER_SIZE;

/// How long a single-datagram command waits for its reply.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

const REPLY_BUFFER: usize = 1024;

/// The outcome of one command call.
///
/// Timeouts and mismatches are ordinary data, not errors: callers branch on
/// the variant (or on [`CommandOutcome::accepted`]) rather than catching
/// anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The appliance acknowledged the command; the raw reply is included.
    Accepted(Vec<u8>),
    /// No reply arrived within the timeout window.
    TimedOut,
    /// A reply arrived but its header or origin did not match this call.
    Mismatched,
}

impl CommandOutcome {
    /// Returns whether the command was acknowledged.
    pub fn accepted(&self) -> bool {
        matches!(self, CommandOutcome::Accepted(_))
    }

    /// The raw reply bytes; empty unless the command was accepted.
    pub fn reply(&self) -> &[u8] {
        match self {
            CommandOutcome::Accepted(bytes) => bytes,
            _ => &[],
        }
    }
}

/// Owns the outbound socket, the peer address, and the session sequence
/// counter; performs the send/await-reply/validate cycle.
///
/// [`CommandChannel::send`] takes `&mut self`: the reply-matching logic
/// supports exactly one in-flight call, and exclusive access makes
/// overlapping calls a compile error instead of a race.
pub struct CommandChannel {
    socket: UdpSocket,
    peer: SocketAddr,
    identity: DeviceId,
    sequence: SequenceCounter,
}

impl CommandChannel {
    /// Binds an ephemeral local socket pointed at `peer`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::BindFailed`] if no socket can be bound, or
    /// [`DriverError::Socket`] if the receive timeout cannot be applied.
    pub fn open(
        peer: SocketAddr,
        identity: DeviceId,
        timeout: Duration,
    ) -> Result<Self, DriverError> {
        let addr: SocketAddr = (Ipv4Addr::UNSPECIFIED, 0).into();
        let socket =
            UdpSocket::bind(addr).map_err(|source| DriverError::BindFailed { addr, source })?;
        socket
            .set_read_timeout(Some(timeout))
            .map_err(|source| DriverError::Socket { peer, source })?;
        Ok(Self {
            socket,
            peer,
            identity,
            sequence: SequenceCounter::new(),
        })
    }

    /// The appliance address this channel talks to.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The local address of the outbound socket.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// The sequence number of the most recent send.
    pub fn last_sequence(&self) -> u32 {
        self.sequence.current()
    }

    /// Sends one command and waits for the matching reply.
    ///
    /// The sequence counter advances before the send and is never rolled
    /// back, so a failed call still burns its number. When `nonce_override`
    /// is `None` the nonce field carries a random 31-bit value; commands
    /// that smuggle auxiliary data through the nonce pass `Some`.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Socket`] for transport-level failures; those
    /// are terminal for this call only. Timeouts and mismatched replies are
    /// reported through the returned [`CommandOutcome`].
    pub fn send(
        &mut self,
        command: CommandId,
        payload: &[u8],
        nonce_override: Option<u32>,
    ) -> Result<CommandOutcome, DriverError> {
        let sequence = self.sequence.next();
        let nonce =
            nonce_override.unwrap_or_else(|| rand::thread_rng().gen_range(0..=0x7FFF_FFFF));
        let header = PacketHeader {
            identity: self.identity.as_u32(),
            nonce,
            sequence,
            command: command as u32,
        };
        let header_bytes = header.to_bytes();

        if HEADER_SIZE + payload.len() > MAX_DATAGRAM {
            return self.send_chunked(&header_bytes, payload);
        }

        let mut datagram = Vec::with_capacity(HEADER_SIZE + payload.len());
        datagram.extend_from_slice(&header_bytes);
        datagram.extend_from_slice(payload);
        self.socket
            .send_to(&datagram, self.peer)
            .map_err(|source| DriverError::Socket {
                peer: self.peer,
                source,
            })?;

        self.await_reply(command, sequence)
    }

    /// Sends an oversized payload as back-to-back chunks sharing one header.
    ///
    /// Multi-datagram transfers are not acknowledged per chunk, so the call
    /// reports acceptance purely on send success.
    fn send_chunked(
        &self,
        header: &[u8; HEADER_SIZE],
        payload: &[u8],
    ) -> Result<CommandOutcome, DriverError> {
        let chunk_count = payload.len().div_ceil(MAX_CHUNK_PAYLOAD);
        debug!(
            bytes = payload.len(),
            chunks = chunk_count,
            "splitting oversized payload"
        );

        let mut datagram = Vec::with_capacity(MAX_DATAGRAM);
        for chunk in payload.chunks(MAX_CHUNK_PAYLOAD) {
            datagram.clear();
            datagram.extend_from_slice(header);
            datagram.extend_from_slice(chunk);
            self.socket
                .send_to(&datagram, self.peer)
                .map_err(|source| DriverError::Socket {
                    peer: self.peer,
                    source,
                })?;
        }

        Ok(CommandOutcome::Accepted(Vec::new()))
    }

    /// Receives one datagram and validates it against the in-flight call.
    fn await_reply(
        &self,
        command: CommandId,
        sequence: u32,
    ) -> Result<CommandOutcome, DriverError> {
        let mut buf = [0u8; REPLY_BUFFER];
        let (len, src) = match self.socket.recv_from(&mut buf) {
            Ok(pair) => pair,
            Err(e) if is_timeout_error(&e) => {
                debug!(?command, sequence, "no reply within the timeout window");
                return Ok(CommandOutcome::TimedOut);
            }
            Err(source) => {
                return Err(DriverError::Socket {
                    peer: self.peer,
                    source,
                })
            }
        };

        if src != self.peer {
            warn!(%src, expected = %self.peer, "discarding reply from unexpected origin");
            return Ok(CommandOutcome::Mismatched);
        }

        let reply = match PacketHeader::parse(&buf[..len]) {
            Ok(header) => header,
            Err(e) => {
                warn!("discarding malformed reply: {e}");
                return Ok(CommandOutcome::Mismatched);
            }
        };

        if reply.command != command as u32 || reply.sequence != sequence {
            warn!(
                reply_command = format_args!("{:#010X}", reply.command),
                reply_sequence = reply.sequence,
                expected_sequence = sequence,
                "discarding reply that does not match the in-flight command"
            );
            return Ok(CommandOutcome::Mismatched);
        }

        Ok(CommandOutcome::Accepted(buf[..len].to_vec()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_payload_capacity_is_wire_accurate() {
        assert_eq!(MAX_CHUNK_PAYLOAD, 1484);
        // One byte over a single datagram's payload capacity needs 2 chunks.
        assert_eq!((MAX_CHUNK_PAYLOAD + 1).div_ceil(MAX_CHUNK_PAYLOAD), 2);
        // A full 128×160 RGB565 LCD frame needs 28.
        assert_eq!(40960usize.div_ceil(MAX_CHUNK_PAYLOAD), 28);
    }

    #[test]
    fn test_outcome_accepted_exposes_reply() {
        let outcome = CommandOutcome::Accepted(vec![1, 2, 3]);

        assert!(outcome.accepted());
        assert_eq!(outcome.reply(), &[1, 2, 3]);
    }

    #[test]
    fn test_failed_outcomes_have_empty_reply() {
        assert!(!CommandOutcome::TimedOut.accepted());
        assert!(!CommandOutcome::Mismatched.accepted());
        assert!(CommandOutcome::TimedOut.reply().is_empty());
        assert!(CommandOutcome::Mismatched.reply().is_empty());
    }

    #[test]
    fn test_open_binds_an_ephemeral_socket() {
        let peer: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let identity = DeviceId::from_hex("00000001").unwrap();

        let channel =
            CommandChannel::open(peer, identity, DEFAULT_COMMAND_TIMEOUT).expect("open must bind");

        assert_eq!(channel.peer(), peer);
        assert_ne!(channel.local_addr().unwrap().port(), 0);
        assert_eq!(channel.last_sequence(), 0, "nothing sent yet");
    }
}
