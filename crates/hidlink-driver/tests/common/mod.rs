//! Shared fixtures for the driver integration tests.
//!
//! `FakeAppliance` is a plain UDP socket standing in for the real hardware:
//! tests script exactly which datagrams it acknowledges, drops, or answers
//! with corrupted headers.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use hidlink_core::{PacketHeader, HEADER_SIZE};

/// Initialise test logging once; safe to call from every test.
#[allow(dead_code)]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_test_writer()
        .try_init()
        .ok();
}

/// A scripted stand-in for the appliance on a loopback socket.
pub struct FakeAppliance {
    socket: UdpSocket,
}

#[allow(dead_code)]
impl FakeAppliance {
    /// Binds the fake appliance on an ephemeral loopback port.
    pub fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("fake appliance bind");
        socket
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set fake appliance timeout");
        Self { socket }
    }

    /// The address the driver should treat as the appliance.
    pub fn addr(&self) -> SocketAddr {
        self.socket.local_addr().expect("fake appliance addr")
    }

    /// Receives one command datagram, split into header and payload.
    pub fn recv_command(&self) -> (PacketHeader, Vec<u8>, SocketAddr) {
        let mut buf = [0u8; 2048];
        let (len, src) = self.socket.recv_from(&mut buf).expect("fake appliance recv");
        let header = PacketHeader::parse(&buf[..len]).expect("command header");
        (header, buf[HEADER_SIZE..len].to_vec(), src)
    }

    /// Receives one raw datagram, or `None` after `timeout` of silence.
    pub fn try_recv_raw(&self, timeout: Duration) -> Option<(Vec<u8>, SocketAddr)> {
        self.socket
            .set_read_timeout(Some(timeout))
            .expect("set fake appliance timeout");
        let mut buf = [0u8; 2048];
        match self.socket.recv_from(&mut buf) {
            Ok((len, src)) => Some((buf[..len].to_vec(), src)),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                None
            }
            Err(e) => panic!("fake appliance recv failed: {e}"),
        }
    }

    /// Acknowledges a command the way the firmware does: echoes its header.
    pub fn ack(&self, header: &PacketHeader, to: SocketAddr) {
        self.socket
            .send_to(&header.to_bytes(), to)
            .expect("fake appliance ack");
    }

    /// Sends an arbitrary (possibly bogus) reply.
    pub fn send_raw(&self, bytes: &[u8], to: SocketAddr) {
        self.socket
            .send_to(bytes, to)
            .expect("fake appliance send");
    }

    /// Spawns a thread that acknowledges the next `count` commands and
    /// returns what it saw.
    pub fn spawn_acker(
        self,
        count: usize,
    ) -> std::thread::JoinHandle<Vec<(PacketHeader, Vec<u8>)>> {
        std::thread::spawn(move || {
            let mut seen = Vec::with_capacity(count);
            for _ in 0..count {
                let (header, payload, src) = self.recv_command();
                self.ack(&header, src);
                seen.push((header, payload));
            }
            seen
        })
    }
}
