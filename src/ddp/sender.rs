use anyhow::{Context, Result};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::fragment::{encode_fragment, fragment};
use crate::pacing::Pacer;

/// Destination for encoded DDP datagrams
pub trait DatagramSink {
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<usize>;
}

impl<T: DatagramSink + ?Sized> DatagramSink for &mut T {
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<usize> {
        (**self).send_datagram(packet)
    }
}

/// Unconnected UDP socket bound to an ephemeral port, sending to one controller
pub struct UdpTarget {
    socket: UdpSocket,
    addr: SocketAddr,
}

impl UdpTarget {
    pub fn open(host: &str, port: u16) -> Result<Self> {
        let addr = (host, port)
            .to_socket_addrs()
            .context(format!("Failed to resolve {}:{}", host, port))?
            .next()
            .context(format!("{}:{} resolved to no addresses", host, port))?;

        let bind_addr = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr)
            .context(format!("Failed to bind UDP socket on {}", bind_addr))?;

        debug!("DDP target {}", addr);
        Ok(UdpTarget { socket, addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl DatagramSink for UdpTarget {
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<usize> {
        self.socket.send_to(packet, self.addr)
    }
}

/// What happened to one frame on the sending side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub fragments: usize,
    pub bytes: usize,
    /// Datagrams the local stack refused; delivery is never confirmed
    pub failed: usize,
}

/// Fire-and-forget DDP frame sender
pub struct DdpSender<S, P> {
    sink: S,
    pacer: P,
    chunk_size: usize,
    fragment_delay: Duration,
    frames_sent: u64,
}

impl<S: DatagramSink, P: Pacer> DdpSender<S, P> {
    /// `chunk_size` is clamped to `1..=u16::MAX`, the range a fragment
    /// length field can carry
    pub fn new(sink: S, pacer: P, chunk_size: usize, fragment_delay: Duration) -> Self {
        DdpSender {
            sink,
            pacer,
            chunk_size: chunk_size.clamp(1, u16::MAX as usize),
            fragment_delay,
            frames_sent: 0,
        }
    }

    /// Fragment `payload` and send each piece as its own datagram, pacing
    /// between fragments. Send failures are logged and counted, never retried.
    pub fn send_frame(&mut self, payload: &[u8]) -> FrameReport {
        let mut report = FrameReport::default();

        for (index, (header, chunk)) in fragment(payload, self.chunk_size).enumerate() {
            if index > 0 {
                self.pacer.pause(self.fragment_delay);
            }

            let packet = encode_fragment(&header, chunk);
            trace!("DDP header: {:02X?}", header.encode());

            match self.sink.send_datagram(&packet) {
                Ok(sent) => debug!(
                    "Sent DDP fragment #{} offset={}, length={}, packet={} bytes (sent={})",
                    index,
                    header.offset,
                    header.length,
                    packet.len(),
                    sent
                ),
                Err(e) => {
                    warn!("DDP fragment #{} at offset {} not sent: {}", index, header.offset, e);
                    report.failed += 1;
                }
            }

            report.fragments += 1;
            report.bytes += chunk.len();
        }

        self.frames_sent += 1;
        report
    }

    /// Delay through the sender's pacer, used for inter-frame timing
    pub fn pause(&mut self, duration: Duration) {
        self.pacer.pause(duration);
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }
}
