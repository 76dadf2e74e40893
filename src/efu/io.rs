//! Socket setup and acknowledgement reads.

use std::io::{self, ErrorKind, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info};

use super::error::{AckFailure, Result, UploadError};
use super::protocol::ACK_LEN;

/// Connect to the device, trying each resolved address in turn.
///
/// The same timeout bounds the connect, every read and every write.
pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream> {
    let addr = format!("{}:{}", host, port);
    info!("Connecting to {} (timeout={:?})", addr, timeout);

    let resolved = (host, port)
        .to_socket_addrs()
        .map_err(|source| UploadError::Connect { addr: addr.clone(), source })?;

    let mut last_error = None;
    for socket_addr in resolved {
        match TcpStream::connect_timeout(&socket_addr, timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                info!("Connected to {}", socket_addr);
                return Ok(stream);
            }
            Err(e) => {
                debug!("Connect to {} failed: {}", socket_addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(UploadError::Connect {
        addr,
        source: last_error
            .unwrap_or_else(|| io::Error::new(ErrorKind::NotFound, "host resolved to no addresses")),
    })
}

/// Read one 2-byte token and compare it with `expected`
pub fn read_ack<R: Read>(reader: &mut R, expected: [u8; ACK_LEN]) -> std::result::Result<(), AckFailure> {
    let mut received = [0u8; ACK_LEN];
    match reader.read_exact(&mut received) {
        Ok(()) if received == expected => {
            debug!("ACK \"{}\"", received.escape_ascii());
            Ok(())
        }
        Ok(()) => Err(AckFailure::Mismatch { expected, received }),
        // Unix reports an expired SO_RCVTIMEO as WouldBlock, Windows as TimedOut
        Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
            Err(AckFailure::TimedOut)
        }
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(AckFailure::Closed),
        Err(e) => Err(AckFailure::Io(e)),
    }
}
