//! Upload error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why an acknowledgement read did not produce the expected token.
#[derive(Error, Debug)]
pub enum AckFailure {
    /// Peer answered with a different token
    #[error(
        "expected \"{}\", received \"{}\" {:02X?}",
        .expected.escape_ascii(),
        .received.escape_ascii(),
        .received
    )]
    Mismatch { expected: [u8; 2], received: [u8; 2] },

    /// Read timeout expired
    #[error("timed out waiting for acknowledgement")]
    TimedOut,

    /// Peer closed the connection before two bytes arrived
    #[error("connection closed by device")]
    Closed,

    #[error("read failed: {0}")]
    Io(io::Error),
}

/// Errors that abort a firmware upload. None of them are retried.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Image file could not be read
    #[error("Failed to read firmware image {}", .path.display())]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    /// Image does not fit the 32-bit size field
    #[error("Firmware image is {size} bytes, more than the header size field can carry")]
    ImageTooLarge { size: usize },

    /// Resolve or connect failed
    #[error("Failed to connect to {addr}")]
    Connect { addr: String, source: io::Error },

    /// Socket failure while sending
    #[error("Connection error: {0}")]
    Io(#[from] io::Error),

    #[error("No ACK after header: {0}")]
    HeaderAck(AckFailure),

    #[error("No ACK after data transferred: {0}")]
    DataAck(AckFailure),

    #[error("No ACK after CRC trailer: {0}")]
    CrcAck(AckFailure),

    /// `offset` is the stream position reached when the ack was due
    #[error("No ACK for chunk ending at offset {offset}: {failure}")]
    ChunkAck { offset: usize, failure: AckFailure },
}

/// Result type for upload operations
pub type Result<T> = std::result::Result<T, UploadError>;
