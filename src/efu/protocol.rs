//! EFU wire constants, header encoding and chunking.

use std::fmt;

/// Magic bytes opening every upload header
pub const STAMP: [u8; 3] = [0xD1, 0x36, 0x4A];
pub const HEADER_SIZE: usize = 8;
/// Must match the device receive buffer
pub const CHUNK_SIZE: usize = 2048;

pub const ACK_LEN: usize = 2;
pub const ACK_HEADER: [u8; ACK_LEN] = *b"HD";
pub const ACK_OK: [u8; ACK_LEN] = *b"OK";
pub const ACK_CRC: [u8; ACK_LEN] = *b"CC";

/// Upload protocol revision, carried in header byte 3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    /// Per-chunk "OK", no trailer
    V11,
    /// "HD" / "OK" / "CC" checkpoints and a CRC32 trailer
    V12,
}

impl ProtocolVersion {
    pub fn byte(self) -> u8 {
        match self {
            ProtocolVersion::V11 => 0x11,
            ProtocolVersion::V12 => 0x12,
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            ProtocolVersion::V11 => 4242,
            ProtocolVersion::V12 => 4243,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V11 => write!(f, "v1.1"),
            ProtocolVersion::V12 => write!(f, "v1.2"),
        }
    }
}

/// Build the 8-byte upload header: stamp, version, big-endian image size
pub fn build_header(version: ProtocolVersion, size: u32) -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0..3].copy_from_slice(&STAMP);
    header[3] = version.byte();
    header[4..8].copy_from_slice(&size.to_be_bytes());
    header
}

/// Split an image into `(offset, chunk)` pairs in ascending offset order.
///
/// # Panics
///
/// Panics if `chunk_size` is 0.
pub fn chunks(data: &[u8], chunk_size: usize) -> impl Iterator<Item = (usize, &[u8])> {
    data.chunks(chunk_size)
        .enumerate()
        .map(move |(index, chunk)| (index * chunk_size, chunk))
}
