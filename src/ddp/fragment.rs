//! DDP fragment header and frame fragmentation.

use std::slice::Chunks;

pub const DDP_PORT: u16 = 4048;
pub const HEADER_LEN: usize = 10;
/// Keeps each datagram under ~1450 bytes; the controller accepts no more
pub const MAX_CHUNK_SIZE: usize = 1242;

/// Set on every fragment
pub const FLAG_MARKER: u8 = 0x40;
/// Set on the final fragment of a frame
pub const FLAG_PUSH: u8 = 0x01;

/// Fixed 10-byte header preceding each fragment's pixel bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentHeader {
    pub flags1: u8,
    pub flags2: u8,
    pub data_type: u16,
    /// Byte offset of this fragment within the frame
    pub offset: u32,
    pub length: u16,
}

impl FragmentHeader {
    pub fn new(offset: u32, length: u16, push: bool) -> Self {
        let flags1 = if push { FLAG_MARKER | FLAG_PUSH } else { FLAG_MARKER };
        FragmentHeader {
            flags1,
            flags2: 0,
            data_type: 0,
            offset,
            length,
        }
    }

    pub fn is_push(&self) -> bool {
        self.flags1 & FLAG_PUSH != 0
    }

    /// Big-endian wire layout: flags1, flags2, dtype, offset, length
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[0] = self.flags1;
        header[1] = self.flags2;
        header[2..4].copy_from_slice(&self.data_type.to_be_bytes());
        header[4..8].copy_from_slice(&self.offset.to_be_bytes());
        header[8..10].copy_from_slice(&self.length.to_be_bytes());
        header
    }
}

/// Lazily yields `(header, chunk)` pairs covering a frame in ascending offset order
pub struct Fragments<'a> {
    chunks: Chunks<'a, u8>,
    offset: usize,
    total: usize,
}

impl<'a> Iterator for Fragments<'a> {
    type Item = (FragmentHeader, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.chunks.next()?;
        let offset = self.offset;
        self.offset += chunk.len();

        let header = FragmentHeader::new(offset as u32, chunk.len() as u16, self.offset >= self.total);
        Some((header, chunk))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Fragments<'_> {}

/// Split `payload` into fragments of at most `chunk_size` bytes.
///
/// # Panics
///
/// Panics if `chunk_size` is 0 or larger than `u16::MAX`, or if the payload
/// is longer than a 32-bit offset can address.
pub fn fragment(payload: &[u8], chunk_size: usize) -> Fragments<'_> {
    assert!(
        (1..=u16::MAX as usize).contains(&chunk_size),
        "DDP chunk size {} out of range",
        chunk_size
    );
    assert!(u32::try_from(payload.len()).is_ok(), "DDP frame too large");

    Fragments {
        chunks: payload.chunks(chunk_size),
        offset: 0,
        total: payload.len(),
    }
}

/// Header followed immediately by the chunk bytes
pub fn encode_fragment(header: &FragmentHeader, chunk: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(HEADER_LEN + chunk.len());
    packet.extend_from_slice(&header.encode());
    packet.extend_from_slice(chunk);
    packet
}
