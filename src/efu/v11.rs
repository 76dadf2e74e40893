//! Protocol v1.1: header, then every chunk acknowledged with "OK" before the
//! next one goes out. No trailer; integrity is left to the device.

use std::io::{Read, Write};
use tracing::{debug, error, info};

use super::error::{Result, UploadError};
use super::image::FirmwareImage;
use super::io::read_ack;
use super::protocol::{build_header, ProtocolVersion, ACK_OK, CHUNK_SIZE};
use super::Progress;

/// Position in the v1.1 exchange. Offsets are image byte positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    /// Next chunk begins at `offset`
    Sending { offset: usize },
    /// Chunk ending at `offset` is waiting for "OK"
    AwaitChunkAck { offset: usize },
    Done,
}

/// One v1.1 upload over any byte stream
pub struct Session<S> {
    stream: S,
    chunk_size: usize,
    state: State,
}

impl<S: Read + Write> Session<S> {
    pub fn new(stream: S) -> Self {
        Session {
            stream,
            chunk_size: CHUNK_SIZE,
            state: State::Start,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    pub fn run<F: FnMut(Progress)>(&mut self, image: &FirmwareImage, mut progress: F) -> Result<()> {
        while self.state != State::Done {
            self.state = self.step(image, &mut progress)?;
        }
        Ok(())
    }

    fn step<F: FnMut(Progress)>(&mut self, image: &FirmwareImage, progress: &mut F) -> Result<State> {
        let data = image.data();
        match self.state {
            State::Start => {
                let header = build_header(ProtocolVersion::V11, image.size());
                self.stream.write_all(&header)?;
                debug!("Header sent: {:02X?}", header);
                if data.is_empty() {
                    Ok(State::Done)
                } else {
                    Ok(State::Sending { offset: 0 })
                }
            }
            State::Sending { offset } => {
                let end = (offset + self.chunk_size).min(data.len());
                self.stream.write_all(&data[offset..end])?;
                self.stream.flush()?;
                debug!("Chunk at {} ({} bytes) sent", offset, end - offset);
                Ok(State::AwaitChunkAck { offset: end })
            }
            State::AwaitChunkAck { offset } => {
                read_ack(&mut self.stream, ACK_OK).map_err(|failure| {
                    error!("No ACK for chunk ending at {}: {}", offset, failure);
                    UploadError::ChunkAck { offset, failure }
                })?;
                progress(Progress::Sent {
                    sent: offset,
                    total: data.len(),
                });

                if offset >= data.len() {
                    info!("All {} bytes acknowledged", data.len());
                    Ok(State::Done)
                } else {
                    Ok(State::Sending { offset })
                }
            }
            State::Done => Ok(State::Done),
        }
    }
}
