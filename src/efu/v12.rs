//! Protocol v1.2: header, erase countdown, unacknowledged chunk stream,
//! CRC32 trailer, with three acknowledgement checkpoints.

use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, error, info};

use super::error::{Result, UploadError};
use super::image::FirmwareImage;
use super::io::read_ack;
use super::protocol::{build_header, chunks, ProtocolVersion, ACK_CRC, ACK_HEADER, ACK_OK, CHUNK_SIZE};
use super::Progress;
use crate::pacing::Pacer;

/// Position in the v1.2 exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    AwaitHeaderAck,
    Sending,
    AwaitDataAck,
    AwaitCrcAck,
    Done,
}

/// One v1.2 upload over any byte stream.
///
/// After an error `state()` still names the stage that failed.
pub struct Session<S, P> {
    stream: S,
    pacer: P,
    chunk_size: usize,
    erase_wait_secs: u32,
    state: State,
}

impl<S: Read + Write, P: Pacer> Session<S, P> {
    pub fn new(stream: S, pacer: P) -> Self {
        Session {
            stream,
            pacer,
            chunk_size: CHUNK_SIZE,
            erase_wait_secs: 0,
            state: State::Start,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Countdown shown between the header and the "HD" read.
    ///
    /// Advisory only: the device may answer before or after its erase, and
    /// the blocking read with timeout is what decides success.
    pub fn with_erase_wait(mut self, secs: u32) -> Self {
        self.erase_wait_secs = secs;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Drive the exchange to `Done` or the first failure
    pub fn run<F: FnMut(Progress)>(&mut self, image: &FirmwareImage, mut progress: F) -> Result<()> {
        while self.state != State::Done {
            self.state = self.step(image, &mut progress)?;
        }
        Ok(())
    }

    fn step<F: FnMut(Progress)>(&mut self, image: &FirmwareImage, progress: &mut F) -> Result<State> {
        match self.state {
            State::Start => {
                let header = build_header(ProtocolVersion::V12, image.size());
                self.stream.write_all(&header)?;
                self.stream.flush()?;
                debug!("Header sent: {:02X?}", header);

                for remaining in (1..=self.erase_wait_secs).rev() {
                    progress(Progress::EraseWait { remaining });
                    self.pacer.pause(Duration::from_secs(1));
                }
                Ok(State::AwaitHeaderAck)
            }
            State::AwaitHeaderAck => {
                read_ack(&mut self.stream, ACK_HEADER).map_err(|failure| {
                    error!("No ACK after header: {}", failure);
                    UploadError::HeaderAck(failure)
                })?;
                info!("Header acknowledged");
                Ok(State::Sending)
            }
            State::Sending => {
                let total = image.data().len();
                for (offset, chunk) in chunks(image.data(), self.chunk_size) {
                    self.stream.write_all(chunk)?;
                    let sent = offset + chunk.len();
                    debug!("Chunk at {} ({} bytes) sent", offset, chunk.len());
                    progress(Progress::Sent { sent, total });
                }
                self.stream.flush()?;
                Ok(State::AwaitDataAck)
            }
            State::AwaitDataAck => {
                read_ack(&mut self.stream, ACK_OK).map_err(|failure| {
                    error!("No ACK after data transferred: {}", failure);
                    UploadError::DataAck(failure)
                })?;

                let crc = image.crc32();
                self.stream.write_all(&crc.to_be_bytes())?;
                self.stream.flush()?;
                debug!("CRC32 trailer {:08X} sent", crc);
                Ok(State::AwaitCrcAck)
            }
            State::AwaitCrcAck => {
                read_ack(&mut self.stream, ACK_CRC).map_err(|failure| {
                    error!("No ACK after CRC trailer: {}", failure);
                    UploadError::CrcAck(failure)
                })?;
                info!("CRC acknowledged");
                Ok(State::Done)
            }
            State::Done => Ok(State::Done),
        }
    }
}
