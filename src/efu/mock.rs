//! Scripted device stand-in for exercising upload sessions without a socket.

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};

use super::protocol::HEADER_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Sent(Vec<u8>),
    Received(Vec<u8>),
}

/// Answers reads from a fixed reply script and logs every read and write in order.
///
/// Once the script is drained a read fails with `TimedOut`, or returns EOF
/// when built with `closing`.
pub(crate) struct ScriptedPeer {
    replies: VecDeque<u8>,
    eof_when_drained: bool,
    pub events: Vec<Event>,
}

impl ScriptedPeer {
    pub fn new(replies: &[&[u8]]) -> Self {
        ScriptedPeer {
            replies: replies.iter().flat_map(|r| r.iter().copied()).collect(),
            eof_when_drained: false,
            events: Vec::new(),
        }
    }

    pub fn closing(replies: &[&[u8]]) -> Self {
        ScriptedPeer {
            eof_when_drained: true,
            ..Self::new(replies)
        }
    }

    /// Everything written after the header, concatenated
    pub fn payload(&self) -> Vec<u8> {
        let mut sent: Vec<u8> = self
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Sent(bytes) => Some(bytes.as_slice()),
                Event::Received(_) => None,
            })
            .flatten()
            .copied()
            .collect();
        sent.drain(..HEADER_SIZE.min(sent.len()));
        sent
    }
}

impl Read for ScriptedPeer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.replies.is_empty() {
            if self.eof_when_drained {
                return Ok(0);
            }
            return Err(io::Error::new(ErrorKind::TimedOut, "no scripted reply"));
        }

        let n = buf.len().min(self.replies.len());
        let bytes: Vec<u8> = self.replies.drain(..n).collect();
        buf[..n].copy_from_slice(&bytes);
        self.events.push(Event::Received(bytes));
        Ok(n)
    }
}

impl Write for ScriptedPeer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.events.push(Event::Sent(buf.to_vec()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
