//! Transport abstraction for the coordinator link
//!
//! The command channel talks to a [`LineTransport`]: an ordered byte
//! stream framed into newline-terminated lines. Telemetry goes out through
//! a [`DatagramTransport`]. Both are polled from the single control loop,
//! so implementations must never block.
//!
//! ```text
//! CommandChannel ──LineTransport──────▶ TcpLineTransport | MockLineTransport
//! TelemetryChannel ─DatagramTransport─▶ UdpDatagramTransport | MockDatagramTransport
//! ```

pub mod mock;
pub mod tcp;
pub mod udp;

use std::collections::VecDeque;
use std::io;

pub use mock::{MockDatagramTransport, MockLineTransport};
pub use tcp::TcpLineTransport;
pub use udp::UdpDatagramTransport;

/// Longest accepted line, excluding the terminating newline
pub const MAX_LINE_LEN: usize = 1024;

/// Transport failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection closed by peer")]
    Disconnected,

    #[error("Address {0} did not resolve")]
    Unresolved(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One framed unit read from a line transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A complete line without its terminator
    Line(String),
    /// A line longer than [`MAX_LINE_LEN`]; its bytes were discarded
    Oversized { len: usize },
}

/// Newline-framed, non-blocking stream transport
pub trait LineTransport {
    /// True while the peer connection is usable
    fn is_connected(&self) -> bool;

    /// Next complete line, if one has arrived
    ///
    /// Returns `Ok(None)` when nothing is buffered or the transport is not
    /// connected. `Err(Disconnected)` is returned once when the peer closes.
    fn poll_line(&mut self) -> Result<Option<Incoming>, TransportError>;

    /// Write `line` followed by a newline
    fn write_line(&mut self, line: &str) -> Result<(), TransportError>;
}

/// Fire-and-forget datagram transport
pub trait DatagramTransport {
    /// Send one datagram to the configured destination
    fn send_datagram(&mut self, payload: &[u8]) -> Result<(), TransportError>;
}

/// Splits a byte stream into lines
///
/// A line that grows past [`MAX_LINE_LEN`] is dropped up to its newline and
/// reported as [`Incoming::Oversized`]. A trailing `\r` is stripped.
#[derive(Debug, Default)]
pub struct LineBuffer {
    partial: Vec<u8>,
    discarding: Option<usize>,
    ready: VecDeque<Incoming>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes
    pub fn extend(&mut self, data: &[u8]) {
        for &byte in data {
            if byte == b'\n' {
                self.finish_line();
            } else if let Some(len) = self.discarding.as_mut() {
                *len += 1;
            } else if self.partial.len() >= MAX_LINE_LEN {
                self.discarding = Some(self.partial.len() + 1);
                self.partial.clear();
            } else {
                self.partial.push(byte);
            }
        }
    }

    /// Take the oldest complete line
    pub fn next_line(&mut self) -> Option<Incoming> {
        self.ready.pop_front()
    }

    /// Complete lines waiting to be taken
    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    /// True if bytes of an unterminated line are held
    pub fn has_partial(&self) -> bool {
        !self.partial.is_empty() || self.discarding.is_some()
    }

    pub fn clear(&mut self) {
        self.partial.clear();
        self.discarding = None;
        self.ready.clear();
    }

    fn finish_line(&mut self) {
        if let Some(len) = self.discarding.take() {
            self.ready.push_back(Incoming::Oversized { len });
            return;
        }
        if self.partial.last() == Some(&b'\r') {
            self.partial.pop();
        }
        let line = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial.clear();
        self.ready.push_back(Incoming::Line(line));
    }
}
