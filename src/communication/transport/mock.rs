//! In-memory transports for tests
//!
//! - [`MockLineTransport`]: feed inbound bytes, inspect written lines
//! - [`MockDatagramTransport`]: records every datagram

use super::{DatagramTransport, Incoming, LineBuffer, LineTransport, TransportError};

/// Line transport backed by a [`LineBuffer`]
#[derive(Debug)]
pub struct MockLineTransport {
    inbound: LineBuffer,
    written: Vec<String>,
    connected: bool,
    fail_writes: bool,
    polls: usize,
}

impl MockLineTransport {
    /// Connected transport with nothing to read
    pub fn new() -> Self {
        Self {
            inbound: LineBuffer::new(),
            written: Vec::new(),
            connected: true,
            fail_writes: false,
            polls: 0,
        }
    }

    /// Transport that reports itself disconnected
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::new()
        }
    }

    /// Queue raw bytes as if received from the peer
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.inbound.extend(data);
    }

    /// Queue one line; the newline is appended
    pub fn push_line(&mut self, line: &str) {
        self.inbound.extend(line.as_bytes());
        self.inbound.extend(b"\n");
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Make every following write fail
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Lines written so far, without newlines
    pub fn written(&self) -> &[String] {
        &self.written
    }

    /// Take and clear the written lines
    pub fn take_written(&mut self) -> Vec<String> {
        std::mem::take(&mut self.written)
    }

    /// Complete lines not yet polled
    pub fn unread(&self) -> usize {
        self.inbound.ready_count()
    }

    /// Number of `poll_line` calls
    pub fn polls(&self) -> usize {
        self.polls
    }
}

impl Default for MockLineTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LineTransport for MockLineTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn poll_line(&mut self) -> Result<Option<Incoming>, TransportError> {
        self.polls += 1;
        if !self.connected {
            return Ok(None);
        }
        Ok(self.inbound.next_line())
    }

    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        if self.fail_writes {
            return Err(TransportError::Disconnected);
        }
        self.written.push(line.to_string());
        Ok(())
    }
}

/// Datagram transport that records payloads
#[derive(Debug, Default)]
pub struct MockDatagramTransport {
    sent: Vec<Vec<u8>>,
    fail_sends: bool,
}

impl MockDatagramTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail
    pub fn set_fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }

    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Last payload decoded as UTF-8
    pub fn last_text(&self) -> Option<String> {
        self.sent
            .last()
            .map(|payload| String::from_utf8_lossy(payload).into_owned())
    }
}

impl DatagramTransport for MockDatagramTransport {
    fn send_datagram(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::NotConnected);
        }
        self.sent.push(payload.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_line_round_trip() {
        let mut transport = MockLineTransport::new();
        transport.push_line("hello");
        assert_eq!(transport.unread(), 1);
        assert_eq!(
            transport.poll_line().unwrap(),
            Some(Incoming::Line("hello".into()))
        );
        assert_eq!(transport.poll_line().unwrap(), None);

        transport.write_line("reply").unwrap();
        assert_eq!(transport.take_written(), vec!["reply".to_string()]);
        assert!(transport.written().is_empty());
    }

    #[test]
    fn test_mock_line_disconnected() {
        let mut transport = MockLineTransport::disconnected();
        transport.push_line("ignored");
        assert_eq!(transport.poll_line().unwrap(), None);
        assert!(transport.write_line("x").is_err());
    }

    #[test]
    fn test_mock_datagram() {
        let mut transport = MockDatagramTransport::new();
        transport.send_datagram(b"abc").unwrap();
        assert_eq!(transport.last_text().as_deref(), Some("abc"));

        transport.set_fail_sends(true);
        assert!(transport.send_datagram(b"def").is_err());
        assert_eq!(transport.sent().len(), 1);
    }
}
