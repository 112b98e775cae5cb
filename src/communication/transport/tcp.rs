//! TCP line transport
//!
//! Connects once to the coordinator and switches the socket to
//! non-blocking mode. Each poll drains whatever the kernel has buffered
//! into a [`LineBuffer`] and hands out one line at a time.
//!
//! When the peer closes, lines it sent before closing are still handed
//! out, and the connection counts as open until they are consumed.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::{Incoming, LineBuffer, LineTransport, TransportError};

/// Bytes read from the socket per `read` call
const READ_CHUNK: usize = 512;

/// Non-blocking newline-framed TCP connection
#[derive(Debug)]
pub struct TcpLineTransport {
    stream: Option<TcpStream>,
    peer: SocketAddr,
    buffer: LineBuffer,
    /// Peer has closed its sending side
    eof: bool,
}

impl TcpLineTransport {
    /// Connect to `addr` (`host:port`), waiting at most `timeout`
    ///
    /// Every resolved address is tried in order; the last error is
    /// returned if none accepts.
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self, TransportError> {
        let mut last_err = None;
        for candidate in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&candidate, timeout) {
                Ok(stream) => return Self::from_stream(stream),
                Err(err) => last_err = Some(err),
            }
        }
        Err(match last_err {
            Some(err) => TransportError::Io(err),
            None => TransportError::Unresolved(addr.to_string()),
        })
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Result<Self, TransportError> {
        let peer = stream.peer_addr()?;
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: Some(stream),
            peer,
            buffer: LineBuffer::new(),
            eof: false,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Drop the connection; buffered lines are discarded
    pub fn close(&mut self) {
        self.stream = None;
        self.buffer.clear();
    }

    /// Read everything available without blocking
    ///
    /// Returns `true` if the peer closed the connection.
    fn fill(&mut self) -> Result<bool, TransportError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(false);
        };

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match stream.read(&mut chunk) {
                Ok(0) => return Ok(true),
                Ok(n) => self.buffer.extend(&chunk[..n]),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl LineTransport for TcpLineTransport {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn poll_line(&mut self) -> Result<Option<Incoming>, TransportError> {
        if !self.eof {
            match self.fill() {
                Ok(closed) => self.eof = closed,
                Err(err) => {
                    self.stream = None;
                    return Err(err);
                }
            }
        }

        if let Some(line) = self.buffer.next_line() {
            return Ok(Some(line));
        }

        if self.eof && self.stream.take().is_some() {
            self.buffer.clear();
            return Err(TransportError::Disconnected);
        }
        Ok(None)
    }

    fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

        let mut framed = Vec::with_capacity(line.len() + 1);
        framed.extend_from_slice(line.as_bytes());
        framed.push(b'\n');

        let mut written = 0;
        while written < framed.len() {
            match stream.write(&framed[written..]) {
                Ok(0) => {
                    self.stream = None;
                    return Err(TransportError::Disconnected);
                }
                Ok(n) => written += n,
                Err(err)
                    if err.kind() == io::ErrorKind::WouldBlock
                        || err.kind() == io::ErrorKind::Interrupted =>
                {
                    std::thread::yield_now();
                }
                Err(err) => {
                    self.stream = None;
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;

    fn pair() -> (TcpLineTransport, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let transport = TcpLineTransport::connect(&addr, Duration::from_secs(1)).unwrap();
        let (server, _) = listener.accept().unwrap();
        (transport, server)
    }

    fn poll_until_line(transport: &mut TcpLineTransport) -> Option<Incoming> {
        for _ in 0..200 {
            if let Some(line) = transport.poll_line().unwrap() {
                return Some(line);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_poll_without_data() {
        let (mut transport, _server) = pair();
        assert!(transport.is_connected());
        assert!(transport.poll_line().unwrap().is_none());
    }

    #[test]
    fn test_reads_lines_one_at_a_time() {
        let (mut transport, mut server) = pair();
        server.write_all(b"first\nsecond\n").unwrap();

        assert_eq!(
            poll_until_line(&mut transport),
            Some(Incoming::Line("first".into()))
        );
        assert_eq!(
            transport.poll_line().unwrap(),
            Some(Incoming::Line("second".into()))
        );
    }

    #[test]
    fn test_write_line_appends_newline() {
        let (mut transport, server) = pair();
        transport.write_line("{\"status\":\"SUCCESS\"}").unwrap();

        let mut reader = BufReader::new(server);
        let mut received = String::new();
        reader.read_line(&mut received).unwrap();
        assert_eq!(received, "{\"status\":\"SUCCESS\"}\n");
    }

    #[test]
    fn test_peer_close_reports_disconnect_once() {
        let (mut transport, server) = pair();
        drop(server);

        let mut saw_disconnect = false;
        for _ in 0..200 {
            match transport.poll_line() {
                Err(TransportError::Disconnected) => {
                    saw_disconnect = true;
                    break;
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(5)),
                other => panic!("unexpected poll result: {:?}", other),
            }
        }
        assert!(saw_disconnect);
        assert!(!transport.is_connected());
        assert!(transport.poll_line().unwrap().is_none());
        assert!(matches!(
            transport.write_line("x"),
            Err(TransportError::NotConnected)
        ));
    }

    #[test]
    fn test_lines_sent_before_close_are_delivered() {
        let (mut transport, mut server) = pair();
        server.write_all(b"one\ntwo\nthree\n").unwrap();
        drop(server);

        assert_eq!(
            poll_until_line(&mut transport),
            Some(Incoming::Line("one".into()))
        );
        // wait until the close has been seen too
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(
            transport.poll_line().unwrap(),
            Some(Incoming::Line("two".into()))
        );
        assert!(transport.is_connected());
        assert_eq!(
            transport.poll_line().unwrap(),
            Some(Incoming::Line("three".into()))
        );
        assert!(matches!(
            transport.poll_line(),
            Err(TransportError::Disconnected)
        ));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);
        assert!(TcpLineTransport::connect(&addr, Duration::from_millis(200)).is_err());
    }
}
