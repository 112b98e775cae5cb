//! Command channel
//!
//! Owns the stream connection to the coordinator. The control loop calls
//! [`CommandChannel::poll_and_dispatch`] once per cycle; at most one line is
//! handled per call and it is answered before the next line is read.

use std::time::Duration;

use line_rover_core::protocol::{Outcome, Response};
use line_rover_core::traits::{Actuation, LineSensor, TimeSource};

use super::codec;
use super::dispatcher::{AcknowledgeOnly, CommandDispatcher, CommandExtensions};
use super::transport::{Incoming, LineTransport, TcpLineTransport, TransportError};
use crate::error::{Result, RoverError};
use crate::rover::LineFollower;

/// Time allowed for the TCP handshake in [`CommandChannel::connect`]
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Stream link plus dispatcher
pub struct CommandChannel<S, E = AcknowledgeOnly> {
    transport: Option<S>,
    dispatcher: CommandDispatcher<E>,
}

impl CommandChannel<TcpLineTransport, AcknowledgeOnly> {
    /// Connect to the coordinator at `host:port`; no retry
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let mut channel = Self::new(CommandDispatcher::acknowledge_only());
        channel.connect_tcp(host, port)?;
        Ok(channel)
    }
}

impl<E: CommandExtensions> CommandChannel<TcpLineTransport, E> {
    /// (Re)connect over TCP, replacing any existing connection
    pub fn connect_tcp(&mut self, host: &str, port: u16) -> Result<()> {
        let addr = format!("{}:{}", host, port);
        crate::log_info!("Connecting to coordinator at {}", addr);

        match TcpLineTransport::connect(&addr, CONNECT_TIMEOUT) {
            Ok(transport) => {
                crate::log_info!("Connected to {}", transport.peer_addr());
                self.transport = Some(transport);
                Ok(())
            }
            Err(source) => {
                crate::log_error!("Connection to {} failed: {}", addr, source);
                Err(RoverError::ConnectionFailed { addr, source })
            }
        }
    }
}

impl<S: LineTransport, E: CommandExtensions> CommandChannel<S, E> {
    /// Channel with no connection yet
    pub fn new(dispatcher: CommandDispatcher<E>) -> Self {
        Self {
            transport: None,
            dispatcher,
        }
    }

    /// Channel over an already established transport
    pub fn with_transport(transport: S, dispatcher: CommandDispatcher<E>) -> Self {
        Self {
            transport: Some(transport),
            dispatcher,
        }
    }

    /// Install a transport, replacing any existing one
    pub fn attach(&mut self, transport: S) {
        self.transport = Some(transport);
    }

    /// Remove and return the transport
    pub fn detach(&mut self) -> Option<S> {
        self.transport.take()
    }

    pub fn is_connected(&self) -> bool {
        self.transport
            .as_ref()
            .map(|transport| transport.is_connected())
            .unwrap_or(false)
    }

    /// Handle at most one buffered command line
    ///
    /// Returns the response that was sent, or `None` when there was nothing
    /// to do (not connected, no complete line, or a blank line).
    pub fn poll_and_dispatch<H, T>(&mut self, follower: &mut LineFollower<H, T>) -> Option<Response>
    where
        H: Actuation + LineSensor,
        T: TimeSource,
    {
        let transport = self.transport.as_mut()?;
        if !transport.is_connected() {
            return None;
        }

        let incoming = match transport.poll_line() {
            Ok(Some(incoming)) => incoming,
            Ok(None) => return None,
            Err(TransportError::Disconnected) => {
                crate::log_warn!("Coordinator closed the command connection");
                return None;
            }
            Err(err) => {
                crate::log_warn!("Command connection error: {}", err);
                return None;
            }
        };

        let response = match incoming {
            Incoming::Line(line) => self.dispatcher.handle_line(&line, follower)?,
            Incoming::Oversized { len } => self.dispatcher.handle_oversized(len),
        };

        if let Err(err) = self.send(&response) {
            crate::log_warn!("Response not sent: {}", err);
        }
        Some(response)
    }

    /// Write one response line; delivery is not confirmed
    pub fn send_response(&mut self, status: Outcome, msg: &str) -> Result<()> {
        self.send(&Response::new(status, msg))
    }

    pub fn dispatcher(&self) -> &CommandDispatcher<E> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut CommandDispatcher<E> {
        &mut self.dispatcher
    }

    pub fn transport(&self) -> Option<&S> {
        self.transport.as_ref()
    }

    pub fn transport_mut(&mut self) -> Option<&mut S> {
        self.transport.as_mut()
    }

    fn send(&mut self, response: &Response) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(RoverError::NotConnected)?;
        let line = codec::encode_response(response)?;
        transport.write_line(&line)?;
        crate::log_debug!("Sent: {}", line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::transport::{MockLineTransport, MAX_LINE_LEN};
    use crate::platform::SimulatedRobot;
    use line_rover_core::parameters::FollowerParams;
    use line_rover_core::traits::MockTime;

    fn follower(time: &MockTime) -> LineFollower<SimulatedRobot, &MockTime> {
        LineFollower::new(SimulatedRobot::new(), time, FollowerParams::immediate())
    }

    fn channel() -> CommandChannel<MockLineTransport> {
        CommandChannel::with_transport(
            MockLineTransport::new(),
            CommandDispatcher::acknowledge_only(),
        )
    }

    fn written(channel: &CommandChannel<MockLineTransport>) -> Vec<String> {
        channel
            .transport()
            .map(|t| t.written().to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_nothing_buffered() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut ch = channel();
        assert!(ch.poll_and_dispatch(&mut f).is_none());
        assert!(written(&ch).is_empty());
    }

    #[test]
    fn test_without_transport() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut ch: CommandChannel<MockLineTransport> =
            CommandChannel::new(CommandDispatcher::acknowledge_only());
        assert!(!ch.is_connected());
        assert!(ch.poll_and_dispatch(&mut f).is_none());
        assert!(matches!(
            ch.send_response(Outcome::Success, "x"),
            Err(RoverError::NotConnected)
        ));
    }

    #[test]
    fn test_disconnected_transport_is_skipped() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut ch = CommandChannel::with_transport(
            MockLineTransport::disconnected(),
            CommandDispatcher::acknowledge_only(),
        );
        assert!(ch.poll_and_dispatch(&mut f).is_none());
        assert_eq!(ch.transport().map(|t| t.polls()), Some(0));
    }

    #[test]
    fn test_move_writes_one_response() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut ch = channel();
        ch.transport_mut()
            .unwrap()
            .push_line(r#"{"cmd":"MOVE","path":"4"}"#);

        let response = ch.poll_and_dispatch(&mut f).unwrap();
        assert!(response.is_success());
        assert!(f.is_running());
        assert_eq!(
            written(&ch),
            vec![r#"{"status":"SUCCESS","msg":"path following started"}"#.to_string()]
        );
    }

    #[test]
    fn test_one_command_per_poll() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut ch = channel();
        {
            let transport = ch.transport_mut().unwrap();
            transport.push_line(r#"{"cmd":"TASK","action":"A"}"#);
            transport.push_line(r#"{"cmd":"TASK","action":"B"}"#);
        }

        ch.poll_and_dispatch(&mut f);
        assert_eq!(written(&ch).len(), 1);
        assert_eq!(ch.transport().map(|t| t.unread()), Some(1));

        ch.poll_and_dispatch(&mut f);
        assert_eq!(written(&ch).len(), 2);
    }

    #[test]
    fn test_malformed_line_fails() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut ch = channel();
        ch.transport_mut().unwrap().push_line(r#"{"cmd":"MOVE""#);

        let response = ch.poll_and_dispatch(&mut f).unwrap();
        assert_eq!(response.status, Outcome::Fail);
        assert!(!f.is_running());
        let lines = written(&ch);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("json parse error"));
    }

    #[test]
    fn test_blank_line_is_ignored() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut ch = channel();
        ch.transport_mut().unwrap().push_line("  ");
        assert!(ch.poll_and_dispatch(&mut f).is_none());
        assert!(written(&ch).is_empty());
    }

    #[test]
    fn test_oversized_line_fails() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut ch = channel();
        let long = format!(r#"{{"cmd":"MOVE","path":"{}"}}"#, "1".repeat(MAX_LINE_LEN));
        ch.transport_mut().unwrap().push_line(&long);

        let response = ch.poll_and_dispatch(&mut f).unwrap();
        assert_eq!(response.status, Outcome::Fail);
        assert!(!f.is_running());
    }

    #[test]
    fn test_write_failure_still_returns_response() {
        let time = MockTime::new();
        let mut f = follower(&time);
        let mut ch = channel();
        {
            let transport = ch.transport_mut().unwrap();
            transport.push_line(r#"{"cmd":"MOVE","path":"1"}"#);
            transport.set_fail_writes(true);
        }

        let response = ch.poll_and_dispatch(&mut f).unwrap();
        assert!(response.is_success());
        assert!(f.is_running());
        assert!(written(&ch).is_empty());
    }

    #[test]
    fn test_send_response() {
        let mut ch = channel();
        ch.send_response(Outcome::Fail, "busy").unwrap();
        assert_eq!(
            written(&ch),
            vec![r#"{"status":"FAIL","msg":"busy"}"#.to_string()]
        );
    }
}
