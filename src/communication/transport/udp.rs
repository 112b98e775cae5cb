//! UDP datagram transport
//!
//! Binds an ephemeral local port and sends every datagram to one fixed
//! destination. Nothing is received.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

use super::{DatagramTransport, TransportError};

/// Datagram sender with a fixed destination
#[derive(Debug)]
pub struct UdpDatagramTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpDatagramTransport {
    /// Resolve `target` (`host:port`) and bind a local socket for it
    pub fn bind(target: &str) -> Result<Self, TransportError> {
        let target = target
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| TransportError::Unresolved(target.to_string()))?;

        let local = if target.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local)?;
        socket.set_nonblocking(true)?;
        if target.ip().is_unspecified() || is_broadcast(&target) {
            socket.set_broadcast(true)?;
        }

        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

fn is_broadcast(addr: &SocketAddr) -> bool {
    match addr {
        SocketAddr::V4(v4) => v4.ip().is_broadcast(),
        SocketAddr::V6(_) => false,
    }
}

impl DatagramTransport for UdpDatagramTransport {
    fn send_datagram(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.socket.send_to(payload, self.target)?;
        Ok(())
    }
}
