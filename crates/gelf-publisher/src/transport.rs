//! Datagram transport: resolve, connect, write.
//!
//! `Connect` produces a `Transport`; the publisher connects lazily on its
//! first publish and keeps the handle until it is dropped. Each `write` is
//! exactly one send attempt.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// A connected datagram endpoint.
pub trait Transport {
    /// Send one datagram. Returns the number of bytes written.
    fn write(&mut self, datagram: &[u8]) -> io::Result<usize>;
}

/// Opens transports to a collector.
pub trait Connect {
    type Transport: Transport;

    fn connect(&self, host: &str, port: u16) -> io::Result<Self::Transport>;
}

/// Connects real UDP sockets.
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpConnector;

impl Connect for UdpConnector {
    type Transport = UdpTransport;

    fn connect(&self, host: &str, port: u16) -> io::Result<UdpTransport> {
        let peer = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{host}:{port} did not resolve to any address"),
            )
        })?;
        UdpTransport::connect(peer)
    }
}

/// A UDP socket connected to one collector address.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpTransport {
    /// Bind an ephemeral local port of the peer's address family and
    /// connect it to `peer`.
    pub fn connect(peer: SocketAddr) -> io::Result<Self> {
        let local: SocketAddr = match peer {
            SocketAddr::V4(_) => (std::net::Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (std::net::Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(peer)?;
        tracing::info!(%peer, local = %socket.local_addr()?, "gelf transport connected");
        Ok(Self { socket, peer })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for UdpTransport {
    fn write(&mut self, datagram: &[u8]) -> io::Result<usize> {
        self.socket.send(datagram)
    }
}
