//! UDP and TCP transports.
//!
//! A transport turns `(version, kind, payload)` into one wire frame and
//! hands it to the socket: one datagram per frame for UDP, one
//! write-plus-flush per frame for TCP. Delivery is fire-and-forget; the
//! length prefix inside the frame, not the transport, provides message
//! framing.

use crate::error::ClientError;
use beacon_protocol::frame::{Frame, MessageKind};
use bytes::Bytes;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};

/// A transport over either a datagram or a stream socket.
pub enum Transport {
    Udp(UdpTransport),
    Tcp(TcpTransport),
}

impl Transport {
    /// Sends one frame carrying the given payload.
    pub async fn send(
        &mut self,
        version: u32,
        kind: MessageKind,
        payload: &[u8],
    ) -> Result<(), ClientError> {
        let frame = Frame {
            version,
            kind,
            payload: Bytes::copy_from_slice(payload),
        };
        let bytes = frame.encode()?;

        match self {
            Transport::Udp(udp) => udp.send(&bytes).await,
            Transport::Tcp(tcp) => tcp.send(&bytes).await,
        }
    }
}

/// Datagram transport: one frame per packet.
///
/// Frames above the path MTU are handed to the socket as-is; fragmentation
/// and loss are the network's business, not this layer's.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Binds an ephemeral local socket and connects it to the collector.
    pub async fn connect(addr: SocketAddr) -> Result<Self, ClientError> {
        let bind_addr: SocketAddr = match addr {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(addr).await?;
        Ok(Self { socket })
    }

    async fn send(&mut self, frame: &[u8]) -> Result<(), ClientError> {
        self.socket.send(frame).await?;
        Ok(())
    }
}

/// Stream transport: one write plus flush per frame.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connects to the collector.
    pub async fn connect(addr: SocketAddr) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true).ok();
        Ok(Self { stream })
    }

    async fn send(&mut self, frame: &[u8]) -> Result<(), ClientError> {
        self.stream.write_all(frame).await?;
        self.stream.flush().await?;
        Ok(())
    }
}
