//! High-level telemetry client.

use crate::error::ClientError;
use crate::transport::{TcpTransport, Transport, UdpTransport};
use beacon_protocol::frame::MessageKind;
use beacon_protocol::v1::V1Codec;
use beacon_protocol::{Batch, BatchOption, Event, Metric, WireCodec, DEFAULT_PORT, PROTOCOL_VERSION};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::sync::Mutex;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Collector address.
    pub addr: SocketAddr,
    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(SocketAddr::new(
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            DEFAULT_PORT,
        ))
    }
}

/// A fire-and-forget telemetry sender.
///
/// Encoding is pure and lock-free; the socket handle is the one shared
/// resource, so sends are serialized through a mutex and at most one frame
/// is in flight per client. Callers that need concurrent senders should
/// create independent clients.
pub struct Client {
    transport: Mutex<Transport>,
}

impl Client {
    /// Connects a datagram transport to the collector.
    pub async fn connect_udp(config: ClientConfig) -> Result<Self, ClientError> {
        tracing::debug!("connecting UDP transport to {}", config.addr);

        let transport = tokio::time::timeout(
            config.connect_timeout,
            UdpTransport::connect(config.addr),
        )
        .await
        .map_err(|_| ClientError::Timeout)??;

        Ok(Self {
            transport: Mutex::new(Transport::Udp(transport)),
        })
    }

    /// Connects a stream transport to the collector.
    pub async fn connect_tcp(config: ClientConfig) -> Result<Self, ClientError> {
        tracing::debug!("connecting TCP transport to {}", config.addr);

        let transport = tokio::time::timeout(
            config.connect_timeout,
            TcpTransport::connect(config.addr),
        )
        .await
        .map_err(|_| ClientError::Timeout)??;

        Ok(Self {
            transport: Mutex::new(Transport::Tcp(transport)),
        })
    }

    /// Sends a single metric.
    pub async fn send_metric(&self, metric: &Metric) -> Result<(), ClientError> {
        let payload = V1Codec.encode_metric(metric)?;
        self.send(MessageKind::Metric, &payload).await
    }

    /// Sends a single event.
    pub async fn send_event(&self, event: &Event) -> Result<(), ClientError> {
        let payload = V1Codec.encode_event(event)?;
        self.send(MessageKind::Event, &payload).await
    }

    /// Sends a batch, optionally gzip-compressed.
    pub async fn send_batch(
        &self,
        batch: &Batch,
        options: &[BatchOption],
    ) -> Result<(), ClientError> {
        let payload = V1Codec.encode_batch(batch, options)?;
        self.send(MessageKind::Batch, &payload).await
    }

    async fn send(&self, kind: MessageKind, payload: &[u8]) -> Result<(), ClientError> {
        tracing::debug!("sending {:?} frame ({} payload bytes)", kind, payload.len());

        let mut transport = self.transport.lock().await;
        transport.send(PROTOCOL_VERSION, kind, payload).await
    }
}
