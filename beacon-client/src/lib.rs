//! # beacon-client
//!
//! Transport layer and high-level client for beacon telemetry.
//!
//! This crate provides:
//! - Fire-and-forget UDP and TCP transports
//! - A high-level client for sending metrics, events and batches

pub mod client;
pub mod error;
pub mod transport;

pub use client::{Client, ClientConfig};
pub use error::ClientError;
pub use transport::{TcpTransport, Transport, UdpTransport};
