//! # beacon-protocol
//!
//! Wire protocol implementation for beacon telemetry.
//!
//! This crate provides:
//! - Immutable metric, event and batch values with per-field presence tracking
//! - Versioned codecs: the canonical bitmask format and the legacy write-only format
//! - Binary framing with version, message-kind tag and length prefix

pub mod batch;
pub mod codec;
pub mod error;
pub mod event;
pub mod frame;
pub mod metric;
pub mod v0;
pub mod v1;

pub use batch::{Batch, BatchOption};
pub use codec::{codec_for_version, Decoder, Encoder, Message, WireCodec};
pub use error::WireError;
pub use event::Event;
pub use frame::{Frame, MessageKind, FRAME_HEADER_SIZE};
pub use metric::Metric;

/// Wire version of the canonical bitmask codec.
pub const PROTOCOL_VERSION: u32 = 1;

/// Wire version of the legacy write-only codec.
pub const LEGACY_VERSION: u32 = 0;

/// Default collector port.
pub const DEFAULT_PORT: u16 = 19091;

/// Maximum frame payload size (16 MiB).
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;
