//! Binary frame format shared by all message kinds.
//!
//! Frame layout (9-byte header + payload, big-endian):
//!
//! ```text
//! +---------+--------+--------------+------------------------+
//! | version |  kind  | total_length | payload                |
//! | 4 bytes | 1 byte |   4 bytes    | total_length - 9 bytes |
//! +---------+--------+--------------+------------------------+
//! ```
//!
//! `total_length` covers the entire frame including the header, so a reader
//! can size its receive buffer from the first bytes alone.

use crate::error::WireError;
use crate::{LEGACY_VERSION, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the fixed frame header in bytes (4+1+4 = 9).
pub const FRAME_HEADER_SIZE: usize = 9;

/// Message kind tag carried in the frame header.
///
/// Tag values are part of the wire contract and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Batch = 1,
    Metric = 2,
    Event = 3,
}

impl MessageKind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(tag: u8) -> Result<Self, WireError> {
        match tag {
            1 => Ok(MessageKind::Batch),
            2 => Ok(MessageKind::Metric),
            3 => Ok(MessageKind::Event),
            other => Err(WireError::UnknownKind(other)),
        }
    }
}

/// A parsed telemetry frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Wire version of the payload codec.
    pub version: u32,
    /// Message kind of the payload.
    pub kind: MessageKind,
    /// Codec payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Creates a canonical-version frame with the given payload.
    pub fn new(kind: MessageKind, payload: Bytes) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            kind,
            payload,
        }
    }

    /// Encodes the frame into bytes.
    pub fn encode(&self) -> Result<BytesMut, WireError> {
        if self.payload.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(WireError::FrameTooLarge {
                size: self.payload.len() as u32,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let total_len = FRAME_HEADER_SIZE + self.payload.len();
        let mut buf = BytesMut::with_capacity(total_len);

        // Version (4 bytes)
        buf.put_u32(self.version);

        // Message kind (1 byte)
        buf.put_u8(self.kind.as_u8());

        // Total length including this header (4 bytes)
        buf.put_u32(total_len as u32);

        // Payload
        buf.put_slice(&self.payload);

        Ok(buf)
    }

    /// Decodes a frame from bytes.
    ///
    /// Returns `Ok(Some(frame))` if a complete frame was consumed,
    /// `Ok(None)` if more data is needed, or `Err` on protocol errors.
    /// Exactly `total_length` bytes are consumed, leaving any following
    /// frame intact.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Self>, WireError> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        // Peek at the header without consuming.
        let version = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        if version != PROTOCOL_VERSION && version != LEGACY_VERSION {
            return Err(WireError::UnsupportedVersion(version));
        }

        let kind = MessageKind::from_u8(buf[4])?;

        let total_len = u32::from_be_bytes([buf[5], buf[6], buf[7], buf[8]]);
        if (total_len as usize) < FRAME_HEADER_SIZE {
            return Err(WireError::InvalidLength(total_len));
        }

        let payload_len = total_len as usize - FRAME_HEADER_SIZE;
        if payload_len > MAX_PAYLOAD_SIZE as usize {
            return Err(WireError::FrameTooLarge {
                size: payload_len as u32,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        if buf.len() < total_len as usize {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let payload = buf.split_to(payload_len).freeze();

        Ok(Some(Self {
            version,
            kind,
            payload,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_roundtrip() {
        let payload = Bytes::from_static(b"\x00\x00\x00\x00\x00\x00\x00\x00");
        let frame = Frame::new(MessageKind::Metric, payload.clone());

        let mut buf = frame.encode().unwrap();
        let decoded = Frame::decode(&mut buf).unwrap().unwrap();

        assert_eq!(decoded.version, PROTOCOL_VERSION);
        assert_eq!(decoded.kind, MessageKind::Metric);
        assert_eq!(decoded.payload, payload);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_total_length_includes_header() {
        let frame = Frame::new(MessageKind::Event, Bytes::from_static(b"abc"));
        let encoded = frame.encode().unwrap();

        assert_eq!(encoded.len(), FRAME_HEADER_SIZE + 3);
        let total = u32::from_be_bytes([encoded[5], encoded[6], encoded[7], encoded[8]]);
        assert_eq!(total as usize, encoded.len());
    }

    #[test]
    fn test_two_frames_self_delimit() {
        let frame1 = Frame::new(MessageKind::Metric, Bytes::from_static(b"first"));
        let frame2 = Frame::new(MessageKind::Event, Bytes::from_static(b"second!"));

        let mut buf = BytesMut::new();
        buf.extend_from_slice(&frame1.encode().unwrap());
        buf.extend_from_slice(&frame2.encode().unwrap());

        let decoded1 = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded1.kind, MessageKind::Metric);
        assert_eq!(decoded1.payload.as_ref(), b"first");

        let decoded2 = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded2.kind, MessageKind::Event);
        assert_eq!(decoded2.payload.as_ref(), b"second!");

        assert!(buf.is_empty());
    }

    #[test]
    fn test_incomplete_header() {
        let mut buf = BytesMut::from(&b"\x00\x00\x00\x01\x02"[..]);
        assert!(Frame::decode(&mut buf).unwrap().is_none());
        // Nothing consumed.
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn test_incomplete_payload() {
        let frame = Frame::new(MessageKind::Event, Bytes::from_static(b"payload"));
        let encoded = frame.encode().unwrap();

        let mut buf = BytesMut::from(&encoded[..encoded.len() - 1]);
        assert!(Frame::decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_unsupported_version() {
        // Version 99, valid kind and length.
        let mut buf = BytesMut::from(&b"\x00\x00\x00\x63\x02\x00\x00\x00\x09"[..]);
        let result = Frame::decode(&mut buf);
        assert!(matches!(result, Err(WireError::UnsupportedVersion(99))));
    }

    #[test]
    fn test_unknown_kind() {
        let mut buf = BytesMut::from(&b"\x00\x00\x00\x01\x07\x00\x00\x00\x09"[..]);
        let result = Frame::decode(&mut buf);
        assert!(matches!(result, Err(WireError::UnknownKind(0x07))));
    }

    #[test]
    fn test_length_below_header_size() {
        let mut buf = BytesMut::from(&b"\x00\x00\x00\x01\x02\x00\x00\x00\x04"[..]);
        let result = Frame::decode(&mut buf);
        assert!(matches!(result, Err(WireError::InvalidLength(4))));
    }

    #[test]
    fn test_frame_too_large() {
        let huge = vec![0u8; MAX_PAYLOAD_SIZE as usize + 1];
        let frame = Frame::new(MessageKind::Batch, Bytes::from(huge));
        assert!(matches!(
            frame.encode(),
            Err(WireError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn test_empty_payload() {
        let frame = Frame::new(MessageKind::Batch, Bytes::new());
        let mut buf = frame.encode().unwrap();
        let decoded = Frame::decode(&mut buf).unwrap().unwrap();
        assert!(decoded.payload.is_empty());
    }

    #[test]
    fn test_legacy_version_accepted_at_frame_layer() {
        let mut frame = Frame::new(MessageKind::Metric, Bytes::from_static(b"x"));
        frame.version = LEGACY_VERSION;

        let mut buf = frame.encode().unwrap();
        let decoded = Frame::decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.version, LEGACY_VERSION);
    }
}
