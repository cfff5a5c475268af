//! Codec interface, version dispatch, and framed encode/decode helpers.

use crate::batch::{Batch, BatchOption};
use crate::error::WireError;
use crate::event::Event;
use crate::frame::{Frame, MessageKind};
use crate::metric::Metric;
use crate::v0::V0Codec;
use crate::v1::V1Codec;
use crate::{LEGACY_VERSION, PROTOCOL_VERSION};
use bytes::{Bytes, BytesMut};

/// Paired encode/decode logic for one wire format version.
///
/// The codec set is closed: call sites select a variant through
/// [`codec_for_version`] from the frame header and never branch on version
/// numbers themselves. A variant that lacks one direction fails with
/// [`WireError::Unsupported`] instead of silently no-opping.
pub trait WireCodec: Send + Sync {
    /// Wire version this codec implements.
    fn version(&self) -> u32;

    fn encode_metric(&self, metric: &Metric) -> Result<BytesMut, WireError>;
    fn decode_metric(&self, payload: &mut Bytes) -> Result<Metric, WireError>;

    fn encode_event(&self, event: &Event) -> Result<BytesMut, WireError>;
    fn decode_event(&self, payload: &mut Bytes) -> Result<Event, WireError>;

    fn encode_batch(&self, batch: &Batch, options: &[BatchOption]) -> Result<BytesMut, WireError>;
    fn decode_batch(&self, payload: &mut Bytes) -> Result<Batch, WireError>;
}

/// Returns the codec for a wire version.
pub fn codec_for_version(version: u32) -> Result<&'static dyn WireCodec, WireError> {
    match version {
        LEGACY_VERSION => Ok(&V0Codec),
        PROTOCOL_VERSION => Ok(&V1Codec),
        other => Err(WireError::UnsupportedVersion(other)),
    }
}

/// A decoded telemetry message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Metric(Metric),
    Event(Event),
    Batch(Batch),
}

/// Encodes entities into complete canonical frames.
pub struct Encoder;

impl Encoder {
    /// Encodes a metric into a framed message.
    pub fn encode_metric(metric: &Metric) -> Result<BytesMut, WireError> {
        let payload = V1Codec.encode_metric(metric)?;
        Frame::new(MessageKind::Metric, payload.freeze()).encode()
    }

    /// Encodes an event into a framed message.
    pub fn encode_event(event: &Event) -> Result<BytesMut, WireError> {
        let payload = V1Codec.encode_event(event)?;
        Frame::new(MessageKind::Event, payload.freeze()).encode()
    }

    /// Encodes a batch into a framed message.
    pub fn encode_batch(batch: &Batch, options: &[BatchOption]) -> Result<BytesMut, WireError> {
        let payload = V1Codec.encode_batch(batch, options)?;
        Frame::new(MessageKind::Batch, payload.freeze()).encode()
    }
}

/// Decodes a stream of frames into messages.
pub struct Decoder {
    buffer: BytesMut,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next frame from the buffer.
    pub fn decode_frame(&mut self) -> Result<Option<Frame>, WireError> {
        Frame::decode(&mut self.buffer)
    }

    /// Attempts to decode the next message from the buffer.
    ///
    /// Returns `Ok(None)` until a whole frame is buffered. The frame's
    /// version selects the codec; its kind selects the entity decoder.
    pub fn decode_message(&mut self) -> Result<Option<Message>, WireError> {
        let frame = match self.decode_frame()? {
            Some(frame) => frame,
            None => return Ok(None),
        };

        let codec = codec_for_version(frame.version)?;
        let mut payload = frame.payload;

        let message = match frame.kind {
            MessageKind::Metric => Message::Metric(codec.decode_metric(&mut payload)?),
            MessageKind::Event => Message::Event(codec.decode_event(&mut payload)?),
            MessageKind::Batch => Message::Batch(codec.decode_batch(&mut payload)?),
        };

        Ok(Some(message))
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FRAME_HEADER_SIZE;

    #[test]
    fn test_codec_dispatch_by_version() {
        assert_eq!(codec_for_version(0).unwrap().version(), 0);
        assert_eq!(codec_for_version(1).unwrap().version(), 1);
        assert!(matches!(
            codec_for_version(2),
            Err(WireError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn test_metric_message_roundtrip() {
        let metric = Metric::empty().with_key("cpu").with_value(0.5);
        let encoded = Encoder::encode_metric(&metric).unwrap();

        let mut decoder = Decoder::new();
        decoder.extend(&encoded);

        let message = decoder.decode_message().unwrap().unwrap();
        assert_eq!(message, Message::Metric(metric));
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_event_message_roundtrip() {
        let event = Event::empty().with_key("deploy").with_state("done");
        let encoded = Encoder::encode_event(&event).unwrap();

        let mut decoder = Decoder::new();
        decoder.extend(&encoded);

        let message = decoder.decode_message().unwrap().unwrap();
        assert_eq!(message, Message::Event(event));
    }

    #[test]
    fn test_batch_message_roundtrip() {
        let batch = Batch::new(
            Default::default(),
            vec![Event::empty().with_key("deploy")],
            vec![Metric::empty().with_key("cpu")],
        );
        let encoded = Encoder::encode_batch(&batch, &[BatchOption::CompressGzip]).unwrap();

        let mut decoder = Decoder::new();
        decoder.extend(&encoded);

        let message = decoder.decode_message().unwrap().unwrap();
        assert_eq!(message, Message::Batch(batch));
    }

    #[test]
    fn test_partial_then_complete_frame() {
        let metric = Metric::empty().with_key("cpu");
        let encoded = Encoder::encode_metric(&metric).unwrap();

        let mut decoder = Decoder::new();
        decoder.extend(&encoded[..FRAME_HEADER_SIZE + 2]);
        assert!(decoder.decode_message().unwrap().is_none());

        decoder.extend(&encoded[FRAME_HEADER_SIZE + 2..]);
        let message = decoder.decode_message().unwrap().unwrap();
        assert_eq!(message, Message::Metric(metric));
    }

    #[test]
    fn test_multiple_messages_in_buffer() {
        let metric = Metric::empty().with_key("cpu");
        let event = Event::empty().with_key("deploy");

        let mut decoder = Decoder::new();
        decoder.extend(&Encoder::encode_metric(&metric).unwrap());
        decoder.extend(&Encoder::encode_event(&event).unwrap());

        assert_eq!(
            decoder.decode_message().unwrap().unwrap(),
            Message::Metric(metric)
        );
        assert_eq!(
            decoder.decode_message().unwrap().unwrap(),
            Message::Event(event)
        );
        assert!(decoder.decode_message().unwrap().is_none());
    }

    #[test]
    fn test_legacy_frame_fails_distinctly() {
        // A version-0 frame decodes at the frame layer but has no decoder.
        let payload = V0Codec
            .encode_metric(&Metric::empty().with_key("cpu"))
            .unwrap();
        let mut frame = Frame::new(MessageKind::Metric, payload.freeze());
        frame.version = LEGACY_VERSION;

        let mut decoder = Decoder::new();
        decoder.extend(&frame.encode().unwrap());

        let result = decoder.decode_message();
        assert!(matches!(
            result,
            Err(WireError::Unsupported {
                version: 0,
                operation: "decode_metric"
            })
        ));
    }

    #[test]
    fn test_decoder_buffered_and_clear() {
        let mut decoder = Decoder::new();
        assert_eq!(decoder.buffered(), 0);

        decoder.extend(b"some bytes");
        assert_eq!(decoder.buffered(), 10);

        decoder.clear();
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_decoder_default() {
        let decoder = Decoder::default();
        assert_eq!(decoder.buffered(), 0);
    }
}
