//! Legacy wire format (version 0), write-only.
//!
//! Encodes metrics and events in a protobuf-shaped layout: a message
//! wrapper holding the entity as a length-delimited submessage, varint
//! integers, little-endian fixed64 doubles, length-delimited UTF-8 strings,
//! and attributes as repeated key/value submessages.
//!
//! No version-0 reader ever existed in this client, so every decode
//! operation (and batching, which version 0 predates) reports
//! [`WireError::Unsupported`] rather than returning empty data.

use crate::batch::{Batch, BatchOption};
use crate::codec::WireCodec;
use crate::error::WireError;
use crate::event::Event;
use crate::metric::Metric;
use crate::LEGACY_VERSION;
use bytes::{BufMut, Bytes, BytesMut};

// Protobuf wire types.
const VARINT: u32 = 0;
const FIXED64: u32 = 1;
const LENGTH_DELIMITED: u32 = 2;

// Field numbers of the message wrapper.
const MESSAGE_EVENT: u32 = 1;
const MESSAGE_METRIC: u32 = 2;

// Field numbers of the metric message.
const METRIC_PROC: u32 = 1;
const METRIC_TIME: u32 = 2;
const METRIC_KEY: u32 = 3;
const METRIC_VALUE: u32 = 4;
const METRIC_HOST: u32 = 5;
const METRIC_TAGS: u32 = 6;
const METRIC_ATTRIBUTES: u32 = 7;

// Field numbers of the event message.
const EVENT_TIME: u32 = 1;
const EVENT_KEY: u32 = 2;
const EVENT_VALUE: u32 = 3;
const EVENT_HOST: u32 = 4;
const EVENT_STATE: u32 = 5;
const EVENT_DESCRIPTION: u32 = 6;
const EVENT_TTL: u32 = 7;
const EVENT_TAGS: u32 = 8;
const EVENT_ATTRIBUTES: u32 = 9;

// Field numbers of the attribute submessage.
const ATTRIBUTE_KEY: u32 = 1;
const ATTRIBUTE_VALUE: u32 = 2;

/// The legacy write-only codec.
pub struct V0Codec;

impl WireCodec for V0Codec {
    fn version(&self) -> u32 {
        LEGACY_VERSION
    }

    fn encode_metric(&self, metric: &Metric) -> Result<BytesMut, WireError> {
        let body = encode_metric_body(metric)?;
        let mut buf = BytesMut::new();
        put_bytes_field(&mut buf, MESSAGE_METRIC, &body);
        Ok(buf)
    }

    fn decode_metric(&self, _payload: &mut Bytes) -> Result<Metric, WireError> {
        Err(unsupported("decode_metric"))
    }

    fn encode_event(&self, event: &Event) -> Result<BytesMut, WireError> {
        let body = encode_event_body(event)?;
        let mut buf = BytesMut::new();
        put_bytes_field(&mut buf, MESSAGE_EVENT, &body);
        Ok(buf)
    }

    fn decode_event(&self, _payload: &mut Bytes) -> Result<Event, WireError> {
        Err(unsupported("decode_event"))
    }

    fn encode_batch(&self, _batch: &Batch, _options: &[BatchOption]) -> Result<BytesMut, WireError> {
        Err(unsupported("encode_batch"))
    }

    fn decode_batch(&self, _payload: &mut Bytes) -> Result<Batch, WireError> {
        Err(unsupported("decode_batch"))
    }
}

fn unsupported(operation: &'static str) -> WireError {
    WireError::Unsupported {
        version: LEGACY_VERSION,
        operation,
    }
}

fn encode_metric_body(m: &Metric) -> Result<BytesMut, WireError> {
    let mut body = BytesMut::new();

    if m.has(Metric::PROC) {
        put_string_field(&mut body, METRIC_PROC, m.proc()?);
    }
    if m.has(Metric::TIME) {
        put_i64_field(&mut body, METRIC_TIME, m.time()?);
    }
    if m.has(Metric::KEY) {
        put_string_field(&mut body, METRIC_KEY, m.key()?);
    }
    if m.has(Metric::VALUE) {
        put_f64_field(&mut body, METRIC_VALUE, m.value()?);
    }
    if m.has(Metric::HOST) {
        put_string_field(&mut body, METRIC_HOST, m.host()?);
    }
    if m.has(Metric::TAGS) {
        for tag in m.tags()? {
            put_string_field(&mut body, METRIC_TAGS, tag);
        }
    }
    if m.has(Metric::ATTRIBUTES) {
        for (key, value) in m.attributes()? {
            put_attribute(&mut body, METRIC_ATTRIBUTES, key, value);
        }
    }

    Ok(body)
}

fn encode_event_body(e: &Event) -> Result<BytesMut, WireError> {
    let mut body = BytesMut::new();

    if e.has(Event::TIME) {
        put_i64_field(&mut body, EVENT_TIME, e.time()?);
    }
    if e.has(Event::KEY) {
        put_string_field(&mut body, EVENT_KEY, e.key()?);
    }
    if e.has(Event::VALUE) {
        put_f64_field(&mut body, EVENT_VALUE, e.value()?);
    }
    if e.has(Event::HOST) {
        put_string_field(&mut body, EVENT_HOST, e.host()?);
    }
    if e.has(Event::STATE) {
        put_string_field(&mut body, EVENT_STATE, e.state()?);
    }
    if e.has(Event::DESCRIPTION) {
        put_string_field(&mut body, EVENT_DESCRIPTION, e.description()?);
    }
    if e.has(Event::TTL) {
        put_i64_field(&mut body, EVENT_TTL, e.ttl()?);
    }
    if e.has(Event::TAGS) {
        for tag in e.tags()? {
            put_string_field(&mut body, EVENT_TAGS, tag);
        }
    }
    if e.has(Event::ATTRIBUTES) {
        for (key, value) in e.attributes()? {
            put_attribute(&mut body, EVENT_ATTRIBUTES, key, value);
        }
    }

    Ok(body)
}

fn put_varint(buf: &mut BytesMut, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.put_u8(byte);
            return;
        }
        buf.put_u8(byte | 0x80);
    }
}

fn put_tag(buf: &mut BytesMut, field: u32, wire_type: u32) {
    put_varint(buf, u64::from((field << 3) | wire_type));
}

fn put_bytes_field(buf: &mut BytesMut, field: u32, bytes: &[u8]) {
    put_tag(buf, field, LENGTH_DELIMITED);
    put_varint(buf, bytes.len() as u64);
    buf.put_slice(bytes);
}

fn put_string_field(buf: &mut BytesMut, field: u32, s: &str) {
    put_bytes_field(buf, field, s.as_bytes());
}

fn put_i64_field(buf: &mut BytesMut, field: u32, value: i64) {
    put_tag(buf, field, VARINT);
    put_varint(buf, value as u64);
}

fn put_f64_field(buf: &mut BytesMut, field: u32, value: f64) {
    put_tag(buf, field, FIXED64);
    buf.put_f64_le(value);
}

fn put_attribute(buf: &mut BytesMut, field: u32, key: &str, value: &str) {
    let mut attr = BytesMut::new();
    put_string_field(&mut attr, ATTRIBUTE_KEY, key);
    put_string_field(&mut attr, ATTRIBUTE_VALUE, value);
    put_bytes_field(buf, field, &attr);
}
