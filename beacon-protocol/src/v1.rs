//! Canonical bitmask wire format (version 1).
//!
//! An entity payload is its `u64` presence bitmask followed by each present
//! field in declaration order; absent fields contribute zero bytes. Encoder
//! and decoder walk the fields in exactly the same order, testing the bit
//! before every read. A mismatch desyncs every later field, so the order
//! here is part of the wire contract.
//!
//! Primitive encodings are big-endian and self-delimiting: fixed-width
//! integers and doubles, `u32`-length-prefixed UTF-8 strings, counted
//! element lists for tags and counted key/value pairs for attributes.
//!
//! A batch payload starts with an unconditional envelope header (a counted
//! map of string keys to booleans, today just `"gzip"`), followed by the
//! batch body, gzip-compressed iff the header says so.

use crate::batch::{Batch, BatchOption};
use crate::codec::WireCodec;
use crate::error::WireError;
use crate::event::Event;
use crate::metric::Metric;
use crate::PROTOCOL_VERSION;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// The canonical bitmask codec.
pub struct V1Codec;

impl WireCodec for V1Codec {
    fn version(&self) -> u32 {
        PROTOCOL_VERSION
    }

    fn encode_metric(&self, metric: &Metric) -> Result<BytesMut, WireError> {
        let mut buf = BytesMut::new();
        put_metric(&mut buf, metric)?;
        Ok(buf)
    }

    fn decode_metric(&self, payload: &mut Bytes) -> Result<Metric, WireError> {
        get_metric(payload)
    }

    fn encode_event(&self, event: &Event) -> Result<BytesMut, WireError> {
        let mut buf = BytesMut::new();
        put_event(&mut buf, event)?;
        Ok(buf)
    }

    fn decode_event(&self, payload: &mut Bytes) -> Result<Event, WireError> {
        get_event(payload)
    }

    fn encode_batch(&self, batch: &Batch, options: &[BatchOption]) -> Result<BytesMut, WireError> {
        let gzip = options.contains(&BatchOption::CompressGzip);

        let mut buf = BytesMut::new();
        put_envelope(&mut buf, gzip);

        let mut body = BytesMut::new();
        put_batch(&mut body, batch)?;

        if gzip {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&body)?;
            let compressed = encoder.finish()?;
            buf.put_slice(&compressed);
        } else {
            buf.unsplit(body);
        }

        Ok(buf)
    }

    fn decode_batch(&self, payload: &mut Bytes) -> Result<Batch, WireError> {
        let gzip = get_envelope(payload)?;

        if gzip {
            let compressed = payload.copy_to_bytes(payload.remaining());
            let mut body = Vec::new();
            GzDecoder::new(compressed.as_ref()).read_to_end(&mut body)?;
            let mut body = Bytes::from(body);
            return get_batch(&mut body);
        }

        get_batch(payload)
    }
}

// --- entity encoding ---------------------------------------------------

fn put_metric(buf: &mut BytesMut, m: &Metric) -> Result<(), WireError> {
    buf.put_u64(m.presence());

    if m.has(Metric::PROC) {
        put_string(buf, m.proc()?);
    }
    if m.has(Metric::TIME) {
        buf.put_i64(m.time()?);
    }
    if m.has(Metric::KEY) {
        put_string(buf, m.key()?);
    }
    if m.has(Metric::VALUE) {
        buf.put_f64(m.value()?);
    }
    if m.has(Metric::HOST) {
        put_string(buf, m.host()?);
    }
    if m.has(Metric::TAGS) {
        put_tags(buf, m.tags()?);
    }
    if m.has(Metric::ATTRIBUTES) {
        put_attributes(buf, m.attributes()?);
    }

    Ok(())
}

fn get_metric(buf: &mut Bytes) -> Result<Metric, WireError> {
    let has = read_u64(buf)?;
    if has & !Metric::PRESENCE_MASK != 0 {
        return Err(WireError::InvalidPresence(has));
    }

    let mut m = Metric::empty();

    if has & Metric::PROC != 0 {
        m = m.with_proc(read_string(buf)?);
    }
    if has & Metric::TIME != 0 {
        m = m.with_time(read_i64(buf)?);
    }
    if has & Metric::KEY != 0 {
        m = m.with_key(read_string(buf)?);
    }
    if has & Metric::VALUE != 0 {
        m = m.with_value(read_f64(buf)?);
    }
    if has & Metric::HOST != 0 {
        m = m.with_host(read_string(buf)?);
    }
    if has & Metric::TAGS != 0 {
        m = m.with_tags(read_tags(buf)?);
    }
    if has & Metric::ATTRIBUTES != 0 {
        m = m.with_attributes(read_attributes(buf)?);
    }

    Ok(m)
}

fn put_event(buf: &mut BytesMut, e: &Event) -> Result<(), WireError> {
    buf.put_u64(e.presence());

    if e.has(Event::TIME) {
        buf.put_i64(e.time()?);
    }
    if e.has(Event::KEY) {
        put_string(buf, e.key()?);
    }
    if e.has(Event::VALUE) {
        buf.put_f64(e.value()?);
    }
    if e.has(Event::HOST) {
        put_string(buf, e.host()?);
    }
    if e.has(Event::STATE) {
        put_string(buf, e.state()?);
    }
    if e.has(Event::DESCRIPTION) {
        put_string(buf, e.description()?);
    }
    if e.has(Event::TTL) {
        buf.put_i64(e.ttl()?);
    }
    if e.has(Event::TAGS) {
        put_tags(buf, e.tags()?);
    }
    if e.has(Event::ATTRIBUTES) {
        put_attributes(buf, e.attributes()?);
    }

    Ok(())
}

fn get_event(buf: &mut Bytes) -> Result<Event, WireError> {
    let has = read_u64(buf)?;
    if has & !Event::PRESENCE_MASK != 0 {
        return Err(WireError::InvalidPresence(has));
    }

    let mut e = Event::empty();

    if has & Event::TIME != 0 {
        e = e.with_time(read_i64(buf)?);
    }
    if has & Event::KEY != 0 {
        e = e.with_key(read_string(buf)?);
    }
    if has & Event::VALUE != 0 {
        e = e.with_value(read_f64(buf)?);
    }
    if has & Event::HOST != 0 {
        e = e.with_host(read_string(buf)?);
    }
    if has & Event::STATE != 0 {
        e = e.with_state(read_string(buf)?);
    }
    if has & Event::DESCRIPTION != 0 {
        e = e.with_description(read_string(buf)?);
    }
    if has & Event::TTL != 0 {
        e = e.with_ttl(read_i64(buf)?);
    }
    if has & Event::TAGS != 0 {
        e = e.with_tags(read_tags(buf)?);
    }
    if has & Event::ATTRIBUTES != 0 {
        e = e.with_attributes(read_attributes(buf)?);
    }

    Ok(e)
}

// --- batch encoding ----------------------------------------------------

fn put_batch(buf: &mut BytesMut, batch: &Batch) -> Result<(), WireError> {
    put_attributes(buf, &batch.attributes);

    buf.put_u32(batch.events.len() as u32);
    for event in &batch.events {
        put_event(buf, event)?;
    }

    buf.put_u32(batch.metrics.len() as u32);
    for metric in &batch.metrics {
        put_metric(buf, metric)?;
    }

    Ok(())
}

fn get_batch(buf: &mut Bytes) -> Result<Batch, WireError> {
    let attributes = read_attributes(buf)?;

    // Every entity starts with its 8-byte presence mask.
    let event_count = read_count(buf, 8)?;
    let mut events = Vec::with_capacity(event_count);
    for _ in 0..event_count {
        events.push(get_event(buf)?);
    }

    let metric_count = read_count(buf, 8)?;
    let mut metrics = Vec::with_capacity(metric_count);
    for _ in 0..metric_count {
        metrics.push(get_metric(buf)?);
    }

    Ok(Batch {
        attributes,
        events,
        metrics,
    })
}

fn put_envelope(buf: &mut BytesMut, gzip: bool) {
    buf.put_u32(1);
    put_string(buf, "gzip");
    buf.put_u8(gzip as u8);
}

fn get_envelope(buf: &mut Bytes) -> Result<bool, WireError> {
    let count = read_count(buf, 5)?;

    let mut gzip = false;
    for _ in 0..count {
        let name = read_string(buf)?;
        let value = read_bool(buf)?;
        if name == "gzip" {
            gzip = value;
        }
    }

    Ok(gzip)
}

// --- primitives --------------------------------------------------------

fn put_string(buf: &mut BytesMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

fn put_tags(buf: &mut BytesMut, tags: &[String]) {
    buf.put_u32(tags.len() as u32);
    for tag in tags {
        put_string(buf, tag);
    }
}

fn put_attributes(buf: &mut BytesMut, attributes: &BTreeMap<String, String>) {
    buf.put_u32(attributes.len() as u32);
    for (key, value) in attributes {
        put_string(buf, key);
        put_string(buf, value);
    }
}

fn need(buf: &Bytes, want: usize) -> Result<(), WireError> {
    let have = buf.remaining();
    if have < want {
        return Err(WireError::Truncated { needed: want - have });
    }
    Ok(())
}

fn read_u8(buf: &mut Bytes) -> Result<u8, WireError> {
    need(buf, 1)?;
    Ok(buf.get_u8())
}

fn read_u32(buf: &mut Bytes) -> Result<u32, WireError> {
    need(buf, 4)?;
    Ok(buf.get_u32())
}

fn read_u64(buf: &mut Bytes) -> Result<u64, WireError> {
    need(buf, 8)?;
    Ok(buf.get_u64())
}

fn read_i64(buf: &mut Bytes) -> Result<i64, WireError> {
    need(buf, 8)?;
    Ok(buf.get_i64())
}

fn read_f64(buf: &mut Bytes) -> Result<f64, WireError> {
    need(buf, 8)?;
    Ok(buf.get_f64())
}

fn read_bool(buf: &mut Bytes) -> Result<bool, WireError> {
    match read_u8(buf)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(WireError::InvalidBool(other)),
    }
}

fn read_string(buf: &mut Bytes) -> Result<String, WireError> {
    let len = read_u32(buf)? as usize;
    need(buf, len)?;
    let raw = buf.copy_to_bytes(len);
    String::from_utf8(raw.to_vec()).map_err(|_| WireError::InvalidUtf8)
}

/// Reads an element count, rejecting counts that cannot possibly fit in the
/// remaining input. Each element occupies at least `min_element_size`
/// bytes, so an oversized count is truncated input, not a reason to
/// allocate.
fn read_count(buf: &mut Bytes, min_element_size: usize) -> Result<usize, WireError> {
    let count = read_u32(buf)? as usize;
    need(buf, count.saturating_mul(min_element_size))?;
    Ok(count)
}

fn read_tags(buf: &mut Bytes) -> Result<Vec<String>, WireError> {
    let count = read_count(buf, 4)?;
    let mut tags = Vec::with_capacity(count);
    for _ in 0..count {
        tags.push(read_string(buf)?);
    }
    Ok(tags)
}

fn read_attributes(buf: &mut Bytes) -> Result<BTreeMap<String, String>, WireError> {
    let count = read_count(buf, 8)?;
    let mut attributes = BTreeMap::new();
    for _ in 0..count {
        let key = read_string(buf)?;
        let value = read_string(buf)?;
        attributes.insert(key, value);
    }
    Ok(attributes)
}
