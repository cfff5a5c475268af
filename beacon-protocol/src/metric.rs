//! Point metric values with per-field presence tracking.

use crate::error::WireError;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// A single point metric.
///
/// Every field is optional and tracked by one bit of a presence mask, so
/// "never set" and "set to the zero value" stay distinct all the way through
/// the wire format. Setters take `&self` and return a new value with the bit
/// set; the original is never mutated. Accessors fail with
/// [`WireError::FieldNotSet`] on fields that were never set.
#[derive(Debug, Clone, Default)]
pub struct Metric {
    has: u64,
    proc: String,
    time: i64,
    key: String,
    value: f64,
    host: String,
    tags: Vec<String>,
    attributes: BTreeMap<String, String>,
}

impl Metric {
    /// Presence bit for `proc`.
    pub const PROC: u64 = 1 << 0;
    /// Presence bit for `time`.
    pub const TIME: u64 = 1 << 1;
    /// Presence bit for `key`.
    pub const KEY: u64 = 1 << 2;
    /// Presence bit for `value`.
    pub const VALUE: u64 = 1 << 3;
    /// Presence bit for `host`.
    pub const HOST: u64 = 1 << 4;
    /// Presence bit for `tags`.
    pub const TAGS: u64 = 1 << 5;
    /// Presence bit for `attributes`.
    pub const ATTRIBUTES: u64 = 1 << 6;

    /// All presence bits a metric can carry.
    pub const PRESENCE_MASK: u64 = Self::PROC
        | Self::TIME
        | Self::KEY
        | Self::VALUE
        | Self::HOST
        | Self::TAGS
        | Self::ATTRIBUTES;

    /// Returns a metric with no fields set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the raw presence bitmask.
    pub fn presence(&self) -> u64 {
        self.has
    }

    /// Tests whether the given presence bit is set.
    pub fn has(&self, bit: u64) -> bool {
        self.has & bit != 0
    }

    fn check(&self, bit: u64, name: &'static str) -> Result<(), WireError> {
        if self.has & bit == 0 {
            return Err(WireError::FieldNotSet(name));
        }
        Ok(())
    }

    pub fn with_proc(&self, proc: impl Into<String>) -> Self {
        let mut m = self.clone();
        m.has |= Self::PROC;
        m.proc = proc.into();
        m
    }

    pub fn proc(&self) -> Result<&str, WireError> {
        self.check(Self::PROC, "proc")?;
        Ok(&self.proc)
    }

    pub fn with_time(&self, time: i64) -> Self {
        let mut m = self.clone();
        m.has |= Self::TIME;
        m.time = time;
        m
    }

    pub fn time(&self) -> Result<i64, WireError> {
        self.check(Self::TIME, "time")?;
        Ok(self.time)
    }

    pub fn with_key(&self, key: impl Into<String>) -> Self {
        let mut m = self.clone();
        m.has |= Self::KEY;
        m.key = key.into();
        m
    }

    pub fn key(&self) -> Result<&str, WireError> {
        self.check(Self::KEY, "key")?;
        Ok(&self.key)
    }

    pub fn with_value(&self, value: f64) -> Self {
        let mut m = self.clone();
        m.has |= Self::VALUE;
        m.value = value;
        m
    }

    pub fn value(&self) -> Result<f64, WireError> {
        self.check(Self::VALUE, "value")?;
        Ok(self.value)
    }

    pub fn with_host(&self, host: impl Into<String>) -> Self {
        let mut m = self.clone();
        m.has |= Self::HOST;
        m.host = host.into();
        m
    }

    pub fn host(&self) -> Result<&str, WireError> {
        self.check(Self::HOST, "host")?;
        Ok(&self.host)
    }

    /// Appends a tag, preserving insertion order.
    pub fn tag(&self, tag: impl Into<String>) -> Self {
        let mut m = self.clone();
        m.has |= Self::TAGS;
        m.tags.push(tag.into());
        m
    }

    /// Replaces the whole tag list.
    pub fn with_tags(&self, tags: Vec<String>) -> Self {
        let mut m = self.clone();
        m.has |= Self::TAGS;
        m.tags = tags;
        m
    }

    pub fn tags(&self) -> Result<&[String], WireError> {
        self.check(Self::TAGS, "tags")?;
        Ok(&self.tags)
    }

    /// Inserts an attribute, overwriting a duplicate key.
    pub fn attribute(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut m = self.clone();
        m.has |= Self::ATTRIBUTES;
        m.attributes.insert(key.into(), value.into());
        m
    }

    /// Replaces the whole attribute map.
    pub fn with_attributes(&self, attributes: BTreeMap<String, String>) -> Self {
        let mut m = self.clone();
        m.has |= Self::ATTRIBUTES;
        m.attributes = attributes;
        m
    }

    pub fn attributes(&self) -> Result<&BTreeMap<String, String>, WireError> {
        self.check(Self::ATTRIBUTES, "attributes")?;
        Ok(&self.attributes)
    }
}

// Equality and hashing consider only fields whose presence bit is set, so
// differing bitmasks are never equal even when the stored defaults match.
// `value` compares and hashes by bit pattern.
impl PartialEq for Metric {
    fn eq(&self, other: &Self) -> bool {
        if self.has != other.has {
            return false;
        }
        if self.has(Self::PROC) && self.proc != other.proc {
            return false;
        }
        if self.has(Self::TIME) && self.time != other.time {
            return false;
        }
        if self.has(Self::KEY) && self.key != other.key {
            return false;
        }
        if self.has(Self::VALUE) && self.value.to_bits() != other.value.to_bits() {
            return false;
        }
        if self.has(Self::HOST) && self.host != other.host {
            return false;
        }
        if self.has(Self::TAGS) && self.tags != other.tags {
            return false;
        }
        if self.has(Self::ATTRIBUTES) && self.attributes != other.attributes {
            return false;
        }
        true
    }
}

impl Eq for Metric {}

impl Hash for Metric {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.has.hash(state);
        if self.has(Self::PROC) {
            self.proc.hash(state);
        }
        if self.has(Self::TIME) {
            self.time.hash(state);
        }
        if self.has(Self::KEY) {
            self.key.hash(state);
        }
        if self.has(Self::VALUE) {
            self.value.to_bits().hash(state);
        }
        if self.has(Self::HOST) {
            self.host.hash(state);
        }
        if self.has(Self::TAGS) {
            self.tags.hash(state);
        }
        if self.has(Self::ATTRIBUTES) {
            self.attributes.hash(state);
        }
    }
}
