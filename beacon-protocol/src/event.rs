//! Discrete event values with per-field presence tracking.

use crate::error::WireError;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// A discrete event, such as a state change or an alert.
///
/// Follows the same presence-bitmask discipline as [`crate::Metric`]: one
/// bit per field in declaration order, setters return new values, accessors
/// fail on absent fields.
#[derive(Debug, Clone, Default)]
pub struct Event {
    has: u64,
    time: i64,
    key: String,
    value: f64,
    host: String,
    state: String,
    description: String,
    ttl: i64,
    tags: Vec<String>,
    attributes: BTreeMap<String, String>,
}

impl Event {
    /// Presence bit for `time`.
    pub const TIME: u64 = 1 << 0;
    /// Presence bit for `key`.
    pub const KEY: u64 = 1 << 1;
    /// Presence bit for `value`.
    pub const VALUE: u64 = 1 << 2;
    /// Presence bit for `host`.
    pub const HOST: u64 = 1 << 3;
    /// Presence bit for `state`.
    pub const STATE: u64 = 1 << 4;
    /// Presence bit for `description`.
    pub const DESCRIPTION: u64 = 1 << 5;
    /// Presence bit for `ttl`.
    pub const TTL: u64 = 1 << 6;
    /// Presence bit for `tags`.
    pub const TAGS: u64 = 1 << 7;
    /// Presence bit for `attributes`.
    pub const ATTRIBUTES: u64 = 1 << 8;

    /// All presence bits an event can carry.
    pub const PRESENCE_MASK: u64 = Self::TIME
        | Self::KEY
        | Self::VALUE
        | Self::HOST
        | Self::STATE
        | Self::DESCRIPTION
        | Self::TTL
        | Self::TAGS
        | Self::ATTRIBUTES;

    /// Returns an event with no fields set.
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

    pub fn with_time(&self, time: i64) -> Self {
        let mut e = self.clone();
        e.has |= Self::TIME;
        e.time = time;
        e
    }

    pub fn time(&self) -> Result<i64, WireError> {
        self.check(Self::TIME, "time")?;
        Ok(self.time)
    }

    pub fn with_key(&self, key: impl Into<String>) -> Self {
        let mut e = self.clone();
        e.has |= Self::KEY;
        e.key = key.into();
        e
    }

    pub fn key(&self) -> Result<&str, WireError> {
        self.check(Self::KEY, "key")?;
        Ok(&self.key)
    }

    pub fn with_value(&self, value: f64) -> Self {
        let mut e = self.clone();
        e.has |= Self::VALUE;
        e.value = value;
        e
    }

    pub fn value(&self) -> Result<f64, WireError> {
        self.check(Self::VALUE, "value")?;
        Ok(self.value)
    }

    pub fn with_host(&self, host: impl Into<String>) -> Self {
        let mut e = self.clone();
        e.has |= Self::HOST;
        e.host = host.into();
        e
    }

    pub fn host(&self) -> Result<&str, WireError> {
        self.check(Self::HOST, "host")?;
        Ok(&self.host)
    }

    pub fn with_state(&self, state: impl Into<String>) -> Self {
        let mut e = self.clone();
        e.has |= Self::STATE;
        e.state = state.into();
        e
    }

    pub fn state(&self) -> Result<&str, WireError> {
        self.check(Self::STATE, "state")?;
        Ok(&self.state)
    }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        let mut e = self.clone();
        e.has |= Self::DESCRIPTION;
        e.description = description.into();
        e
    }

    pub fn description(&self) -> Result<&str, WireError> {
        self.check(Self::DESCRIPTION, "description")?;
        Ok(&self.description)
    }

    pub fn with_ttl(&self, ttl: i64) -> Self {
        let mut e = self.clone();
        e.has |= Self::TTL;
        e.ttl = ttl;
        e
    }

    pub fn ttl(&self) -> Result<i64, WireError> {
        self.check(Self::TTL, "ttl")?;
        Ok(self.ttl)
    }

    /// Appends a tag, preserving insertion order.
    pub fn tag(&self, tag: impl Into<String>) -> Self {
        let mut e = self.clone();
        e.has |= Self::TAGS;
        e.tags.push(tag.into());
        e
    }

    /// Replaces the whole tag list.
    pub fn with_tags(&self, tags: Vec<String>) -> Self {
        let mut e = self.clone();
        e.has |= Self::TAGS;
        e.tags = tags;
        e
    }

    pub fn tags(&self) -> Result<&[String], WireError> {
        self.check(Self::TAGS, "tags")?;
        Ok(&self.tags)
    }

    /// Inserts an attribute, overwriting a duplicate key.
    pub fn attribute(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut e = self.clone();
        e.has |= Self::ATTRIBUTES;
        e.attributes.insert(key.into(), value.into());
        e
    }

    /// Replaces the whole attribute map.
    pub fn with_attributes(&self, attributes: BTreeMap<String, String>) -> Self {
        let mut e = self.clone();
        e.has |= Self::ATTRIBUTES;
        e.attributes = attributes;
        e
    }

    pub fn attributes(&self) -> Result<&BTreeMap<String, String>, WireError> {
        self.check(Self::ATTRIBUTES, "attributes")?;
        Ok(&self.attributes)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        if self.has != other.has {
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
        if self.has(Self::STATE) && self.state != other.state {
            return false;
        }
        if self.has(Self::DESCRIPTION) && self.description != other.description {
            return false;
        }
        if self.has(Self::TTL) && self.ttl != other.ttl {
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

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.has.hash(state);
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
        if self.has(Self::STATE) {
            self.state.hash(state);
        }
        if self.has(Self::DESCRIPTION) {
            self.description.hash(state);
        }
        if self.has(Self::TTL) {
            self.ttl.hash(state);
        }
        if self.has(Self::TAGS) {
            self.tags.hash(state);
        }
        if self.has(Self::ATTRIBUTES) {
            self.attributes.hash(state);
        }
    }
}
