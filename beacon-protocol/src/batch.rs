//! Batch container for events and metrics.

use crate::event::Event;
use crate::metric::Metric;
use std::collections::BTreeMap;

/// Options controlling batch encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOption {
    /// Gzip-compress the batch body. The envelope header stays uncompressed.
    CompressGzip,
}

/// A batch of events and metrics sharing a set of attributes.
///
/// Unlike entity fields, `attributes` is not optional: it is always present
/// and always encoded, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Batch {
    pub attributes: BTreeMap<String, String>,
    pub events: Vec<Event>,
    pub metrics: Vec<Metric>,
}

impl Batch {
    pub fn new(
        attributes: BTreeMap<String, String>,
        events: Vec<Event>,
        metrics: Vec<Metric>,
    ) -> Self {
        Self {
            attributes,
            events,
            metrics,
        }
    }

    /// Returns a batch with no attributes, events or metrics.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.events.is_empty() && self.metrics.is_empty()
    }
}
