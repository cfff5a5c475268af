//! # beacon
//!
//! Fire-and-forget telemetry client: build immutable metrics and events with
//! per-field presence tracking, encode them in a versioned binary wire
//! format, and ship them to a collector over UDP or TCP.
//!
//! ```no_run
//! use beacon::{metric, Client, ClientConfig};
//!
//! # async fn example() -> Result<(), beacon::ClientError> {
//! let client = Client::connect_udp(ClientConfig::default()).await?;
//! client
//!     .send_metric(&metric("cpu.idle").with_value(98.5).with_host("node1"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub use beacon_client::{Client, ClientConfig, ClientError};
pub use beacon_protocol::{
    Batch, BatchOption, Event, Metric, WireError, DEFAULT_PORT, PROTOCOL_VERSION,
};

/// Returns a new metric with the given key set.
pub fn metric(key: impl Into<String>) -> Metric {
    Metric::empty().with_key(key)
}

/// Returns a new event with the given key set.
pub fn event(key: impl Into<String>) -> Event {
    Event::empty().with_key(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_helper() {
        let m = metric("cpu");
        assert_eq!(m.key().unwrap(), "cpu");
        assert_eq!(m.presence(), Metric::KEY);
    }

    #[test]
    fn test_event_helper() {
        let e = event("deploy");
        assert_eq!(e.key().unwrap(), "deploy");
        assert_eq!(e.presence(), Event::KEY);
    }
}
