//! Client error types.

use beacon_protocol::WireError;
use thiserror::Error;

/// Client errors.
///
/// A failed send surfaces here and is not retried; delivery policy belongs
/// to the caller.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    #[error("connect timeout")]
    Timeout,
}
