//! Protocol error types.

use thiserror::Error;

/// Errors produced by entity accessors, codecs and framing.
#[derive(Debug, Error)]
pub enum WireError {
    /// A field was read whose presence bit is unset. This is a caller bug,
    /// not a data error, and is never substituted with a default value.
    #[error("field not set: {0}")]
    FieldNotSet(&'static str),

    #[error("truncated input: need {needed} more bytes")]
    Truncated { needed: usize },

    #[error("unsupported wire version: {0}")]
    UnsupportedVersion(u32),

    #[error("unknown message kind: {0:#x}")]
    UnknownKind(u8),

    #[error("invalid frame length: {0}")]
    InvalidLength(u32),

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: u32, max: u32 },

    #[error("invalid presence bits: {0:#x}")]
    InvalidPresence(u64),

    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    #[error("invalid boolean byte: {0:#x}")]
    InvalidBool(u8),

    /// The selected codec version does not implement this operation.
    /// Distinct from a decode failure: no bytes were interpreted at all.
    #[error("operation {operation} not supported by wire version {version}")]
    Unsupported {
        version: u32,
        operation: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
