//! # shroud-wire
//!
//! Typed-record stream codec for onion messages.
//!
//! - [`bigsize`]: BigSize varints and length-prefixed frames
//! - [`tlv`]: raw `(type, length, value)` streams and typed record tables
//! - [`onionmsg`]: the outer onion-message payload and the encrypted inner instructions
//! - [`scid`]: short channel ids used as routing hints
//!
//! ## Wire format
//!
//! ```text
//! stream := record*
//! record := type:bigsize length:bigsize value:[u8; length]
//! ```
//!
//! Types are strictly ascending. Unknown odd types are carried through
//! untouched; unknown even types are rejected.

pub mod bigsize;
pub mod onionmsg;
pub mod scid;
pub mod tlv;

/// Error types for wire encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete item could be read.
    #[error("truncated input: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// A BigSize value was not minimally encoded.
    #[error("non-minimal bigsize encoding")]
    NonMinimalBigSize,

    /// Record types were not strictly ascending.
    #[error("record type {tag} follows {prev}: types must be strictly ascending")]
    UnorderedTypes { prev: u64, tag: u64 },

    /// An even record type this codec does not understand.
    #[error("unknown even record type {0}")]
    UnknownEvenType(u64),

    /// A known record held a value that does not decode.
    #[error("invalid value for record type {tag}: {reason}")]
    InvalidValue { tag: u64, reason: String },

    /// A length prefix disagreed with the bytes that follow it.
    #[error("length prefix {declared} does not match {actual} remaining bytes")]
    LengthMismatch { declared: u64, actual: usize },

    /// A short channel id string did not parse.
    #[error("invalid short channel id: {0}")]
    InvalidShortChannelId(String),
}

/// Result type alias for wire operations.
pub type Result<T> = std::result::Result<T, WireError>;
