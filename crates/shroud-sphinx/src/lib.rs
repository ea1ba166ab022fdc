//! # shroud-sphinx
//!
//! Fixed-size Sphinx onion packets over secp256k1.
//!
//! - [`packet`]: packet layout, parsing and serialization
//! - [`keys`]: per-hop key derivation and the ephemeral-key blinding factor
//! - [`process`]: peeling one layer at a relay
//! - [`construct`]: wrapping a route's payloads into a packet
//!
//! ## Architecture
//!
//! ```text
//! hop payloads (bigsize-length-prefixed TLV streams)
//!     |
//!     v
//! construct()  -- filler, right-shift, rho obfuscation, mu HMAC per hop
//!     |
//!     v
//! OnionPacket  -- [version:1][ephemeral_key:33][routing_info:1300][hmac:32]
//!     |
//!     v
//! process()    -- verify HMAC, peel one layer, blind the ephemeral key
//! ```

pub mod construct;
pub mod keys;
pub mod packet;
pub mod process;

/// Error types for onion packet operations.
#[derive(Debug, thiserror::Error)]
pub enum SphinxError {
    /// Wrong size or unsupported version.
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    /// The embedded ephemeral key is not a curve point.
    #[error("invalid ephemeral key: {0}")]
    InvalidEphemeralKey(String),

    /// HMAC verification failed on the packet.
    #[error("HMAC verification failed")]
    MacVerification,

    /// The decrypted hop payload is malformed.
    #[error("invalid hop payload: {0}")]
    InvalidHopPayload(String),

    /// The route's payloads do not fit the routing info.
    #[error("route too long: {needed} bytes of hop data, {available} available")]
    RouteTooLong { needed: usize, available: usize },

    /// A packet needs at least one hop.
    #[error("empty route")]
    EmptyRoute,

    /// Cryptographic operation failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] shroud_crypto::CryptoError),
}

/// Result type alias for onion packet operations.
pub type Result<T> = std::result::Result<T, SphinxError>;
