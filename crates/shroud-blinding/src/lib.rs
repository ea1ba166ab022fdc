//! # shroud-blinding
//!
//! Route blinding for onion messages.
//!
//! A path creator turns an ordered list of node ids into a [`BlindedPath`]:
//! an initial blinding point plus, per hop, a blinded node id and an
//! encrypted payload naming the next hop. Each relay, holding only its own
//! private key and the blinding point it received, re-derives the same chain
//! step to recover its instructions and the blinding point for the next hop.
//!
//! - [`keychain`]: the blinding chain step and label-separated subkeys
//! - [`codec`]: one-shot AEAD sealing of hop payloads
//! - [`session`]: where the path's initial ephemeral key comes from
//! - [`builder`]: path creation
//! - [`unwrapper`]: per-hop unwrapping
//!
//! ## Chain
//!
//! ```text
//! ss(i)  = ECDH(P(i), e(i))          = ECDH(E(i), k(i))
//! h(i)   = SHA256(E(i) || ss(i))
//! E(i+1) = h(i) · E(i)                e(i+1) = h(i) · e(i)
//! B(i)   = HMAC("blinded_node_id", ss(i)) · P(i)     (B(0) = P(0))
//! ```

pub mod builder;
pub mod codec;
pub mod keychain;
pub mod session;
pub mod unwrapper;

pub use builder::{create_path, create_path_with_seed, BlindedHop, BlindedPath, PathHop};
pub use unwrapper::{unwrap_onion, unwrap_onion_bytes, UnwrapOutcome};

use shroud_crypto::CryptoError;

/// Why an onion was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The onion bytes do not parse as a packet.
    #[error("unparsable onion: {0}")]
    UnparsableOnion(String),

    /// The onion engine refused the packet (HMAC mismatch, bad frame).
    #[error("could not process onion: {0}")]
    OnionRejected(String),

    /// The hop payload is not a valid length-prefixed record stream.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A forwarding hop's payload has no encrypted field.
    #[error("no encrypted forwarding field")]
    MissingEncryptedField,

    /// The encrypted field cannot even hold an authentication tag.
    #[error("encrypted forwarding field too short: {len} bytes")]
    EncryptedFieldTooShort { len: usize },

    /// The encrypted field failed authentication.
    #[error("failed to decrypt forwarding field: tampered or wrong key")]
    AuthFailure,
}

/// Error types for blinded path operations.
#[derive(Debug, thiserror::Error)]
pub enum BlindingError {
    /// Malformed input: bad hex, wrong length, missing values.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Input decoded but is not a valid scalar or curve point.
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// A curve operation failed on well-formed inputs. This is a defect, not
    /// bad input.
    #[error("crypto invariant violated: {0}")]
    CryptoInvariant(String),

    /// The received onion or payload was malformed or tampered with.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl BlindingError {
    /// Whether this error signals a defect rather than bad or hostile input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::CryptoInvariant(_))
    }

    pub(crate) fn invariant(err: CryptoError) -> Self {
        Self::CryptoInvariant(err.to_string())
    }
}

impl From<CryptoError> for BlindingError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Hex(_) | CryptoError::InvalidKeyLength { .. } => Self::Argument(err.to_string()),
            CryptoError::InvalidScalar(_) | CryptoError::InvalidPoint(_) => Self::Conversion(err.to_string()),
            CryptoError::AeadDecryption => Self::Protocol(ProtocolError::AuthFailure),
            CryptoError::AeadEncryption | CryptoError::CurveOperation(_) => Self::CryptoInvariant(err.to_string()),
        }
    }
}

/// Result type alias for blinded path operations.
pub type Result<T> = std::result::Result<T, BlindingError>;
