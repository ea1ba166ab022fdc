//! # shroud-crypto
//!
//! Cryptographic primitives for route blinding and onion messages.
//!
//! The suite is fixed; there is no algorithm negotiation.
//!
//! ## Modules
//!
//! - [`secp`]: secp256k1 scalars, points, ECDH and multiplicative tweaks
//! - [`hash`]: SHA-256 and label-separated HMAC-SHA256 subkeys
//! - [`chacha20`]: ChaCha20-Poly1305 AEAD (RFC 8439) and the raw ChaCha20 keystream

pub mod chacha20;
pub mod hash;
pub mod secp;

/// Error types for cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// AEAD decryption failed (authentication tag mismatch).
    #[error("AEAD decryption failed")]
    AeadDecryption,

    /// AEAD encryption failed.
    #[error("AEAD encryption failed")]
    AeadEncryption,

    /// Input bytes do not decode to a valid scalar.
    #[error("invalid scalar: {0}")]
    InvalidScalar(String),

    /// Input bytes do not decode to a valid curve point.
    #[error("invalid point: {0}")]
    InvalidPoint(String),

    /// A tweak or ECDH produced an invalid result on well-formed inputs.
    #[error("curve operation failed: {0}")]
    CurveOperation(String),

    /// Invalid key length.
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, CryptoError>;
