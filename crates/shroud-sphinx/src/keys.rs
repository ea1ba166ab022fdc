//! Per-hop key derivation.
//!
//! Given the hop's onion shared secret `S`:
//! - `rho = HMAC-SHA256("rho", S)`: routing info obfuscation stream key
//! - `mu  = HMAC-SHA256("mu", S)`: packet HMAC key
//!
//! The ephemeral key for the next hop is `E · SHA256(E || S)`.

use shroud_crypto::hash::{self, labels, Digest};
use shroud_crypto::secp::{Point, Scalar, SharedSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::Result;

/// Keys one hop needs to verify and peel its layer.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct HopKeys {
    /// Routing info stream key.
    pub rho: [u8; 32],
    /// HMAC key.
    pub mu: [u8; 32],
}

impl HopKeys {
    /// Derive both keys from a hop's shared secret.
    pub fn derive(shared_secret: &SharedSecret) -> Result<Self> {
        Ok(Self {
            rho: hash::derive_subkey(labels::RHO, shared_secret.as_bytes())?,
            mu: hash::derive_subkey(labels::MU, shared_secret.as_bytes())?,
        })
    }
}

/// `SHA256(compressed(E) || S)`.
pub fn blinding_factor(ephemeral_key: &Point, shared_secret: &SharedSecret) -> Digest {
    hash::sha256_concat(&[&ephemeral_key.serialize(), shared_secret.as_bytes()])
}

/// Key for the random-looking initial routing info, derived from the session key.
pub fn pad_key(session_key: &Scalar) -> Result<[u8; 32]> {
    Ok(hash::derive_subkey(labels::PAD, &session_key.secret_bytes())?)
}
