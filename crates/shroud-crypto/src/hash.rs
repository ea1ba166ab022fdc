//! SHA-256 hashing and label-separated HMAC-SHA256 key derivation.
//!
//! ## Modes
//!
//! - [`sha256_concat`]: plain hashing for blinding factors and link hashes
//! - [`derive_subkey`]: `HMAC-SHA256(key = label, msg = secret)`; one key per purpose
//! - [`hmac_sha256`] / [`verify_hmac_sha256`]: packet MACs
//!
//! ## Labels
//!
//! Every subkey label in use is registered in [`labels`]. Two keys derived from
//! the same secret under different labels are independent.

use hmac::{Hmac, Mac};
use sha2::{Digest as _, Sha256};

use crate::{CryptoError, Result};

type HmacSha256 = Hmac<Sha256>;

/// A 32-byte SHA-256 output.
pub type Digest = [u8; 32];

/// Registered subkey labels.
pub mod labels {
    /// Encrypts blinded-hop payloads and obfuscates onion routing info.
    pub const RHO: &str = "rho";
    /// Tweaks a node id (or incoming onion key) into its blinded form.
    pub const BLINDED_NODE_ID: &str = "blinded_node_id";
    /// Authenticates onion packets.
    pub const MU: &str = "mu";
    /// Seeds the initial onion routing-info padding.
    pub const PAD: &str = "pad";
}

/// Compute SHA-256 over the concatenation of `parts`.
pub fn sha256_concat(parts: &[&[u8]]) -> Digest {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Compute `HMAC-SHA256(key, data)`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Digest> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: 32,
        actual: key.len(),
    })?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Verify `tag` against `HMAC-SHA256(key, data)` in constant time.
pub fn verify_hmac_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> Result<bool> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: 32,
        actual: key.len(),
    })?;
    mac.update(data);
    Ok(mac.verify_slice(tag).is_ok())
}

/// Derive a subkey from `secret` under `label`.
///
/// The label is the HMAC key and the secret the message.
pub fn derive_subkey(label: &str, secret: &[u8; 32]) -> Result<[u8; 32]> {
    hmac_sha256(label.as_bytes(), secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_sha256_empty() {
        assert_eq!(
            sha256_concat(&[]),
            hex!("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }

    #[test]
    fn test_sha256_concat_matches_single() {
        assert_eq!(sha256_concat(&[b"blind", b"ing"]), sha256_concat(&[b"blinding"]));
    }

    #[test]
    fn test_hmac_rfc4231_case2() {
        let tag = hmac_sha256(b"Jefe", b"what do ya want for nothing?").expect("hmac");
        assert_eq!(
            tag,
            hex!("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );
    }

    #[test]
    fn test_verify_hmac() {
        let tag = hmac_sha256(b"mu-key", b"routing").expect("hmac");
        assert!(verify_hmac_sha256(b"mu-key", b"routing", &tag).expect("verify"));
        assert!(!verify_hmac_sha256(b"mu-key", b"routinG", &tag).expect("verify"));
    }

    #[test]
    fn test_subkeys_are_label_separated() {
        let secret = [0x11u8; 32];
        let rho = derive_subkey(labels::RHO, &secret).expect("rho");
        let blind = derive_subkey(labels::BLINDED_NODE_ID, &secret).expect("blind");
        assert_ne!(rho, blind);
        assert_eq!(rho, derive_subkey(labels::RHO, &secret).expect("rho again"));
    }

    #[test]
    fn test_labels_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for label in [labels::RHO, labels::BLINDED_NODE_ID, labels::MU, labels::PAD] {
            assert!(seen.insert(label), "duplicate label: {label}");
        }
    }
}
