//! Sealing hop payloads.
//!
//! ChaCha20-Poly1305 with an all-zero nonce and no associated data. Every key
//! is a fresh `rho` subkey used for exactly one message, which the by-value
//! [`SubKey`] parameter enforces.

use shroud_crypto::chacha20::{self, TAG_SIZE, ZERO_NONCE};

use crate::keychain::SubKey;
use crate::{ProtocolError, Result};

/// Encrypt `plaintext`, returning `ciphertext || tag`.
pub fn encrypt(plaintext: &[u8], key: SubKey) -> Result<Vec<u8>> {
    Ok(chacha20::encrypt(key.as_bytes(), &ZERO_NONCE, plaintext)?)
}

/// Decrypt and authenticate `ciphertext || tag`.
///
/// # Errors
///
/// [`ProtocolError::EncryptedFieldTooShort`] when the input cannot hold a
/// tag, [`ProtocolError::AuthFailure`] when authentication fails.
pub fn decrypt(ciphertext: &[u8], key: SubKey) -> Result<Vec<u8>> {
    if ciphertext.len() < TAG_SIZE {
        return Err(ProtocolError::EncryptedFieldTooShort {
            len: ciphertext.len(),
        }
        .into());
    }
    chacha20::decrypt(key.as_bytes(), &ZERO_NONCE, ciphertext)
        .map_err(|_| ProtocolError::AuthFailure.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keychain::{labels, sub_key};
    use crate::BlindingError;
    use shroud_crypto::secp::SharedSecret;

    fn rho(b: u8) -> SubKey {
        sub_key(&SharedSecret::from_bytes([b; 32]), labels::RHO).expect("rho")
    }

    #[test]
    fn test_seal_and_open() {
        let ct = encrypt(b"next hop", rho(1)).expect("encrypt");
        assert_eq!(ct.len(), 8 + TAG_SIZE);
        assert_eq!(decrypt(&ct, rho(1)).expect("decrypt"), b"next hop");
    }

    #[test]
    fn test_empty_plaintext_is_just_a_tag() {
        let ct = encrypt(&[], rho(1)).expect("encrypt");
        assert_eq!(ct.len(), TAG_SIZE);
        assert!(decrypt(&ct, rho(1)).expect("decrypt").is_empty());
    }

    #[test]
    fn test_wrong_key() {
        let ct = encrypt(b"payload", rho(1)).expect("encrypt");
        assert!(matches!(
            decrypt(&ct, rho(2)),
            Err(BlindingError::Protocol(ProtocolError::AuthFailure))
        ));
    }

    #[test]
    fn test_flipped_bit() {
        let mut ct = encrypt(b"payload", rho(1)).expect("encrypt");
        ct[0] ^= 0x80;
        assert!(matches!(
            decrypt(&ct, rho(1)),
            Err(BlindingError::Protocol(ProtocolError::AuthFailure))
        ));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            decrypt(&[0u8; TAG_SIZE - 1], rho(1)),
            Err(BlindingError::Protocol(ProtocolError::EncryptedFieldTooShort { len: 15 }))
        ));
    }
}
