//! ChaCha20-Poly1305 AEAD encryption (RFC 8439) and the bare ChaCha20 keystream.
//!
//! The AEAD seals per-hop forwarding instructions inside blinded paths. The
//! keystream obfuscates onion routing info.

use ::chacha20::cipher::{KeyIvInit, StreamCipher};
use ::chacha20::ChaCha20;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};

use crate::{CryptoError, Result};

/// Nonce size for ChaCha20-Poly1305 (96 bits = 12 bytes).
pub const NONCE_SIZE: usize = 12;

/// Key size for ChaCha20-Poly1305 (256 bits = 32 bytes).
pub const KEY_SIZE: usize = 32;

/// Authentication tag size (128 bits = 16 bytes).
pub const TAG_SIZE: usize = 16;

/// The all-zero nonce. Only safe with keys that are used exactly once.
pub const ZERO_NONCE: [u8; NONCE_SIZE] = [0u8; NONCE_SIZE];

/// Seal `plaintext` under `key`, returning `ciphertext || tag`.
///
/// No associated data is bound. `nonce` must never repeat for a key.
pub fn encrypt(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
    ChaCha20Poly1305::new(Key::from_slice(key))
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| CryptoError::AeadEncryption)
}

/// Open `ciphertext || tag` sealed by [`encrypt`].
///
/// # Errors
///
/// Returns [`CryptoError::AeadDecryption`] if authentication fails.
pub fn decrypt(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> Result<Vec<u8>> {
    ChaCha20Poly1305::new(Key::from_slice(key))
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::AeadDecryption)
}

/// Generate `len` bytes of ChaCha20 keystream under `key` and a zero nonce.
pub fn keystream(key: &[u8; KEY_SIZE], len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    apply_keystream(key, &mut out);
    out
}

/// XOR the zero-nonce ChaCha20 keystream for `key` into `buf` in place.
pub fn apply_keystream(key: &[u8; KEY_SIZE], buf: &mut [u8]) {
    let mut cipher = ChaCha20::new(::chacha20::Key::from_slice(key), ::chacha20::Nonce::from_slice(&ZERO_NONCE));
    cipher.apply_keystream(buf);
}
