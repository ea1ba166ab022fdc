//! secp256k1 scalars, points and key agreement.
//!
//! Node identities, blinding points and onion ephemeral keys are all
//! compressed secp256k1 points. The blinding chain relies on multiplicative
//! tweaks: `P · t` for points and `k · t mod n` for scalars, so that
//! `(k · t) · G == (k · G) · t`.

use std::fmt;

use rand::{CryptoRng, RngCore};
use secp256k1::{ecdh, PublicKey, SecretKey, SECP256K1};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{CryptoError, Result};

/// Size of a serialized scalar.
pub const SCALAR_SIZE: usize = 32;

/// Size of a compressed point.
pub const POINT_SIZE: usize = 33;

/// A private scalar in `[1, n)`. Erased on drop; never printed.
pub struct Scalar {
    inner: SecretKey,
}

/// A valid, compressed secp256k1 point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    inner: PublicKey,
}

/// `SHA256(compressed(k · P))`, the libsecp256k1 default ECDH output.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: [u8; 32],
}

fn tweak_scalar(tweak: &[u8; 32]) -> Result<secp256k1::Scalar> {
    secp256k1::Scalar::from_be_bytes(*tweak)
        .map_err(|_| CryptoError::CurveOperation("tweak is not below the curve order".to_string()))
}

impl Scalar {
    /// Generate a uniformly random scalar from `rng`.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            inner: SecretKey::new(rng),
        }
    }

    /// Create from 32 big-endian bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidScalar`] if the value is zero or not below the
    /// curve order.
    pub fn from_bytes(bytes: &[u8; SCALAR_SIZE]) -> Result<Self> {
        SecretKey::from_slice(bytes)
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::InvalidScalar(e.to_string()))
    }

    /// Create from a byte slice that must be exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SCALAR_SIZE] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: SCALAR_SIZE,
            actual: bytes.len(),
        })?;
        Self::from_bytes(&arr)
    }

    /// Parse from 64 hex digits.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = Zeroizing::new(hex::decode(s)?);
        Self::from_slice(&bytes)
    }

    /// Compute `self · G`.
    pub fn public_key(&self) -> Point {
        Point {
            inner: PublicKey::from_secret_key_global(&self.inner),
        }
    }

    /// Compute `self · tweak mod n`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CurveOperation`] if the tweak is zero or out of range.
    pub fn mul_tweak(&self, tweak: &[u8; 32]) -> Result<Self> {
        let t = tweak_scalar(tweak)?;
        self.inner
            .mul_tweak(&t)
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::CurveOperation(format!("scalar tweak: {e}")))
    }

    /// Raw big-endian bytes, wiped when the returned buffer drops.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; SCALAR_SIZE]> {
        Zeroizing::new(self.inner.secret_bytes())
    }

    pub(crate) fn as_secret_key(&self) -> &SecretKey {
        &self.inner
    }
}

impl Drop for Scalar {
    fn drop(&mut self) {
        self.inner.non_secure_erase();
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Scalar(..)")
    }
}

impl Point {
    /// Parse a 33-byte compressed encoding.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyLength`] for any other length and
    /// [`CryptoError::InvalidPoint`] if the bytes are not on the curve.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != POINT_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: POINT_SIZE,
                actual: bytes.len(),
            });
        }
        PublicKey::from_slice(bytes)
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::InvalidPoint(e.to_string()))
    }

    /// Parse from hex.
    pub fn from_hex(s: &str) -> Result<Self> {
        Self::from_slice(&hex::decode(s)?)
    }

    /// Compressed 33-byte encoding.
    pub fn serialize(&self) -> [u8; POINT_SIZE] {
        self.inner.serialize()
    }

    /// Lowercase hex of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }

    /// Compute `self · tweak`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CurveOperation`] if the tweak is zero or out of range.
    pub fn mul_tweak(&self, tweak: &[u8; 32]) -> Result<Self> {
        let t = tweak_scalar(tweak)?;
        self.inner
            .mul_tweak(SECP256K1, &t)
            .map(|inner| Self { inner })
            .map_err(|e| CryptoError::CurveOperation(format!("point tweak: {e}")))
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({})", self.to_hex())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl SharedSecret {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes of the shared secret.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

/// Perform ECDH between `their_point` and `our_scalar`.
pub fn ecdh(their_point: &Point, our_scalar: &Scalar) -> SharedSecret {
    let shared = ecdh::SharedSecret::new(&their_point.inner, our_scalar.as_secret_key());
    SharedSecret {
        bytes: shared.secret_bytes(),
    }
}
