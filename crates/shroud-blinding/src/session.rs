//! Sources for the path's initial ephemeral key `e(0)`.

use rand::rngs::OsRng;
use shroud_crypto::secp::Scalar;

use crate::Result;

/// Supplies the session key a new path starts from.
pub trait SessionKeySource {
    fn session_key(&mut self) -> Result<Scalar>;
}

/// Fresh keys from the operating system RNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsSessionKeys;

impl SessionKeySource for OsSessionKeys {
    fn session_key(&mut self) -> Result<Scalar> {
        Ok(Scalar::random(&mut OsRng))
    }
}

/// The same key every time. For reproducible test vectors only.
#[cfg(any(test, feature = "fixed-seed"))]
#[derive(Clone, Debug)]
pub struct FixedSessionKey {
    bytes: [u8; 32],
}

#[cfg(any(test, feature = "fixed-seed"))]
impl FixedSessionKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }
}

#[cfg(any(test, feature = "fixed-seed"))]
impl Default for FixedSessionKey {
    fn default() -> Self {
        Self::new([0x06; 32])
    }
}

#[cfg(any(test, feature = "fixed-seed"))]
impl SessionKeySource for FixedSessionKey {
    fn session_key(&mut self) -> Result<Scalar> {
        Ok(Scalar::from_bytes(&self.bytes)?)
    }
}
