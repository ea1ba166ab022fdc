//! The blinding key chain.
//!
//! Both sides of a blinded path walk the same chain. The creator holds the
//! ephemeral private key `e(i)` and computes `ss(i) = ECDH(P(i), e(i))`; the
//! relay holds its node key `k(i)` and computes `ss(i) = ECDH(E(i), k(i))`.
//! The link hash `h(i) = SHA256(E(i) || ss(i))` then advances both halves of
//! the ephemeral pair in lockstep.

use shroud_crypto::hash::{self, Digest};
use shroud_crypto::secp::{self, Point, Scalar, SharedSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{BlindingError, Result};

pub use shroud_crypto::hash::labels;

/// A 32-byte key derived from a shared secret under one label.
///
/// Not `Clone`: each subkey is handed by value to exactly one consumer
/// (one AEAD operation or one point tweak) and wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SubKey([u8; 32]);

impl SubKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for SubKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SubKey(..)")
    }
}

/// `SHA256(compressed(E) || ss)`.
pub fn derive_link_hash(ephemeral_pk: &Point, shared_secret: &SharedSecret) -> Digest {
    hash::sha256_concat(&[&ephemeral_pk.serialize(), shared_secret.as_bytes()])
}

/// `E(i+1) = h · E(i)`.
///
/// # Errors
///
/// [`BlindingError::CryptoInvariant`] if the tweak is zero or out of range,
/// which a SHA-256 output hits with negligible probability.
pub fn advance_public(ephemeral_pk: &Point, link_hash: &Digest) -> Result<Point> {
    ephemeral_pk
        .mul_tweak(link_hash)
        .map_err(BlindingError::invariant)
}

/// `e(i+1) = h · e(i) mod n`.
pub fn advance_private(ephemeral_sk: &Scalar, link_hash: &Digest) -> Result<Scalar> {
    ephemeral_sk
        .mul_tweak(link_hash)
        .map_err(BlindingError::invariant)
}

/// `HMAC-SHA256(key = label, message = ss)`.
pub fn sub_key(shared_secret: &SharedSecret, label: &str) -> Result<SubKey> {
    hash::derive_subkey(label, shared_secret.as_bytes())
        .map(SubKey)
        .map_err(BlindingError::invariant)
}

/// `key · P`, consuming the key.
pub fn blind_point(point: &Point, key: SubKey) -> Result<Point> {
    point.mul_tweak(key.as_bytes()).map_err(BlindingError::invariant)
}

/// The creator's position in the chain: the ephemeral pair for hop `i`.
///
/// The shared secret for the hop is produced by [`KeyChainState::link`]
/// and fed back into [`KeyChainState::advance`]; the state never outlives
/// one step.
pub struct KeyChainState {
    ephemeral_pk: Point,
    ephemeral_sk: Scalar,
}

impl KeyChainState {
    /// Start a chain from the session key `e(0)`.
    pub fn start(session_key: Scalar) -> Self {
        Self {
            ephemeral_pk: session_key.public_key(),
            ephemeral_sk: session_key,
        }
    }

    /// `E(i)`.
    pub fn ephemeral_pk(&self) -> &Point {
        &self.ephemeral_pk
    }

    /// `ss(i) = ECDH(P(i), e(i))`.
    pub fn link(&self, node_id: &Point) -> SharedSecret {
        secp::ecdh(node_id, &self.ephemeral_sk)
    }

    /// Step to `(E(i+1), e(i+1))`, consuming the current pair.
    pub fn advance(self, shared_secret: &SharedSecret) -> Result<Self> {
        let h = derive_link_hash(&self.ephemeral_pk, shared_secret);
        let ephemeral_pk = advance_public(&self.ephemeral_pk, &h)?;
        let ephemeral_sk = advance_private(&self.ephemeral_sk, &h)?;
        debug_assert_eq!(ephemeral_sk.public_key(), ephemeral_pk);
        Ok(Self {
            ephemeral_pk,
            ephemeral_sk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(b: u8) -> Scalar {
        Scalar::from_bytes(&[b; 32]).expect("scalar")
    }

    #[test]
    fn test_creator_and_relay_agree() {
        let node = scalar(0x11);
        let state = KeyChainState::start(scalar(0x06));
        let e0 = *state.ephemeral_pk();

        let ss_creator = state.link(&node.public_key());
        let ss_relay = secp::ecdh(&e0, &node);
        assert_eq!(ss_creator.as_bytes(), ss_relay.as_bytes());

        let next = state.advance(&ss_creator).expect("advance");
        let h = derive_link_hash(&e0, &ss_relay);
        assert_eq!(*next.ephemeral_pk(), advance_public(&e0, &h).expect("advance"));
    }

    #[test]
    fn test_private_and_public_advance_stay_paired() {
        let e = scalar(0x06);
        let h = [0x42u8; 32];
        let next_sk = advance_private(&e, &h).expect("advance");
        let next_pk = advance_public(&e.public_key(), &h).expect("advance");
        assert_eq!(next_sk.public_key(), next_pk);
    }

    #[test]
    fn test_zero_link_hash_is_invariant_violation() {
        let err = advance_public(&scalar(1).public_key(), &[0u8; 32]).expect_err("zero tweak");
        assert!(err.is_invariant_violation());
        let err = advance_private(&scalar(1), &[0u8; 32]).expect_err("zero tweak");
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_link_hash_binds_ephemeral_and_secret() {
        let ss = SharedSecret::from_bytes([9u8; 32]);
        let a = derive_link_hash(&scalar(1).public_key(), &ss);
        let b = derive_link_hash(&scalar(2).public_key(), &ss);
        assert_ne!(a, b);
        let c = derive_link_hash(&scalar(1).public_key(), &SharedSecret::from_bytes([8u8; 32]));
        assert_ne!(a, c);
    }

    #[test]
    fn test_subkeys_are_label_separated() {
        let ss = SharedSecret::from_bytes([3u8; 32]);
        let rho = sub_key(&ss, labels::RHO).expect("rho");
        let blind = sub_key(&ss, labels::BLINDED_NODE_ID).expect("blind");
        assert_ne!(rho.as_bytes(), blind.as_bytes());
        assert_eq!(format!("{rho:?}"), "SubKey(..)");
    }

    #[test]
    fn test_blind_point_matches_scalar_tweak() {
        let node = scalar(0x22);
        let ss = SharedSecret::from_bytes([5u8; 32]);
        let key = sub_key(&ss, labels::BLINDED_NODE_ID).expect("key");
        let tweak = *key.as_bytes();
        let blinded = blind_point(&node.public_key(), key).expect("blind");
        assert_eq!(blinded, node.mul_tweak(&tweak).expect("tweak").public_key());
    }
}
