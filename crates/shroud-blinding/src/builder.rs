//! Blinded path creation.
//!
//! For each hop `i`, in order:
//!
//! 1. `ss(i) = ECDH(P(i), e(i))`
//! 2. `rho(i)` and `blind(i)` subkeys from `ss(i)`
//! 3. `B(i) = blind(i) · P(i)`, except `B(0) = P(0)`
//! 4. the inner instructions naming hop `i+1`, sealed under `rho(i)` and
//!    carried in the outer payload's `enctlv` record; the last hop gets an
//!    empty payload
//! 5. advance the ephemeral pair by `h(i)`

use std::str::FromStr;

use shroud_crypto::secp::{Point, Scalar};
use shroud_wire::bigsize;
use shroud_wire::onionmsg::{EncMsgTlvs, OnionMsgPayload};
use shroud_wire::scid::ShortChannelId;
use shroud_wire::tlv::TlvRecord;
use tracing::debug;

use crate::codec;
use crate::keychain::{blind_point, labels, sub_key, KeyChainState};
use crate::session::SessionKeySource;
use crate::{BlindingError, Result};

/// A node on the path as the creator knows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathHop {
    pub node_id: Point,
    /// Channel the previous hop should use to reach this node.
    pub routing_hint: Option<ShortChannelId>,
}

impl PathHop {
    pub fn new(node_id: Point) -> Self {
        Self {
            node_id,
            routing_hint: None,
        }
    }
}

impl FromStr for PathHop {
    type Err = BlindingError;

    /// Parse `<node id hex>[/<routing hint>]`.
    fn from_str(s: &str) -> Result<Self> {
        let (node, hint) = match s.split_once('/') {
            Some((node, hint)) => (node, Some(hint)),
            None => (s, None),
        };
        let node_id = Point::from_hex(node)?;
        let routing_hint = hint
            .map(|h| {
                h.parse::<ShortChannelId>()
                    .map_err(|e| BlindingError::Argument(e.to_string()))
            })
            .transpose()?;
        Ok(Self {
            node_id,
            routing_hint,
        })
    }
}

/// One hop of a finished path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindedHop {
    /// `B(i)`: the key the onion is built to for this hop.
    pub blinded_node_id: Point,
    /// Sealed instructions for this hop; empty for the last hop.
    pub encrypted_payload: Vec<u8>,
    /// Outer record stream carrying `encrypted_payload`; empty for the last hop.
    pub payload: Vec<u8>,
}

impl BlindedHop {
    /// The payload with its BigSize length prefix, as placed in the onion.
    pub fn framed_payload(&self) -> Vec<u8> {
        bigsize::prefix_length(&self.payload)
    }

    pub fn is_terminal(&self) -> bool {
        self.payload.is_empty()
    }
}

/// A blinded path: the blinding point handed to the first hop plus every
/// hop's blinded id and payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindedPath {
    /// `E(0)`.
    pub blinding: Point,
    pub hops: Vec<BlindedHop>,
}

/// Create a blinded path over `path`, drawing `e(0)` from `keys`.
pub fn create_path(path: &[PathHop], keys: &mut impl SessionKeySource) -> Result<BlindedPath> {
    create_path_with_seed(path, keys.session_key()?)
}

/// Create a blinded path over `path` starting from session key `seed`.
///
/// # Errors
///
/// [`BlindingError::Argument`] for an empty path,
/// [`BlindingError::CryptoInvariant`] if a curve operation fails.
pub fn create_path_with_seed(path: &[PathHop], seed: Scalar) -> Result<BlindedPath> {
    if path.is_empty() {
        return Err(BlindingError::Argument(
            "a blinded path needs at least one node".into(),
        ));
    }
    let chain = KeyChainState::start(seed);
    let blinding = *chain.ephemeral_pk();

    let (_, hops) = path.iter().enumerate().try_fold(
        (chain, Vec::with_capacity(path.len())),
        |(chain, mut hops), (i, hop)| -> Result<_> {
            let ss = chain.link(&hop.node_id);

            let blinded_node_id = if i == 0 {
                hop.node_id
            } else {
                blind_point(&hop.node_id, sub_key(&ss, labels::BLINDED_NODE_ID)?)?
            };

            let blinded = match path.get(i + 1) {
                Some(next) => {
                    let instructions = EncMsgTlvs {
                        next_node_id: Some(next.node_id),
                        next_short_channel_id: next.routing_hint,
                        ..Default::default()
                    };
                    let plaintext = instructions.to_wire().map_err(wire_invariant)?;
                    let encrypted_payload = codec::encrypt(&plaintext, sub_key(&ss, labels::RHO)?)?;
                    let outer = OnionMsgPayload {
                        enctlv: Some(encrypted_payload.clone()),
                        ..Default::default()
                    };
                    BlindedHop {
                        blinded_node_id,
                        payload: outer.to_wire().map_err(wire_invariant)?,
                        encrypted_payload,
                    }
                }
                None => BlindedHop {
                    blinded_node_id,
                    encrypted_payload: Vec::new(),
                    payload: Vec::new(),
                },
            };
            debug!(hop = i, blinded = %blinded.blinded_node_id, payload_len = blinded.payload.len(), "blinded hop");
            hops.push(blinded);

            let chain = if i + 1 < path.len() { chain.advance(&ss)? } else { chain };
            Ok((chain, hops))
        },
    )?;

    Ok(BlindedPath { blinding, hops })
}

fn wire_invariant(err: shroud_wire::WireError) -> BlindingError {
    BlindingError::CryptoInvariant(format!("record encoding failed: {err}"))
}
