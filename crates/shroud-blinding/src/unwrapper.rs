//! Unwrapping one hop of a blinded onion message.
//!
//! The relay knows only its node key `k` and the blinding point `E` it was
//! handed. From `ss = ECDH(E, k)` it derives:
//!
//! - `blind`, which turns the onion's ephemeral key into one its real key can
//!   answer for (the onion was built to `B = blind · P`); the first hop was
//!   addressed by its real id and skips this tweak
//! - `rho`, which opens the sealed forwarding instructions
//! - the next blinding point `E · SHA256(E || ss)`

use shroud_crypto::chacha20::TAG_SIZE;
use shroud_crypto::secp::{self, Point, Scalar, SharedSecret};
use shroud_crypto::CryptoError;
use shroud_sphinx::packet::OnionPacket;
use shroud_sphinx::process::{process_packet, NextCase, RouteStep};
use shroud_sphinx::SphinxError;
use shroud_wire::bigsize;
use shroud_wire::onionmsg::{EncMsgTlvs, OnionMsgPayload};
use shroud_wire::tlv::TlvRecord;
use tracing::{debug, warn};

use crate::codec;
use crate::keychain::{advance_public, derive_link_hash, labels, sub_key, SubKey};
use crate::{BlindingError, ProtocolError, Result};

/// Peels one onion layer given the hop's onion shared secret.
pub trait OnionEngine {
    fn process(&self, onion: &OnionPacket, shared_secret: &SharedSecret) -> std::result::Result<RouteStep, SphinxError>;
}

/// Onion messages carry no associated data.
#[derive(Clone, Copy, Debug, Default)]
pub struct SphinxEngine;

impl OnionEngine for SphinxEngine {
    fn process(&self, onion: &OnionPacket, shared_secret: &SharedSecret) -> std::result::Result<RouteStep, SphinxError> {
        process_packet(onion, shared_secret, &[])
    }
}

/// What a hop learns from unwrapping.
#[derive(Clone, Debug)]
pub enum UnwrapOutcome {
    /// This hop is the destination.
    Terminal,
    /// Forward `next_onion` with `next_blinding` to the node named in `contents`.
    Forward {
        /// Decrypted inner record stream.
        contents: Vec<u8>,
        next_blinding: Point,
        next_onion: OnionPacket,
    },
}

impl UnwrapOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Decode the forwarding instructions. `None` for a terminal outcome.
    pub fn instructions(&self) -> Option<Result<EncMsgTlvs>> {
        match self {
            Self::Terminal => None,
            Self::Forward { contents, .. } => Some(
                EncMsgTlvs::from_wire(contents)
                    .map_err(|e| ProtocolError::InvalidPayload(e.to_string()).into()),
            ),
        }
    }
}

/// [`unwrap_onion`] on a serialized packet.
///
/// # Errors
///
/// [`ProtocolError::UnparsableOnion`] if `onion` is not a packet, otherwise as
/// [`unwrap_onion`].
pub fn unwrap_onion_bytes(
    node_key: &Scalar,
    onion: &[u8],
    blinding: &Point,
    first_hop: bool,
) -> Result<UnwrapOutcome> {
    let packet = OnionPacket::parse(onion).map_err(|e| ProtocolError::UnparsableOnion(e.to_string()))?;
    unwrap_onion(node_key, &packet, blinding, first_hop)
}

/// Unwrap `onion` at this hop using [`SphinxEngine`].
pub fn unwrap_onion(
    node_key: &Scalar,
    onion: &OnionPacket,
    blinding: &Point,
    first_hop: bool,
) -> Result<UnwrapOutcome> {
    unwrap_onion_with(&SphinxEngine, node_key, onion, blinding, first_hop)
}

/// Unwrap `onion` at this hop, peeling the layer with `engine`.
///
/// # Errors
///
/// - [`ProtocolError::OnionRejected`] if the engine refuses the packet
/// - [`ProtocolError::InvalidPayload`] if the hop payload does not decode
/// - [`ProtocolError::MissingEncryptedField`] or
///   [`ProtocolError::EncryptedFieldTooShort`] for a forwarding hop without
///   usable sealed instructions
/// - [`ProtocolError::AuthFailure`] if the instructions fail authentication
pub fn unwrap_onion_with(
    engine: &impl OnionEngine,
    node_key: &Scalar,
    onion: &OnionPacket,
    blinding: &Point,
    first_hop: bool,
) -> Result<UnwrapOutcome> {
    let ss = secp::ecdh(blinding, node_key);
    let rho = sub_key(&ss, labels::RHO)?;

    let onion_key = if first_hop {
        onion.ephemeral_key
    } else {
        let blind = sub_key(&ss, labels::BLINDED_NODE_ID)?;
        onion
            .ephemeral_key
            .mul_tweak(blind.as_bytes())
            .map_err(BlindingError::invariant)?
    };
    let onion_ss = secp::ecdh(&onion_key, node_key);

    let step = engine.process(onion, &onion_ss).map_err(|e| {
        warn!(error = %e, "onion rejected");
        engine_error(e)
    })?;

    let payload = decode_payload(&step.raw_payload)?;
    if step.next_case == NextCase::Terminal {
        debug!("reached end of blinded path");
        return Ok(UnwrapOutcome::Terminal);
    }

    let contents = open_enctlv(&payload, rho)?;
    let next_blinding = advance_public(blinding, &derive_link_hash(blinding, &ss))?;
    debug!(next_blinding = %next_blinding, contents_len = contents.len(), "unwrapped forwarding hop");

    Ok(UnwrapOutcome::Forward {
        contents,
        next_blinding,
        next_onion: step.next,
    })
}

fn engine_error(err: SphinxError) -> BlindingError {
    match err {
        SphinxError::Crypto(e @ CryptoError::CurveOperation(_)) => BlindingError::invariant(e),
        other => ProtocolError::OnionRejected(other.to_string()).into(),
    }
}

fn decode_payload(raw_payload: &[u8]) -> Result<OnionMsgPayload> {
    let stream = bigsize::strip_length_prefix(raw_payload)
        .map_err(|e| ProtocolError::InvalidPayload(e.to_string()))?;
    OnionMsgPayload::from_wire(stream).map_err(|e| ProtocolError::InvalidPayload(e.to_string()).into())
}

fn open_enctlv(payload: &OnionMsgPayload, rho: SubKey) -> Result<Vec<u8>> {
    let sealed = payload
        .enctlv
        .as_deref()
        .ok_or(ProtocolError::MissingEncryptedField)?;
    if sealed.len() < TAG_SIZE {
        return Err(ProtocolError::EncryptedFieldTooShort { len: sealed.len() }.into());
    }
    codec::decrypt(sealed, rho)
}
