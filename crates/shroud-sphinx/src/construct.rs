//! Wrapping a route's hop payloads into an onion packet.
//!
//! Hops are written innermost first: each iteration right-shifts the routing
//! info by the hop's frame size, writes `payload || next_hmac` at the front,
//! XORs the hop's rho stream over it and recomputes the HMAC. The filler makes
//! the tail the final hop sees match what earlier hops shifted in.

use shroud_crypto::chacha20;
use shroud_crypto::hash;
use shroud_crypto::secp::{self, Point, Scalar, SharedSecret};
use shroud_wire::bigsize;
use tracing::debug;

use crate::keys::{blinding_factor, pad_key, HopKeys};
use crate::packet::{OnionPacket, HMAC_SIZE, ONION_VERSION, ROUTING_INFO_SIZE};
use crate::{Result, SphinxError};

/// One hop of a route to wrap.
#[derive(Clone, Debug)]
pub struct SphinxHop {
    /// Key the hop will use for ECDH (a real or blinded node id).
    pub pubkey: Point,
    /// Hop payload including its BigSize length prefix.
    pub raw_payload: Vec<u8>,
}

impl SphinxHop {
    /// Bytes this hop occupies in the routing info.
    pub fn frame_size(&self) -> usize {
        self.raw_payload.len() + HMAC_SIZE
    }
}

struct HopParams {
    secret: SharedSecret,
}

/// Derive each hop's shared secret, advancing the session key by the
/// blinding factor after every hop.
fn hop_params(hops: &[SphinxHop], session_key: &Scalar) -> Result<(Point, Vec<HopParams>)> {
    let first_ephemeral = session_key.public_key();
    let mut params = Vec::with_capacity(hops.len());
    let mut ephemeral = Scalar::from_bytes(&session_key.secret_bytes())?;
    for hop in hops {
        let ephemeral_pk = ephemeral.public_key();
        let secret = secp::ecdh(&hop.pubkey, &ephemeral);
        let factor = blinding_factor(&ephemeral_pk, &secret);
        ephemeral = ephemeral.mul_tweak(&factor)?;
        params.push(HopParams { secret });
    }
    Ok((first_ephemeral, params))
}

fn generate_filler(hops: &[SphinxHop], params: &[HopParams]) -> Result<Vec<u8>> {
    let Some((_, leading)) = hops.split_last() else {
        return Ok(Vec::new());
    };
    let filler_len: usize = leading.iter().map(SphinxHop::frame_size).sum();
    let mut filler = vec![0u8; filler_len];
    let mut used = 0usize;
    for (hop, param) in leading.iter().zip(params) {
        let keys = HopKeys::derive(&param.secret)?;
        let stream = chacha20::keystream(&keys.rho, 2 * ROUTING_INFO_SIZE);
        let start = ROUTING_INFO_SIZE - used;
        let end = ROUTING_INFO_SIZE + hop.frame_size();
        for (f, s) in filler.iter_mut().zip(&stream[start..end]) {
            *f ^= s;
        }
        used += hop.frame_size();
    }
    Ok(filler)
}

/// Build an onion packet carrying `hops[i].raw_payload` to each hop in order.
///
/// # Errors
///
/// Returns [`SphinxError::EmptyRoute`] for no hops,
/// [`SphinxError::InvalidHopPayload`] if a payload's length prefix is wrong, and
/// [`SphinxError::RouteTooLong`] if the frames do not fit.
pub fn build_packet(hops: &[SphinxHop], session_key: &Scalar, assoc_data: &[u8]) -> Result<OnionPacket> {
    if hops.is_empty() {
        return Err(SphinxError::EmptyRoute);
    }
    for hop in hops {
        bigsize::strip_length_prefix(&hop.raw_payload)
            .map_err(|e| SphinxError::InvalidHopPayload(e.to_string()))?;
    }
    let needed: usize = hops.iter().map(SphinxHop::frame_size).sum();
    if needed > ROUTING_INFO_SIZE {
        return Err(SphinxError::RouteTooLong {
            needed,
            available: ROUTING_INFO_SIZE,
        });
    }

    let (ephemeral_key, params) = hop_params(hops, session_key)?;
    let filler = generate_filler(hops, &params)?;

    let mut routing_info = [0u8; ROUTING_INFO_SIZE];
    chacha20::apply_keystream(&pad_key(session_key)?, &mut routing_info);

    let mut next_hmac = [0u8; HMAC_SIZE];
    for (i, (hop, param)) in hops.iter().zip(&params).enumerate().rev() {
        let keys = HopKeys::derive(&param.secret)?;
        let shift = hop.frame_size();
        let payload_len = hop.raw_payload.len();

        routing_info.copy_within(..ROUTING_INFO_SIZE - shift, shift);
        routing_info[..payload_len].copy_from_slice(&hop.raw_payload);
        routing_info[payload_len..shift].copy_from_slice(&next_hmac);
        chacha20::apply_keystream(&keys.rho, &mut routing_info);

        if i == hops.len() - 1 {
            routing_info[ROUTING_INFO_SIZE - filler.len()..].copy_from_slice(&filler);
        }

        let mac_input = OnionPacket::hmac_input(&routing_info, assoc_data);
        next_hmac = hash::hmac_sha256(&keys.mu, &mac_input)?;
    }
    debug!(hops = hops.len(), frame_bytes = needed, "built onion packet");

    Ok(OnionPacket {
        version: ONION_VERSION,
        ephemeral_key,
        routing_info,
        hmac: next_hmac,
    })
}
