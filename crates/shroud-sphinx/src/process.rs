//! Peeling one layer of an onion packet at a relay.

use shroud_crypto::chacha20;
use shroud_crypto::hash;
use shroud_crypto::secp::SharedSecret;
use shroud_wire::bigsize;
use tracing::{debug, warn};

use crate::keys::{blinding_factor, HopKeys};
use crate::packet::{OnionPacket, HMAC_SIZE, ONION_VERSION, ROUTING_INFO_SIZE};
use crate::{Result, SphinxError};

/// Whether the packet continues past this hop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextCase {
    /// Another hop follows; forward [`RouteStep::next`].
    More,
    /// This hop is the last one.
    Terminal,
}

/// Result of processing a packet at one hop.
#[derive(Clone, Debug)]
pub struct RouteStep {
    /// This hop's payload, including its BigSize length prefix.
    pub raw_payload: Vec<u8>,
    pub next_case: NextCase,
    /// The packet to hand to the next hop (meaningless when terminal).
    pub next: OnionPacket,
}

/// Verify and peel one layer of `packet` with the hop's onion shared secret.
///
/// # Errors
///
/// Returns [`SphinxError::MacVerification`] if the packet HMAC does not match,
/// [`SphinxError::InvalidHopPayload`] if the revealed frame is malformed.
pub fn process_packet(
    packet: &OnionPacket,
    shared_secret: &SharedSecret,
    assoc_data: &[u8],
) -> Result<RouteStep> {
    if packet.version != ONION_VERSION {
        return Err(SphinxError::InvalidPacket(format!(
            "unsupported onion version {}",
            packet.version
        )));
    }

    let keys = HopKeys::derive(shared_secret)?;
    let mac_input = OnionPacket::hmac_input(&packet.routing_info, assoc_data);
    if !hash::verify_hmac_sha256(&keys.mu, &mac_input, &packet.hmac)? {
        warn!("onion HMAC mismatch");
        return Err(SphinxError::MacVerification);
    }

    // Routing info followed by zeros, so the shifted-in tail is keystream.
    let mut padded = vec![0u8; 2 * ROUTING_INFO_SIZE];
    padded[..ROUTING_INFO_SIZE].copy_from_slice(&packet.routing_info);
    chacha20::apply_keystream(&keys.rho, &mut padded);

    let mut cursor = padded.as_slice();
    let payload_len = bigsize::read(&mut cursor)
        .map_err(|e| SphinxError::InvalidHopPayload(e.to_string()))?;
    let prefix_len = padded.len() - cursor.len();
    let raw_len = usize::try_from(payload_len)
        .ok()
        .and_then(|l| l.checked_add(prefix_len))
        .filter(|l| l.checked_add(HMAC_SIZE).is_some_and(|end| end <= ROUTING_INFO_SIZE))
        .ok_or_else(|| {
            SphinxError::InvalidHopPayload(format!(
                "payload length {payload_len} exceeds routing info"
            ))
        })?;

    let raw_payload = padded[..raw_len].to_vec();
    let mut next_hmac = [0u8; HMAC_SIZE];
    next_hmac.copy_from_slice(&padded[raw_len..raw_len + HMAC_SIZE]);
    let shift = raw_len + HMAC_SIZE;
    let mut next_routing = [0u8; ROUTING_INFO_SIZE];
    next_routing.copy_from_slice(&padded[shift..shift + ROUTING_INFO_SIZE]);

    let factor = blinding_factor(&packet.ephemeral_key, shared_secret);
    let next_ephemeral = packet.ephemeral_key.mul_tweak(&factor)?;

    let next_case = if next_hmac.iter().all(|b| *b == 0) {
        NextCase::Terminal
    } else {
        NextCase::More
    };
    debug!(payload_len = raw_len, ?next_case, "peeled onion layer");

    Ok(RouteStep {
        raw_payload,
        next_case,
        next: OnionPacket {
            version: ONION_VERSION,
            ephemeral_key: next_ephemeral,
            routing_info: next_routing,
            hmac: next_hmac,
        },
    })
}
