//! Onion packet layout.
//!
//! ```text
//! [version:1][ephemeral_key:33][routing_info:1300][hmac:32] = 1366 bytes
//! ```
//!
//! - `version`: always [`ONION_VERSION`]
//! - `ephemeral_key`: compressed secp256k1 point for this hop's ECDH
//! - `routing_info`: obfuscated hop frames, each `payload || next_hmac`
//! - `hmac`: `HMAC-SHA256(mu, routing_info || associated_data)`

use shroud_crypto::secp::{Point, POINT_SIZE};

use crate::{Result, SphinxError};

/// The only supported packet version.
pub const ONION_VERSION: u8 = 0x00;

/// Size of the obfuscated routing info.
pub const ROUTING_INFO_SIZE: usize = 1300;

/// Size of a packet or hop HMAC.
pub const HMAC_SIZE: usize = 32;

/// Total serialized packet size.
pub const TOTAL_PACKET_SIZE: usize = 1 + POINT_SIZE + ROUTING_INFO_SIZE + HMAC_SIZE; // 1366

const OFF_VERSION: usize = 0;
const OFF_EPHEMERAL: usize = 1;
const OFF_ROUTING: usize = OFF_EPHEMERAL + POINT_SIZE; // 34
const OFF_HMAC: usize = OFF_ROUTING + ROUTING_INFO_SIZE; // 1334

/// A parsed onion packet.
#[derive(Clone, PartialEq, Eq)]
pub struct OnionPacket {
    pub version: u8,
    pub ephemeral_key: Point,
    pub routing_info: [u8; ROUTING_INFO_SIZE],
    pub hmac: [u8; HMAC_SIZE],
}

impl OnionPacket {
    /// Parse exactly [`TOTAL_PACKET_SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SphinxError::InvalidPacket`] on a size or version mismatch and
    /// [`SphinxError::InvalidEphemeralKey`] if the key is not on the curve.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != TOTAL_PACKET_SIZE {
            return Err(SphinxError::InvalidPacket(format!(
                "wrong packet size: {} bytes, expected {TOTAL_PACKET_SIZE}",
                data.len()
            )));
        }
        if data[OFF_VERSION] != ONION_VERSION {
            return Err(SphinxError::InvalidPacket(format!(
                "unsupported onion version {}",
                data[OFF_VERSION]
            )));
        }
        let ephemeral_key = Point::from_slice(&data[OFF_EPHEMERAL..OFF_ROUTING])
            .map_err(|e| SphinxError::InvalidEphemeralKey(e.to_string()))?;
        let mut routing_info = [0u8; ROUTING_INFO_SIZE];
        routing_info.copy_from_slice(&data[OFF_ROUTING..OFF_HMAC]);
        let mut hmac = [0u8; HMAC_SIZE];
        hmac.copy_from_slice(&data[OFF_HMAC..]);
        Ok(Self {
            version: ONION_VERSION,
            ephemeral_key,
            routing_info,
            hmac,
        })
    }

    /// Serialize to [`TOTAL_PACKET_SIZE`] bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TOTAL_PACKET_SIZE);
        out.push(self.version);
        out.extend_from_slice(&self.ephemeral_key.serialize());
        out.extend_from_slice(&self.routing_info);
        out.extend_from_slice(&self.hmac);
        out
    }

    /// Data covered by the packet HMAC.
    pub(crate) fn hmac_input(routing_info: &[u8], assoc_data: &[u8]) -> Vec<u8> {
        let mut data = Vec::with_capacity(routing_info.len() + assoc_data.len());
        data.extend_from_slice(routing_info);
        data.extend_from_slice(assoc_data);
        data
    }
}

impl std::fmt::Debug for OnionPacket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnionPacket")
            .field("version", &self.version)
            .field("ephemeral_key", &self.ephemeral_key)
            .field("hmac", &hex::encode(self.hmac))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "02eec7245d6b7d2ccb30380bfbe2a3648cd7a942653f5aa340edcea1f283686619";

    fn sample() -> Vec<u8> {
        let mut data = vec![0u8; TOTAL_PACKET_SIZE];
        data[OFF_EPHEMERAL..OFF_ROUTING].copy_from_slice(&hex::decode(KEY).expect("hex"));
        data[OFF_ROUTING] = 0x42;
        data[OFF_HMAC] = 0x99;
        data
    }

    #[test]
    fn test_constants_consistency() {
        assert_eq!(TOTAL_PACKET_SIZE, 1366);
        assert_eq!(OFF_ROUTING, 34);
        assert_eq!(OFF_HMAC, 1334);
    }

    #[test]
    fn test_parse_serialize() {
        let data = sample();
        let packet = OnionPacket::parse(&data).expect("parse");
        assert_eq!(packet.ephemeral_key.to_hex(), KEY);
        assert_eq!(packet.routing_info[0], 0x42);
        assert_eq!(packet.hmac[0], 0x99);
        assert_eq!(packet.serialize(), data);
    }

    #[test]
    fn test_wrong_size() {
        assert!(matches!(
            OnionPacket::parse(&[0u8; 100]),
            Err(SphinxError::InvalidPacket(_))
        ));
    }

    #[test]
    fn test_wrong_version() {
        let mut data = sample();
        data[OFF_VERSION] = 1;
        assert!(matches!(
            OnionPacket::parse(&data),
            Err(SphinxError::InvalidPacket(_))
        ));
    }

    #[test]
    fn test_bad_ephemeral_key() {
        let mut data = sample();
        data[OFF_EPHEMERAL] = 0x05;
        assert!(matches!(
            OnionPacket::parse(&data),
            Err(SphinxError::InvalidEphemeralKey(_))
        ));
    }
}
