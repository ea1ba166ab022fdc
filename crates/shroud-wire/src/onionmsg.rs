//! Onion-message payload records.
//!
//! ## Outer payload (`onionmsg_payload`), read by every hop
//!
//! | Type | Field | Value |
//! |---|---|---|
//! | 4 | `next_node_id` | point |
//! | 6 | `next_short_channel_id` | short channel id |
//! | 10 | `enctlv` | ciphertext of an [`EncMsgTlvs`] |
//! | 12 | `blinding` | point |
//!
//! ## Inner instructions (`encmsg_tlvs`), sealed for one hop
//!
//! | Type | Field | Value |
//! |---|---|---|
//! | 4 | `next_node_id` | point |
//! | 6 | `next_short_channel_id` | short channel id |

use shroud_crypto::secp::Point;

use crate::scid::ShortChannelId;
use crate::tlv::{RecordType, TlvField, TlvRecord};
use crate::{Result, WireError};

pub const TLV_NEXT_NODE_ID: u64 = 4;
pub const TLV_NEXT_SHORT_CHANNEL_ID: u64 = 6;
pub const TLV_ENCTLV: u64 = 10;
pub const TLV_BLINDING: u64 = 12;

/// Payload a hop finds in its onion layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OnionMsgPayload {
    pub next_node_id: Option<Point>,
    pub next_short_channel_id: Option<ShortChannelId>,
    /// Encrypted forwarding instructions.
    pub enctlv: Option<Vec<u8>>,
    /// Blinding point override for the next hop.
    pub blinding: Option<Point>,
    pub extra: Vec<TlvField>,
}

/// Forwarding instructions sealed inside `enctlv`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncMsgTlvs {
    pub next_node_id: Option<Point>,
    pub next_short_channel_id: Option<ShortChannelId>,
    pub extra: Vec<TlvField>,
}

fn decode_point(tag: u64, value: &[u8]) -> Result<Point> {
    Point::from_slice(value).map_err(|e| WireError::InvalidValue {
        tag,
        reason: e.to_string(),
    })
}

fn decode_scid(tag: u64, value: &[u8]) -> Result<ShortChannelId> {
    ShortChannelId::from_slice(value).map_err(|e| WireError::InvalidValue {
        tag,
        reason: e.to_string(),
    })
}

fn payload_next_node_id_to(p: &OnionMsgPayload) -> Option<Vec<u8>> {
    p.next_node_id.map(|pk| pk.serialize().to_vec())
}

fn payload_next_node_id_from(v: &[u8], p: &mut OnionMsgPayload) -> Result<()> {
    p.next_node_id = Some(decode_point(TLV_NEXT_NODE_ID, v)?);
    Ok(())
}

fn payload_scid_to(p: &OnionMsgPayload) -> Option<Vec<u8>> {
    p.next_short_channel_id.map(|s| s.to_bytes().to_vec())
}

fn payload_scid_from(v: &[u8], p: &mut OnionMsgPayload) -> Result<()> {
    p.next_short_channel_id = Some(decode_scid(TLV_NEXT_SHORT_CHANNEL_ID, v)?);
    Ok(())
}

fn payload_enctlv_to(p: &OnionMsgPayload) -> Option<Vec<u8>> {
    p.enctlv.clone()
}

fn payload_enctlv_from(v: &[u8], p: &mut OnionMsgPayload) -> Result<()> {
    p.enctlv = Some(v.to_vec());
    Ok(())
}

fn payload_blinding_to(p: &OnionMsgPayload) -> Option<Vec<u8>> {
    p.blinding.map(|pk| pk.serialize().to_vec())
}

fn payload_blinding_from(v: &[u8], p: &mut OnionMsgPayload) -> Result<()> {
    p.blinding = Some(decode_point(TLV_BLINDING, v)?);
    Ok(())
}

impl TlvRecord for OnionMsgPayload {
    const TYPES: &'static [RecordType<Self>] = &[
        RecordType {
            tag: TLV_NEXT_NODE_ID,
            encode: payload_next_node_id_to,
            decode: payload_next_node_id_from,
        },
        RecordType {
            tag: TLV_NEXT_SHORT_CHANNEL_ID,
            encode: payload_scid_to,
            decode: payload_scid_from,
        },
        RecordType {
            tag: TLV_ENCTLV,
            encode: payload_enctlv_to,
            decode: payload_enctlv_from,
        },
        RecordType {
            tag: TLV_BLINDING,
            encode: payload_blinding_to,
            decode: payload_blinding_from,
        },
    ];

    fn extra(&self) -> &[TlvField] {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Vec<TlvField> {
        &mut self.extra
    }
}

fn encmsg_next_node_id_to(e: &EncMsgTlvs) -> Option<Vec<u8>> {
    e.next_node_id.map(|pk| pk.serialize().to_vec())
}

fn encmsg_next_node_id_from(v: &[u8], e: &mut EncMsgTlvs) -> Result<()> {
    e.next_node_id = Some(decode_point(TLV_NEXT_NODE_ID, v)?);
    Ok(())
}

fn encmsg_scid_to(e: &EncMsgTlvs) -> Option<Vec<u8>> {
    e.next_short_channel_id.map(|s| s.to_bytes().to_vec())
}

fn encmsg_scid_from(v: &[u8], e: &mut EncMsgTlvs) -> Result<()> {
    e.next_short_channel_id = Some(decode_scid(TLV_NEXT_SHORT_CHANNEL_ID, v)?);
    Ok(())
}

impl TlvRecord for EncMsgTlvs {
    const TYPES: &'static [RecordType<Self>] = &[
        RecordType {
            tag: TLV_NEXT_NODE_ID,
            encode: encmsg_next_node_id_to,
            decode: encmsg_next_node_id_from,
        },
        RecordType {
            tag: TLV_NEXT_SHORT_CHANNEL_ID,
            encode: encmsg_scid_to,
            decode: encmsg_scid_from,
        },
    ];

    fn extra(&self) -> &[TlvField] {
        &self.extra
    }

    fn extra_mut(&mut self) -> &mut Vec<TlvField> {
        &mut self.extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODE: &str = "02eec7245d6b7d2ccb30380bfbe2a3648cd7a942653f5aa340edcea1f283686619";

    #[test]
    fn test_encmsg_layout() {
        let node = Point::from_hex(NODE).expect("point");
        let inner = EncMsgTlvs {
            next_node_id: Some(node),
            ..Default::default()
        };
        let wire = inner.to_wire().expect("wire");
        assert_eq!(wire.len(), 2 + 33);
        assert_eq!(&wire[..2], &[0x04, 0x21]);
        assert_eq!(EncMsgTlvs::from_wire(&wire).expect("parse"), inner);
    }

    #[test]
    fn test_payload_field_order() {
        let node = Point::from_hex(NODE).expect("point");
        let payload = OnionMsgPayload {
            blinding: Some(node),
            enctlv: Some(vec![0xaa; 3]),
            next_short_channel_id: Some(ShortChannelId::new(0, 0, 1).expect("scid")),
            ..Default::default()
        };
        let wire = payload.to_wire().expect("wire");
        let fields = crate::tlv::parse_stream(&wire).expect("parse");
        let tags: Vec<u64> = fields.iter().map(|f| f.tag).collect();
        assert_eq!(tags, vec![6, 10, 12]);
        assert_eq!(OnionMsgPayload::from_wire(&wire).expect("decode"), payload);
    }

    #[test]
    fn test_bad_point_rejected() {
        let mut wire = vec![0x04, 0x21];
        wire.extend_from_slice(&[0x05; 33]);
        assert!(matches!(
            OnionMsgPayload::from_wire(&wire),
            Err(WireError::InvalidValue { tag: 4, .. })
        ));
    }

    #[test]
    fn test_empty_stream_is_empty_payload() {
        let payload = OnionMsgPayload::from_wire(&[]).expect("parse");
        assert_eq!(payload, OnionMsgPayload::default());
        assert!(payload.to_wire().expect("wire").is_empty());
    }
}
