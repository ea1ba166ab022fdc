//! Short channel ids.
//!
//! A short channel id packs `block height (24 bits) | tx index (24 bits) |
//! output index (16 bits)` into a `u64`. The textual form is `BLOCKxTXxOUT`;
//! sixteen hex digits of the packed value are accepted as well.

use std::fmt;
use std::str::FromStr;

use crate::{Result, WireError};

/// Encoded size of a short channel id.
pub const SCID_SIZE: usize = 8;

/// A channel's position on chain, used as a routing hint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShortChannelId(u64);

impl ShortChannelId {
    /// Build from components.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidShortChannelId`] if a component overflows its field.
    pub fn new(block: u32, tx: u32, output: u16) -> Result<Self> {
        if block >= 1 << 24 || tx >= 1 << 24 {
            return Err(WireError::InvalidShortChannelId(format!(
                "{block}x{tx}x{output}: component out of range"
            )));
        }
        Ok(Self(
            (u64::from(block) << 40) | (u64::from(tx) << 16) | u64::from(output),
        ))
    }

    pub fn block(&self) -> u32 {
        (self.0 >> 40) as u32
    }

    pub fn tx_index(&self) -> u32 {
        ((self.0 >> 16) & 0xff_ffff) as u32
    }

    pub fn output_index(&self) -> u16 {
        (self.0 & 0xffff) as u16
    }

    /// Big-endian 8-byte encoding.
    pub fn to_bytes(&self) -> [u8; SCID_SIZE] {
        self.0.to_be_bytes()
    }

    /// Decode from exactly eight bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SCID_SIZE] = bytes.try_into().map_err(|_| {
            WireError::InvalidShortChannelId(format!("expected {SCID_SIZE} bytes, got {}", bytes.len()))
        })?;
        Ok(Self(u64::from_be_bytes(arr)))
    }
}

impl fmt::Display for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.block(), self.tx_index(), self.output_index())
    }
}

impl FromStr for ShortChannelId {
    type Err = WireError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || WireError::InvalidShortChannelId(s.to_string());
        let parts: Vec<&str> = s.split('x').collect();
        match parts.as_slice() {
            [block, tx, output] => Self::new(
                block.parse().map_err(|_| invalid())?,
                tx.parse().map_err(|_| invalid())?,
                output.parse().map_err(|_| invalid())?,
            ),
            [packed] if packed.len() == SCID_SIZE * 2 => {
                let bytes = hex::decode(packed).map_err(|_| invalid())?;
                Self::from_slice(&bytes)
            }
            _ => Err(invalid()),
        }
    }
}
