//! Raw TLV streams and typed record tables.
//!
//! A typed record is any struct implementing [`TlvRecord`]: it names an
//! ordered table of [`RecordType`] entries, each pairing a numeric tag with an
//! encoder and a decoder for one field. Serialization walks the table, so the
//! table order is the wire order; it is checked every time a record is written.

use crate::bigsize;
use crate::{Result, WireError};

/// A single raw field: numeric type and opaque value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TlvField {
    /// Record type.
    pub tag: u64,
    /// Raw value bytes.
    pub value: Vec<u8>,
}

/// One entry in a typed record table.
pub struct RecordType<T> {
    /// Record type.
    pub tag: u64,
    /// Marshal the field, or `None` if it is absent.
    pub encode: fn(&T) -> Option<Vec<u8>>,
    /// Unmarshal `value` into the field.
    pub decode: fn(&[u8], &mut T) -> Result<()>,
}

/// A struct serialized as a TLV stream.
pub trait TlvRecord: Default + Sized + 'static {
    /// Known record types, strictly ascending by tag.
    const TYPES: &'static [RecordType<Self>];

    /// Unknown odd fields carried through from decoding.
    fn extra(&self) -> &[TlvField];

    /// Mutable access to the unknown odd fields.
    fn extra_mut(&mut self) -> &mut Vec<TlvField>;

    /// Serialize as a TLV stream.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnorderedTypes`] if the type table or the carried
    /// unknown fields are not strictly ascending, or if an unknown field reuses
    /// a known tag.
    fn to_wire(&self) -> Result<Vec<u8>> {
        check_ascending(Self::TYPES.iter().map(|t| t.tag))?;
        check_ascending(self.extra().iter().map(|f| f.tag))?;

        let mut fields: Vec<TlvField> = Self::TYPES
            .iter()
            .filter_map(|t| (t.encode)(self).map(|value| TlvField { tag: t.tag, value }))
            .collect();
        fields.extend(self.extra().iter().cloned());
        fields.sort_by_key(|f| f.tag);
        check_ascending(fields.iter().map(|f| f.tag))?;

        Ok(write_stream(&fields))
    }

    /// Parse a TLV stream.
    ///
    /// # Errors
    ///
    /// Returns a [`WireError`] if the stream is malformed, out of order, holds
    /// an unknown even type, or a known field fails to decode.
    fn from_wire(bytes: &[u8]) -> Result<Self> {
        let mut record = Self::default();
        for field in parse_stream(bytes)? {
            match Self::TYPES.iter().find(|t| t.tag == field.tag) {
                Some(t) => (t.decode)(&field.value, &mut record)?,
                None if field.tag % 2 == 1 => record.extra_mut().push(field),
                None => return Err(WireError::UnknownEvenType(field.tag)),
            }
        }
        Ok(record)
    }
}

fn check_ascending(tags: impl Iterator<Item = u64>) -> Result<()> {
    let mut prev: Option<u64> = None;
    for tag in tags {
        if let Some(p) = prev {
            if tag <= p {
                return Err(WireError::UnorderedTypes { prev: p, tag });
            }
        }
        prev = Some(tag);
    }
    Ok(())
}

/// Serialize raw fields in the order given.
pub fn write_stream(fields: &[TlvField]) -> Vec<u8> {
    let mut out = Vec::new();
    for field in fields {
        bigsize::write(field.tag, &mut out);
        bigsize::write(field.value.len() as u64, &mut out);
        out.extend_from_slice(&field.value);
    }
    out
}

/// Parse a raw stream, enforcing strictly ascending types.
pub fn parse_stream(bytes: &[u8]) -> Result<Vec<TlvField>> {
    let mut cursor = bytes;
    let mut fields: Vec<TlvField> = Vec::new();
    while !cursor.is_empty() {
        let tag = bigsize::read(&mut cursor)?;
        if let Some(prev) = fields.last() {
            if tag <= prev.tag {
                return Err(WireError::UnorderedTypes { prev: prev.tag, tag });
            }
        }
        let len = bigsize::read(&mut cursor)?;
        let len = usize::try_from(len)
            .ok()
            .filter(|l| *l <= cursor.len())
            .ok_or(WireError::Truncated {
                needed: usize::try_from(len).unwrap_or(usize::MAX),
                available: cursor.len(),
            })?;
        let (value, rest) = cursor.split_at(len);
        fields.push(TlvField {
            tag,
            value: value.to_vec(),
        });
        cursor = rest;
    }
    Ok(fields)
}
