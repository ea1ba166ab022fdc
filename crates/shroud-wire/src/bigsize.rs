//! BigSize variable-length integers.
//!
//! ```text
//! 0x00..=0xfc            1 byte
//! 0xfd || u16 (BE)       3 bytes, value >= 0xfd
//! 0xfe || u32 (BE)       5 bytes, value >= 0x10000
//! 0xff || u64 (BE)       9 bytes, value >= 0x100000000
//! ```
//!
//! Decoding rejects any value that would have fit a shorter form.

use crate::{Result, WireError};

/// Number of bytes `value` occupies when encoded.
pub fn encoded_len(value: u64) -> usize {
    match value {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Append the encoding of `value` to `out`.
pub fn write(value: u64, out: &mut Vec<u8>) {
    match value {
        0..=0xfc => out.push(value as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(value as u16).to_be_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(value as u32).to_be_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&value.to_be_bytes());
        }
    }
}

fn take<'a>(cursor: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if cursor.len() < n {
        return Err(WireError::Truncated {
            needed: n,
            available: cursor.len(),
        });
    }
    let (head, tail) = cursor.split_at(n);
    *cursor = tail;
    Ok(head)
}

/// Read one BigSize value, advancing `cursor` past it.
///
/// # Errors
///
/// Returns [`WireError::Truncated`] on short input and
/// [`WireError::NonMinimalBigSize`] for non-canonical encodings.
pub fn read(cursor: &mut &[u8]) -> Result<u64> {
    let prefix = take(cursor, 1)?[0];
    let (value, min) = match prefix {
        0xfd => {
            let b = take(cursor, 2)?;
            (u64::from(u16::from_be_bytes([b[0], b[1]])), 0xfd)
        }
        0xfe => {
            let b = take(cursor, 4)?;
            (u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]])), 0x1_0000)
        }
        0xff => {
            let b = take(cursor, 8)?;
            let mut arr = [0u8; 8];
            arr.copy_from_slice(b);
            (u64::from_be_bytes(arr), 0x1_0000_0000)
        }
        small => return Ok(u64::from(small)),
    };
    if value < min {
        return Err(WireError::NonMinimalBigSize);
    }
    Ok(value)
}

/// Frame `payload` as `bigsize(len) || payload`.
pub fn prefix_length(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(payload.len() as u64) + payload.len());
    write(payload.len() as u64, &mut out);
    out.extend_from_slice(payload);
    out
}

/// Strip a BigSize length prefix, requiring it to cover exactly the rest of `frame`.
///
/// # Errors
///
/// Returns [`WireError::LengthMismatch`] if the declared length differs from the
/// number of bytes that follow.
pub fn strip_length_prefix(frame: &[u8]) -> Result<&[u8]> {
    let mut cursor = frame;
    let declared = read(&mut cursor)?;
    if declared != cursor.len() as u64 {
        return Err(WireError::LengthMismatch {
            declared,
            actual: cursor.len(),
        });
    }
    Ok(cursor)
}
