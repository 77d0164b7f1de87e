//! Variable-length integers made of nibbles ("quartets").
//!
//! A value below 8 is a single nibble. Anything larger starts with a length
//! nibble `7 + k` followed by `k` data nibbles, most significant first, where
//! `k` is the smallest count that holds the value (1..=8).
//!
//! ```text
//! 0    -> [0]
//! 8    -> [8, 8]
//! 16   -> [9, 1, 0]
//! 255  -> [9, F, F]
//! ```
//!
//! Decoding exists in two forms. [`deserialize_int`] walks a flat slice with
//! one nibble per element (the expanded form). [`deserialize_int_with`]
//! pulls nibbles through a fetcher so the registry can read straight out of
//! a slot or the stash without copying.

use super::BufferType;
use crate::error::DecodeError;

pub const MAX_NIBBLE: u8 = 0x0F;

/// Values below this are stored as a single nibble.
const SINGLE_NIBBLE_LIMIT: u32 = 8;

/// A length nibble is `LENGTH_BIAS + k`.
const LENGTH_BIAS: u8 = 7;

/// Maximum number of data nibbles for a `u32`.
const MAX_DATA_NIBBLES: u8 = 8;

/// Nibble `quartet` of `v`, counting from the least significant.
#[inline]
fn qrtt(v: u32, quartet: u32) -> u8 {
    ((v >> (4 * quartet)) & 0x0F) as u8
}

/// Number of data nibbles needed to hold `v`.
#[inline]
fn data_nibbles(v: u32) -> u32 {
    (u32::BITS - v.leading_zeros()).div_ceil(4)
}

/// Number of nibbles `serialize_int(v)` produces.
pub fn serialized_len(v: u32) -> usize {
    if v < SINGLE_NIBBLE_LIMIT {
        1
    } else {
        1 + data_nibbles(v) as usize
    }
}

/// Append the nibbles of `v` to `buf`.
pub fn serialize_int_into(buf: &mut BufferType, v: u32) {
    if v < SINGLE_NIBBLE_LIMIT {
        buf.push(v as u8);
        return;
    }
    let k = data_nibbles(v);
    buf.push(LENGTH_BIAS + k as u8);
    for quartet in (0..k).rev() {
        buf.push(qrtt(v, quartet));
    }
}

pub fn serialize_int(v: u32) -> BufferType {
    let mut buf = BufferType::new();
    serialize_int_into(&mut buf, v);
    buf
}

/// Decode one integer from a flat nibble slice, starting at `*pos`.
///
/// On success `*pos` points past the integer.
pub fn deserialize_int(nibbles: &[u8], pos: &mut usize) -> Result<u32, DecodeError> {
    let mut at = *pos;
    let mut next = || -> Result<u8, DecodeError> {
        let value = *nibbles
            .get(at)
            .ok_or(DecodeError::Truncated { offset: at })?;
        if value > MAX_NIBBLE {
            return Err(DecodeError::InvalidNibble { offset: at, value });
        }
        at += 1;
        Ok(value)
    };

    let len = next()?;
    let value = if len < LENGTH_BIAS + 1 {
        len as u32
    } else {
        let mut acc = 0u32;
        for _ in 0..(len - LENGTH_BIAS) {
            acc = (acc << 4) | next()? as u32;
        }
        acc
    };
    *pos = at;
    Ok(value)
}

/// Decode one integer through a quartet fetcher.
///
/// `fetch(i)` returns nibble `i` of the stream, or `None` past its end. On
/// success `*pos` points past the integer.
pub fn deserialize_int_with<F>(fetch: F, pos: &mut usize) -> Result<u32, DecodeError>
where
    F: Fn(usize) -> Option<u8>,
{
    let start = *pos;
    let len = fetch(start).ok_or(DecodeError::Truncated { offset: start })?;
    if len < LENGTH_BIAS + 1 {
        *pos = start + 1;
        return Ok(len as u32);
    }

    let count = (len - LENGTH_BIAS) as usize;
    debug_assert!(count <= MAX_DATA_NIBBLES as usize);
    let mut acc = 0u32;
    for i in 1..=count {
        let q = fetch(start + i).ok_or(DecodeError::Truncated { offset: start + i })?;
        acc = (acc << 4) | (q & MAX_NIBBLE) as u32;
    }
    *pos = start + 1 + count;
    Ok(acc)
}

/// Fetch nibble `index` from packed bytes whose first byte is the tag byte.
#[inline]
pub fn packed_quartet(packed: &[u8], index: usize) -> Option<u8> {
    let byte = *packed.get(1 + index / 2)?;
    Some(if index % 2 == 0 { byte >> 4 } else { byte & 0x0F })
}
