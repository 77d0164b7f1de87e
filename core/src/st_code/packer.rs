//! Conversion between the expanded and the packed form.

use super::nibble::MAX_NIBBLE;
use super::tag_byte::is_odd_length;
use super::{BufferType, PackedSt, Stir};
use crate::error::DecodeError;

/// Size in bytes of the packed form of `stir`.
#[inline]
pub fn packed_size(stir: &Stir) -> usize {
    1 + stir.len() / 2
}

/// Size in elements of the expanded form of `packed`.
pub fn unpacked_size(packed: &[u8]) -> Result<usize, DecodeError> {
    let Some(&tag) = packed.first() else {
        return Err(DecodeError::Empty);
    };
    let padding = is_odd_length(tag) as usize;
    let full = 1 + 2 * (packed.len() - 1);
    if full <= padding {
        // A lone tag byte cannot have a padding nibble.
        return Err(DecodeError::LengthFlagMismatch { len: packed.len() });
    }
    Ok(full - padding)
}

pub fn pack(stir: &Stir) -> PackedSt {
    let mut out = BufferType::with_capacity(packed_size(stir));
    out.push(stir.tag_byte());
    for pair in stir.nibbles().chunks(2) {
        let hi = pair[0] & MAX_NIBBLE;
        let lo = pair.get(1).map_or(0, |n| n & MAX_NIBBLE);
        out.push((hi << 4) | lo);
    }
    debug_assert_eq!(out.len(), packed_size(stir));
    PackedSt::from_buffer(out)
}

/// Exact inverse of [`pack`]. A non-zero padding nibble is rejected, since
/// packing the result would not give back the same bytes.
pub fn unpack(packed: &[u8]) -> Result<Stir, DecodeError> {
    let size = unpacked_size(packed)?;
    let mut out = BufferType::with_capacity(size + 1);
    out.push(packed[0]);
    for &byte in &packed[1..] {
        out.push(byte >> 4);
        out.push(byte & 0x0F);
    }
    if out.len() > size {
        let value = out.pop().unwrap_or(0);
        if value != 0 {
            return Err(DecodeError::NonZeroPadding { value });
        }
    }
    debug_assert_eq!(out.len(), size);
    Ok(Stir::from_buffer(out))
}
