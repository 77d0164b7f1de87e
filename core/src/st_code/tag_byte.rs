//! The codec's tag byte.
//!
//! Layout: bits 0..=4 hold the [`Tag`], bit 5 is the odd-length flag, bit 6
//! is constness. Bit 7 is never set by the codec.
//!
//! These masks are unrelated to the registry's slot marker, even where the
//! numeric values happen to look alike.

use upl_types::{MAX_TAG_VALUE, Tag};

pub const TAG_MASK: u8 = MAX_TAG_VALUE;

/// Set when the expanded form has an even number of elements, i.e. when the
/// packed form's last low nibble is padding.
pub const ODD_LENGTH_BIT: u8 = 1 << 5;

pub const CONSTNESS_BIT: u8 = 1 << 6;

/// Every bit the codec may legitimately produce.
pub const KNOWN_BITS: u8 = TAG_MASK | ODD_LENGTH_BIT | CONSTNESS_BIT;

#[inline]
pub fn serialize_tag(tag: Tag, is_const: bool) -> u8 {
    let mut ret = tag.to_u8();
    if is_const {
        ret |= CONSTNESS_BIT;
    }
    ret
}

#[inline]
pub fn get_tag(tag_byte: u8) -> Option<Tag> {
    Tag::from_u8(tag_byte & TAG_MASK)
}

#[inline]
pub fn is_valid(tag_byte: u8) -> bool {
    get_tag(tag_byte).is_some()
}

#[inline]
pub fn is_const(tag_byte: u8) -> bool {
    tag_byte & CONSTNESS_BIT != 0
}

#[inline]
pub fn is_odd_length(tag_byte: u8) -> bool {
    tag_byte & ODD_LENGTH_BIT != 0
}
