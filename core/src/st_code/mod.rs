//! # ST-Code
//!
//! Compact serialized form for UPL type descriptors.
//!
//! ## Overview
//!
//! A descriptor goes through two representations:
//!
//! - [`Stir`], the expanded intermediate form: element 0 is the tag byte and
//!   every following element holds a single nibble (0..=15). It is only a
//!   working representation and is never stored.
//! - [`PackedSt`], the packed form: byte 0 is the same tag byte and every
//!   following byte holds two nibbles, high nibble first. This is the
//!   canonical form that gets hashed, compared and stored by the registry.
//!
//! ## Tag byte
//!
//! ```text
//!   bit  7   6       5            4..0
//!      [ 0 | const | odd-length | tag   ]
//! ```
//!
//! The odd-length flag is set when the expanded form has an *even* number of
//! elements (tag included), which is exactly when the packed form ends with a
//! padding nibble. See [`tag_byte`].
//!
//! ## Operands
//!
//! Operands (sizes, counts, type identifiers) are variable-length integers
//! built from nibbles, see [`nibble`]. Their order per tag is fixed by
//! [`builder`] and must never change, since it is part of the canonical form.
//!
//! Example: vectors of type #5 and type #9:
//!
//! ```text
//! vector<#5>  Stir:     [0x2B, 5]        Vector | odd-length, one nibble
//!             PackedSt: [0x2B, 0x50]     low nibble is padding
//! vector<#9>  Stir:     [0x0B, 8, 9]     length nibble 8, then data 9
//!             PackedSt: [0x0B, 0x89]
//! ```

pub mod builder;
pub mod nibble;
pub mod packer;
pub mod tag_byte;

use crate::error::DecodeError;
use core::fmt;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use builder::{
    make_any, make_array, make_basic, make_bool, make_byte, make_char, make_function, make_int,
    make_map, make_nil, make_package, make_real, make_string, make_tuple, make_variant,
    make_vector,
};
pub use packer::{pack, packed_size, unpack, unpacked_size};

/// Backing buffer for both representations. Most descriptors fit inline.
pub type BufferType = SmallVec<[u8; 16]>;

/// Element count of a fixed-length array.
pub type Size = u32;

/// Identifier of a registered type.
///
/// `TypeId::INVALID` (zero) is reserved to mean "no type"; every registered
/// descriptor gets an identifier of at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const INVALID: TypeId = TypeId(0);

    pub const fn new(raw: u32) -> Self {
        TypeId(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_invalid(self) -> bool {
        self.0 == 0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for TypeId {
    fn from(raw: u32) -> Self {
        TypeId(raw)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Expanded intermediate representation: tag byte followed by one nibble per
/// element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stir {
    buffer: BufferType,
}

impl Stir {
    /// Wrap a buffer produced by the builder or the unpacker. The odd-length
    /// flag must already agree with the length.
    pub(crate) fn from_buffer(buffer: BufferType) -> Self {
        debug_assert!(!buffer.is_empty());
        debug_assert_eq!(
            tag_byte::is_odd_length(buffer[0]),
            buffer.len() % 2 == 0,
            "odd-length flag out of sync"
        );
        Stir { buffer }
    }

    /// Validate and wrap an expanded form coming from outside the codec.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let Some(&tag) = bytes.first() else {
            return Err(DecodeError::Empty);
        };
        if let Some(offset) = bytes[1..].iter().position(|&n| n > nibble::MAX_NIBBLE) {
            return Err(DecodeError::InvalidNibble {
                offset,
                value: bytes[1 + offset],
            });
        }
        if tag_byte::is_odd_length(tag) != (bytes.len() % 2 == 0) {
            return Err(DecodeError::LengthFlagMismatch { len: bytes.len() });
        }
        Ok(Stir {
            buffer: BufferType::from_slice(bytes),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn tag_byte(&self) -> u8 {
        self.buffer[0]
    }

    /// The operand nibbles, without the tag byte.
    pub fn nibbles(&self) -> &[u8] {
        &self.buffer[1..]
    }

    /// Number of elements, tag byte included.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Packed ST-Code: tag byte followed by two nibbles per byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedSt {
    buffer: BufferType,
}

impl PackedSt {
    pub(crate) fn from_buffer(buffer: BufferType) -> Self {
        debug_assert!(!buffer.is_empty());
        PackedSt { buffer }
    }

    /// Wrap raw packed bytes. Only emptiness is checked here; the registry
    /// validates the full structure before storing anything.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(PackedSt {
            buffer: BufferType::from_slice(bytes),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn tag_byte(&self) -> u8 {
        self.buffer[0]
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl AsRef<[u8]> for PackedSt {
    fn as_ref(&self) -> &[u8] {
        &self.buffer
    }
}

impl AsRef<[u8]> for Stir {
    fn as_ref(&self) -> &[u8] {
        &self.buffer
    }
}
