//! Type-category tags for UPL.
//!
//! Every descriptor the compiler handles starts with one of these tags. The
//! set is closed and each tag fits in five bits, which is what the ST-Code
//! tag byte reserves for it.

use bitflags::bitflags;
use core::fmt;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Capability flags attached to each tag in the static tag table.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct TagFlags: u8 {
        /// Stand-alone: the type does not reference any other type.
        const BASIC = 1;
        /// Holds a single value. Strings count as scalar.
        const SCALAR = 1 << 1;
        /// Product type (tuples, packages).
        const COMPOSITE = 1 << 2;
        /// Collection of same-typed values. Strings count here too.
        const COLLECTION = 1 << 3;
        /// Instances can be called.
        const CALLABLE = 1 << 4;
    }
}

/// Type-category tag.
///
/// Discriminants are part of the encoding and must never be renumbered.
/// Zero is deliberately not a tag so that an all-zero byte never decodes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tag {
    Nil = 1,
    Bool = 2,
    Byte = 3,
    Char = 4,
    Int = 5,
    Real = 6,
    String = 7,
    Any = 8,
    Variant = 9,
    Array = 10,
    Vector = 11,
    Map = 12,
    Tuple = 13,
    Package = 14,
    Function = 15,
}

/// Number of tags in the table.
pub const TAG_COUNT: usize = 15;

/// Largest value a tag may take; tags live in the low five bits of a byte.
pub const MAX_TAG_VALUE: u8 = 0x1F;

const _: () = assert!(TAG_COUNT <= MAX_TAG_VALUE as usize);

/// Static metadata for a tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TagInfo {
    pub tag: Tag,
    pub name: &'static str,
    pub flags: TagFlags,
}

impl TagInfo {
    pub const fn is_basic(&self) -> bool {
        self.flags.contains(TagFlags::BASIC)
    }

    pub const fn is_scalar(&self) -> bool {
        self.flags.contains(TagFlags::SCALAR)
    }

    pub const fn is_composite(&self) -> bool {
        self.flags.contains(TagFlags::COMPOSITE)
    }

    pub const fn is_collection(&self) -> bool {
        self.flags.contains(TagFlags::COLLECTION)
    }

    pub const fn is_callable(&self) -> bool {
        self.flags.contains(TagFlags::CALLABLE)
    }
}

const fn info(tag: Tag, name: &'static str, flags: TagFlags) -> TagInfo {
    TagInfo { tag, name, flags }
}

const BASIC_SCALAR: TagFlags = TagFlags::BASIC.union(TagFlags::SCALAR);

// Indexed by `tag as usize - 1`.
static TAG_TABLE: [TagInfo; TAG_COUNT] = [
    info(Tag::Nil, "nil", BASIC_SCALAR),
    info(Tag::Bool, "bool", BASIC_SCALAR),
    info(Tag::Byte, "byte", BASIC_SCALAR),
    info(Tag::Char, "char", BASIC_SCALAR),
    info(Tag::Int, "int", BASIC_SCALAR),
    info(Tag::Real, "real", BASIC_SCALAR),
    info(Tag::String, "string", BASIC_SCALAR.union(TagFlags::COLLECTION)),
    info(Tag::Any, "any", TagFlags::BASIC),
    info(Tag::Variant, "variant", TagFlags::empty()),
    info(Tag::Array, "array", TagFlags::COLLECTION),
    info(Tag::Vector, "vector", TagFlags::COLLECTION),
    info(Tag::Map, "map", TagFlags::COLLECTION),
    info(Tag::Tuple, "tuple", TagFlags::COMPOSITE),
    info(Tag::Package, "package", TagFlags::COMPOSITE),
    info(Tag::Function, "function", TagFlags::SCALAR.union(TagFlags::CALLABLE)),
];

impl Tag {
    /// All tags, in table order.
    pub const ALL: [Tag; TAG_COUNT] = [
        Tag::Nil,
        Tag::Bool,
        Tag::Byte,
        Tag::Char,
        Tag::Int,
        Tag::Real,
        Tag::String,
        Tag::Any,
        Tag::Variant,
        Tag::Array,
        Tag::Vector,
        Tag::Map,
        Tag::Tuple,
        Tag::Package,
        Tag::Function,
    ];

    /// The self-contained tags, in the order the registry pre-registers them.
    pub const BASIC: [Tag; 8] = [
        Tag::Nil,
        Tag::Bool,
        Tag::Byte,
        Tag::Char,
        Tag::Int,
        Tag::Real,
        Tag::String,
        Tag::Any,
    ];

    /// Convert from the raw five-bit value.
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Tag::Nil),
            2 => Some(Tag::Bool),
            3 => Some(Tag::Byte),
            4 => Some(Tag::Char),
            5 => Some(Tag::Int),
            6 => Some(Tag::Real),
            7 => Some(Tag::String),
            8 => Some(Tag::Any),
            9 => Some(Tag::Variant),
            10 => Some(Tag::Array),
            11 => Some(Tag::Vector),
            12 => Some(Tag::Map),
            13 => Some(Tag::Tuple),
            14 => Some(Tag::Package),
            15 => Some(Tag::Function),
            _ => None,
        }
    }

    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn info(self) -> &'static TagInfo {
        &TAG_TABLE[self as usize - 1]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn flags(self) -> TagFlags {
        self.info().flags
    }

    pub fn is_basic(self) -> bool {
        self.info().is_basic()
    }

    pub fn is_scalar(self) -> bool {
        self.info().is_scalar()
    }

    pub fn is_composite(self) -> bool {
        self.info().is_composite()
    }

    pub fn is_collection(self) -> bool {
        self.info().is_collection()
    }

    pub fn is_callable(self) -> bool {
        self.info().is_callable()
    }

    /// Position of a basic tag within [`Tag::BASIC`].
    pub fn basic_index(self) -> Option<usize> {
        if self.is_basic() {
            // Basic tags are numbered contiguously from Nil.
            Some((self as u8 - Tag::Nil as u8) as usize)
        } else {
            None
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Tag::from_u8(value).ok_or(value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Table lookup by tag.
pub fn tag_info(tag: Tag) -> &'static TagInfo {
    tag.info()
}

pub const fn tag_to_int(tag: Tag) -> u8 {
    tag.to_u8()
}

pub const fn int_to_tag(i: u8) -> Option<Tag> {
    Tag::from_u8(i)
}
