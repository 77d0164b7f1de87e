//! UPL type-category tags.
//!
//! This crate holds the closed table of type tags shared by the ST-Code codec
//! and the type registry. It is `no_std` and has no runtime initialization:
//! the table is plain constant data.
//!
//! # Example
//!
//! ```
//! use upl_types::Tag;
//!
//! assert!(Tag::Int.is_basic());
//! assert!(Tag::Function.is_callable());
//! assert_eq!(Tag::from_u8(Tag::Map.to_u8()), Some(Tag::Map));
//! ```

#![no_std]

pub mod tag;

pub use tag::{
    MAX_TAG_VALUE, TAG_COUNT, Tag, TagFlags, TagInfo, int_to_tag, tag_info, tag_to_int,
};
