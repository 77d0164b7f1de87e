//! Canonical expanded-form construction.
//!
//! Operand order per tag (never reorder, the canonical form depends on it):
//!
//! ```text
//! basic     [tag]
//! variant   [tag][count][member...]          members ascending
//! array     [tag][size][element]
//! vector    [tag][element]
//! map       [tag][key][value]
//! tuple     [tag][count][field...]           declared order
//! package   [tag][count][field...]           declared order
//! function  [tag][return][count][param...]   declared order
//! ```

use super::nibble::serialize_int_into;
use super::tag_byte::{ODD_LENGTH_BIT, serialize_tag};
use super::{BufferType, Size, Stir, TypeId};
use crate::error::StError;
use alloc::collections::BTreeSet;
use upl_types::Tag;

fn start(tag: Tag, is_const: bool) -> BufferType {
    let mut buf = BufferType::new();
    buf.push(serialize_tag(tag, is_const));
    buf
}

fn push_id(buf: &mut BufferType, id: TypeId) {
    serialize_int_into(buf, id.raw());
}

fn push_list<'a>(buf: &mut BufferType, ids: impl ExactSizeIterator<Item = &'a TypeId>) {
    serialize_int_into(buf, ids.len() as u32);
    for id in ids {
        push_id(buf, *id);
    }
}

/// Set the odd-length flag if the expanded form has an even element count.
fn finish(mut buf: BufferType) -> Stir {
    if buf.len() % 2 == 0 {
        buf[0] |= ODD_LENGTH_BIT;
    }
    Stir::from_buffer(buf)
}

pub(crate) fn basic_unchecked(is_const: bool, tag: Tag) -> Stir {
    debug_assert!(tag.is_basic());
    finish(start(tag, is_const))
}

pub fn make_basic(is_const: bool, tag: Tag) -> Result<Stir, StError> {
    if !tag.is_basic() {
        return Err(StError::ShapeMismatch {
            id: TypeId::INVALID,
            expected: "a basic tag",
            found: tag,
        });
    }
    Ok(basic_unchecked(is_const, tag))
}

/// The set gives ascending, duplicate-free members, so logically equal
/// variants always encode to the same bytes.
pub fn make_variant(is_const: bool, allowed_types: &BTreeSet<TypeId>) -> Stir {
    let mut buf = start(Tag::Variant, is_const);
    push_list(&mut buf, allowed_types.iter());
    finish(buf)
}

pub fn make_array(is_const: bool, size: Size, ty: TypeId) -> Stir {
    let mut buf = start(Tag::Array, is_const);
    serialize_int_into(&mut buf, size);
    push_id(&mut buf, ty);
    finish(buf)
}

pub fn make_vector(is_const: bool, ty: TypeId) -> Stir {
    let mut buf = start(Tag::Vector, is_const);
    push_id(&mut buf, ty);
    finish(buf)
}

pub fn make_map(is_const: bool, key_type: TypeId, value_type: TypeId) -> Stir {
    let mut buf = start(Tag::Map, is_const);
    push_id(&mut buf, key_type);
    push_id(&mut buf, value_type);
    finish(buf)
}

pub fn make_tuple(is_const: bool, field_types: &[TypeId]) -> Stir {
    let mut buf = start(Tag::Tuple, is_const);
    push_list(&mut buf, field_types.iter());
    finish(buf)
}

pub fn make_package(is_const: bool, field_types: &[TypeId]) -> Stir {
    let mut buf = start(Tag::Package, is_const);
    push_list(&mut buf, field_types.iter());
    finish(buf)
}

pub fn make_function(is_const: bool, return_type: TypeId, param_types: &[TypeId]) -> Stir {
    let mut buf = start(Tag::Function, is_const);
    push_id(&mut buf, return_type);
    push_list(&mut buf, param_types.iter());
    finish(buf)
}

pub fn make_nil() -> Stir {
    basic_unchecked(false, Tag::Nil)
}

pub fn make_bool(is_const: bool) -> Stir {
    basic_unchecked(is_const, Tag::Bool)
}

pub fn make_byte(is_const: bool) -> Stir {
    basic_unchecked(is_const, Tag::Byte)
}

pub fn make_char(is_const: bool) -> Stir {
    basic_unchecked(is_const, Tag::Char)
}

pub fn make_int(is_const: bool) -> Stir {
    basic_unchecked(is_const, Tag::Int)
}

pub fn make_real(is_const: bool) -> Stir {
    basic_unchecked(is_const, Tag::Real)
}

pub fn make_string(is_const: bool) -> Stir {
    basic_unchecked(is_const, Tag::String)
}

pub fn make_any(is_const: bool) -> Stir {
    basic_unchecked(is_const, Tag::Any)
}
