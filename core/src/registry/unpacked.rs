//! Decoded, structured view of a descriptor.

use crate::Vec;
use crate::error::DecodeError;
use crate::st_code::builder::basic_unchecked;
use crate::st_code::nibble::deserialize_int;
use crate::st_code::tag_byte::{get_tag, is_const};
use crate::st_code::{
    PackedSt, Size, Stir, TypeId, make_array, make_function, make_map, make_package, make_tuple,
    make_variant, make_vector, pack,
};
use serde::{Deserialize, Serialize};
use upl_types::{MAX_TAG_VALUE, Tag};

/// A descriptor's tag, constness and operands.
///
/// Which fields are meaningful depends on `tag`:
///
/// | tag | `type1` | `type2` | `size` | `type_list` |
/// |---|---|---|---|---|
/// | basic | | | | |
/// | Array | element | | element count | |
/// | Vector | element | | | |
/// | Map | key | value | | |
/// | Tuple, Package | | | | fields |
/// | Variant | | | | members, ascending |
/// | Function | return | | | parameters |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unpacked {
    pub tag: Tag,
    pub is_const: bool,
    pub type1: Option<TypeId>,
    pub type2: Option<TypeId>,
    pub size: Size,
    pub type_list: Vec<TypeId>,
}

impl Unpacked {
    /// An empty view for `tag`; operands are filled in by the caller.
    pub fn new(tag: Tag, is_const: bool) -> Self {
        Unpacked {
            tag,
            is_const,
            type1: None,
            type2: None,
            size: 0,
            type_list: Vec::new(),
        }
    }

    /// Decode an expanded form with the flat nibble decoder.
    ///
    /// Every nibble must be consumed; leftovers are an error.
    pub fn from_stir(stir: &Stir) -> Result<Self, DecodeError> {
        let tag_byte = stir.tag_byte();
        let tag = get_tag(tag_byte).ok_or(DecodeError::UnknownTag {
            value: tag_byte & MAX_TAG_VALUE,
        })?;
        let nibbles = stir.nibbles();
        let mut pos = 0;
        let mut next = || deserialize_int(nibbles, &mut pos);

        let mut out = Unpacked::new(tag, is_const(tag_byte));
        match tag {
            Tag::Nil
            | Tag::Bool
            | Tag::Byte
            | Tag::Char
            | Tag::Int
            | Tag::Real
            | Tag::String
            | Tag::Any => {}
            Tag::Array => {
                out.size = next()?;
                out.type1 = Some(TypeId::new(next()?));
            }
            Tag::Vector => {
                out.type1 = Some(TypeId::new(next()?));
            }
            Tag::Map => {
                out.type1 = Some(TypeId::new(next()?));
                out.type2 = Some(TypeId::new(next()?));
            }
            Tag::Variant | Tag::Tuple | Tag::Package => {
                let count = next()?;
                out.type_list = read_list(&mut next, count)?;
            }
            Tag::Function => {
                out.type1 = Some(TypeId::new(next()?));
                let count = next()?;
                out.type_list = read_list(&mut next, count)?;
            }
        }

        if pos != nibbles.len() {
            return Err(DecodeError::TrailingNibbles {
                remaining: nibbles.len() - pos,
            });
        }
        Ok(out)
    }

    /// Rebuild the canonical expanded form.
    ///
    /// Missing operands encode as `TypeId::INVALID`, which a registry with
    /// operand checking refuses to store. Variant members are normalized to ascending order.
    pub fn to_stir(&self) -> Stir {
        let type1 = self.type1.unwrap_or(TypeId::INVALID);
        let type2 = self.type2.unwrap_or(TypeId::INVALID);
        match self.tag {
            Tag::Nil
            | Tag::Bool
            | Tag::Byte
            | Tag::Char
            | Tag::Int
            | Tag::Real
            | Tag::String
            | Tag::Any => basic_unchecked(self.is_const, self.tag),
            Tag::Variant => make_variant(self.is_const, &self.type_list.iter().copied().collect()),
            Tag::Array => make_array(self.is_const, self.size, type1),
            Tag::Vector => make_vector(self.is_const, type1),
            Tag::Map => make_map(self.is_const, type1, type2),
            Tag::Tuple => make_tuple(self.is_const, &self.type_list),
            Tag::Package => make_package(self.is_const, &self.type_list),
            Tag::Function => make_function(self.is_const, type1, &self.type_list),
        }
    }

    pub fn pack(&self) -> PackedSt {
        pack(&self.to_stir())
    }

    /// Every type identifier this descriptor refers to.
    pub fn operands(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.type1
            .into_iter()
            .chain(self.type2)
            .chain(self.type_list.iter().copied())
    }
}

fn read_list<F>(next: &mut F, count: u32) -> Result<Vec<TypeId>, DecodeError>
where
    F: FnMut() -> Result<u32, DecodeError>,
{
    // Each entry takes at least one nibble, so `count` cannot legitimately
    // exceed what is left; cap the reservation rather than trusting it.
    let mut list = Vec::with_capacity((count as usize).min(64));
    for _ in 0..count {
        list.push(TypeId::new(next()?));
    }
    Ok(list)
}
