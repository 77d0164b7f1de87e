//! # Type registry
//!
//! Interns packed ST-Code descriptors and hands out dense [`TypeId`]s.
//!
//! Every identifier owns one 4-byte [`slot`]. Encodings of up to four bytes
//! live directly in their slot; longer ones are appended to a shared byte
//! arena (the "stash") and the slot records their offset. A hash map from
//! packed bytes to identifier guarantees that one encoding is stored once.
//!
//! The sixteen basic descriptors (every basic tag, non-const then const) are
//! registered on construction and always occupy identifiers 1 to 16.
//!
//! ```
//! use upl_core::registry::TypeRegistry;
//! use upl_core::st_code::{make_vector, pack};
//! use upl_types::Tag;
//!
//! let mut registry = TypeRegistry::new();
//! let int = registry.by_tag(Tag::Int);
//! let ints = registry.create_type(&pack(&make_vector(false, int)));
//!
//! assert_eq!(registry.get_vector_type(ints), Ok(int));
//! assert_eq!(registry.display(ints).to_string(), "vector<int>");
//! ```

mod display;
mod options;
mod scoped;
mod slot;
mod unpacked;

#[cfg(test)]
mod registry_test;

pub use display::TypeDisplay;
pub use options::RegistryOptions;
pub use scoped::ScopedNames;
pub use unpacked::Unpacked;

use crate::Vec;
use crate::error::{DecodeError, StError};
use crate::st_code::builder::basic_unchecked;
use crate::st_code::nibble::{deserialize_int_with, packed_quartet};
use crate::st_code::tag_byte::{self, get_tag};
use crate::st_code::{BufferType, PackedSt, Size, Stir, TypeId, pack, unpack};
use hashbrown::HashMap;
use slot::{Location, Slot};
use tracing::{debug, trace, warn};
use upl_types::{MAX_TAG_VALUE, Tag};

/// Interning store for packed type descriptors.
///
/// Registration takes `&mut self` and every query takes `&self`, so reads can
/// never observe a half-finished registration. Wrap it in a lock to share it
/// between threads.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    slots: Vec<Slot>,
    stash: Vec<u8>,
    dedup: HashMap<BufferType, TypeId>,
    options: RegistryOptions,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        let basic_count = 2 * Tag::BASIC.len();
        let mut registry = TypeRegistry {
            slots: Vec::with_capacity(options.slot_capacity.max(1 + basic_count)),
            stash: Vec::with_capacity(options.stash_capacity),
            dedup: HashMap::with_capacity(options.slot_capacity.max(basic_count)),
            options,
        };
        registry.slots.push(Slot::RESERVED);

        for tag in Tag::BASIC {
            for is_const in [false, true] {
                let packed = pack(&basic_unchecked(is_const, tag));
                debug_assert_eq!(packed.len(), 1);
                let id = TypeId::new(registry.slots.len() as u32);
                registry.slots.push(Slot::single(packed.tag_byte()));
                registry.dedup.insert(BufferType::from_slice(packed.as_bytes()), id);
                debug_assert_eq!(id, registry.by_basic(tag, is_const));
            }
        }
        registry
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Number of registered types, basic types included.
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently held in the stash.
    pub fn stash_len(&self) -> usize {
        self.stash.len()
    }

    pub fn is_valid(&self, id: TypeId) -> bool {
        !id.is_invalid() && id.index() < self.slots.len()
    }

    // Registration

    /// Register `packed`, or find the identifier it already has.
    ///
    /// The encoding is fully validated before anything is stored: it must
    /// unpack cleanly, decode without leftover nibbles and be exactly the
    /// canonical bytes the builder would produce for it. Operands are only
    /// required to be registered when [`RegistryOptions::check_operands`] is
    /// set.
    pub fn try_create_type(&mut self, packed: &PackedSt) -> Result<TypeId, StError> {
        if let Some(&id) = self.dedup.get(packed.as_bytes()) {
            trace!(%id, "type already registered");
            return Ok(id);
        }
        self.validate(packed.as_bytes())?;
        self.store(packed)
    }

    /// Like [`try_create_type`](Self::try_create_type), but reports any
    /// rejection as `TypeId::INVALID`.
    pub fn create_type(&mut self, packed: &PackedSt) -> TypeId {
        self.try_create_type(packed).unwrap_or_else(|err| {
            warn!(bytes = ?packed.as_bytes(), %err, "rejected type encoding");
            TypeId::INVALID
        })
    }

    /// Pack and register an expanded form.
    pub fn register(&mut self, stir: &Stir) -> TypeId {
        self.create_type(&pack(stir))
    }

    /// Identifier of `packed` if it is registered, `TypeId::INVALID` if not.
    pub fn lookup_type(&self, packed: &PackedSt) -> TypeId {
        self.dedup
            .get(packed.as_bytes())
            .copied()
            .unwrap_or(TypeId::INVALID)
    }

    /// Non-const identifier of a basic tag, `TypeId::INVALID` for any other.
    pub fn by_tag(&self, tag: Tag) -> TypeId {
        self.by_basic(tag, false)
    }

    pub fn by_basic(&self, tag: Tag, is_const: bool) -> TypeId {
        match tag.basic_index() {
            Some(index) => TypeId::new(1 + 2 * index as u32 + is_const as u32),
            None => TypeId::INVALID,
        }
    }

    fn validate(&self, bytes: &[u8]) -> Result<(), StError> {
        let stir = unpack(bytes)?;
        let view = Unpacked::from_stir(&stir)?;
        if self.options.check_operands {
            if let Some(id) = view.operands().find(|&id| !self.is_valid(id)) {
                return Err(StError::UnknownIdentifier {
                    id,
                    len: self.len(),
                });
            }
        }
        if view.to_stir() != stir {
            return Err(DecodeError::NonCanonical.into());
        }
        Ok(())
    }

    fn store(&mut self, packed: &PackedSt) -> Result<TypeId, StError> {
        let raw = u32::try_from(self.slots.len()).map_err(|_| StError::RegistryFull)?;
        let id = TypeId::new(raw);
        let bytes = packed.as_bytes();

        let slot = match Slot::inline(bytes) {
            Some(slot) => slot,
            None => {
                let offset = self.stash.len();
                let slot = Slot::stashed(offset).ok_or(StError::StashOverflow { offset })?;
                self.stash.extend_from_slice(bytes);
                slot
            }
        };
        self.slots.push(slot);
        self.dedup.insert(BufferType::from_slice(bytes), id);

        debug!(%id, len = bytes.len(), stashed = slot.is_stashed(), "registered type");
        Ok(id)
    }

    // Queries

    /// Packed bytes of `id`, possibly followed by unrelated bytes.
    fn entry(&self, id: TypeId) -> Result<&[u8], StError> {
        if !self.is_valid(id) {
            return Err(StError::UnknownIdentifier {
                id,
                len: self.len(),
            });
        }
        match self.slots[id.index()].location() {
            Location::Inline(bytes) => Ok(&bytes[..]),
            Location::Stashed(offset) => self
                .stash
                .get(offset..)
                .ok_or(StError::StashOverflow { offset }),
        }
    }

    fn reader(&self, id: TypeId, expected: Tag) -> Result<EntryReader<'_>, StError> {
        let bytes = self.entry(id)?;
        let found = entry_tag(bytes)?;
        if found != expected {
            return Err(StError::ShapeMismatch {
                id,
                expected: expected.name(),
                found,
            });
        }
        Ok(EntryReader { bytes, pos: 0 })
    }

    /// Tag of `id`, `None` if it is not registered.
    pub fn tag(&self, id: TypeId) -> Option<Tag> {
        self.entry(id).ok().and_then(|bytes| get_tag(bytes[0]))
    }

    /// Constness of `id`; false if it is not registered.
    pub fn is_const(&self, id: TypeId) -> bool {
        self.entry(id).is_ok_and(|bytes| tag_byte::is_const(bytes[0]))
    }

    pub fn get_array_size(&self, id: TypeId) -> Result<Size, StError> {
        self.reader(id, Tag::Array)?.int()
    }

    pub fn get_array_type(&self, id: TypeId) -> Result<TypeId, StError> {
        let mut reader = self.reader(id, Tag::Array)?;
        reader.skip()?;
        reader.type_id()
    }

    pub fn get_vector_type(&self, id: TypeId) -> Result<TypeId, StError> {
        self.reader(id, Tag::Vector)?.type_id()
    }

    pub fn get_map_key_type(&self, id: TypeId) -> Result<TypeId, StError> {
        self.reader(id, Tag::Map)?.type_id()
    }

    pub fn get_map_value_type(&self, id: TypeId) -> Result<TypeId, StError> {
        let mut reader = self.reader(id, Tag::Map)?;
        reader.skip()?;
        reader.type_id()
    }

    pub fn get_tuple_types(&self, id: TypeId) -> Result<Vec<TypeId>, StError> {
        self.reader(id, Tag::Tuple)?.type_list()
    }

    pub fn get_package_types(&self, id: TypeId) -> Result<Vec<TypeId>, StError> {
        self.reader(id, Tag::Package)?.type_list()
    }

    /// Variant members, in ascending identifier order.
    pub fn get_variant_types(&self, id: TypeId) -> Result<Vec<TypeId>, StError> {
        self.reader(id, Tag::Variant)?.type_list()
    }

    pub fn get_function_return_type(&self, id: TypeId) -> Result<TypeId, StError> {
        self.reader(id, Tag::Function)?.type_id()
    }

    pub fn get_function_param_types(&self, id: TypeId) -> Result<Vec<TypeId>, StError> {
        let mut reader = self.reader(id, Tag::Function)?;
        reader.skip()?;
        reader.type_list()
    }

    /// Decode `id` into its structured view.
    pub fn unpack(&self, id: TypeId) -> Result<Unpacked, StError> {
        let bytes = self.entry(id)?;
        let tag = entry_tag(bytes)?;
        let mut view = Unpacked::new(tag, tag_byte::is_const(bytes[0]));
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
                view.size = self.get_array_size(id)?;
                view.type1 = Some(self.get_array_type(id)?);
            }
            Tag::Vector => view.type1 = Some(self.get_vector_type(id)?),
            Tag::Map => {
                view.type1 = Some(self.get_map_key_type(id)?);
                view.type2 = Some(self.get_map_value_type(id)?);
            }
            Tag::Tuple => view.type_list = self.get_tuple_types(id)?,
            Tag::Package => view.type_list = self.get_package_types(id)?,
            Tag::Variant => view.type_list = self.get_variant_types(id)?,
            Tag::Function => {
                view.type1 = Some(self.get_function_return_type(id)?);
                view.type_list = self.get_function_param_types(id)?;
            }
        }
        Ok(view)
    }

    /// The exact packed bytes `id` was registered with.
    pub fn packed(&self, id: TypeId) -> Result<PackedSt, StError> {
        Ok(self.unpack(id)?.pack())
    }

    /// Human-readable rendering of `id`.
    pub fn display(&self, id: TypeId) -> TypeDisplay<'_> {
        TypeDisplay::new(self, id)
    }
}

fn entry_tag(bytes: &[u8]) -> Result<Tag, StError> {
    get_tag(bytes[0]).ok_or_else(|| {
        StError::from(DecodeError::UnknownTag {
            value: bytes[0] & MAX_TAG_VALUE,
        })
    })
}

/// Sequential operand reader over stored packed bytes.
struct EntryReader<'r> {
    bytes: &'r [u8],
    pos: usize,
}

impl EntryReader<'_> {
    fn int(&mut self) -> Result<u32, StError> {
        let bytes = self.bytes;
        Ok(deserialize_int_with(|i| packed_quartet(bytes, i), &mut self.pos)?)
    }

    fn skip(&mut self) -> Result<(), StError> {
        self.int().map(drop)
    }

    fn type_id(&mut self) -> Result<TypeId, StError> {
        self.int().map(TypeId::new)
    }

    fn type_list(&mut self) -> Result<Vec<TypeId>, StError> {
        let count = self.int()? as usize;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            list.push(self.type_id()?);
        }
        Ok(list)
    }
}
