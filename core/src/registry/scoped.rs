//! Lexically nested type names.

use super::TypeRegistry;
use crate::String;
use crate::st_code::TypeId;
use alloc::string::ToString;
use hashbrown::HashMap;
use tracing::debug;

/// A scope of type names, optionally nested in a parent scope.
///
/// Names resolve innermost first. A child may shadow a parent's name but a
/// scope never rebinds a name it already holds.
///
/// ```
/// use upl_core::registry::{ScopedNames, TypeRegistry};
/// use upl_types::Tag;
///
/// let registry = TypeRegistry::new();
/// let mut global = ScopedNames::new();
/// assert!(global.create_name(&registry, "Count", registry.by_tag(Tag::Int)));
///
/// let mut local = global.child();
/// assert!(local.create_name(&registry, "Count", registry.by_tag(Tag::Byte)));
/// assert_eq!(local.find_by_name("Count"), registry.by_tag(Tag::Byte));
/// assert_eq!(global.find_by_name("Count"), registry.by_tag(Tag::Int));
/// ```
#[derive(Debug, Default)]
pub struct ScopedNames<'p> {
    parent: Option<&'p ScopedNames<'p>>,
    names: HashMap<String, TypeId>,
}

impl<'p> ScopedNames<'p> {
    /// A root scope.
    pub fn new() -> Self {
        Self {
            parent: None,
            names: HashMap::new(),
        }
    }

    /// A scope nested inside `self`.
    pub fn child(&self) -> ScopedNames<'_> {
        ScopedNames {
            parent: Some(self),
            names: HashMap::new(),
        }
    }

    pub fn parent(&self) -> Option<&'p ScopedNames<'p>> {
        self.parent
    }

    /// Bind `name` to `id` in this scope.
    ///
    /// Returns false if `id` is not registered in `registry` or if this scope
    /// already binds `name`.
    pub fn create_name(&mut self, registry: &TypeRegistry, name: &str, id: TypeId) -> bool {
        if !registry.is_valid(id) || self.names.contains_key(name) {
            return false;
        }
        debug!(name, %id, "bound type name");
        self.names.insert(name.to_string(), id);
        true
    }

    /// Resolve `name` here or in an enclosing scope.
    pub fn find_by_name(&self, name: &str) -> TypeId {
        match self.names.get(name) {
            Some(&id) => id,
            None => self
                .parent
                .map_or(TypeId::INVALID, |parent| parent.find_by_name(name)),
        }
    }

    /// Number of names bound directly in this scope.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
