//! Configuration options for the type registry.

/// Configuration options for a [`TypeRegistry`](super::TypeRegistry).
///
/// # Example
///
/// ```
/// use upl_core::registry::{RegistryOptions, TypeRegistry};
///
/// let registry = TypeRegistry::with_options(RegistryOptions {
///     slot_capacity: 4096,
///     ..RegistryOptions::default()
/// });
/// assert!(!registry.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Number of slots to reserve up front.
    ///
    /// Default: 64
    pub slot_capacity: usize,

    /// Number of stash bytes to reserve up front.
    ///
    /// Default: 256
    pub stash_capacity: usize,

    /// Reject encodings that reference identifiers not yet registered.
    ///
    /// Turning this on guarantees that every operand points at an older
    /// entry, so the registry forms a DAG. Off by default: a descriptor may
    /// name operands that are registered later.
    ///
    /// Default: false
    pub check_operands: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            slot_capacity: 64,
            stash_capacity: 256,
            check_operands: false,
        }
    }
}
