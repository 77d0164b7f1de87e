//! UPL type descriptors.
//!
//! # Overview
//!
//! Every UPL type is described by a short byte string, its *ST-Code*. A
//! descriptor is built in an expanded form ([`Stir`]) with one nibble per
//! element, packed two nibbles per byte ([`PackedSt`]), and interned in a
//! [`TypeRegistry`] which hands back a dense [`TypeId`]. Composite types refer
//! to their components by identifier, so structurally equal types always get
//! the same identifier.
//!
//! # Quick Start
//!
//! ```
//! use upl::{Tag, TypeRegistry};
//! use upl::st_code::{make_function, make_map};
//!
//! let mut registry = TypeRegistry::new();
//! let string = registry.by_tag(Tag::String);
//! let int = registry.by_tag(Tag::Int);
//!
//! let counts = registry.register(&make_map(false, string, int));
//! let lookup = registry.register(&make_function(false, int, &[counts, string]));
//!
//! assert_eq!(registry.get_function_param_types(lookup), Ok(vec![counts, string]));
//! assert_eq!(
//!     registry.display(lookup).to_string(),
//!     "func(map<string, int>, string) -> int"
//! );
//! ```
//!
//! # Crates
//!
//! - `upl-types`: the closed tag table.
//! - `upl-core`: the codec, the registry and diagnostics.

// Re-export public API from upl_core
pub use upl_core::registry::{
    self, RegistryOptions, ScopedNames, TypeDisplay, TypeRegistry, Unpacked,
};
pub use upl_core::st_code::{self, PackedSt, Size, Stir, TypeId};

// Re-export diagnostics and errors
pub use upl_core::diagnostics::{self, Category, Diagnostic, Location, Reporter, Severity};
pub use upl_core::error::{DecodeError, ErrorKind, StError};

// Re-export the tag table
pub use upl_types::{Tag, TagFlags, TagInfo};
