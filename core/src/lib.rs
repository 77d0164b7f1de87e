#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

//! ST-Code: compact type descriptors for UPL and the registry that interns
//! them.
//!
//! - [`st_code`] builds and packs descriptors.
//! - [`registry`] validates, deduplicates and stores them behind dense
//!   [`TypeId`]s.
//! - [`diagnostics`] turns failures into reportable diagnostics.

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{boxed::Box, format, string::String, string::ToString, vec, vec::Vec};

pub mod diagnostics;
pub mod error;
pub mod registry;
pub mod st_code;

pub use error::{DecodeError, ErrorKind, StError};
pub use registry::{RegistryOptions, ScopedNames, TypeRegistry, Unpacked};
pub use st_code::{PackedSt, Size, Stir, TypeId};
