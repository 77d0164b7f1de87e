//! Error types for the ST-Code codec and the type registry.
//!
//! Two layers:
//!
//! - [`DecodeError`]: what is wrong with a byte sequence (unknown tag,
//!   truncated operand stream, non-canonical form, ...).
//! - [`StError`]: what went wrong with an operation. Besides malformed input
//!   it covers unknown identifiers and accessor/shape mismatches, which are
//!   contract violations by the caller rather than bad input.

use crate::diagnostics::{Category, Severity};
use crate::st_code::TypeId;
use thiserror::Error;
use upl_types::Tag;

/// Reasons a byte sequence is not a valid ST-Code encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty encoding")]
    Empty,

    #[error("tag value {value} is not a known type tag")]
    UnknownTag { value: u8 },

    #[error("nibble stream truncated at nibble {offset}")]
    Truncated { offset: usize },

    #[error("value {value:#x} at nibble {offset} does not fit in four bits")]
    InvalidNibble { offset: usize, value: u8 },

    #[error("{remaining} unused nibble(s) after the last operand")]
    TrailingNibbles { remaining: usize },

    #[error("padding nibble is {value:#x}, expected zero")]
    NonZeroPadding { value: u8 },

    #[error("odd-length flag does not match an encoding of {len} element(s)")]
    LengthFlagMismatch { len: usize },

    #[error("encoding is well-formed but not in canonical form")]
    NonCanonical,
}

/// Errors reported by codec and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StError {
    #[error("invalid type encoding: {0}")]
    InvalidEncoding(#[from] DecodeError),

    #[error("unknown type identifier {id} (registry holds {len} types)")]
    UnknownIdentifier { id: TypeId, len: usize },

    #[error("type {id} is {found}, expected {expected}")]
    ShapeMismatch {
        id: TypeId,
        expected: &'static str,
        found: Tag,
    },

    #[error("type stash offset {offset} does not fit in 31 bits")]
    StashOverflow { offset: usize },

    #[error("type registry cannot hold more than u32::MAX identifiers")]
    RegistryFull,
}

/// Fieldless classification of [`StError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidEncoding,
    UnknownIdentifier,
    ShapeMismatch,
    StashOverflow,
    RegistryFull,
}

impl StError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StError::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
            StError::UnknownIdentifier { .. } => ErrorKind::UnknownIdentifier,
            StError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            StError::StashOverflow { .. } => ErrorKind::StashOverflow,
            StError::RegistryFull => ErrorKind::RegistryFull,
        }
    }

    /// Diagnostic category this error belongs to.
    ///
    /// Bad bytes and dangling identifiers come from the caller's input;
    /// everything else means an invariant inside the compiler was broken.
    pub fn category(&self) -> Category {
        match self.kind() {
            ErrorKind::InvalidEncoding | ErrorKind::UnknownIdentifier => Category::Input,
            ErrorKind::ShapeMismatch | ErrorKind::StashOverflow | ErrorKind::RegistryFull => {
                Category::Internal
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self.category() {
            Category::Internal => Severity::Fatal,
            _ => Severity::Error,
        }
    }

    /// Stable diagnostic number, one per kind.
    pub fn number(&self) -> i32 {
        match self.kind() {
            ErrorKind::InvalidEncoding => 101,
            ErrorKind::UnknownIdentifier => 102,
            ErrorKind::ShapeMismatch => 201,
            ErrorKind::StashOverflow => 202,
            ErrorKind::RegistryFull => 203,
        }
    }
}
