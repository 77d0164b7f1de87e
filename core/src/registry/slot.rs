//! Fixed-size registry slots.
//!
//! ```text
//!   inline:   [0ttttttt][byte 1][byte 2][byte 3]   packed bytes, zero-padded
//!   stashed:  [1ooooooo][oooooooo][oooooooo][oooooooo]   31-bit stash offset
//! ```
//!
//! The inline case relies on the codec never setting bit 7 of a tag byte.
//! The marker below is a registry-only concept and shares nothing with the
//! codec's tag byte flags.

use static_assertions::assert_eq_size;

pub(crate) const SLOT_SIZE: usize = 4;

/// Marks a slot whose bytes live in the stash.
const STASHED_BIT: u8 = 1 << 7;

/// Largest offset a stashed slot can address.
pub(crate) const MAX_STASH_OFFSET: usize = (1 << 31) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot([u8; SLOT_SIZE]);

assert_eq_size!(Slot, u32);

/// Where a slot's packed bytes can be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Location<'s> {
    Inline(&'s [u8; SLOT_SIZE]),
    Stashed(usize),
}

impl Slot {
    /// Occupies identifier zero so that identifiers index slots directly.
    pub(crate) const RESERVED: Slot = Slot([0; SLOT_SIZE]);

    /// Store `packed` directly in the slot. `None` if it does not fit or
    /// would collide with the stash marker.
    pub(crate) fn inline(packed: &[u8]) -> Option<Slot> {
        if packed.is_empty() || packed.len() > SLOT_SIZE || packed[0] & STASHED_BIT != 0 {
            return None;
        }
        let mut bytes = [0; SLOT_SIZE];
        bytes[..packed.len()].copy_from_slice(packed);
        Some(Slot(bytes))
    }

    /// Inline slot holding a one-byte encoding.
    pub(crate) const fn single(tag_byte: u8) -> Slot {
        debug_assert!(tag_byte & STASHED_BIT == 0);
        Slot([tag_byte, 0, 0, 0])
    }

    /// Point the slot at `offset` in the stash. `None` past 31 bits.
    pub(crate) fn stashed(offset: usize) -> Option<Slot> {
        if offset > MAX_STASH_OFFSET {
            return None;
        }
        let mut bytes = (offset as u32).to_be_bytes();
        bytes[0] |= STASHED_BIT;
        Some(Slot(bytes))
    }

    pub(crate) fn is_stashed(&self) -> bool {
        self.0[0] & STASHED_BIT != 0
    }

    pub(crate) fn location(&self) -> Location<'_> {
        if self.is_stashed() {
            let mut bytes = self.0;
            bytes[0] &= !STASHED_BIT;
            Location::Stashed(u32::from_be_bytes(bytes) as usize)
        } else {
            Location::Inline(&self.0)
        }
    }
}
