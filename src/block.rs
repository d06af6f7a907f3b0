//! Filepath: src/block.rs
//!
//! A single tail block.
//!
//! The persisted layout overloads the next-free link: `-1` means "allocated",
//! anything else is a link in the free list. In memory the two states are
//! separate variants, so a free block cannot carry data or a suffix.

use crate::types::{TRIE_DATA_ERROR, TrieChar, TrieData};

// ============================================================================
//  TailBlock
// ============================================================================

/// One slot of the tail arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TailBlock {
    /// Slot is in use.
    Allocated {
        /// Associated value, [`TRIE_DATA_ERROR`] until set.
        data: TrieData,

        /// Owned suffix bytes, without terminator.
        suffix: Option<Box<[TrieChar]>>,
    },

    /// Slot is on the free list.
    Free {
        /// Arena position of the next free slot, `None` at the tail of the list.
        next: Option<usize>,
    },
}

impl TailBlock {
    /// A freshly allocated block: no data, no suffix.
    pub(crate) const EMPTY: Self = Self::Allocated {
        data: TRIE_DATA_ERROR,
        suffix: None,
    };

    /// Check if this block is allocated.
    #[must_use]
    #[inline(always)]
    pub const fn is_allocated(&self) -> bool {
        matches!(self, Self::Allocated { .. })
    }

    /// Check if this block is on the free list.
    #[must_use]
    #[inline(always)]
    pub const fn is_free(&self) -> bool {
        matches!(self, Self::Free { .. })
    }

    /// The stored suffix, if allocated and set.
    #[must_use]
    #[inline(always)]
    pub fn suffix(&self) -> Option<&[TrieChar]> {
        match self {
            Self::Allocated { suffix, .. } => suffix.as_deref(),
            Self::Free { .. } => None,
        }
    }

    /// The raw data value. Free blocks report [`TRIE_DATA_ERROR`].
    #[must_use]
    #[inline(always)]
    pub const fn data(&self) -> TrieData {
        match self {
            Self::Allocated { data, .. } => *data,
            Self::Free { .. } => TRIE_DATA_ERROR,
        }
    }

    /// The free-list link, if this block is free.
    #[must_use]
    #[inline(always)]
    pub const fn next_free(&self) -> Option<Option<usize>> {
        match self {
            Self::Free { next } => Some(*next),
            Self::Allocated { .. } => None,
        }
    }
}

impl Default for TailBlock {
    fn default() -> Self {
        Self::EMPTY
    }
}
