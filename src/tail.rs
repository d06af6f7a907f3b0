//! Filepath: src/tail.rs
//!
//! The suffix-tail store.
//!
//! A [`Tail`] keeps the unshared remainder of each key once its path through
//! the double array diverges from every other key, together with the value
//! associated with that key. Blocks are addressed by external [`TrieIndex`]
//! handles (see [`TAIL_START_BLOCKNO`](crate::types::TAIL_START_BLOCKNO)).
//!
//! # Handles vs. views
//!
//! The block arena is a `Vec` and may relocate on growth. Indices stay valid
//! across mutations; the `&[TrieChar]` returned by [`Tail::suffix`] borrows the
//! store and therefore cannot outlive the next `&mut self` call.

use crate::block::TailBlock;
use crate::error::TailError;
use crate::types::{TRIE_DATA_ERROR, TrieChar, TrieData, TrieIndex, terminated_len, to_internal};

// ============================================================================
//  Tail
// ============================================================================

/// Suffix storage for a double-array trie.
///
/// # Example
///
/// ```rust
/// use tailstore::Tail;
///
/// let mut tail = Tail::new();
/// let idx = tail.add_suffix(b"use").unwrap();
/// assert!(tail.set_data(idx, 42));
///
/// assert_eq!(tail.suffix(idx), Some(b"use".as_slice()));
/// assert_eq!(tail.data(idx), Some(42));
///
/// tail.delete(idx);
/// assert_eq!(tail.suffix(idx), None);
/// assert_eq!(tail.data(idx), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tail {
    /// Block arena, indexed by internal position.
    pub(crate) blocks: Vec<TailBlock>,

    /// Position of the lowest free block, `None` when the free list is empty.
    pub(crate) first_free: Option<usize>,
}

impl Tail {
    // ========================================================================
    //  Constructor
    // ========================================================================

    /// Create an empty tail. No storage is allocated until the first block.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks: Vec::new(),
            first_free: None,
        }
    }

    /// Create an empty tail with room for `capacity` blocks.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            blocks: Vec::with_capacity(capacity),
            first_free: None,
        }
    }

    // ========================================================================
    //  Size
    // ========================================================================

    /// Total number of blocks, allocated and free.
    #[must_use]
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the arena has no blocks at all.
    #[must_use]
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number of blocks currently allocated.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_allocated()).count()
    }

    // ========================================================================
    //  Block Access
    // ========================================================================

    #[inline(always)]
    pub(crate) fn block(&self, index: TrieIndex) -> Option<&TailBlock> {
        to_internal(index).and_then(|pos| self.blocks.get(pos))
    }

    #[inline(always)]
    pub(crate) fn block_mut(&mut self, index: TrieIndex) -> Option<&mut TailBlock> {
        to_internal(index).and_then(|pos| self.blocks.get_mut(pos))
    }

    /// Check if `index` names an allocated block.
    #[must_use]
    #[inline]
    pub fn is_allocated(&self, index: TrieIndex) -> bool {
        self.block(index).is_some_and(TailBlock::is_allocated)
    }

    // ========================================================================
    //  Suffix
    // ========================================================================

    /// The suffix stored at `index`.
    ///
    /// Returns `None` if the index is out of range, the block is free, or no
    /// suffix has been set. The view borrows the store and is never copied.
    #[must_use]
    #[inline]
    pub fn suffix(&self, index: TrieIndex) -> Option<&[TrieChar]> {
        self.block(index).and_then(TailBlock::suffix)
    }

    /// Replace the suffix of an allocated block.
    ///
    /// Bytes are stored up to the first terminator. The new suffix is copied
    /// into its own allocation before the old one is released. Passing `None`
    /// clears the suffix.
    ///
    /// Returns `false` if `index` is out of range or names a free block.
    pub fn set_suffix(&mut self, index: TrieIndex, suffix: Option<&[TrieChar]>) -> bool {
        let Some(TailBlock::Allocated { suffix: slot, .. }) = self.block_mut(index) else {
            return false;
        };

        let copy: Option<Box<[TrieChar]>> =
            suffix.map(|s| Box::from(s.get(..terminated_len(s)).unwrap_or(s)));
        *slot = copy;
        true
    }

    /// Drop the first `skip` units of the suffix at `index`.
    ///
    /// This is the self-derived update the trie layer performs when a branch
    /// is inserted inside an existing tail: the remainder is copied out of the
    /// old buffer before that buffer is released. Skipping past the end
    /// leaves an empty suffix.
    ///
    /// Returns `false` if the block is missing, free, or has no suffix.
    pub fn advance_suffix(&mut self, index: TrieIndex, skip: usize) -> bool {
        let Some(TailBlock::Allocated {
            suffix: Some(old), ..
        }) = self.block_mut(index)
        else {
            return false;
        };

        let rest: Box<[TrieChar]> = Box::from(old.get(skip..).unwrap_or_default());
        *old = rest;
        true
    }

    // ========================================================================
    //  Data
    // ========================================================================

    /// The value associated with `index`.
    ///
    /// Returns `None` if the index is out of range, the block is free, or the
    /// value is still [`TRIE_DATA_ERROR`].
    #[must_use]
    #[inline]
    pub fn data(&self, index: TrieIndex) -> Option<TrieData> {
        Some(self.data_or_error(index)).filter(|&d| d != TRIE_DATA_ERROR)
    }

    /// The raw value at `index`, [`TRIE_DATA_ERROR`] when there is none.
    #[must_use]
    #[inline]
    pub fn data_or_error(&self, index: TrieIndex) -> TrieData {
        self.block(index).map_or(TRIE_DATA_ERROR, TailBlock::data)
    }

    /// Set the value of an allocated block.
    ///
    /// Returns `false` if `index` is out of range or names a free block.
    pub fn set_data(&mut self, index: TrieIndex, value: TrieData) -> bool {
        match self.block_mut(index) {
            Some(TailBlock::Allocated { data, .. }) => {
                *data = value;
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    //  Entries
    // ========================================================================

    /// Allocate a block and store `suffix` in it.
    ///
    /// The value stays at [`TRIE_DATA_ERROR`] until [`set_data`](Self::set_data).
    ///
    /// # Errors
    ///
    /// [`TailError::Exhausted`] if a new block is needed and the arena cannot
    /// grow. The store is unchanged in that case.
    pub fn add_suffix(&mut self, suffix: &[TrieChar]) -> Result<TrieIndex, TailError> {
        let index: TrieIndex = self.alloc_block()?;
        let stored: bool = self.set_suffix(index, Some(suffix));
        debug_assert!(stored, "freshly allocated block {index} rejected suffix");
        Ok(index)
    }

    /// Delete the entry at `index` and return its block to the free list.
    ///
    /// Out-of-range and already-free indices are ignored.
    #[inline]
    pub fn delete(&mut self, index: TrieIndex) {
        self.free_block(index);
    }

    /// Iterate over allocated blocks as `(index, data, suffix)`.
    pub fn entries(&self) -> impl Iterator<Item = (TrieIndex, TrieData, Option<&[TrieChar]>)> {
        (crate::types::TAIL_START_BLOCKNO..)
            .zip(self.blocks.iter())
            .filter_map(|(index, block)| match block {
                TailBlock::Allocated { data, suffix } => Some((index, *data, suffix.as_deref())),
                TailBlock::Free { .. } => None,
            })
    }
}

// ============================================================================
//  Tests
// ============================================================================
