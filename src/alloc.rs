//! Filepath: src/alloc.rs
//!
//! Block allocation for the tail arena.
//!
//! Free blocks form a singly linked list threaded through
//! [`TailBlock::Free`]. The list is kept sorted by arena position, so
//! [`Tail::alloc_block`] always hands out the lowest free block before it
//! grows the arena.
//!
//! # Complexity
//!
//! | Operation     | Cost                      |
//! |---------------|---------------------------|
//! | `alloc_block` | O(1) amortized            |
//! | `free_block`  | O(free-list length)       |
//!
//! The linear reinsertion scan trades asymptotics for a zero-overhead
//! representation. It is fine for the dictionary sizes a trie tail sees.

use crate::block::TailBlock;
use crate::error::TailError;
use crate::tail::Tail;
use crate::tracing_helpers::{trace_log, warn_log};
use crate::types::{TrieIndex, to_external, to_internal};

impl Tail {
    // ========================================================================
    //  Allocation
    // ========================================================================

    /// Allocate a block and return its external index.
    ///
    /// Pops the head of the free list if there is one, otherwise appends a
    /// block to the arena. The returned block is allocated with no data and
    /// no suffix.
    ///
    /// # Errors
    ///
    /// [`TailError::Exhausted`] if the arena has to grow and cannot. No block
    /// is touched in that case.
    pub fn alloc_block(&mut self) -> Result<TrieIndex, TailError> {
        if let Some(pos) = self.pop_free() {
            let index: TrieIndex = to_external(pos).ok_or(TailError::Exhausted {
                blocks: self.blocks.len(),
            })?;

            if let Some(block) = self.blocks.get_mut(pos) {
                *block = TailBlock::EMPTY;
            }

            trace_log!(index, "tail: reused free block");
            return Ok(index);
        }

        let pos: usize = self.blocks.len();

        // Check the handle first so a failed push never leaves a block behind.
        let index: TrieIndex = to_external(pos).ok_or(TailError::Exhausted { blocks: pos })?;
        self.blocks
            .try_reserve(1)
            .map_err(|_| TailError::Exhausted { blocks: pos })?;
        self.blocks.push(TailBlock::EMPTY);

        trace_log!(index, blocks = self.blocks.len(), "tail: appended block");
        Ok(index)
    }

    /// Unlink and return the head of the free list.
    fn pop_free(&mut self) -> Option<usize> {
        let head: usize = self.first_free?;
        let next: Option<Option<usize>> = self.blocks.get(head).and_then(TailBlock::next_free);

        debug_assert!(next.is_some(), "free-list head {head} is not a free block");
        self.first_free = next.flatten();
        next.map(|_| head)
    }

    // ========================================================================
    //  Release
    // ========================================================================

    /// Return the block at `index` to the free list.
    ///
    /// The block's data and suffix are released. Out-of-range indices and
    /// blocks that are already free are ignored.
    pub fn free_block(&mut self, index: TrieIndex) {
        let Some(pos) = to_internal(index).filter(|&p| p < self.blocks.len()) else {
            trace_log!(index, "tail: free of out-of-range block ignored");
            return;
        };

        if self.blocks.get(pos).is_some_and(TailBlock::is_free) {
            warn_log!(index, "tail: double free ignored");
            return;
        }

        // Find insertion point: `prev` is the last free block below `pos`,
        // `cur` the first one above it.
        let mut prev: Option<usize> = None;
        let mut cur: Option<usize> = self.first_free;
        while let Some(i) = cur {
            if i >= pos {
                break;
            }
            prev = Some(i);
            cur = self.blocks.get(i).and_then(TailBlock::next_free).flatten();
        }

        if let Some(block) = self.blocks.get_mut(pos) {
            *block = TailBlock::Free { next: cur };
        }

        match prev {
            Some(p) => {
                if let Some(TailBlock::Free { next }) = self.blocks.get_mut(p) {
                    *next = Some(pos);
                }
            }
            None => self.first_free = Some(pos),
        }

        trace_log!(index, "tail: freed block");
    }

    // ========================================================================
    //  Free List
    // ========================================================================

    /// Iterate over free blocks in reuse order, as external indices.
    pub fn free_list(&self) -> FreeList<'_> {
        FreeList {
            blocks: &self.blocks,
            cur: self.first_free,
            remaining: self.blocks.len(),
        }
    }

    /// Number of blocks on the free list.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list().count()
    }

    /// External index of the head of the free list, `None` if it is empty.
    #[must_use]
    #[inline]
    pub fn first_free(&self) -> Option<TrieIndex> {
        self.first_free.and_then(to_external)
    }

    /// Rebuild the free list from the free blocks in ascending order.
    pub(crate) fn relink_free_list(&mut self) {
        let mut next: Option<usize> = None;
        for (pos, block) in self.blocks.iter_mut().enumerate().rev() {
            if let TailBlock::Free { next: link } = block {
                *link = next;
                next = Some(pos);
            }
        }
        self.first_free = next;
    }
}

// ============================================================================
//  FreeList
// ============================================================================

/// Iterator over the free list of a [`Tail`].
///
/// Yields external indices, lowest first.
#[derive(Clone, Debug)]
pub struct FreeList<'a> {
    blocks: &'a [TailBlock],
    cur: Option<usize>,

    /// Bound on the walk, so a corrupted link cannot loop forever.
    remaining: usize,
}

impl Iterator for FreeList<'_> {
    type Item = TrieIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let pos: usize = self.cur?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.cur = self.blocks.get(pos).and_then(TailBlock::next_free).flatten();
        to_external(pos)
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "fail fast in tests")]
mod tests {
    use super::*;

    fn tail_with_blocks(n: usize) -> Tail {
        let mut tail = Tail::new();
        for _ in 0..n {
            tail.alloc_block().unwrap();
        }
        tail
    }

    #[test]
    fn test_alloc_appends() {
        let mut tail = Tail::new();

        assert_eq!(tail.alloc_block().unwrap(), 1);
        assert_eq!(tail.alloc_block().unwrap(), 2);
        assert_eq!(tail.alloc_block().unwrap(), 3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail.free_count(), 0);
        assert_eq!(tail.first_free(), None);
    }

    #[test]
    fn test_free_then_alloc_reuses() {
        let mut tail = tail_with_blocks(3);

        tail.free_block(2);
        assert_eq!(tail.first_free(), Some(2));

        assert_eq!(tail.alloc_block().unwrap(), 2);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail.first_free(), None);
    }

    #[test]
    fn test_free_list_sorted_regardless_of_free_order() {
        let mut tail = tail_with_blocks(6);

        tail.free_block(5);
        tail.free_block(2);
        tail.free_block(6);
        tail.free_block(4);

        assert_eq!(tail.free_list().collect::<Vec<_>>(), vec![2, 4, 5, 6]);

        assert_eq!(tail.alloc_block().unwrap(), 2);
        assert_eq!(tail.alloc_block().unwrap(), 4);
        assert_eq!(tail.free_list().collect::<Vec<_>>(), vec![5, 6]);
    }

    #[test]
    fn test_free_first_block() {
        // Position 0 must be reusable like any other block.
        let mut tail = tail_with_blocks(2);

        tail.free_block(1);

        assert_eq!(tail.first_free(), Some(1));
        assert_eq!(tail.alloc_block().unwrap(), 1);
        assert_eq!(tail.len(), 2);
    }

    #[test]
    fn test_free_out_of_range_is_noop() {
        let mut tail = tail_with_blocks(2);
        let before = tail.clone();

        tail.free_block(0);
        tail.free_block(-7);
        tail.free_block(3);
        tail.free_block(TrieIndex::MAX);

        assert_eq!(tail, before);
    }

    #[test]
    fn test_double_free_is_noop() {
        let mut tail = tail_with_blocks(3);

        tail.free_block(2);
        let before = tail.clone();
        tail.free_block(2);

        assert_eq!(tail, before);
        assert_eq!(tail.free_list().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_freed_block_is_reset_on_reuse() {
        let mut tail = Tail::new();
        let idx = tail.add_suffix(b"ammonia").unwrap();
        tail.set_data(idx, 77);

        tail.free_block(idx);
        let again = tail.alloc_block().unwrap();

        assert_eq!(again, idx);
        assert_eq!(tail.suffix(again), None);
        assert_eq!(tail.data(again), None);
        assert!(tail.is_allocated(again));
    }

    #[test]
    fn test_relink_free_list() {
        let mut tail = tail_with_blocks(5);
        tail.free_block(4);
        tail.free_block(1);
        tail.free_block(3);
        let expected = tail.clone();

        // Scramble links, then rebuild.
        tail.first_free = Some(3);
        for block in &mut tail.blocks {
            if let TailBlock::Free { next } = block {
                *next = None;
            }
        }
        tail.relink_free_list();

        assert_eq!(tail, expected);
    }
}
