//! Filepath: src/walk.rs
//!
//! Resumable matching of input against a stored suffix.
//!
//! The caller owns the cursor (`suffix_idx`), a position inside one suffix.
//! A lookup can match a few units, hand control back to the double array,
//! and later resume from the same cursor.
//!
//! The end of a stored suffix reads as [`TRIE_CHAR_TERM`]. Matching the
//! terminator counts as a successful step but never moves the cursor past
//! it, so repeated walks at the end keep succeeding on a terminator input.

use crate::tail::Tail;
use crate::types::{TRIE_CHAR_TERM, TrieChar, TrieIndex};

/// Unit at `pos`, with everything at or past the end reading as terminator.
#[inline(always)]
fn unit_at(suffix: &[TrieChar], pos: usize) -> TrieChar {
    suffix.get(pos).copied().unwrap_or(TRIE_CHAR_TERM)
}

impl Tail {
    /// Walk the suffix at `index` with the units of `input`.
    ///
    /// Starts at `*suffix_idx` and advances while units match, stopping at
    /// the first mismatch, after matching the terminator, or when `input` is
    /// consumed. On return `*suffix_idx` is the first unconsumed position.
    ///
    /// Returns the number of input units matched, or `None` if the block has
    /// no suffix to walk (distinct from `Some(0)`, a mismatch).
    pub fn walk_str(
        &self,
        index: TrieIndex,
        suffix_idx: &mut usize,
        input: &[TrieChar],
    ) -> Option<usize> {
        let suffix: &[TrieChar] = self.suffix(index)?;

        let mut matched: usize = 0;
        let mut pos: usize = *suffix_idx;
        for &c in input {
            let unit: TrieChar = unit_at(suffix, pos);
            if c != unit {
                break;
            }
            matched += 1;
            // stop and stay at terminator
            if unit == TRIE_CHAR_TERM {
                break;
            }
            pos += 1;
        }

        *suffix_idx = pos;
        Some(matched)
    }

    /// Walk the suffix at `index` with one unit.
    ///
    /// On a match the cursor advances, unless the matched unit is the
    /// terminator. On a mismatch the cursor is left unchanged.
    ///
    /// Returns `None` if the block has no suffix, otherwise whether `c`
    /// matched.
    pub fn walk_char(&self, index: TrieIndex, suffix_idx: &mut usize, c: TrieChar) -> Option<bool> {
        let suffix: &[TrieChar] = self.suffix(index)?;

        let unit: TrieChar = unit_at(suffix, *suffix_idx);
        if unit != c {
            return Some(false);
        }
        if unit != TRIE_CHAR_TERM {
            *suffix_idx += 1;
        }
        Some(true)
    }

    /// Start a walk over the suffix at `index` from position 0.
    ///
    /// Returns `None` if the block has no suffix.
    #[must_use]
    pub fn walker(&self, index: TrieIndex) -> Option<TailWalker<'_>> {
        self.suffix(index).map(|_| TailWalker {
            tail: self,
            index,
            suffix_idx: 0,
        })
    }
}

// ============================================================================
//  TailWalker
// ============================================================================

/// A cursor bound to one suffix of a [`Tail`].
///
/// Holds the tail by shared reference, so the store cannot be mutated while
/// a walker is alive. Use [`position`](Self::position) to save the cursor
/// and [`Tail::walk_str`] to resume after a mutation.
#[derive(Clone, Copy, Debug)]
pub struct TailWalker<'a> {
    tail: &'a Tail,
    index: TrieIndex,
    suffix_idx: usize,
}

impl<'a> TailWalker<'a> {
    /// Resume a walk at a saved position.
    #[must_use]
    pub fn resume(tail: &'a Tail, index: TrieIndex, suffix_idx: usize) -> Option<Self> {
        tail.suffix(index).map(|_| Self {
            tail,
            index,
            suffix_idx,
        })
    }

    /// Block this walker reads.
    #[must_use]
    #[inline(always)]
    pub const fn index(&self) -> TrieIndex {
        self.index
    }

    /// Current position within the suffix.
    #[must_use]
    #[inline(always)]
    pub const fn position(&self) -> usize {
        self.suffix_idx
    }

    /// Match as much of `input` as possible, returning the matched count.
    pub fn walk_str(&mut self, input: &[TrieChar]) -> usize {
        self.tail
            .walk_str(self.index, &mut self.suffix_idx, input)
            .unwrap_or(0)
    }

    /// Match one unit.
    pub fn walk_char(&mut self, c: TrieChar) -> bool {
        self.tail
            .walk_char(self.index, &mut self.suffix_idx, c)
            .unwrap_or(false)
    }

    /// Units left before the terminator.
    #[must_use]
    pub fn remaining(&self) -> &'a [TrieChar] {
        self.tail
            .suffix(self.index)
            .and_then(|s| s.get(self.suffix_idx..))
            .unwrap_or_default()
    }

    /// Check if the cursor sits on the terminator.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.remaining().is_empty()
    }
}

// ============================================================================
//  Tests
// ============================================================================
