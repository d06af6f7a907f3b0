//! Filepath: src/types.rs
//!
//! Scalar types and constants shared by the tail store.
//!
//! Indices handed to callers are *external*: they are offset from the raw
//! arena position by [`TAIL_START_BLOCKNO`] so that `0` never names a real
//! block and can be used by the trie layer as "no entry".

/// Index of a tail block as seen by callers.
pub type TrieIndex = i32;

/// Value associated with a stored key.
pub type TrieData = i32;

/// One unit of a suffix, in trie-symbol space.
pub type TrieChar = u8;

/// Sentinel for "no data" / "error" in the persisted layout.
pub const TRIE_DATA_ERROR: TrieData = -1;

/// Terminator unit. Walks treat it (and the end of a suffix) as sticky.
pub const TRIE_CHAR_TERM: TrieChar = 0;

/// Offset between external indices and arena positions.
pub const TAIL_START_BLOCKNO: TrieIndex = 1;

/// Signature at the start of a serialized tail.
pub const TAIL_SIGNATURE: u32 = 0xDFFC_DFFC;

/// Translate an external index into an arena position.
///
/// Returns `None` for indices below [`TAIL_START_BLOCKNO`]. The caller still
/// has to check the upper bound against the arena length.
#[must_use]
#[inline(always)]
pub fn to_internal(index: TrieIndex) -> Option<usize> {
    index
        .checked_sub(TAIL_START_BLOCKNO)
        .and_then(|i| usize::try_from(i).ok())
}

/// Translate an arena position into an external index.
///
/// Returns `None` if the position does not fit in a [`TrieIndex`].
#[must_use]
#[inline(always)]
pub fn to_external(pos: usize) -> Option<TrieIndex> {
    TrieIndex::try_from(pos)
        .ok()
        .and_then(|i| i.checked_add(TAIL_START_BLOCKNO))
}

/// Length of `suffix` up to, not including, the first [`TRIE_CHAR_TERM`].
#[must_use]
#[inline]
pub fn terminated_len(suffix: &[TrieChar]) -> usize {
    suffix
        .iter()
        .position(|&c| c == TRIE_CHAR_TERM)
        .unwrap_or(suffix.len())
}
