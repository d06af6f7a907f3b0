//! Filepath: src/error.rs
//!
//! Errors for the allocation and serialization paths.
//!
//! Lookups, accessors and walks never return these: "no such entry" is an
//! ordinary outcome for the trie layer and is reported as `None`/`false`.

use thiserror::Error;

use crate::types::TrieIndex;

/// Failure while allocating a block or moving a tail in or out of bytes.
#[derive(Error, Debug)]
pub enum TailError {
    /// The block arena could not grow.
    ///
    /// Either the allocator refused the reservation or the arena already
    /// holds as many blocks as a [`TrieIndex`] can address. The store is
    /// left unchanged.
    #[error("tail block arena exhausted at {blocks} blocks")]
    Exhausted {
        /// Number of blocks at the time of the failure.
        blocks: usize,
    },

    /// The input does not start with the tail signature.
    #[error("bad tail signature: expected {expected:#010x}, found {found:#010x}")]
    BadSignature {
        /// Signature the reader expects.
        expected: u32,
        /// Signature found in the input.
        found: u32,
    },

    /// The input ended in the middle of the header or a block.
    #[error("truncated tail data while reading {context}")]
    Truncated {
        /// What was being read when the input ran out.
        context: &'static str,
    },

    /// A header or block field holds a value outside its valid range.
    #[error("malformed tail data: {reason}")]
    Malformed {
        /// Description of the offending field.
        reason: String,
    },

    /// A suffix is too long for the 16-bit length field.
    #[error("suffix of block {index} is {len} bytes, longer than {max}")]
    SuffixTooLong {
        /// External index of the block.
        index: TrieIndex,
        /// Length of the stored suffix.
        len: usize,
        /// Largest length the layout can express.
        max: usize,
    },

    /// Underlying reader or writer failed.
    #[error("tail I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
