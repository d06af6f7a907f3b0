//! # `tailstore`
//!
//! Suffix-tail storage for a double-array trie.
//!
//! Once a key's path through the double array diverges from every other key,
//! the rest of the key (its *tail*) is moved out of the array and into a
//! [`Tail`]. This crate provides that store:
//!
//! - **Blocks**: an arena of [`TailBlock`]s, each holding an owned suffix and
//!   the value associated with the key.
//! - **Allocator**: a free list kept in ascending order, so the lowest free
//!   block is always reused first.
//! - **Walks**: cursor-based, resumable matching of input against a stored
//!   suffix ([`Tail::walk_str`], [`Tail::walk_char`], [`TailWalker`]).
//! - **Persistence**: a bit-exact big-endian layout ([`Tail::write_to`],
//!   [`Tail::read_from`]).
//!
//! The double array itself and the alphabet mapping live in the trie layer
//! on top of this crate.
//!
//! ## Example
//!
//! ```rust
//! use tailstore::{Tail, TRIE_CHAR_TERM};
//!
//! let mut tail = Tail::new();
//! let idx = tail.add_suffix(b"ouse").unwrap();
//! tail.set_data(idx, 7);
//!
//! // Resumable walk: the caller keeps the cursor between calls.
//! let mut cursor = 0;
//! assert_eq!(tail.walk_str(idx, &mut cursor, b"ou"), Some(2));
//! assert_eq!(tail.walk_str(idx, &mut cursor, b"se"), Some(2));
//! assert_eq!(tail.walk_char(idx, &mut cursor, TRIE_CHAR_TERM), Some(true));
//! assert_eq!(cursor, 4);
//!
//! // Round trip through the binary layout.
//! let bytes = tail.to_bytes().unwrap();
//! assert_eq!(Tail::from_bytes(&bytes).unwrap(), tail);
//! ```
//!
//! ## Thread Safety
//!
//! None. A [`Tail`] is a plain single-owner value; callers that share one
//! across threads serialize access themselves.
//!
//! ## Indices
//!
//! Indices returned by [`Tail::alloc_block`] and [`Tail::add_suffix`] are
//! offset by [`TAIL_START_BLOCKNO`] from the arena position, so `0` never
//! names a block. They stay valid across growth. Suffix views borrow the
//! store and end at the next mutation.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::inline_always)]

mod tracing_helpers;

pub mod alloc;
pub mod block;
pub mod error;
pub mod serialize;
pub mod tail;
pub mod types;
pub mod walk;

pub use alloc::FreeList;
pub use block::TailBlock;
pub use error::TailError;
pub use tail::Tail;
pub use types::{
    TAIL_SIGNATURE, TAIL_START_BLOCKNO, TRIE_CHAR_TERM, TRIE_DATA_ERROR, TrieChar, TrieData,
    TrieIndex,
};
pub use walk::TailWalker;
