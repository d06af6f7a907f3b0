//! Filepath: src/serialize.rs
//!
//! Binary layout of a [`Tail`].
//!
//! All integers are big-endian.
//!
//! ```text
//! Header:
//!   u32  signature (0xDFFCDFFC)
//!   i32  arena position of the first free block (0 if none)
//!   i32  number of blocks
//!
//! Blocks, in arena order:
//!   i32  arena position of the next free block (-1 if allocated, 0 ends the list)
//!   i32  data
//!   u16  suffix length L
//!   [u8; L] suffix bytes, no terminator
//! ```
//!
//! Free-list links hold raw arena positions, so `0` doubles as "none". The
//! list is sorted, which means only the head can legitimately point at
//! position 0; the reader therefore rebuilds the list from the per-block
//! free markers instead of trusting the links.

use std::io::{ErrorKind, Read, Write};

use crate::block::TailBlock;
use crate::error::TailError;
use crate::tail::Tail;
use crate::tracing_helpers::{debug_log, warn_log};
use crate::types::{TAIL_SIGNATURE, TRIE_DATA_ERROR, TrieChar, TrieData, TrieIndex, to_external};

/// Header size in bytes.
const HEADER_SIZE: usize = 4 + 4 + 4;

/// Fixed part of a block in bytes.
const BLOCK_HEADER_SIZE: usize = 4 + 4 + 2;

/// On-disk link value of an allocated block.
const ALLOCATED_LINK: i32 = -1;

/// Upper bound on blocks reserved up front from an untrusted count.
const PREALLOC_LIMIT: usize = 4096;

// ============================================================================
//  Writing
// ============================================================================

impl Tail {
    /// Exact number of bytes [`to_bytes`](Self::to_bytes) produces.
    #[must_use]
    pub fn serialized_size(&self) -> usize {
        HEADER_SIZE
            + self
                .blocks
                .iter()
                .map(|b| BLOCK_HEADER_SIZE + b.suffix().map_or(0, <[TrieChar]>::len))
                .sum::<usize>()
    }

    /// Append the binary form of this tail to `buf`.
    ///
    /// # Errors
    ///
    /// [`TailError::SuffixTooLong`] if a suffix does not fit the 16-bit
    /// length field. Nothing is appended in that case.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) -> Result<(), TailError> {
        self.check_suffix_lengths()?;

        let start: usize = buf.len();
        buf.reserve(self.serialized_size());

        buf.extend_from_slice(&TAIL_SIGNATURE.to_be_bytes());
        buf.extend_from_slice(&encode_link(self.first_free)?.to_be_bytes());
        buf.extend_from_slice(&encode_pos(self.blocks.len())?.to_be_bytes());

        for block in &self.blocks {
            let (link, data, suffix): (i32, TrieData, &[TrieChar]) = match block {
                TailBlock::Allocated { data, suffix } => {
                    (ALLOCATED_LINK, *data, suffix.as_deref().unwrap_or_default())
                }
                TailBlock::Free { next } => (encode_link(*next)?, TRIE_DATA_ERROR, &[][..]),
            };
            let len: u16 = u16::try_from(suffix.len()).map_err(|_| TailError::Malformed {
                reason: format!("suffix length {} checked but did not fit", suffix.len()),
            })?;

            buf.extend_from_slice(&link.to_be_bytes());
            buf.extend_from_slice(&data.to_be_bytes());
            buf.extend_from_slice(&len.to_be_bytes());
            buf.extend_from_slice(suffix);
        }

        debug_assert_eq!(buf.len() - start, self.serialized_size());
        Ok(())
    }

    /// The binary form of this tail.
    ///
    /// # Errors
    ///
    /// See [`serialize_into`](Self::serialize_into).
    pub fn to_bytes(&self) -> Result<Vec<u8>, TailError> {
        let mut buf: Vec<u8> = Vec::with_capacity(self.serialized_size());
        self.serialize_into(&mut buf)?;
        Ok(buf)
    }

    /// Write the binary form of this tail to `writer`.
    ///
    /// The whole tail is validated before the first byte is written.
    ///
    /// # Errors
    ///
    /// [`TailError::SuffixTooLong`] for an oversized suffix, or
    /// [`TailError::Io`] if the writer fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), TailError> {
        let buf: Vec<u8> = self.to_bytes()?;
        writer.write_all(&buf)?;

        debug_log!(
            blocks = self.blocks.len(),
            bytes = buf.len(),
            "tail: written"
        );
        Ok(())
    }

    fn check_suffix_lengths(&self) -> Result<(), TailError> {
        let max: usize = usize::from(u16::MAX);
        for (index, _, suffix) in self.entries() {
            let len: usize = suffix.map_or(0, <[TrieChar]>::len);
            if len > max {
                return Err(TailError::SuffixTooLong { index, len, max });
            }
        }
        Ok(())
    }
}

fn encode_pos(pos: usize) -> Result<i32, TailError> {
    i32::try_from(pos).map_err(|_| TailError::Malformed {
        reason: format!("arena position {pos} does not fit in 32 bits"),
    })
}

fn encode_link(link: Option<usize>) -> Result<i32, TailError> {
    link.map_or(Ok(0), encode_pos)
}

// ============================================================================
//  Reading
// ============================================================================

impl Tail {
    /// Read a tail from `reader`.
    ///
    /// Reads exactly the bytes of one tail and leaves the rest of the stream
    /// untouched. A tail is only returned once every block has been read
    /// and validated.
    ///
    /// Allocated blocks always come back with a suffix, empty when its
    /// length is zero.
    ///
    /// # Errors
    ///
    /// - [`TailError::BadSignature`] if the header signature does not match
    /// - [`TailError::Truncated`] if the input ends early
    /// - [`TailError::Malformed`] for out-of-range counts or links
    /// - [`TailError::Io`] for any other reader failure
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, TailError> {
        let signature: u32 = u32::from_be_bytes(read_array(reader, "header signature")?);
        if signature != TAIL_SIGNATURE {
            warn_log!(signature, "tail: bad signature");
            return Err(TailError::BadSignature {
                expected: TAIL_SIGNATURE,
                found: signature,
            });
        }

        let first_free: i32 = i32::from_be_bytes(read_array(reader, "header first-free")?);
        let num_blocks: i32 = i32::from_be_bytes(read_array(reader, "header block count")?);

        let count: usize = usize::try_from(num_blocks).map_err(|_| TailError::Malformed {
            reason: format!("negative block count {num_blocks}"),
        })?;
        let head: usize = usize::try_from(first_free)
            .ok()
            .filter(|&h| h == 0 || h < count)
            .ok_or_else(|| TailError::Malformed {
                reason: format!("first free block {first_free} out of range 0..{count}"),
            })?;

        let mut tail = Self::with_capacity(count.min(PREALLOC_LIMIT));
        for pos in 0..count {
            tail.blocks.push(read_block(reader, pos, count)?);
        }
        tail.relink_free_list();

        if head != 0 && tail.first_free != Some(head) {
            warn_log!(head, "tail: stored free-list head disagrees with block markers");
            if tail.blocks.get(head).is_none_or(TailBlock::is_allocated) {
                return Err(TailError::Malformed {
                    reason: format!("first free block {head} is allocated"),
                });
            }
        }

        debug_log!(
            blocks = count,
            free = tail.free_count(),
            "tail: loaded"
        );
        Ok(tail)
    }

    /// Read a tail from `bytes`, which must hold exactly one tail.
    ///
    /// # Errors
    ///
    /// Everything [`read_from`](Self::read_from) reports, plus
    /// [`TailError::Malformed`] if bytes remain after the tail.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self, TailError> {
        let tail: Self = Self::read_from(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(TailError::Malformed {
                reason: format!("{} trailing bytes after tail", bytes.len()),
            });
        }
        Ok(tail)
    }
}

fn read_block<R: Read>(reader: &mut R, pos: usize, count: usize) -> Result<TailBlock, TailError> {
    let link: i32 = i32::from_be_bytes(read_array(reader, "block link")?);
    let data: TrieData = i32::from_be_bytes(read_array(reader, "block data")?);
    let len: u16 = u16::from_be_bytes(read_array(reader, "block suffix length")?);

    let mut suffix: Vec<TrieChar> = vec![0; usize::from(len)];
    read_exact(reader, &mut suffix, "block suffix")?;

    if link == ALLOCATED_LINK {
        return Ok(TailBlock::Allocated {
            data,
            suffix: Some(suffix.into_boxed_slice()),
        });
    }

    // Free: the link only has to be in range; `relink_free_list` rebuilds it.
    match usize::try_from(link) {
        Ok(next) if next < count => Ok(TailBlock::Free {
            next: (next != 0).then_some(next),
        }),
        _ => {
            let index: TrieIndex = to_external(pos).unwrap_or(TrieIndex::MAX);
            Err(TailError::Malformed {
                reason: format!("block {index} has next-free link {link} out of range"),
            })
        }
    }
}

fn read_array<const N: usize, R: Read>(
    reader: &mut R,
    context: &'static str,
) -> Result<[u8; N], TailError> {
    let mut buf = [0u8; N];
    read_exact(reader, &mut buf, context)?;
    Ok(buf)
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], context: &'static str) -> Result<(), TailError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => TailError::Truncated { context },
        _ => TailError::Io(e),
    })
}

// ============================================================================
//  Tests
// ============================================================================
