//! Bump arena backing every string derived while parsing a feed.
//!
//! The arena is a list of fixed-capacity blocks. Allocations are addressed by
//! index (block, offset, length) rather than by pointer, and are never freed
//! individually: `free_all` drops every block at once. Handles taken before a
//! `free_all` go stale and resolve to `None` afterwards.

use std::fmt::{self, Write};

use thiserror::Error;

/// Capacity of a single block, and the ceiling for one allocation.
pub const BLOCK_SIZE: usize = 8 * 1024;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("allocation of {requested} bytes exceeds the {capacity} byte arena block")]
    TooLarge { requested: usize, capacity: usize },
}

struct Block {
    data: Box<[u8]>,
    used: usize,
}

impl Block {
    fn new() -> Self {
        Block {
            data: vec![0u8; BLOCK_SIZE].into_boxed_slice(),
            used: 0,
        }
    }

    fn can_alloc(&self, bytes: usize) -> bool {
        self.used + bytes <= self.data.len()
    }
}

/// A region returned by [`Arena::alloc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    generation: u32,
    block: usize,
    offset: usize,
    len: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A UTF-8 string copied into the arena.
///
/// The underlying allocation is one byte longer than the text and ends with a
/// zero byte; `len` excludes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStr(Span);

impl ArenaStr {
    pub fn len(&self) -> usize {
        self.0.len
    }

    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }
}

#[derive(Default)]
pub struct Arena {
    blocks: Vec<Block>,
    generation: u32,
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("blocks", &self.blocks.len())
            .field("bytes_used", &self.bytes_used())
            .field("generation", &self.generation)
            .finish()
    }
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks currently owned.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Bytes handed out so far, across all blocks.
    pub fn bytes_used(&self) -> usize {
        self.blocks.iter().map(|b| b.used).sum()
    }

    /// Reserve `bytes` zeroed bytes.
    ///
    /// Starts a new block when the current one cannot hold the request; an
    /// allocation never spans two blocks.
    pub fn alloc(&mut self, bytes: usize) -> Result<Span, ArenaError> {
        if bytes > BLOCK_SIZE {
            return Err(ArenaError::TooLarge {
                requested: bytes,
                capacity: BLOCK_SIZE,
            });
        }

        if !self.blocks.last().is_some_and(|b| b.can_alloc(bytes)) {
            self.blocks.push(Block::new());
        }

        let block = self.blocks.len() - 1;
        let current = &mut self.blocks[block];
        let offset = current.used;
        current.used += bytes;

        Ok(Span {
            generation: self.generation,
            block,
            offset,
            len: bytes,
        })
    }

    pub fn get(&self, span: Span) -> Option<&[u8]> {
        if span.generation != self.generation {
            return None;
        }
        let block = self.blocks.get(span.block)?;
        block.data.get(span.offset..span.offset + span.len)
    }

    pub fn get_mut(&mut self, span: Span) -> Option<&mut [u8]> {
        if span.generation != self.generation {
            return None;
        }
        let block = self.blocks.get_mut(span.block)?;
        block.data.get_mut(span.offset..span.offset + span.len)
    }

    /// Copy `s` into the arena (`s.len() + 1` bytes, zero terminated).
    pub fn copy_str(&mut self, s: &str) -> Result<ArenaStr, ArenaError> {
        let span = self.alloc(s.len() + 1)?;
        self.fresh_mut(span)[..s.len()].copy_from_slice(s.as_bytes());

        Ok(ArenaStr(Span { len: s.len(), ..span }))
    }

    /// Format `args` into the arena.
    ///
    /// A first pass measures the output so that exactly `len + 1` bytes are
    /// reserved, a second pass writes it.
    pub fn copy_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<ArenaStr, ArenaError> {
        let mut probe = LenProbe(0);
        // Counting never fails.
        let _ = probe.write_fmt(args);
        let len = probe.0;

        let span = self.alloc(len + 1)?;
        let mut writer = SliceWriter {
            buf: &mut self.fresh_mut(span)[..len],
            pos: 0,
        };
        let _ = writer.write_fmt(args);

        Ok(ArenaStr(Span { len, ..span }))
    }

    // Only for spans just returned by `alloc`.
    fn fresh_mut(&mut self, span: Span) -> &mut [u8] {
        &mut self.blocks[span.block].data[span.offset..span.offset + span.len]
    }

    /// Look up a string; `None` once the arena has been freed since the copy.
    pub fn resolve(&self, s: ArenaStr) -> Option<&str> {
        self.get(s.0).and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// Release every block. All previously returned spans become stale.
    pub fn free_all(&mut self) {
        self.blocks.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

struct LenProbe(usize);

impl Write for LenProbe {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.pos + s.len();
        let dest = self.buf.get_mut(self.pos..end).ok_or(fmt::Error)?;
        dest.copy_from_slice(s.as_bytes());
        self.pos = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_is_zeroed() {
        let mut arena = Arena::new();
        let span = arena.alloc(32).unwrap();
        assert_eq!(arena.get(span).unwrap(), &[0u8; 32][..]);
    }

    #[test]
    fn test_alloc_over_block_size_fails() {
        let mut arena = Arena::new();
        let err = arena.alloc(BLOCK_SIZE + 1).unwrap_err();
        assert_eq!(
            err,
            ArenaError::TooLarge {
                requested: BLOCK_SIZE + 1,
                capacity: BLOCK_SIZE
            }
        );
        assert_eq!(arena.block_count(), 0);
    }

    #[test]
    fn test_full_block_starts_new_block() {
        let mut arena = Arena::new();
        arena.alloc(BLOCK_SIZE - 10).unwrap();
        assert_eq!(arena.block_count(), 1);

        let span = arena.alloc(20).unwrap();
        assert_eq!(arena.block_count(), 2);
        assert_eq!(arena.get(span).unwrap().len(), 20);
    }

    #[test]
    fn test_copy_str_reserves_terminator() {
        let mut arena = Arena::new();
        let s = arena.copy_str("Standup").unwrap();
        assert_eq!(arena.resolve(s), Some("Standup"));
        assert_eq!(s.len(), 7);
        assert_eq!(arena.bytes_used(), 8);
    }

    #[test]
    fn test_copy_fmt() {
        let mut arena = Arena::new();
        let s = arena.copy_fmt(format_args!("{}, {}", "37.38", "-122.08")).unwrap();
        assert_eq!(arena.resolve(s), Some("37.38, -122.08"));
        assert_eq!(arena.bytes_used(), "37.38, -122.08".len() + 1);
    }

    #[test]
    fn test_free_all_invalidates_handles() {
        let mut arena = Arena::new();
        let s = arena.copy_str("gone").unwrap();
        arena.free_all();

        assert_eq!(arena.block_count(), 0);
        assert_eq!(arena.resolve(s), None);

        // A fresh allocation at the same position does not revive the old handle
        let t = arena.copy_str("new!").unwrap();
        assert_eq!(arena.resolve(s), None);
        assert_eq!(arena.resolve(t), Some("new!"));
    }
}
