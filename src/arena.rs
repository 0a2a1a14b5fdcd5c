use crate::error::{CompileError, CompileResult};
use std::fmt;

pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;
pub const ALIGNMENT: usize = 8;

pub type BlockId = usize;

/// A location handed out by [`Arena::alloc`]. Handles stay valid for as long
/// as the arena lives, unless a [`SavePoint`] taken before them is restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaPtr {
    block: BlockId,
    offset: usize,
    len: usize,
}

impl ArenaPtr {
    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A string copied into the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaStr(ArenaPtr);

impl ArenaStr {
    pub fn ptr(&self) -> ArenaPtr {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len
    }

    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }
}

struct Block {
    // over-allocated by ALIGNMENT - 1 bytes, usable bytes begin at `start`
    memory: Box<[u8]>,
    start: usize,
    capacity: usize,
    used: usize,
}

impl Block {
    fn new(size: usize) -> CompileResult<Self> {
        let out_of_memory = || CompileError::memory(format!("failed to allocate a {} byte arena block", size));
        let mut memory: Vec<u8> = Vec::new();

        memory
            .try_reserve_exact(size + ALIGNMENT - 1)
            .map_err(|_| out_of_memory())?;
        memory.resize(size + ALIGNMENT - 1, 0);

        let memory = memory.into_boxed_slice();
        let start = memory.as_ptr().align_offset(ALIGNMENT);

        if start >= ALIGNMENT {
            return Err(out_of_memory());
        }

        Ok(Self {
            memory,
            start,
            capacity: size,
            used: 0,
        })
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    fn bytes(&self) -> &[u8] {
        &self.memory[self.start..self.start + self.capacity]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.memory[self.start..self.start + self.capacity]
    }

    fn addr(&self) -> usize {
        self.bytes().as_ptr() as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub total_allocated: usize,
    pub total_used: usize,
    pub blocks: usize,
}

impl fmt::Display for ArenaStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let waste = self.total_allocated - self.total_used;
        let percent = if self.total_allocated == 0 {
            0.0
        } else {
            100.0 * waste as f64 / self.total_allocated as f64
        };

        writeln!(f, "Arena Statistics:")?;
        writeln!(f, "  Total allocated: {} bytes", self.total_allocated)?;
        writeln!(f, "  Total used:      {} bytes", self.total_used)?;
        writeln!(f, "  Waste:           {} bytes ({:.1}%)", waste, percent)?;
        write!(f, "  Blocks:          {}", self.blocks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavePoint {
    blocks: usize,
    used: usize,
}

/// Bump allocator over a list of blocks.
///
/// The most recently created block is the head of the list and serves every
/// allocation until it runs out of room. Nothing is freed individually, the
/// whole arena goes away at once when it is dropped or destroyed.
pub struct Arena {
    // the last block is the head
    blocks: Vec<Block>,
    default_block_size: usize,
    total_allocated: usize,
    total_used: usize,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

fn align_up(size: usize) -> usize {
    (size + ALIGNMENT - 1) & !(ALIGNMENT - 1)
}

impl Arena {
    /// A `default_block_size` of 0 selects [`DEFAULT_BLOCK_SIZE`].
    pub fn new(default_block_size: usize) -> Self {
        let default_block_size = if default_block_size == 0 {
            DEFAULT_BLOCK_SIZE
        } else {
            align_up(default_block_size)
        };

        Self {
            blocks: vec![],
            default_block_size,
            total_allocated: 0,
            total_used: 0,
        }
    }

    pub fn alloc(&mut self, size: usize) -> CompileResult<ArenaPtr> {
        let aligned_size = align_up(size);

        let needs_block = match self.blocks.last() {
            Some(head) => head.remaining() < aligned_size,
            None => true,
        };

        if needs_block {
            self.push_block(aligned_size.max(self.default_block_size))?;
        }

        let block = self.blocks.len() - 1;
        let head = &mut self.blocks[block];
        let offset = head.used;

        head.used += aligned_size;
        self.total_used += aligned_size;

        Ok(ArenaPtr {
            block,
            offset,
            len: size,
        })
    }

    pub fn strdup(&mut self, str: &str) -> CompileResult<ArenaStr> {
        let ptr = self.alloc(str.len())?;

        self.bytes_mut(ptr).copy_from_slice(str.as_bytes());

        Ok(ArenaStr(ptr))
    }

    /// Formats straight into the arena, measuring the output first so only
    /// one allocation is made.
    pub fn sprintf(&mut self, args: fmt::Arguments) -> CompileResult<ArenaStr> {
        let mut counter = LenCounter(0);

        fmt::write(&mut counter, args)
            .map_err(|_| CompileError::invalid_operation("formatting into the arena failed"))?;

        let ptr = self.alloc(counter.0)?;
        let mut writer = SliceWriter {
            buf: self.bytes_mut(ptr),
            pos: 0,
        };

        fmt::write(&mut writer, args)
            .map_err(|_| CompileError::invalid_operation("formatting into the arena failed"))?;

        Ok(ArenaStr(ptr))
    }

    pub fn get_str(&self, str: ArenaStr) -> &str {
        self.bytes(str.0)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or("")
    }

    pub fn bytes(&self, ptr: ArenaPtr) -> Option<&[u8]> {
        self.blocks
            .get(ptr.block)
            .and_then(|block| block.bytes().get(ptr.offset..ptr.offset + ptr.len))
    }

    /// Address of an allocation, only meaningful for comparisons.
    pub fn addr(&self, ptr: ArenaPtr) -> Option<usize> {
        self.blocks
            .get(ptr.block)
            .map(|block| block.addr() + ptr.offset)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_capacity(&self, block: BlockId) -> Option<usize> {
        self.blocks.get(block).map(|block| block.capacity())
    }

    pub fn head(&self) -> Option<BlockId> {
        self.blocks.len().checked_sub(1)
    }

    pub fn default_block_size(&self) -> usize {
        self.default_block_size
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            total_allocated: self.total_allocated,
            total_used: self.total_used,
            blocks: self.blocks.len(),
        }
    }

    pub fn save(&self) -> SavePoint {
        SavePoint {
            blocks: self.blocks.len(),
            used: self.blocks.last().map(|block| block.used).unwrap_or(0),
        }
    }

    /// Frees everything allocated after `save_point` was taken.
    pub fn restore(&mut self, save_point: SavePoint) {
        while self.blocks.len() > save_point.blocks {
            if let Some(block) = self.blocks.pop() {
                self.total_allocated -= block.capacity();
                self.total_used -= block.used;
            }
        }

        if let Some(head) = self.blocks.last_mut() {
            if head.used >= save_point.used {
                self.total_used -= head.used - save_point.used;
                head.used = save_point.used;
            }
        }
    }

    /// Keeps every block but marks all of them empty.
    pub fn reset(&mut self) {
        for block in self.blocks.iter_mut() {
            block.used = 0;
        }

        self.total_used = 0;
    }

    pub fn destroy(self) {
        drop(self)
    }

    fn push_block(&mut self, size: usize) -> CompileResult<()> {
        self.blocks
            .try_reserve(1)
            .map_err(|_| CompileError::memory("failed to grow the arena block list"))?;

        let block = Block::new(size)?;

        self.total_allocated += block.capacity();
        self.blocks.push(block);

        Ok(())
    }

    fn bytes_mut(&mut self, ptr: ArenaPtr) -> &mut [u8] {
        &mut self.blocks[ptr.block].bytes_mut()[ptr.offset..ptr.offset + ptr.len]
    }
}

struct LenCounter(usize);

impl fmt::Write for LenCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

struct SliceWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> fmt::Write for SliceWriter<'a> {
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
    fn no_blocks_until_first_alloc() {
        let arena = Arena::new(1024);

        assert_eq!(arena.block_count(), 0);
        assert_eq!(arena.head(), None);
    }

    #[test]
    fn allocations_are_aligned_and_inside_the_head_block() {
        let mut arena = Arena::new(128);
        let sizes = [1, 7, 8, 9, 13, 64, 3, 100, 200, 0, 5, 128, 17];
        let mut seen: Vec<(usize, usize)> = vec![];

        for size in sizes {
            let ptr = arena.alloc(size).unwrap();
            let addr = arena.addr(ptr).unwrap();
            let capacity = arena.block_capacity(ptr.block()).unwrap();

            assert_eq!(addr % ALIGNMENT, 0);
            assert_eq!(Some(ptr.block()), arena.head());
            assert!(ptr.offset() + align_up(size) <= capacity);

            for (start, len) in seen.iter() {
                let overlaps = addr < start + len && *start < addr + size;
                assert!(!overlaps || size == 0);
            }

            seen.push((addr, size));
        }
    }

    #[test]
    fn oversized_request_gets_its_own_block() {
        let mut arena = Arena::new(64);

        arena.alloc(16).unwrap();
        let big = arena.alloc(1000).unwrap();

        assert_eq!(arena.block_count(), 2);
        assert_eq!(big.block(), 1);
        assert_eq!(arena.block_capacity(1), Some(1000usize.next_multiple_of(8)));
    }

    #[test]
    fn new_block_becomes_the_head() {
        let mut arena = Arena::new(32);

        let first = arena.alloc(24).unwrap();
        let second = arena.alloc(16).unwrap();
        let third = arena.alloc(8).unwrap();

        assert_eq!(first.block(), 0);
        assert_eq!(second.block(), 1);
        assert_eq!(third.block(), 1);
        assert_eq!(arena.head(), Some(1));
    }

    #[test]
    fn strdup_copies_the_text() {
        let mut arena = Arena::new(0);
        let source = String::from("procedure");
        let copy = arena.strdup(&source).unwrap();

        drop(source);

        assert_eq!(arena.get_str(copy), "procedure");
        assert_eq!(copy.len(), 9);
    }

    #[test]
    fn strdup_empty_string() {
        let mut arena = Arena::new(0);
        let copy = arena.strdup("").unwrap();

        assert!(copy.is_empty());
        assert_eq!(arena.get_str(copy), "");
    }

    #[test]
    fn sprintf_formats_into_the_arena() {
        let mut arena = Arena::new(0);
        let temp = arena.sprintf(format_args!("t{}", 42)).unwrap();
        let label = arena.sprintf(format_args!("L{}", 7)).unwrap();

        assert_eq!(arena.get_str(temp), "t42");
        assert_eq!(arena.get_str(label), "L7");
    }

    #[test]
    fn stats_track_usage() {
        let mut arena = Arena::new(1024);

        arena.alloc(10).unwrap();
        arena.alloc(3).unwrap();

        let stats = arena.stats();

        assert_eq!(stats.total_allocated, 1024);
        assert_eq!(stats.total_used, 24);
        assert_eq!(stats.blocks, 1);
    }

    #[test]
    fn restore_frees_everything_after_the_save_point() {
        let mut arena = Arena::new(64);
        let name = arena.strdup("John Doe").unwrap();
        let save_point = arena.save();

        arena.strdup("temporary string 1").unwrap();
        arena.strdup("temporary string 2").unwrap();
        arena.alloc(400).unwrap();

        assert_eq!(arena.block_count(), 2);

        arena.restore(save_point);

        assert_eq!(arena.block_count(), 1);
        assert_eq!(arena.stats().total_used, 8);
        assert_eq!(arena.get_str(name), "John Doe");
    }

    #[test]
    fn block_storage_is_zeroed_and_keeps_writes() {
        let mut arena = Arena::new(64);
        let first = arena.alloc(13).unwrap();

        assert!(arena.bytes(first).unwrap().iter().all(|byte| *byte == 0));

        let word = arena.strdup("aligned").unwrap();
        let third = arena.alloc(200).unwrap();

        assert_eq!(arena.get_str(word), "aligned");
        assert_eq!(arena.addr(word.ptr()).unwrap() % ALIGNMENT, 0);
        assert_eq!(arena.addr(third).unwrap() % ALIGNMENT, 0);
        assert_eq!(arena.block_capacity(0), Some(64));
        assert_eq!(arena.bytes(third).unwrap().len(), 200);
    }

    #[test]
    fn reset_keeps_blocks() {
        let mut arena = Arena::new(64);

        arena.alloc(40).unwrap();
        arena.alloc(40).unwrap();
        arena.reset();

        assert_eq!(arena.block_count(), 2);
        assert_eq!(arena.stats().total_used, 0);
        assert_eq!(arena.stats().total_allocated, 128);
    }
}
