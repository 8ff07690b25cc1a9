//! Atomic buffer over a shared memory region.
//!
//! An [`AtomicBuffer`] is a fixed-capacity byte region addressed in logical
//! little-endian byte order and backed by 32-bit atomic words. It is the
//! substrate both the log buffer and its companion state buffer live in: one
//! producer writes frames and counters, one scanner reads them, and the
//! release/acquire accessor pairs carry the publication handshake between
//! the two threads.
//!
//! # Design Notes
//!
//! The region is `Arc`-shared `AtomicU32` words rather than a raw pointer
//! view, keeping the crate free of `unsafe` while giving each field access
//! the ordering it needs. Cloning an `AtomicBuffer` is cheap and yields
//! another view of the *same* region; this is how a producer and a scanner
//! end up looking at one log.
//!
//! 32-bit accesses must be 4-byte aligned and 16-bit accesses 2-byte
//! aligned. Bulk byte operations are plain (relaxed) and are only meaningful
//! from the single writer before the covering frame is published.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const WORD_SIZE: usize = 4;

/// A fixed-capacity byte region backed by shared atomic words.
///
/// Clones share the underlying region. The buffer itself imposes no
/// protocol; callers choose plain, acquire or release accessors per field.
#[derive(Clone)]
pub struct AtomicBuffer {
    words: Arc<[AtomicU32]>,
}

impl AtomicBuffer {
    /// Allocates a zeroed buffer of `capacity` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a positive multiple of 4.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity > 0 && capacity % WORD_SIZE == 0,
            "capacity must be a positive multiple of {WORD_SIZE}: capacity={capacity}"
        );
        let words: Vec<AtomicU32> = (0..capacity / WORD_SIZE).map(|_| AtomicU32::new(0)).collect();
        Self {
            words: words.into(),
        }
    }

    /// The capacity of the region in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.words.len() * WORD_SIZE
    }

    /// Plain 32-bit read at a 4-byte aligned byte offset.
    #[must_use]
    pub fn get_u32(&self, offset: usize) -> u32 {
        self.word(offset).load(Ordering::Relaxed)
    }

    /// Acquire 32-bit read at a 4-byte aligned byte offset.
    ///
    /// Pairs with [`put_u32_ordered`][Self::put_u32_ordered]: a value
    /// observed here makes every plain write that preceded the release
    /// store visible.
    #[must_use]
    pub fn get_u32_volatile(&self, offset: usize) -> u32 {
        self.word(offset).load(Ordering::Acquire)
    }

    /// Plain 32-bit write at a 4-byte aligned byte offset.
    pub fn put_u32(&self, offset: usize, value: u32) {
        self.word(offset).store(value, Ordering::Relaxed);
    }

    /// Release 32-bit write at a 4-byte aligned byte offset.
    pub fn put_u32_ordered(&self, offset: usize, value: u32) {
        self.word(offset).store(value, Ordering::Release);
    }

    /// Plain 16-bit little-endian read at a 2-byte aligned byte offset.
    #[must_use]
    pub fn get_u16(&self, offset: usize) -> u16 {
        debug_assert!(offset % 2 == 0, "unaligned u16 read at {offset}");
        let shift = (offset % WORD_SIZE) * 8;
        (self.word(offset & !(WORD_SIZE - 1)).load(Ordering::Relaxed) >> shift) as u16
    }

    /// Plain 16-bit little-endian write at a 2-byte aligned byte offset.
    ///
    /// Read-modify-write on the containing word; single-writer only.
    pub fn put_u16(&self, offset: usize, value: u16) {
        debug_assert!(offset % 2 == 0, "unaligned u16 write at {offset}");
        let shift = (offset % WORD_SIZE) * 8;
        let word = self.word(offset & !(WORD_SIZE - 1));
        let current = word.load(Ordering::Relaxed);
        let cleared = current & !(u32::from(u16::MAX) << shift);
        word.store(cleared | (u32::from(value) << shift), Ordering::Relaxed);
    }

    /// Copies `data` into the region starting at `offset`, plain ordering.
    ///
    /// Setup-path helper for producers and tests; publish the covering
    /// frame's length afterwards to make the bytes visible to a reader.
    pub fn put_bytes(&self, offset: usize, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.put_u8(offset + i, byte);
        }
    }

    /// Copies `length` bytes starting at `offset` out of the region.
    #[must_use]
    pub fn get_bytes(&self, offset: usize, length: usize) -> Vec<u8> {
        (offset..offset + length).map(|at| self.get_u8(at)).collect()
    }

    fn get_u8(&self, offset: usize) -> u8 {
        let shift = (offset % WORD_SIZE) * 8;
        (self.words[offset / WORD_SIZE].load(Ordering::Relaxed) >> shift) as u8
    }

    fn put_u8(&self, offset: usize, value: u8) {
        let shift = (offset % WORD_SIZE) * 8;
        let word = &self.words[offset / WORD_SIZE];
        let current = word.load(Ordering::Relaxed);
        let cleared = current & !(0xFF << shift);
        word.store(cleared | (u32::from(value) << shift), Ordering::Relaxed);
    }

    fn word(&self, offset: usize) -> &AtomicU32 {
        debug_assert!(offset % WORD_SIZE == 0, "unaligned u32 access at {offset}");
        &self.words[offset / WORD_SIZE]
    }
}

impl fmt::Debug for AtomicBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicBuffer")
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
