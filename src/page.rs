// Copyright 2024-Present the contributors to this crate.
// SPDX-License-Identifier: Apache-2.0

use crate::MemoryAllocator;
use allocator_api2::alloc::{AllocError, Allocator, Global, Layout};
use core::cell::Cell;
use core::ptr::NonNull;

/// A slab of exactly [`PageAllocator::CAPACITY`] fixed-size chunks, tracked
/// by a 64-bit occupancy bitmap. This is the leaf allocator: every chunk is
/// the same size, and the whole backing buffer is acquired once up front.
///
/// Generic over its backing allocator the same way
/// [`crate::LinearAllocator`]-style arenas are generic over theirs; defaults
/// to [`Global`] (the process's global allocator) so the common case needs
/// no backing allocator to be named.
pub struct PageAllocator<B: Allocator = Global> {
    buffer: NonNull<u8>,
    buffer_layout: Layout,
    chunk_size: usize,
    usage_flags: Cell<u64>,
    backing: B,
}

// SAFETY: `PageAllocator` owns its buffer exclusively and its `Cell` is only
// ever touched from `&self` methods, never aliased across threads by design
// (the allocator family is single-threaded, see spec §5).
unsafe impl<B: Allocator> Send for PageAllocator<B> {}

impl PageAllocator<Global> {
    /// Creates a page of `chunk_size`-byte chunks backed by the process's
    /// global allocator.
    pub fn new(chunk_size: usize) -> Result<Self, AllocError> {
        Self::new_in(chunk_size, Global)
    }
}

impl<B: Allocator> PageAllocator<B> {
    /// Number of chunks a page always holds.
    pub const CAPACITY: usize = 64;

    /// Creates a page of `chunk_size`-byte chunks backed by `backing`.
    pub fn new_in(chunk_size: usize, backing: B) -> Result<Self, AllocError> {
        let buffer_layout = Layout::from_size_align(
            chunk_size.saturating_mul(Self::CAPACITY),
            natural_alignment(chunk_size),
        )
        .map_err(|_| AllocError)?;
        let allocation = backing.allocate(buffer_layout)?;
        let buffer = allocation.cast::<u8>();

        tracing::debug!(chunk_size, capacity = Self::CAPACITY, "page allocator initialized");

        Ok(Self {
            buffer,
            buffer_layout,
            chunk_size,
            usage_flags: Cell::new(0),
            backing,
        })
    }

    /// The fixed size every chunk in this page serves.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The occupancy bitmap; bit `i` is set iff chunk `i` is live.
    #[inline]
    pub fn usage_flags(&self) -> u64 {
        self.usage_flags.get()
    }

    /// Whether every chunk is currently live.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.usage_flags() == u64::MAX
    }

    fn natural_alignment(&self) -> usize {
        natural_alignment(self.chunk_size)
    }
}

/// The largest power of two dividing `n`, or 1 if `n` is 0. This is the
/// strongest alignment a contiguous run of `n`-sized chunks can promise
/// without extra per-chunk padding (spec.md §9's alignment Open Question).
fn natural_alignment(n: usize) -> usize {
    if n == 0 {
        1
    } else {
        1usize << n.trailing_zeros()
    }
}

unsafe impl<B: Allocator> MemoryAllocator for PageAllocator<B> {
    fn allocate(&self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        if size > self.chunk_size || alignment > self.natural_alignment() || self.is_full() {
            return None;
        }

        let flags = self.usage_flags.get();
        // Lowest clear bit: the index of the first zero from the LSB.
        let index = (!flags).trailing_zeros() as usize;
        debug_assert!(index < Self::CAPACITY);

        self.usage_flags.set(flags | (1u64 << index));

        // SAFETY: `index < CAPACITY` and the buffer holds `CAPACITY` chunks
        // of `chunk_size` bytes each, so this stays within the allocation.
        let address = unsafe { self.buffer.as_ptr().add(index * self.chunk_size) };
        // SAFETY: derived from a non-null buffer pointer with a positive
        // offset, so it cannot be null.
        Some(unsafe { NonNull::new_unchecked(address) })
    }

    unsafe fn deallocate(&self, address: NonNull<u8>) {
        // SAFETY: caller guarantees `address` came from `self.allocate`.
        let offset = unsafe { address.as_ptr().offset_from(self.buffer.as_ptr()) };
        debug_assert!(offset >= 0);
        let offset = offset as usize;
        debug_assert_eq!(offset % self.chunk_size, 0);
        let index = offset / self.chunk_size;
        debug_assert!(index < Self::CAPACITY);

        self.usage_flags.set(self.usage_flags.get() & !(1u64 << index));
    }

    fn memory_footprint(&self) -> usize {
        self.chunk_size * Self::CAPACITY
    }
}

impl<B: Allocator> Drop for PageAllocator<B> {
    fn drop(&mut self) {
        // SAFETY: `buffer`/`buffer_layout` are exactly what was returned by
        // `self.backing.allocate` in `new_in`, and this is the only place
        // they are ever released.
        unsafe { self.backing.deallocate(self.buffer, self.buffer_layout) };
    }
}
