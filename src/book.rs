// Copyright 2024-Present the contributors to this crate.
// SPDX-License-Identifier: Apache-2.0

use crate::page::PageAllocator;
use crate::{ConfigError, MemoryAllocator};
use alloc::vec::Vec;
use allocator_api2::alloc::Global;
use core::mem::align_of;
use core::ptr::NonNull;

/// A tiered router over several [`PageAllocator`]s of strictly increasing
/// chunk size. Every live allocation is prefixed with a small header
/// recording which page served it, so deallocation is a constant-time
/// lookup rather than a scan.
///
/// Storage for the pages themselves is a plain `alloc::vec::Vec` — this is
/// bookkeeping internal to the allocator, not the crate's own `Vector`
/// client type.
pub struct BookAllocator {
    pages: Vec<PageAllocator<Global>>,
}

/// Bytes prepended to every live `BookAllocator` allocation, holding the
/// index of the page that served it. Fixed rather than computed: tests and
/// callers read it as a constant observer.
const HEADER_SIZE: usize = 8;

impl BookAllocator {
    /// Builds `page_count` pages where page `k` serves chunks of
    /// `(k + 1) * chunk_step + header_size()` bytes, each backed by the
    /// process's global allocator.
    pub fn new_in(page_count: usize, chunk_step: usize) -> Result<Self, ConfigError> {
        if page_count == 0 {
            return Err(ConfigError::ZeroPageCount);
        }
        if chunk_step == 0 {
            return Err(ConfigError::ZeroChunkStep);
        }

        let mut pages = Vec::with_capacity(page_count);
        for k in 0..page_count {
            // Rounded up to a multiple of `align_of::<u32>()` so that
            // `PageAllocator::new_in`'s natural-alignment buffer (the
            // largest power of two dividing `chunk_size`) is always at
            // least 4-byte aligned — every chunk in the page is then a
            // valid home for the `u32` page-index header this allocator
            // writes at chunk offset 0.
            let chunk_size = round_up(
                (k + 1) * chunk_step + HEADER_SIZE,
                align_of::<u32>(),
            );
            let page =
                PageAllocator::new(chunk_size).map_err(|_| ConfigError::OutOfMemory)?;
            pages.push(page);
        }

        tracing::debug!(page_count, chunk_step, "book allocator initialized");

        Ok(Self { pages })
    }

    /// Bytes of routing overhead prepended to every allocation.
    #[inline]
    pub fn header_size(&self) -> usize {
        HEADER_SIZE
    }

    /// How many pages this book routes across.
    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The page at index `k`, for inspection (e.g. reading its
    /// `usage_flags` in tests).
    pub fn get_page_allocator(&self, k: usize) -> &PageAllocator<Global> {
        &self.pages[k]
    }
}

unsafe impl MemoryAllocator for BookAllocator {
    fn allocate(&self, size: usize, alignment: usize) -> Option<NonNull<u8>> {
        if alignment > HEADER_SIZE {
            return None;
        }
        let needed = size.checked_add(HEADER_SIZE)?;

        for (index, page) in self.pages.iter().enumerate() {
            if page.chunk_size() < needed {
                continue;
            }
            // `alignment` is a power of two no larger than `HEADER_SIZE`
            // (checked above), so `HEADER_SIZE` is itself a multiple of it;
            // aligning the chunk start to `alignment` therefore also aligns
            // the payload returned after the header to `alignment`.
            let Some(raw) = page.allocate(needed, alignment) else {
                continue;
            };

            if index != first_eligible_page(&self.pages, needed) {
                tracing::trace!(page_index = index, needed, "book allocator overflow routing");
            }

            // SAFETY: `raw` is a fresh `needed`-byte region from `page`,
            // large enough to hold the `u32` page index header.
            unsafe { raw.cast::<u32>().as_ptr().write(index as u32) };
            // SAFETY: `raw` has at least `HEADER_SIZE` bytes before the
            // payload, since `needed = size + HEADER_SIZE`.
            let payload = unsafe { raw.as_ptr().add(HEADER_SIZE) };
            // SAFETY: derived from a non-null pointer with a positive offset.
            return Some(unsafe { NonNull::new_unchecked(payload) });
        }

        None
    }

    unsafe fn deallocate(&self, address: NonNull<u8>) {
        // SAFETY: caller guarantees `address` was returned by `self.allocate`,
        // which always leaves room for the header immediately before it.
        let raw = unsafe { address.as_ptr().sub(HEADER_SIZE) };
        // SAFETY: the header was written as a `u32` by `allocate`.
        let index = unsafe { *raw.cast::<u32>() } as usize;
        // SAFETY: `raw` is the exact address `pages[index].allocate` returned.
        let raw = unsafe { NonNull::new_unchecked(raw) };
        unsafe { self.pages[index].deallocate(raw) };
    }

    fn memory_footprint(&self) -> usize {
        self.pages.iter().map(MemoryAllocator::memory_footprint).sum()
    }
}

/// Index of the first page that could in principle serve `needed` bytes,
/// ignoring current occupancy — used only to decide whether a successful
/// allocation should be logged as having overflowed past its natural tier.
fn first_eligible_page(pages: &[PageAllocator<Global>], needed: usize) -> usize {
    pages
        .iter()
        .position(|page| page.chunk_size() >= needed)
        .unwrap_or(usize::MAX)
}

/// Rounds `n` up to the next multiple of `align` (`align` a power of two).
fn round_up(n: usize, align: usize) -> usize {
    (n + align - 1) & !(align - 1)
}
