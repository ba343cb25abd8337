// Copyright 2024-Present the contributors to this crate.
// SPDX-License-Identifier: Apache-2.0

use crate::MemoryAllocator;
use core::ptr::{self, NonNull};

/// A resizable byte buffer built on the [`MemoryAllocator`] capability,
/// mirroring [`crate::Vector`]'s resize/free shape with a byte payload in
/// place of a typed element array.
///
/// The two allocator parameters spec.md §4.6 describes for a
/// "dynamic string" are the two call-site arguments of
/// `make_new(object_allocator, || DynamicString::new(buffer_allocator))`:
/// one places the `DynamicString` value itself, the other is the allocator
/// `DynamicString` stores for its own buffer. Only the latter is a field
/// here — the placement allocator is never retained by the object it
/// places.
pub struct DynamicString<'a, A: MemoryAllocator> {
    allocator: &'a A,
    data: Option<NonNull<u8>>,
    capacity: usize,
}

impl<'a, A: MemoryAllocator> DynamicString<'a, A> {
    /// An empty string buffer over `allocator`. Allocates nothing.
    pub fn new(allocator: &'a A) -> Self {
        Self { allocator, data: None, capacity: 0 }
    }

    /// Current byte capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ensures storage for exactly `n` bytes, preserving the first
    /// `min(capacity, n)` bytes. A no-op if `n` already equals the current
    /// capacity; otherwise exactly one allocate and, if storage already
    /// existed, exactly one free.
    ///
    /// Returns `false`, leaving the buffer unchanged, if the allocator
    /// cannot satisfy the new size.
    pub fn resize(&mut self, n: usize) -> bool {
        if n == self.capacity {
            return true;
        }

        let new_data = if n == 0 {
            None
        } else {
            match self.allocator.allocate(n, 1) {
                Some(raw) => Some(raw),
                None => return false,
            }
        };

        if let (Some(new_ptr), Some(old_ptr)) = (new_data, self.data) {
            let preserved = self.capacity.min(n);
            // SAFETY: `old_ptr` is valid for `self.capacity` bytes and
            // `new_ptr` for `n` bytes; `preserved` is the minimum of both.
            unsafe { ptr::copy_nonoverlapping(old_ptr.as_ptr(), new_ptr.as_ptr(), preserved) };
        }

        if let Some(old_ptr) = self.data.take() {
            // SAFETY: `old_ptr` was returned by a prior `allocate` on this
            // same allocator and has not been freed yet.
            unsafe { self.allocator.deallocate(old_ptr) };
        }

        self.data = new_data;
        self.capacity = n;
        true
    }

    /// Releases storage and sets capacity to 0. The buffer remains usable
    /// and may be grown again with [`Self::resize`]. A no-op if already
    /// empty.
    pub fn free(&mut self) {
        if let Some(old_ptr) = self.data.take() {
            // SAFETY: `old_ptr` was returned by a prior `allocate` on this
            // same allocator and has not been freed yet.
            unsafe { self.allocator.deallocate(old_ptr) };
        }
        self.capacity = 0;
    }

    /// The live bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        match self.data {
            // SAFETY: `ptr` is valid for `capacity` bytes.
            Some(ptr) => unsafe { core::slice::from_raw_parts(ptr.as_ptr(), self.capacity) },
            None => &[],
        }
    }

    /// The live bytes as a mutable slice.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self.data {
            // SAFETY: `ptr` is valid for `capacity` bytes and `self` is
            // borrowed mutably, so no other access can alias it.
            Some(ptr) => unsafe { core::slice::from_raw_parts_mut(ptr.as_ptr(), self.capacity) },
            None => &mut [],
        }
    }
}

impl<A: MemoryAllocator> Drop for DynamicString<'_, A> {
    fn drop(&mut self) {
        self.free();
    }
}
