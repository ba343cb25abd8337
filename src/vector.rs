// Copyright 2024-Present the contributors to this crate.
// SPDX-License-Identifier: Apache-2.0

use crate::MemoryAllocator;
use core::mem::{align_of, size_of};
use core::ptr::{self, NonNull};

/// A resizable array of `T` built directly on the [`MemoryAllocator`]
/// capability, restricted to `Copy` elements the same way
/// `datadog-alloc::vec::VirtualVec<T: Copy>` is: without `Drop`/`Clone` to
/// account for, a resize is exactly one allocate and one free, with no
/// hidden per-element bookkeeping.
///
/// Never copies the allocator reference it's given — it only ever borrows
/// it, matching the capability's client contract (§6.2).
pub struct Vector<'a, T: Copy, A: MemoryAllocator> {
    allocator: &'a A,
    data: Option<NonNull<T>>,
    capacity: usize,
}

impl<'a, T: Copy, A: MemoryAllocator> Vector<'a, T, A> {
    /// An empty vector over `allocator`. Allocates nothing.
    pub fn new(allocator: &'a A) -> Self {
        Self { allocator, data: None, capacity: 0 }
    }

    /// Current element capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ensures storage for exactly `n` elements, preserving the first
    /// `min(capacity, n)` elements. A no-op if `n` already equals the
    /// current capacity. Otherwise performs exactly one allocate of
    /// `n * size_of::<T>()` bytes and, if storage already existed, exactly
    /// one free of it — never both an over-allocation and a shrink in the
    /// same call.
    ///
    /// Returns `false`, leaving the vector unchanged, if the allocator
    /// cannot satisfy the new size.
    pub fn resize(&mut self, n: usize) -> bool {
        if n == self.capacity {
            return true;
        }

        let new_data = if n == 0 {
            None
        } else {
            match self.allocator.allocate(n * size_of::<T>(), align_of::<T>()) {
                Some(raw) => Some(raw.cast::<T>()),
                None => return false,
            }
        };

        if let (Some(new_ptr), Some(old_ptr)) = (new_data, self.data) {
            let preserved = self.capacity.min(n);
            // SAFETY: both pointers are valid for `preserved` elements —
            // `old_ptr` for `self.capacity` and `new_ptr` for `n`, and
            // `preserved` is the minimum of the two. `T: Copy` makes a
            // bytewise copy sound.
            unsafe { ptr::copy_nonoverlapping(old_ptr.as_ptr(), new_ptr.as_ptr(), preserved) };
        }

        if let Some(old_ptr) = self.data.take() {
            // SAFETY: `old_ptr` was returned by a prior `allocate` on this
            // same allocator and has not been freed yet.
            unsafe { self.allocator.deallocate(old_ptr.cast()) };
        }

        self.data = new_data;
        self.capacity = n;
        true
    }

    /// Releases storage and sets capacity to 0. The vector remains usable
    /// and may be grown again with [`Self::resize`]. A no-op if already
    /// empty.
    pub fn free(&mut self) {
        if let Some(old_ptr) = self.data.take() {
            // SAFETY: `old_ptr` was returned by a prior `allocate` on this
            // same allocator and has not been freed yet.
            unsafe { self.allocator.deallocate(old_ptr.cast()) };
        }
        self.capacity = 0;
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        match self.data {
            // SAFETY: `ptr` is valid for `capacity` elements of `T`.
            Some(ptr) => unsafe { core::slice::from_raw_parts(ptr.as_ptr(), self.capacity) },
            None => &[],
        }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match self.data {
            // SAFETY: `ptr` is valid for `capacity` elements of `T` and
            // `self` is borrowed mutably, so no other access can alias it.
            Some(ptr) => unsafe { core::slice::from_raw_parts_mut(ptr.as_ptr(), self.capacity) },
            None => &mut [],
        }
    }
}

impl<T: Copy, A: MemoryAllocator> Drop for Vector<'_, T, A> {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::SafeSystemAllocator;

    #[test]
    fn new_vector_allocates_nothing() {
        let system = SafeSystemAllocator::new();
        let vector = Vector::<u32, _>::new(&system);
        assert_eq!(vector.capacity(), 0);
        assert_eq!(system.current_allocated_memory(), 0);
    }

    #[test]
    fn resize_to_same_capacity_is_a_noop() {
        let system = SafeSystemAllocator::new();
        let mut vector = Vector::<u32, _>::new(&system);
        assert!(vector.resize(4));
        let after_first = system.current_allocated_memory();
        assert!(vector.resize(4));
        assert_eq!(system.current_allocated_memory(), after_first);
    }

    #[test]
    fn resize_preserves_existing_elements() {
        let system = SafeSystemAllocator::new();
        let mut vector = Vector::<u32, _>::new(&system);
        vector.resize(4);
        vector.as_mut_slice().copy_from_slice(&[1, 2, 3, 4]);

        vector.resize(2);
        assert_eq!(vector.as_slice(), &[1, 2]);

        vector.resize(6);
        assert_eq!(&vector.as_slice()[..2], &[1, 2]);
    }

    #[test]
    fn free_then_grow_round_trips_through_one_alloc_one_free() {
        let system = SafeSystemAllocator::new();
        let mut vector = Vector::<u32, _>::new(&system);
        vector.resize(4);
        let allocated_for_four = system.total_memory_allocated();

        vector.free();
        assert_eq!(vector.capacity(), 0);
        let freed_after_free = system.total_freed_memory();
        assert_eq!(freed_after_free, allocated_for_four);

        vector.resize(8);
        let expected = 8 * size_of::<u32>() + system.header_size();
        assert_eq!(
            system.current_allocated_memory(),
            expected,
            "current must reflect exactly the new buffer, nothing carried over"
        );
    }
}
