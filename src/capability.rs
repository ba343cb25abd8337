// Copyright 2024-Present the contributors to this crate.
// SPDX-License-Identifier: Apache-2.0

use core::ptr::NonNull;

/// The contract every allocator in this crate satisfies. Client containers
/// and [`crate::make_new`]/[`crate::make_delete`] are written against this
/// trait alone, so any allocator below is interchangeable at the call site.
///
/// # Safety
/// Implementors must only ever return addresses that are valid for `size`
/// bytes and aligned to `alignment`. `deallocate` may assume `address` was
/// previously returned by `allocate` on the same instance and has not
/// already been deallocated; violating that is a programming error the
/// implementor is not required to detect.
pub unsafe trait MemoryAllocator {
    /// Requests `size` bytes aligned to `alignment` (a power of two).
    /// Returns `None` if the request cannot be served; never panics and
    /// never aborts the process.
    fn allocate(&self, size: usize, alignment: usize) -> Option<NonNull<u8>>;

    /// Releases an address previously returned by [`Self::allocate`] on this
    /// same instance.
    ///
    /// # Safety
    /// `address` must have been returned by a prior, not-yet-deallocated
    /// call to `allocate` on `self`.
    unsafe fn deallocate(&self, address: NonNull<u8>);

    /// Total bytes this allocator has reserved from whatever backs it. This
    /// is the allocator's footprint, not its live/outstanding usage.
    fn memory_footprint(&self) -> usize;
}
