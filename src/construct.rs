// Copyright 2024-Present the contributors to this crate.
// SPDX-License-Identifier: Apache-2.0

use crate::MemoryAllocator;
use core::mem::{align_of, size_of};
use core::ptr::NonNull;

/// Requests room for a `T` from `allocator` and places the value produced by
/// `init` into it. `init` only runs once the allocation has succeeded, so a
/// failed allocation never has constructor side effects.
///
/// This, together with [`make_delete`], is the only way objects should be
/// placed on an allocator in this crate: it keeps allocation and
/// construction, and deallocation and destruction, symmetric.
pub fn make_new<T, A, F>(allocator: &A, init: F) -> Option<NonNull<T>>
where
    A: MemoryAllocator,
    F: FnOnce() -> T,
{
    let raw = allocator.allocate(size_of::<T>(), align_of::<T>())?;
    let typed = raw.cast::<T>();
    // SAFETY: `raw` was just allocated for exactly this layout and is
    // therefore valid and properly aligned for a single write of `T`.
    unsafe { typed.as_ptr().write(init()) };
    Some(typed)
}

/// Destroys `*object` and hands its storage back to `allocator`. A `None`
/// object is a no-op.
///
/// # Safety
/// `object`, if present, must have been produced by [`make_new`] on this
/// same `allocator` and not already passed to `make_delete`.
pub unsafe fn make_delete<T, A: MemoryAllocator>(allocator: &A, object: Option<NonNull<T>>) {
    let Some(ptr) = object else {
        return;
    };
    // SAFETY: caller guarantees `ptr` is a live object from `make_new` on
    // this allocator; dropping it in place and handing the address back is
    // exactly the inverse of that call.
    unsafe {
        ptr.as_ptr().drop_in_place();
        allocator.deallocate(ptr.cast());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageAllocator;

    #[test]
    fn round_trips_through_allocator() {
        let page = PageAllocator::new(16).unwrap();
        let obj = make_new(&page, || 7_i32).unwrap();
        assert_eq!(unsafe { *obj.as_ptr() }, 7);
        unsafe { make_delete(&page, Some(obj)) };
        assert_eq!(page.usage_flags(), 0);
    }

    #[test]
    fn null_object_is_noop() {
        let page = PageAllocator::new(16).unwrap();
        unsafe { make_delete::<i32, _>(&page, None) };
        assert_eq!(page.usage_flags(), 0);
    }

    #[test]
    fn failed_allocation_skips_constructor_side_effects() {
        let page = PageAllocator::new(4).unwrap();
        // i64 doesn't fit in a 4-byte chunk, so allocation must fail before
        // the closure would ever run.
        let mut ran = false;
        let obj = make_new::<i64, _, _>(&page, || {
            ran = true;
            0
        });
        assert!(obj.is_none());
        assert!(!ran);
    }
}
