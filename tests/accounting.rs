// Copyright 2024-Present the contributors to this crate.
// SPDX-License-Identifier: Apache-2.0

//! Cross-module accounting scenario: a [`Vector`] resized over a
//! [`SafeSystemAllocator`] must translate every storage change into
//! exactly the allocate/free pair the allocator's counters can verify.

use layered_alloc::{SafeSystemAllocator, Vector};

#[test]
fn vector_resize_and_free_match_exact_counters() {
    let system = SafeSystemAllocator::new();

    // Constructing three empty vectors allocates nothing.
    let mut a = Vector::<u8, _>::new(&system);
    let mut b = Vector::<u32, _>::new(&system);
    let c = Vector::<u64, _>::new(&system);
    assert_eq!(system.current_allocated_memory(), 0);
    drop(c);
    assert_eq!(system.current_allocated_memory(), 0);

    // resize(4) on a u32 vector allocates exactly 4 * size_of::<u32>() +
    // header_size.
    assert!(b.resize(4));
    let header_size = system.header_size();
    assert_eq!(system.current_allocated_memory(), 4 * 4 + header_size);

    let after_b_resize = system.current_allocated_memory();

    // free() then resize(8) is exactly one free and one allocate.
    b.free();
    assert_eq!(system.current_allocated_memory(), 0);
    assert_eq!(system.total_freed_memory(), after_b_resize);

    assert!(b.resize(8));
    assert_eq!(system.current_allocated_memory(), 8 * 4 + header_size);

    // The untouched `a` vector never contributed to the counters.
    assert!(a.resize(3));
    let expected = (8 * 4 + header_size) + (3 + header_size);
    assert_eq!(system.current_allocated_memory(), expected);

    drop(a);
    drop(b);
    assert_eq!(system.current_allocated_memory(), 0);
    assert_eq!(system.total_freed_memory(), system.total_memory_allocated());
}
