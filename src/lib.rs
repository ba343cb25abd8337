// Copyright 2024-Present the contributors to this crate.
// SPDX-License-Identifier: Apache-2.0

//! Layered user-space allocators for latency-sensitive code paths: a
//! 64-chunk bitmap slab ([`PageAllocator`]), a tiered router over several
//! slabs keyed by size class ([`BookAllocator`]), and a header-stamped
//! wrapper over the process's global allocator with exact byte accounting
//! ([`SafeSystemAllocator`]). All three implement the single
//! [`MemoryAllocator`] capability, so client containers ([`Vector`],
//! [`DynamicString`]) and the generic placement helpers ([`make_new`],
//! [`make_delete`]) work identically over any of them.
//!
//! Single-threaded by design: every allocator here uses interior
//! mutability via `Cell`, not locks, and is not `Sync`. Concurrent use of
//! one instance from multiple threads is a programming error the type
//! system does not attempt to catch.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

extern crate alloc;

mod book;
mod capability;
mod construct;
mod error;
mod page;
mod string;
mod system;
mod vector;

pub use book::BookAllocator;
pub use capability::MemoryAllocator;
pub use construct::{make_delete, make_new};
pub use error::ConfigError;
pub use page::PageAllocator;
pub use string::DynamicString;
pub use system::SafeSystemAllocator;
pub use vector::Vector;

// Expose the capability vocabulary our allocators are built against, the
// way this family's teacher crate re-exports its own foundation.
pub use allocator_api2::alloc::{AllocError, Allocator, Global, Layout};
