// Copyright 2024-Present the contributors to this crate.
// SPDX-License-Identifier: Apache-2.0

use core::{error, fmt};

/// A mistake in how an allocator was configured, detected at construction
/// time rather than surfacing as a routine `None` from `allocate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `BookAllocator::new_in` was asked for zero pages.
    ZeroPageCount,
    /// `BookAllocator::new_in` was asked for a zero-sized chunk step.
    ZeroChunkStep,
    /// The backing allocator could not satisfy one of the book's pages.
    OutOfMemory,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            ConfigError::ZeroPageCount => "page_count must be at least 1",
            ConfigError::ZeroChunkStep => "chunk_step must be at least 1",
            ConfigError::OutOfMemory => "backing allocator could not provide a page",
        };
        f.write_str(reason)
    }
}

impl error::Error for ConfigError {}
