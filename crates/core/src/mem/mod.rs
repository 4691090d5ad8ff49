//! Backing-store memory model.
//!
//! Provides the sparse byte-addressable store visible to both DRAM
//! channels and populated by the image loader.

/// Sparse page-granular store.
pub mod sparse;

pub use sparse::{PAGE_COUNT, PAGE_SHIFT, PAGE_SIZE, SENTINEL, SparseMemory};
