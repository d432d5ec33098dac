//! List module
//!
//! Bulk aggregate operations over lists, split into slices and run in
//! parallel.

pub mod partitioner;

/// Convenience re-exports
pub use partitioner::ListPartitioner;
