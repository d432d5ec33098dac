//! Parallel list operations
//!
//! A persistent [`WorkerPool`] that runs batches of independent function
//! applications and returns their results in input order, and a
//! [`ListPartitioner`] that splits bulk list operations (minimum, maximum,
//! filter, map, join, all, any) into slices and runs them on that pool or on
//! threads spawned per call.

pub mod engines;
pub mod modules;

pub use engines::compute::Executor;
pub use engines::core::config::PoolConfig;
pub use engines::core::interrupt::Interrupt;
pub use engines::core::parallel::partition;
pub use engines::core::pool::WorkerPool;
pub use engines::{EngineError, EngineResult};
pub use modules::list::ListPartitioner;
