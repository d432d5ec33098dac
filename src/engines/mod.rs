//! Execution engines
//!
//! `core` owns the threads (worker pool, task queue, ad-hoc slice threads),
//! `compute` owns the per-slice folds and the reduction of partial results.

pub mod core;
pub mod compute;

use std::any::Any;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Error types for engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Interrupted while waiting for task results")]
    Interrupted,

    #[error("Task {index} failed: {message}")]
    TaskFailed { index: usize, message: String },

    #[error("Worker pool is closed")]
    PoolClosed,

    #[error("Failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl EngineError {
    /// Build a `TaskFailed` from a panic payload caught at `index`.
    pub(crate) fn from_panic(index: usize, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        EngineError::TaskFailed { index, message }
    }
}

/// Reject a zero thread count.
pub(crate) fn check_threads(threads: usize) -> EngineResult<()> {
    if threads == 0 {
        return Err(EngineError::InvalidArgument(
            "thread count must be positive".to_string(),
        ));
    }
    Ok(())
}
