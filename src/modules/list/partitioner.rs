//! Parallel aggregate operations over lists
//!
//! Every operation cuts its input into at most `threads` contiguous slices,
//! runs a per-slice version of itself on each, and merges the partial
//! results in slice order:
//!
//! - `filter`/`map` concatenate the partial lists
//! - `all`/`any` combine the partial booleans
//! - `minimum`/`join` fold the partials pairwise in rounds until one is left

use std::cmp::Ordering;
use std::fmt::Display;
use std::sync::Arc;

use itertools::Itertools;

use crate::engines::compute::Executor;
use crate::engines::core::interrupt::Interrupt;
use crate::engines::core::pool::WorkerPool;
use crate::engines::{check_threads, EngineError, EngineResult};

/// Splits list operations across a worker pool or across threads spawned
/// per call.
///
/// Every operation takes owned `'static` element types and callbacks, in
/// both modes, because a pool's workers outlive the call. To run a slice
/// function over borrowed data (say `&str`s pointing into a local `String`)
/// use [`run_scoped`](crate::engines::core::parallel::run_scoped), which
/// borrows the list for the duration of the call.
#[derive(Clone, Debug, Default)]
pub struct ListPartitioner {
    executor: Executor,
}

impl ListPartitioner {
    /// Use `pool` when given, otherwise spawn threads per call
    pub fn new(pool: Option<Arc<WorkerPool>>) -> Self {
        match pool {
            Some(pool) => Self::with_pool(pool),
            None => Self::threaded(),
        }
    }

    /// Spawn one thread per slice on every call
    pub fn threaded() -> Self {
        Self {
            executor: Executor::Scoped,
        }
    }

    /// Submit every call as one batch to `pool`
    pub fn with_pool(pool: Arc<WorkerPool>) -> Self {
        Self {
            executor: Executor::pool(pool),
        }
    }

    /// Make pool-backed calls abort with [`EngineError::Interrupted`] when
    /// `interrupt` is raised. Threaded calls always run to completion.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        if let Executor::Pool { interrupt: slot, .. } = &mut self.executor {
            *slot = Some(interrupt);
        }
        self
    }

    /// Smallest element according to `cmp`; the first one on ties.
    pub fn minimum<T, C>(&self, threads: usize, list: &[T], cmp: C) -> EngineResult<T>
    where
        T: Clone + Send + Sync + 'static,
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        check_threads(threads)?;
        if list.is_empty() {
            return Err(EngineError::EmptyInput(
                "cannot take the minimum of an empty list".to_string(),
            ));
        }

        let cmp = Arc::new(cmp);
        let slice_cmp = Arc::clone(&cmp);
        let partials: Vec<T> = self
            .executor
            .run_slices(threads, list, move |slice| {
                slice.iter().min_by(|a, b| slice_cmp(*a, *b)).cloned()
            })?
            .into_iter()
            .flatten()
            .collect();

        let smaller = move |a: T, b: T| if cmp(&b, &a) == Ordering::Less { b } else { a };
        self.executor
            .reduce_rounds(threads, partials, smaller)?
            .ok_or_else(|| EngineError::EmptyInput("no partial minimum produced".to_string()))
    }

    /// Largest element according to `cmp`, i.e. the minimum under the
    /// reversed comparator.
    pub fn maximum<T, C>(&self, threads: usize, list: &[T], cmp: C) -> EngineResult<T>
    where
        T: Clone + Send + Sync + 'static,
        C: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.minimum(threads, list, move |a, b| cmp(b, a))
    }

    /// True if every element matches; true for an empty list.
    pub fn all<T, P>(&self, threads: usize, list: &[T], predicate: P) -> EngineResult<bool>
    where
        T: Clone + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        check_threads(threads)?;
        if list.is_empty() {
            return Ok(true);
        }

        let partials = self
            .executor
            .run_slices(threads, list, move |slice| slice.iter().all(|x| predicate(x)))?;
        Ok(partials.into_iter().all(|matched| matched))
    }

    /// True if some element matches; false for an empty list.
    pub fn any<T, P>(&self, threads: usize, list: &[T], predicate: P) -> EngineResult<bool>
    where
        T: Clone + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        check_threads(threads)?;
        if list.is_empty() {
            return Ok(false);
        }

        let partials = self
            .executor
            .run_slices(threads, list, move |slice| slice.iter().any(|x| predicate(x)))?;
        Ok(partials.into_iter().any(|matched| matched))
    }

    /// Matching elements in their original order
    pub fn filter<T, P>(&self, threads: usize, list: &[T], predicate: P) -> EngineResult<Vec<T>>
    where
        T: Clone + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        check_threads(threads)?;
        if list.is_empty() {
            return Ok(Vec::new());
        }

        let partials = self.executor.run_slices(threads, list, move |slice| {
            slice.iter().filter(|x| predicate(*x)).cloned().collect::<Vec<T>>()
        })?;
        Ok(partials.concat())
    }

    /// `transform` applied to every element, in order
    pub fn map<T, U, F>(&self, threads: usize, list: &[T], transform: F) -> EngineResult<Vec<U>>
    where
        T: Clone + Send + Sync + 'static,
        U: Send + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        check_threads(threads)?;
        if list.is_empty() {
            return Ok(Vec::new());
        }

        let partials = self.executor.run_slices(threads, list, move |slice| {
            slice.iter().map(|x| transform(x)).collect::<Vec<U>>()
        })?;
        Ok(partials.into_iter().flatten().collect())
    }

    /// Concatenated `Display` output of every element, in order
    pub fn join<T>(&self, threads: usize, list: &[T]) -> EngineResult<String>
    where
        T: Display + Clone + Send + Sync + 'static,
    {
        check_threads(threads)?;
        if list.is_empty() {
            return Ok(String::new());
        }

        let partials = self
            .executor
            .run_slices(threads, list, |slice| slice.iter().join(""))?;
        let joined = self
            .executor
            .reduce_rounds(threads, partials, |a: String, b: String| a + &b)?;
        Ok(joined.unwrap_or_default())
    }
}
