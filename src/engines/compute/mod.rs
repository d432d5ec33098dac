//! Slice execution and reduction of partial results
//!
//! An [`Executor`] runs one function per slice of a list, either on fresh
//! scoped threads or as a single batch on a shared [`WorkerPool`].
//! [`Executor::reduce_rounds`] then folds partial results together in
//! rounds, each round using at most half as many slices as values remain.

use std::ops::Range;
use std::sync::Arc;

use crate::engines::core::interrupt::Interrupt;
use crate::engines::core::parallel::{partition, run_scoped};
use crate::engines::core::pool::WorkerPool;
use crate::engines::EngineResult;

/// Where slice functions run
#[derive(Clone, Debug, Default)]
pub enum Executor {
    /// One short-lived thread per slice, joined before the call returns
    #[default]
    Scoped,
    /// One batch per call on a shared pool
    Pool {
        pool: Arc<WorkerPool>,
        interrupt: Option<Interrupt>,
    },
}

impl Executor {
    pub fn pool(pool: Arc<WorkerPool>) -> Self {
        Executor::Pool {
            pool,
            interrupt: None,
        }
    }

    /// Apply `slice_fn` to each of the `min(threads, list.len())` slices of
    /// `list`, results in slice order.
    pub fn run_slices<T, U, F>(&self, threads: usize, list: &[T], slice_fn: F) -> EngineResult<Vec<U>>
    where
        T: Clone + Send + Sync + 'static,
        U: Send + 'static,
        F: Fn(&[T]) -> U + Send + Sync + 'static,
    {
        match self {
            Executor::Scoped => run_scoped(threads, list, slice_fn),
            Executor::Pool { pool, interrupt } => {
                let ranges = partition(list.len(), threads);
                log::debug!(
                    "Submitting {} elements as {} slices to the pool",
                    list.len(),
                    ranges.len()
                );

                // Workers outlive this call, so the slices need owned data.
                let shared: Arc<[T]> = Arc::from(list);
                let job = move |range: Range<usize>| slice_fn(&shared[range]);

                match interrupt {
                    Some(interrupt) => pool.submit_batch_with(job, ranges, interrupt),
                    None => pool.submit_batch(job, ranges),
                }
            }
        }
    }

    /// Fold `values` down to one with the associative `op`, keeping their
    /// order. Each round cuts the thread count to at most half the remaining
    /// values and folds every slice in parallel. `None` for no values.
    pub fn reduce_rounds<V, Op>(&self, threads: usize, values: Vec<V>, op: Op) -> EngineResult<Option<V>>
    where
        V: Clone + Send + Sync + 'static,
        Op: Fn(V, V) -> V + Send + Sync + 'static,
    {
        let op = Arc::new(op);
        let mut threads = threads;
        let mut values = values;

        while values.len() > 1 {
            threads = threads.min(values.len() / 2);
            let op = Arc::clone(&op);
            values = self
                .run_slices(threads, &values, move |slice| fold_slice(slice, &*op))?
                .into_iter()
                .flatten()
                .collect();
        }

        Ok(values.pop())
    }
}

/// Left fold of a slice with `op`; `None` if the slice is empty.
pub fn fold_slice<V, Op>(slice: &[V], op: &Op) -> Option<V>
where
    V: Clone,
    Op: Fn(V, V) -> V,
{
    let (first, rest) = slice.split_first()?;
    Some(rest.iter().cloned().fold(first.clone(), op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fold_slice() {
        assert_eq!(fold_slice(&[1, 2, 3, 4], &|a, b| a + b), Some(10));
        assert_eq!(fold_slice(&[7], &|a: i32, b: i32| a.min(b)), Some(7));
        assert_eq!(fold_slice(&[] as &[i32], &|a, b| a + b), None);
    }

    #[test]
    fn test_reduce_rounds_keeps_order() {
        let parts: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();

        for threads in 1..=6 {
            let joined = Executor::Scoped
                .reduce_rounds(threads, parts.clone(), |a, b| a + &b)
                .unwrap();
            assert_eq!(joined.as_deref(), Some("abcde"));
        }
    }

    #[test]
    fn test_reduce_rounds_single_and_empty() {
        let one = Executor::Scoped.reduce_rounds(4, vec![9], |a: i32, b| a + b).unwrap();
        assert_eq!(one, Some(9));

        let none = Executor::Scoped.reduce_rounds(4, Vec::<i32>::new(), |a, b| a + b).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_reduce_rounds_shrinks_thread_count() {
        // Count slices per round through the slice function itself
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let total = Executor::Scoped
            .reduce_rounds(8, (1..=8).collect::<Vec<u64>>(), move |a, b| {
                counter.fetch_add(1, Ordering::SeqCst);
                a + b
            })
            .unwrap();

        assert_eq!(total, Some(36));
        // Any pairwise fold of 8 values needs exactly 7 combinations
        assert_eq!(calls.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_pool_executor_matches_scoped() {
        let pool = Arc::new(WorkerPool::new(3).unwrap());
        let executor = Executor::pool(pool);
        let data: Vec<i64> = (0..100).collect();

        let pooled = executor.run_slices(7, &data, |s| s.iter().sum::<i64>()).unwrap();
        let scoped = Executor::Scoped.run_slices(7, &data, |s| s.iter().sum::<i64>()).unwrap();
        assert_eq!(pooled, scoped);
        assert_eq!(pooled.len(), 7);
    }
}
