//! Slice partitioning and short-lived slice threads
//!
//! A list of `n` elements asked to run on `t` threads is cut into
//! `min(t, n)` contiguous slices. Every slice holds `n / t` elements except
//! the last, which also takes the remainder.

use std::ops::Range;
use std::thread;

use crate::engines::{EngineError, EngineResult};

/// Prefix for threads spawned by [`run_scoped`]
pub const SLICE_THREAD_PREFIX: &str = "list-slice";

/// Get the default number of threads to use
pub fn default_num_threads() -> usize {
    num_cpus::get()
}

/// Cut `0..len` into at most `threads` contiguous, non-empty ranges in order.
///
/// Returns no ranges for an empty list. A thread count of zero is treated as
/// one; callers validate it before partitioning.
pub fn partition(len: usize, threads: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }

    let threads = threads.clamp(1, len);
    let count = len / threads;

    (0..threads)
        .map(|i| {
            let start = i * count;
            let end = if i + 1 == threads { len } else { start + count };
            start..end
        })
        .collect()
}

/// Run `slice_fn` over every slice of `list` on its own thread and return
/// the per-slice results in slice order.
///
/// The threads borrow `list` and are all joined before this returns. A
/// panicking slice is reported as [`EngineError::TaskFailed`] with the slice
/// index, after every other slice has finished.
pub fn run_scoped<T, U, F>(threads: usize, list: &[T], slice_fn: F) -> EngineResult<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&[T]) -> U + Sync,
{
    let ranges = partition(list.len(), threads);
    let slice_fn = &slice_fn;

    log::debug!(
        "Running {} elements on {} slice threads",
        list.len(),
        ranges.len()
    );

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(ranges.len());
        let mut spawn_error = None;

        for (i, range) in ranges.into_iter().enumerate() {
            let slice = &list[range];
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", SLICE_THREAD_PREFIX, i))
                .spawn_scoped(scope, move || slice_fn(slice));

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    spawn_error = Some(e);
                    break;
                }
            }
        }

        // Join everything before reporting anything
        let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();

        if let Some(e) = spawn_error {
            return Err(EngineError::Spawn(e));
        }

        joined
            .into_iter()
            .enumerate()
            .map(|(i, outcome)| outcome.map_err(|payload| EngineError::from_panic(i, payload)))
            .collect()
    })
}
