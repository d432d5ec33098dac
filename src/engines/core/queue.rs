//! Shared task queue for a worker pool
//!
//! One mutex guards the pending jobs and the closed flag; idle workers block
//! on a single condition variable until a batch arrives or the queue closes.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use super::task::Job;
use crate::engines::EngineError;

struct QueueState {
    jobs: VecDeque<Box<dyn Job>>,
    closed: bool,
}

pub(crate) struct TaskQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Append a whole batch atomically. Hands the batch back if the queue is
    /// closed.
    pub(crate) fn push_batch(&self, batch: Vec<Box<dyn Job>>) -> Result<(), Vec<Box<dyn Job>>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(batch);
        }
        let count = batch.len();
        state.jobs.extend(batch);
        drop(state);

        if count == 1 {
            self.available.notify_one();
        } else {
            self.available.notify_all();
        }
        Ok(())
    }

    /// Block until a job is available. `None` once the queue is closed.
    pub(crate) fn pop(&self) -> Option<Box<dyn Job>> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }
            self.available.wait(&mut state);
        }
    }

    /// Mark closed, wake every idle worker and fail everything still queued.
    /// Returns false if the queue was already closed.
    pub(crate) fn close(&self) -> bool {
        let drained: Vec<Box<dyn Job>> = {
            let mut state = self.state.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            state.jobs.drain(..).collect()
        };
        self.available.notify_all();

        if !drained.is_empty() {
            log::debug!("Abandoning {} queued tasks on close", drained.len());
        }
        for job in drained {
            job.abandon(EngineError::PoolClosed);
        }
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().jobs.len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}
