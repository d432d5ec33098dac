//! Persistent worker pool
//!
//! A fixed set of named worker threads share one [`TaskQueue`]. A call to
//! [`WorkerPool::submit_batch`] turns every input into a task, pushes them
//! all at once and then waits on each task's own slot in input order, so
//! results come back in submission order whatever order the workers finish in.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::config::PoolConfig;
use super::interrupt::Interrupt;
use super::queue::TaskQueue;
use super::task::{Job, Task};
use crate::engines::{check_threads, EngineError, EngineResult};

pub struct WorkerPool {
    queue: Arc<TaskQueue>,
    workers: Vec<JoinHandle<()>>,
    worker_count: usize,
}

impl WorkerPool {
    /// Create a pool with `worker_count` workers and default settings
    pub fn new(worker_count: usize) -> EngineResult<Self> {
        Self::with_config(PoolConfig::default().with_worker_count(worker_count))
    }

    /// Create a pool from an explicit configuration
    pub fn with_config(config: PoolConfig) -> EngineResult<Self> {
        check_threads(config.worker_count)?;

        let queue = Arc::new(TaskQueue::new());
        let mut workers = Vec::with_capacity(config.worker_count);

        for id in 0..config.worker_count {
            let queue_ref = Arc::clone(&queue);
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name_prefix, id))
                .spawn(move || worker_loop(id, queue_ref));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Release the workers started so far
                    queue.close();
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(EngineError::Spawn(e));
                }
            }
        }

        log::info!("Initialized worker pool with {} threads", config.worker_count);

        Ok(Self {
            queue,
            workers,
            worker_count: config.worker_count,
        })
    }

    /// Apply `f` to every input on the pool and return the outputs in input
    /// order. Blocks until every task of this batch has finished.
    pub fn submit_batch<I, R, F>(&self, f: F, inputs: Vec<I>) -> EngineResult<Vec<R>>
    where
        I: Send + 'static,
        R: Send + 'static,
        F: Fn(I) -> R + Send + Sync + 'static,
    {
        self.submit(f, inputs, None)
    }

    /// Like [`submit_batch`](Self::submit_batch), but returns
    /// [`EngineError::Interrupted`] as soon as `interrupt` is raised. Tasks
    /// already queued still run; their results are discarded.
    pub fn submit_batch_with<I, R, F>(
        &self,
        f: F,
        inputs: Vec<I>,
        interrupt: &Interrupt,
    ) -> EngineResult<Vec<R>>
    where
        I: Send + 'static,
        R: Send + 'static,
        F: Fn(I) -> R + Send + Sync + 'static,
    {
        self.submit(f, inputs, Some(interrupt))
    }

    fn submit<I, R, F>(
        &self,
        f: F,
        inputs: Vec<I>,
        interrupt: Option<&Interrupt>,
    ) -> EngineResult<Vec<R>>
    where
        I: Send + 'static,
        R: Send + 'static,
        F: Fn(I) -> R + Send + Sync + 'static,
    {
        if self.queue.is_closed() {
            return Err(EngineError::PoolClosed);
        }
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let func = Arc::new(f);
        let mut jobs: Vec<Box<dyn Job>> = Vec::with_capacity(inputs.len());
        let mut slots = Vec::with_capacity(inputs.len());

        for (index, input) in inputs.into_iter().enumerate() {
            let (task, slot) = Task::new(index, Arc::clone(&func), input);
            jobs.push(Box::new(task));
            slots.push(slot);
        }

        if self.queue.push_batch(jobs).is_err() {
            return Err(EngineError::PoolClosed);
        }

        let mut results = Vec::with_capacity(slots.len());
        for slot in &slots {
            results.push(slot.wait(interrupt)?);
        }
        Ok(results)
    }

    /// Stop accepting work and let the workers exit. Queued tasks that no
    /// worker has taken yet complete with [`EngineError::PoolClosed`]; tasks
    /// already running finish normally. Does not wait for the workers.
    pub fn close(&self) {
        if self.queue.close() {
            log::info!("Closed worker pool with {} threads", self.worker_count);
        }
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Number of worker threads the pool was built with
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Number of queued tasks not yet taken by a worker
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();

        let workers = std::mem::take(&mut self.workers);
        for worker in workers {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("worker_count", &self.worker_count)
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn worker_loop(id: usize, queue: Arc<TaskQueue>) {
    log::debug!("Worker {} started", id);
    while let Some(job) = queue.pop() {
        job.run();
    }
    log::debug!("Worker {} exiting", id);
}
