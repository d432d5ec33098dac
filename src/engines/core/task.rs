//! Tasks and their result slots
//!
//! A [`Task`] is one function application queued on a worker pool. Its
//! outcome is written exactly once into a [`TaskSlot`] that has its own lock
//! and condition variable, so a caller waiting on its batch never contends on
//! the pool-wide queue lock.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::interrupt::{Interrupt, Wake};
use crate::engines::{EngineError, EngineResult};

/// Type-erased unit of work as seen by a worker thread
pub(crate) trait Job: Send {
    /// Execute and publish the outcome.
    fn run(self: Box<Self>);

    /// Publish `error` without executing.
    fn abandon(self: Box<Self>, error: EngineError);
}

/// Result slot plus completion signal for a single task
pub(crate) struct TaskSlot<R> {
    outcome: Mutex<Option<EngineResult<R>>>,
    ready: Condvar,
}

impl<R: Send + 'static> TaskSlot<R> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(None),
            ready: Condvar::new(),
        })
    }

    pub(crate) fn complete(&self, outcome: EngineResult<R>) {
        let mut guard = self.outcome.lock();
        *guard = Some(outcome);
        self.ready.notify_all();
    }

    /// Block until the outcome is published, or until `interrupt` is raised.
    pub(crate) fn wait(self: &Arc<Self>, interrupt: Option<&Interrupt>) -> EngineResult<R> {
        let interrupt = match interrupt {
            Some(interrupt) => interrupt,
            None => {
                let mut guard = self.outcome.lock();
                loop {
                    if let Some(outcome) = guard.take() {
                        return outcome;
                    }
                    self.ready.wait(&mut guard);
                }
            }
        };

        let token = interrupt.park_on(self.clone());
        let result = self.wait_interruptible(interrupt);
        interrupt.unpark(token);
        result
    }

    fn wait_interruptible(&self, interrupt: &Interrupt) -> EngineResult<R> {
        let mut guard = self.outcome.lock();
        loop {
            if interrupt.is_raised() {
                return Err(EngineError::Interrupted);
            }
            if let Some(outcome) = guard.take() {
                return outcome;
            }
            self.ready.wait(&mut guard);
        }
    }
}

impl<R: Send + 'static> Wake for TaskSlot<R> {
    fn wake(&self) {
        // Taking the lock orders this notify after the waiter's flag check.
        let _guard = self.outcome.lock();
        self.ready.notify_all();
    }
}

/// One application of `func` to `input`
pub(crate) struct Task<I, R, F> {
    index: usize,
    func: Arc<F>,
    input: I,
    slot: Arc<TaskSlot<R>>,
}

impl<I, R, F> Task<I, R, F>
where
    R: Send + 'static,
    F: Fn(I) -> R,
{
    pub(crate) fn new(index: usize, func: Arc<F>, input: I) -> (Self, Arc<TaskSlot<R>>) {
        let slot = TaskSlot::new();
        let task = Self {
            index,
            func,
            input,
            slot: slot.clone(),
        };
        (task, slot)
    }
}

impl<I, R, F> Job for Task<I, R, F>
where
    I: Send,
    R: Send + 'static,
    F: Fn(I) -> R + Send + Sync,
{
    fn run(self: Box<Self>) {
        let Task {
            index,
            func,
            input,
            slot,
        } = *self;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| func(input))).map_err(|payload| {
            let error = EngineError::from_panic(index, payload);
            log::warn!("{}", error);
            error
        });
        slot.complete(outcome);
    }

    fn abandon(self: Box<Self>, error: EngineError) {
        self.slot.complete(Err(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_run_publishes_result() {
        let (task, slot) = Task::new(0, Arc::new(|x: i32| x * 2), 21);
        Box::new(task).run();
        assert_eq!(slot.wait(None).unwrap(), 42);
    }

    #[test]
    fn test_panic_is_captured() {
        let (task, slot) = Task::new(5, Arc::new(|x: i32| -> i32 {
            if x > 0 {
                panic!("positive input");
            }
            x
        }), 1);
        Box::new(task).run();

        match slot.wait(None) {
            Err(EngineError::TaskFailed { index, message }) => {
                assert_eq!(index, 5);
                assert!(message.contains("positive input"));
            }
            _ => panic!("Expected TaskFailed"),
        }
    }

    #[test]
    fn test_abandon_publishes_error() {
        let (task, slot) = Task::new(0, Arc::new(|x: u8| x), 1u8);
        Box::new(task).abandon(EngineError::PoolClosed);
        assert!(matches!(slot.wait(None), Err(EngineError::PoolClosed)));
    }

    #[test]
    fn test_wait_from_other_thread() {
        let slot: Arc<TaskSlot<&'static str>> = TaskSlot::new();
        let writer = slot.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.complete(Ok("done"));
        });

        assert_eq!(slot.wait(None).unwrap(), "done");
        handle.join().unwrap();
    }

    #[test]
    fn test_interrupt_wakes_waiter() {
        let slot: Arc<TaskSlot<u32>> = TaskSlot::new();
        let interrupt = Interrupt::new();
        let raiser = interrupt.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            raiser.raise();
        });

        assert!(matches!(slot.wait(Some(&interrupt)), Err(EngineError::Interrupted)));
        handle.join().unwrap();
    }

    #[test]
    fn test_already_raised_interrupt_returns_immediately() {
        let slot: Arc<TaskSlot<u32>> = TaskSlot::new();
        let interrupt = Interrupt::new();
        interrupt.raise();
        assert!(matches!(slot.wait(Some(&interrupt)), Err(EngineError::Interrupted)));
    }
}
