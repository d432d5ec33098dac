//! Cooperative interruption of callers blocked on task results
//!
//! Threads cannot be interrupted from outside, so a caller that wants to be
//! abortable hands an [`Interrupt`] to the blocking call. Raising it wakes
//! every caller currently parked on a task slot through that handle (or any
//! clone of it); each wait then returns
//! [`EngineError::Interrupted`](crate::engines::EngineError::Interrupted).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Something a blocked caller is parked on and that can be woken up.
pub(crate) trait Wake: Send + Sync {
    fn wake(&self);
}

/// Registration of one parked caller, released with [`Interrupt::unpark`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ParkToken(u64);

struct InterruptState {
    raised: AtomicBool,
    next_token: AtomicU64,
    parked: Mutex<HashMap<u64, Arc<dyn Wake>>>,
}

/// Cloneable interruption flag shared between a waiting caller and whoever
/// wants to abort it.
#[derive(Clone)]
pub struct Interrupt {
    state: Arc<InterruptState>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    /// Create a handle that is not raised
    pub fn new() -> Self {
        Self {
            state: Arc::new(InterruptState {
                raised: AtomicBool::new(false),
                next_token: AtomicU64::new(0),
                parked: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Raise the flag and wake every caller waiting on it. Stays raised
    /// until [`reset`](Self::reset).
    pub fn raise(&self) {
        self.state.raised.store(true, Ordering::SeqCst);
        let parked: Vec<Arc<dyn Wake>> = self.state.parked.lock().values().cloned().collect();
        for target in parked {
            target.wake();
        }
    }

    /// Whether the flag is currently raised
    pub fn is_raised(&self) -> bool {
        self.state.raised.load(Ordering::SeqCst)
    }

    /// Lower the flag so later waits block normally again
    pub fn reset(&self) {
        self.state.raised.store(false, Ordering::SeqCst);
    }

    // Must be called before the caller re-checks the flag under the target's
    // lock, otherwise a raise in between is lost.
    pub(crate) fn park_on(&self, target: Arc<dyn Wake>) -> ParkToken {
        let token = self.state.next_token.fetch_add(1, Ordering::Relaxed);
        self.state.parked.lock().insert(token, target);
        ParkToken(token)
    }

    pub(crate) fn unpark(&self, token: ParkToken) {
        self.state.parked.lock().remove(&token.0);
    }

    #[cfg(test)]
    pub(crate) fn parked_count(&self) -> usize {
        self.state.parked.lock().len()
    }
}

impl std::fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interrupt")
            .field("raised", &self.is_raised())
            .finish()
    }
}
