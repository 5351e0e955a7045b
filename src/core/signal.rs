//! Purpose: In-process counting signal used to hand one result across threads.
//! Exports: `Signal`.
//! Role: Blocking primitive behind the callback-to-blocking fetch adapter.
//! Invariants: Count starts at zero; a post before a wait is remembered, never lost.
//! Invariants: Poisoned locks are recovered because the count is plain data.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct Signal {
    count: Mutex<u64>,
    ready: Condvar,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self) {
        let mut count = self.lock();
        *count += 1;
        self.ready.notify_one();
    }

    pub fn wait(&self) {
        let mut count = self.lock();
        while *count == 0 {
            count = self
                .ready
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *count -= 1;
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
