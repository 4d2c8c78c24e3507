//! Blocking coordination primitives shared by crawlers, grep workers and the
//! reporter.
//!
//! Both the worker pool and the notification channel are counting semaphores
//! underneath: the pool starts full and hands out slots, the notifier starts
//! empty and accumulates posted events.

pub mod notify;
pub mod pool;

pub use notify::Notifier;
pub use pool::{PoolSlot, WorkerPool};

use parking_lot::{Condvar, Mutex};

/// Counting semaphore built on a mutex-guarded counter and a condition variable
#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Blocks until a permit is available, then takes it
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Returns one permit and wakes a single waiter. Never blocks beyond the
    /// counter's own short critical section.
    pub fn release(&self) {
        *self.permits.lock() += 1;
        self.available.notify_one();
    }

    /// Permits currently available
    pub fn available(&self) -> usize {
        *self.permits.lock()
    }
}
