use std::num::NonZeroUsize;
use std::sync::Arc;

use super::Semaphore;

/// Caps the number of grep workers running at once.
///
/// The capacity is fixed at construction. Crawlers call [`WorkerPool::acquire`]
/// before starting a worker; that call is the only backpressure in the system
/// and bounds open files and threads no matter how large the tree is.
#[derive(Debug)]
pub struct WorkerPool {
    slots: Arc<Semaphore>,
    capacity: NonZeroUsize,
}

impl WorkerPool {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(capacity.get())),
            capacity,
        }
    }

    /// Blocks until a slot is free and hands it out
    pub fn acquire(&self) -> PoolSlot {
        self.slots.acquire();
        PoolSlot {
            slots: Arc::clone(&self.slots),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Slots not currently held by a worker
    pub fn available(&self) -> usize {
        self.slots.available()
    }
}

/// One occupied pool slot, returned to the pool when dropped
#[derive(Debug)]
pub struct PoolSlot {
    slots: Arc<Semaphore>,
}

impl PoolSlot {
    /// Returns the slot now; same as dropping it
    pub fn release(self) {}
}

impl Drop for PoolSlot {
    fn drop(&mut self) {
        self.slots.release();
    }
}
