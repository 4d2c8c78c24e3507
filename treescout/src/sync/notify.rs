use super::Semaphore;

/// Accumulating "something changed" signal.
///
/// Every post is counted and every wait consumes exactly one, so no event is
/// ever lost. Producers never wait for the consumer; posts made while the
/// reporter is busy queue up and turn into extra, harmless wake-ups.
#[derive(Debug)]
pub struct Notifier {
    events: Semaphore,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            events: Semaphore::new(0),
        }
    }

    /// Records one state change
    pub fn post(&self) {
        self.events.release();
    }

    /// Sleeps until at least one event is pending and consumes it
    pub fn wait(&self) {
        self.events.acquire();
    }

    /// Events posted but not yet consumed
    pub fn pending(&self) -> usize {
        self.events.available()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
