use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// A small, blocking counting semaphore bounding the number of in-flight chunks.
pub(crate) struct Semaphore {
    permits: Mutex<usize>,
    cv: Condvar,
}

/// A held permit; released on drop.
pub(crate) struct Permit<'a> {
    sem: &'a Semaphore,
}

impl Semaphore {
    pub(crate) fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits.max(1)),
            cv: Condvar::new(),
        }
    }

    // The counter stays consistent even if a holder panicked, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.permits.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire one permit, blocking until available.
    ///
    /// Also returns the time spent waiting (zero if no wait was required).
    pub(crate) fn acquire(&self) -> (Permit<'_>, Duration) {
        let start = Instant::now();
        let mut waited = false;
        let mut g = self.lock();
        while *g == 0 {
            waited = true;
            g = self.cv.wait(g).unwrap_or_else(PoisonError::into_inner);
        }
        *g -= 1;
        let wait = if waited { start.elapsed() } else { Duration::ZERO };
        (Permit { sem: self }, wait)
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        *self.sem.lock() += 1;
        self.sem.cv.notify_one();
    }
}
