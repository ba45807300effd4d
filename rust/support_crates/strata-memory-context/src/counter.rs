use std::sync::atomic::{AtomicU64, Ordering};

/// A thread-safe usage counter that multiple consumers can grow and shrink
/// concurrently, optionally refusing growth past a limit.
///
/// The counter never goes below zero: releasing more than is held clamps to zero.
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a new `Counter` with the given initial amount.
    pub fn new(amount: u64) -> Counter {
        Counter(AtomicU64::new(amount))
    }

    /// Attempts to add `amount` to the counter without the result exceeding `limit`.
    ///
    /// Returns `true` if the amount was added. Otherwise the counter remains
    /// unchanged and `false` is returned.
    ///
    /// This operation uses atomic compare-and-exchange operations to ensure correctness when
    /// multiple threads are attempting to grow the counter concurrently.
    pub fn try_add(&self, amount: u64, limit: u64) -> bool {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let Some(next) = current.checked_add(amount).filter(|&next| next <= limit) else {
                return false;
            };
            match self.0.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(updated) => current = updated,
            }
        }
    }

    /// Adds `amount` to the counter unconditionally.
    pub fn add(&self, amount: u64) {
        self.0.fetch_add(amount, Ordering::AcqRel);
    }

    /// Subtracts `amount` from the counter, clamping at zero.
    ///
    /// Returns the amount actually subtracted.
    pub fn sub(&self, amount: u64) -> u64 {
        let mut current = self.0.load(Ordering::Relaxed);
        loop {
            let taken = current.min(amount);
            match self.0.compare_exchange_weak(
                current,
                current - taken,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return taken,
                Err(updated) => current = updated,
            }
        }
    }

    /// Returns the counter value (most likely stale by the time it is observed by the caller).
    pub fn read(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}
