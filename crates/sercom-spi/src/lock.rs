use portable_atomic::{AtomicBool, Ordering};

/// Single-holder, non-blocking lock over one bus.
///
/// Contention is only reported, never queued. The flag is shared with
/// interrupt context, so taking it is a single compare-exchange.
#[derive(Debug, Default)]
pub struct SpiLock {
    locked: AtomicBool,
}

impl SpiLock {
    pub const fn new() -> Self {
        Self { locked: AtomicBool::new(false) }
    }

    /// Take the lock if it is free.
    pub fn try_acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Advisory read; only `try_acquire` gives a guarantee.
    pub fn is_held(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    pub fn release(&self) {
        self.locked.store(false, Ordering::Release);
    }
}
