use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Hands out strictly increasing ids starting at 1. Shared between the
/// caller-side handle, which needs ids synchronously, and the service task.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl IdAllocator {
    pub fn next<T: From<u64>>(&self) -> T {
        T::from(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
