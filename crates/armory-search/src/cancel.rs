//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag for one search.
///
/// Clones observe the same flag. Cancellation is terminal: once set, the
/// flag is never cleared, and a new search needs a new handle.
///
/// # Example
///
/// ```
/// use armory_search::CancellationHandle;
///
/// let handle = CancellationHandle::new();
/// let worker_view = handle.clone();
///
/// handle.cancel();
/// assert!(worker_view.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    flag: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Safe to call from any thread, any number of
    /// times.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
