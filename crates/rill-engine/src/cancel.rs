//! Cooperative cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A one-shot, revocable cancellation signal shared between the party that
/// requests interruption and the interpreter that honors it.
///
/// Cloning is cheap; all clones observe the same flag. Firing the token is
/// idempotent. The interpreter polls it at statement boundaries and loop
/// iterations, and blocking natives poll it between slices of their waits,
/// so cancellation lands at the next cooperative checkpoint rather than
/// immediately.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, unfired token.
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Safe to call any number of times.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
