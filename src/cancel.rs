use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation handle for a blocked [`execute_cancellable`] call.
///
/// Clones share the same flag, so one clone can be handed to the waiting
/// thread and another kept by whoever decides to give up. Once cancelled a
/// token stays cancelled.
///
/// ```rust
/// use rate_gate::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
///
/// [`execute_cancellable`]: crate::gate::TokenBucketGate::execute_cancellable
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Waiters observe it within their poll interval.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
