//! Cancellation scope for a mounted form session.
//!
//! Requests started by a form session may settle after the session has been closed. Each
//! session owns one [`SessionScope`]; clones are handed to pending work, which must check the
//! scope before touching session state and drop its result when the scope is cancelled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct SessionScope {
    cancelled: Arc<AtomicBool>,
}

impl SessionScope {
    /// Creates a live scope. Clones share the same cancellation flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctrls_core::SessionScope;
    ///
    /// let scope = SessionScope::new();
    /// let pending = scope.clone();
    /// assert_eq!(pending.keep(1), Some(1));
    /// scope.cancel();
    /// assert!(pending.is_cancelled());
    /// assert_eq!(pending.keep(2), None);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the session as gone. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once any clone of this scope has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Pass `value` through while the scope is live; discard it once cancelled.
    pub fn keep<T>(&self, value: T) -> Option<T> {
        if self.is_cancelled() {
            None
        } else {
            Some(value)
        }
    }
}
