//! Cooperative cancellation shared by every stage of one open file
//!
//! Each blocking component (the uncompressed stream and the record queue)
//! registers itself with the file's [`AbortToken`]. Aborting sets the flag and
//! then wakes every registered component, so a thread blocked in a condition
//! variable wait or a channel select returns.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

/// A component with blocked waiters that must observe an abort
pub trait Wake: Send + Sync {
    /// Wake all waiters. Implementations take their own lock before
    /// notifying so a waiter cannot miss the flag between check and wait.
    fn wake(&self);
}

#[derive(Default)]
struct TokenInner {
    aborted: AtomicBool,
    listeners: Mutex<Vec<Weak<dyn Wake>>>,
}

/// Broadcast cancellation flag; clones share the same state
#[derive(Clone, Default)]
pub struct AbortToken {
    inner: Arc<TokenInner>,
}

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_aborted(&self) -> bool {
        self.inner.aborted.load(Ordering::Acquire)
    }

    /// Set the flag and wake every registered component. Idempotent.
    pub fn abort(&self) {
        if self.inner.aborted.swap(true, Ordering::AcqRel) {
            return;
        }
        log::debug!("Abort requested");
        let listeners: Vec<_> = self.inner.listeners.lock().clone();
        for listener in listeners.iter().filter_map(Weak::upgrade) {
            listener.wake();
        }
    }

    /// Register a component to be woken on abort.
    ///
    /// A component registered after the abort is woken immediately.
    pub fn register(&self, listener: Weak<dyn Wake>) {
        {
            let mut listeners = self.inner.listeners.lock();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.push(listener.clone());
        }
        if self.is_aborted() {
            if let Some(listener) = listener.upgrade() {
                listener.wake();
            }
        }
    }
}

impl std::fmt::Debug for AbortToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbortToken")
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl Wake for Counter {
        fn wake(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_abort_wakes_listeners_once() {
        let token = AbortToken::new();
        let counter = Arc::new(Counter::default());
        let weak: Weak<dyn Wake> = Arc::downgrade(&counter) as Weak<dyn Wake>;
        token.register(weak);

        assert!(!token.is_aborted());
        token.abort();
        token.abort();
        assert!(token.is_aborted());
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_registration_is_woken() {
        let token = AbortToken::new();
        token.clone().abort();

        let counter = Arc::new(Counter::default());
        token.register(Arc::downgrade(&counter) as Weak<dyn Wake>);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dropped_listeners_are_skipped() {
        let token = AbortToken::new();
        let counter = Arc::new(Counter::default());
        token.register(Arc::downgrade(&counter) as Weak<dyn Wake>);
        drop(counter);
        token.abort();
        assert!(token.is_aborted());
    }
}
