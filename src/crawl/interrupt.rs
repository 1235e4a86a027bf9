// src/crawl/interrupt.rs
// =============================================================================
// Operator stop request (ctrl-c), shared between the signal listener task and
// the crawl loop.
//
// The loop polls `is_triggered()` between pages and races `triggered()`
// against the politeness sleep, so a stop is noticed before the next request
// is sent but never cuts a request in half.
//
// Rust concepts:
// - Arc: the ctrl-c task and the crawler share one flag
// - AtomicBool: a bool that several threads can set and read without a Mutex
// - tokio::sync::Notify: lets the crawler sleep until the flag is set
// =============================================================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

/// Cloneable stop flag. All clones observe the same request.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    inner: Arc<Inner>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Idempotent.
    pub fn trigger(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Resolves once a stop has been requested.
    pub async fn triggered(&self) {
        // Register before checking the flag so a trigger in between is not lost
        let notified = self.inner.notify.notified();
        if self.is_triggered() {
            return;
        }
        notified.await;
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why create `notified()` before checking the flag?
//    - A trigger that lands between the check and the await would otherwise be missed
//    - Notify only remembers wakeups for futures that already exist
//
// 2. Why is Interrupt Clone?
//    - Cloning copies the Arc, not the flag, so every clone sees the same state
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_clones_share_state() {
        let interrupt = Interrupt::new();
        let handle = interrupt.clone();
        assert!(!interrupt.is_triggered());
        handle.trigger();
        assert!(interrupt.is_triggered());
    }

    #[tokio::test]
    async fn test_triggered_resolves_after_trigger() {
        let interrupt = Interrupt::new();
        let handle = interrupt.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.trigger();
        });
        tokio::time::timeout(Duration::from_secs(5), interrupt.triggered())
            .await
            .expect("interrupt was not observed");
    }

    #[tokio::test]
    async fn test_triggered_resolves_when_already_set() {
        let interrupt = Interrupt::new();
        interrupt.trigger();
        interrupt.triggered().await;
    }
}
