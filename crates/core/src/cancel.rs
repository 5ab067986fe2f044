// SPDX-License-Identifier: MIT

//! Cooperative cancellation handle.
//!
//! A shared flag polled at suspension points in place of an async
//! cancellation fabric. [`CancelToken`] is that flag: cheap to clone,
//! composable via [`CancelToken::any_of`], and checked at every suspension
//! point: before a step, before a retry sleep, before the model call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self { inner: Arc::new(Inner { cancelled: AtomicBool::new(false), notify: Notify::new() }) }
    }

    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until cancelled. Returns immediately if already cancelled.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let notified = self.inner.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// Compose N tokens: the returned token fires as soon as any of them does.
    ///
    /// Used by the Pipeline Engine to bind a parallel step's in-flight
    /// sub-tasks to a single internal handle, and by the Agent Executor to
    /// bind the caller's cancellation to a per-call timeout.
    pub fn any_of(tokens: impl IntoIterator<Item = CancelToken>) -> CancelToken {
        let composite = CancelToken::new();
        for t in tokens {
            let composite = composite.clone();
            tokio::spawn(async move {
                t.cancelled().await;
                composite.cancel();
            });
        }
        composite
    }

    /// A cancellable sleep: resolves to `Err(())` if cancelled before the
    /// duration elapses, `Ok(())` otherwise.
    pub async fn sleep(&self, duration: std::time::Duration) -> Result<(), ()> {
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = self.cancelled() => Err(()),
        }
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
