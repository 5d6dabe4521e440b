//! Cooperative shutdown controller.
//!
//! `main.rs` trips this from OS signals; the monitor loop waits on it.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;

/// Cooperative shutdown signal used for graceful exit.
///
/// Requesting shutdown more than once is a no-op, so repeated signals never
/// run the shutdown path twice.
#[derive(Clone, Debug, Default)]
pub struct ShutdownController {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    requested: AtomicBool,
    notify: Notify,
}

impl ShutdownController {
    /// Create a controller that has not been tripped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// Request shutdown and wake all waiters.
    ///
    /// Returns `true` only for the call that actually flipped the flag.
    pub fn request_shutdown(&self) -> bool {
        let first = !self.inner.requested.swap(true, Ordering::SeqCst);
        if first {
            self.inner.notify.notify_waiters();
        }
        first
    }

    /// Wait until shutdown is requested.
    pub async fn wait(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // 登録してからフラグを確認し、request_shutdownとの競合で通知を取りこぼさない
        notified.as_mut().enable();
        if self.is_shutdown_requested() {
            return;
        }
        notified.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn request_is_idempotent() {
        let shutdown = ShutdownController::new();
        assert!(!shutdown.is_shutdown_requested());
        assert!(shutdown.request_shutdown());
        assert!(!shutdown.request_shutdown());
        assert!(shutdown.is_shutdown_requested());
    }

    #[tokio::test]
    async fn wait_returns_immediately_after_request() {
        let shutdown = ShutdownController::new();
        shutdown.request_shutdown();
        tokio::time::timeout(Duration::from_secs(1), shutdown.wait())
            .await
            .expect("wait should complete");
    }

    #[tokio::test]
    async fn wait_wakes_clones() {
        let shutdown = ShutdownController::new();
        let waiter = shutdown.clone();
        let handle = tokio::spawn(async move { waiter.wait().await });

        tokio::task::yield_now().await;
        shutdown.request_shutdown();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
