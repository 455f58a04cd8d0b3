//! One-shot Deferred Actions
//!
//! A timer-backed task that runs a closure once after a delay. The handle owns
//! the task: cancelling (or dropping) the handle before the delay elapses
//! discards the action without running it.

use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle to a scheduled one-shot action
#[derive(Debug)]
pub struct DeferredTask {
    handle: JoinHandle<()>,
}

impl DeferredTask {
    /// Run `action` once after `delay` on the current tokio runtime
    ///
    /// Returns `None` without running `action` when called outside a runtime.
    pub fn schedule<F>(delay: Duration, action: F) -> Option<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime, deferred action skipped");
            return None;
        };

        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        Some(Self { handle })
    }

    /// Discard the action if it has not run yet
    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            tracing::debug!("Cancelling deferred action");
            self.handle.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for DeferredTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
