use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// A single cancellable delayed action.
///
/// At most one action is pending at a time: scheduling a new one cancels the
/// previous one first. Dropping the `Deferred` cancels whatever is pending.
///
/// Cancellation aborts the timer task. On a multi-threaded runtime the action
/// may already be running when `cancel` is called, so actions that must not
/// apply late should also check a generation token of their own.
#[derive(Debug, Default)]
pub struct Deferred {
    pending: Option<JoinHandle<()>>,
}

impl Deferred {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `action` after `delay`. Must be called from within a Tokio runtime.
    pub fn schedule<F>(&mut self, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        trace!(delay_ms = delay.as_millis() as u64, "deferred action scheduled");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    /// Cancels the pending action.
    ///
    /// Returns `true` if an action was still waiting to run.
    pub fn cancel(&mut self) -> bool {
        let Some(handle) = self.pending.take() else {
            return false;
        };
        let was_pending = !handle.is_finished();
        handle.abort();
        if was_pending {
            trace!("deferred action cancelled");
        }
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Deferred {
    fn drop(&mut self) {
        self.cancel();
    }
}
