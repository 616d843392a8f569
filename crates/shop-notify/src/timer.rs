//! Replace-on-preempt timer.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Runs a callback once after a delay. Scheduling again cancels whatever
/// was pending, so at most one callback is ever outstanding.
#[derive(Debug, Default)]
pub struct ResetTimer {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ResetTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending callback, then run `f` after `delay`.
    ///
    /// Outside a Tokio runtime nothing is scheduled and a warning is logged.
    pub fn schedule<F>(&self, delay: Duration, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!("no async runtime, timer not scheduled");
            return;
        };
        *pending = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            f();
        }));
    }

    /// Cancel the pending callback, if any.
    pub fn cancel(&self) {
        if let Some(previous) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            previous.abort();
        }
    }

    /// A callback is scheduled and has not run yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ResetTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_fires_once_after_delay() {
        let timer = ResetTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        timer.schedule(Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(timer.is_pending());

        sleep(Duration::from_millis(99)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_cancels_previous() {
        let timer = ResetTimer::new();
        let fired = Arc::new(Mutex::new(Vec::new()));

        let log = fired.clone();
        timer.schedule(Duration::from_millis(100), move || {
            log.lock().unwrap().push("first")
        });
        sleep(Duration::from_millis(50)).await;
        let log = fired.clone();
        timer.schedule(Duration::from_millis(100), move || {
            log.lock().unwrap().push("second")
        });

        sleep(Duration::from_millis(200)).await;
        assert_eq!(*fired.lock().unwrap(), vec!["second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let timer = ResetTimer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        let counter = fired.clone();
        timer.schedule(Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel();

        sleep(Duration::from_millis(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_outside_runtime_does_not_panic() {
        let timer = ResetTimer::new();
        timer.schedule(Duration::from_millis(10), || {});
        assert!(!timer.is_pending());
    }
}
