//! Single-slot toast notifications.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timer::ResetTimer;

/// Default time a toast stays visible.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Success,
    Error,
}

/// What the toast slot currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub visible: bool,
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Default)]
struct Slot {
    toast: Toast,
    // Bumped on every show; a hide callback only applies to its own toast.
    generation: u64,
}

struct ToastInner {
    slot: Mutex<Slot>,
    timer: ResetTimer,
    default_duration: Duration,
}

/// Holds at most one toast. Showing a new toast replaces the current one
/// and restarts the hide timer; there is no queue.
///
/// Timers run on the ambient Tokio runtime.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<ToastInner>,
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastStore {
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_TOAST_DURATION)
    }

    /// Store whose `success`/`error` toasts last `duration`.
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            inner: Arc::new(ToastInner {
                slot: Mutex::new(Slot::default()),
                timer: ResetTimer::new(),
                default_duration: duration,
            }),
        }
    }

    /// Show `message` now and hide it after `duration` unless another toast
    /// replaces it first.
    pub fn show_toast(&self, message: impl Into<String>, kind: ToastKind, duration: Duration) {
        let mut slot = self.slot();
        slot.generation += 1;
        slot.toast = Toast {
            visible: true,
            message: message.into(),
            kind,
        };
        let generation = slot.generation;

        // Scheduled under the slot lock so timers are replaced in show order.
        let inner = Arc::downgrade(&self.inner);
        self.inner.timer.schedule(duration, move || {
            let Some(inner) = inner.upgrade() else { return };
            let mut slot = inner.slot.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.generation == generation {
                slot.toast.visible = false;
            }
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show_toast(message, ToastKind::Success, self.inner.default_duration);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show_toast(message, ToastKind::Error, self.inner.default_duration);
    }

    /// Snapshot of the slot.
    pub fn current(&self) -> Toast {
        self.slot().toast.clone()
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.inner.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_toast_hides_after_duration() {
        let toasts = ToastStore::new();
        toasts.success("Saved");

        assert_eq!(
            toasts.current(),
            Toast {
                visible: true,
                message: "Saved".into(),
                kind: ToastKind::Success
            }
        );

        sleep(Duration::from_millis(1999)).await;
        assert!(toasts.current().visible);

        sleep(Duration::from_millis(2)).await;
        let toast = toasts.current();
        assert!(!toast.visible);
        assert_eq!(toast.message, "Saved");
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_toast_preempts() {
        let toasts = ToastStore::new();
        toasts.success("A");
        sleep(Duration::from_millis(1500)).await;
        toasts.error("B");

        // A's deadline passes without hiding B.
        sleep(Duration::from_millis(600)).await;
        let toast = toasts.current();
        assert!(toast.visible);
        assert_eq!(toast.message, "B");
        assert_eq!(toast.kind, ToastKind::Error);

        sleep(Duration::from_millis(1500)).await;
        assert!(!toasts.current().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_last_wins() {
        let toasts = ToastStore::new();
        toasts.show_toast("A", ToastKind::Success, Duration::from_millis(100));
        toasts.show_toast("B", ToastKind::Success, Duration::from_millis(5000));

        sleep(Duration::from_millis(200)).await;
        assert_eq!(toasts.current().message, "B");
        assert!(toasts.current().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_default_duration() {
        let toasts = ToastStore::with_duration(Duration::from_millis(500));
        toasts.error("Payment failed");

        sleep(Duration::from_millis(501)).await;
        assert!(!toasts.current().visible);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_shows_leave_last_toast_hiding() {
        for _ in 0..20 {
            let toasts = ToastStore::with_duration(Duration::from_millis(10));
            let tasks: Vec<_> = (0..4)
                .map(|i| {
                    let toasts = toasts.clone();
                    tokio::spawn(async move { toasts.success(format!("toast {}", i)) })
                })
                .collect();
            for task in tasks {
                task.await.unwrap();
            }

            sleep(Duration::from_millis(60)).await;
            assert!(!toasts.current().visible);
        }
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(serde_json::to_string(&ToastKind::Error).unwrap(), r#""error""#);
    }
}
