//! "Copied!" feedback for copy-to-clipboard buttons.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::timer::ResetTimer;

/// How long the copied flag stays up.
pub const DEFAULT_COPY_FEEDBACK: Duration = Duration::from_millis(2000);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write denied")]
    Denied,
}

/// System clipboard access.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard kept in memory.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}

struct FeedbackState {
    copied: AtomicBool,
    // Bumped on every copy; held while the reset is scheduled.
    generation: Mutex<u64>,
}

impl FeedbackState {
    fn generation(&self) -> MutexGuard<'_, u64> {
        self.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Copies text and raises a short-lived `copied` flag.
pub struct CopyFeedback {
    clipboard: Arc<dyn Clipboard>,
    state: Arc<FeedbackState>,
    timer: ResetTimer,
    reset_after: Duration,
}

impl CopyFeedback {
    pub fn new(clipboard: Arc<dyn Clipboard>) -> Self {
        Self::with_reset(clipboard, DEFAULT_COPY_FEEDBACK)
    }

    pub fn with_reset(clipboard: Arc<dyn Clipboard>, reset_after: Duration) -> Self {
        Self {
            clipboard,
            state: Arc::new(FeedbackState {
                copied: AtomicBool::new(false),
                generation: Mutex::new(0),
            }),
            timer: ResetTimer::new(),
            reset_after,
        }
    }

    /// Copy `text`. Returns whether the clipboard accepted it.
    pub async fn copy(&self, text: &str) -> bool {
        if let Err(error) = self.clipboard.write_text(text).await {
            tracing::error!(%error, "Failed to copy");
            return false;
        }

        let mut current = self.state.generation();
        *current += 1;
        let generation = *current;
        self.state.copied.store(true, Ordering::SeqCst);

        let state = Arc::downgrade(&self.state);
        self.timer.schedule(self.reset_after, move || {
            let Some(state) = state.upgrade() else { return };
            let current = state.generation();
            if *current == generation {
                state.copied.store(false, Ordering::SeqCst);
            }
        });
        true
    }

    /// The last copy succeeded recently.
    pub fn copied(&self) -> bool {
        self.state.copied.load(Ordering::SeqCst)
    }
}
