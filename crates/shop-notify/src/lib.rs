//! Ephemeral, timed UI state for the storefront shell.
//!
//! Both stores here follow the same pattern: a single slot of state, set
//! immediately, cleared by a timer that is cancelled and restarted whenever
//! the slot is set again.
//!
//! - [`ToastStore`] - one transient toast message at a time
//! - [`CopyFeedback`] - the "copied" flag behind copy-to-clipboard buttons

mod copy;
mod timer;
mod toast;

pub use copy::{Clipboard, ClipboardError, CopyFeedback, MemoryClipboard, DEFAULT_COPY_FEEDBACK};
pub use timer::ResetTimer;
pub use toast::{Toast, ToastKind, ToastStore, DEFAULT_TOAST_DURATION};
