//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use shop_core::prelude::*;
//! ```

pub use shop_auth::{AuthError, PageLocation, SessionStore, User};
pub use shop_data::prelude::*;
pub use shop_notify::{CopyFeedback, Toast, ToastKind, ToastStore};
pub use shop_router::prelude::*;
pub use shop_router::NavigationError;

pub use crate::{Shell, ShellConfig, ShellError};
