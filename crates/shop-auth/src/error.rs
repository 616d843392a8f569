//! Authentication errors.

use shop_data::FetchError;
use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authenticated, but not allowed to see the target.
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// Loading the current user failed (network or HTTP error).
    #[error("session fetch failed: {0}")]
    SessionFetch(#[from] FetchError),
}

impl AuthError {
    /// Check if this is an authentication failure.
    ///
    /// A failed session fetch counts: the client cannot tell a dead session
    /// from an unreachable backend.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, AuthError::SessionFetch(_))
    }
}
