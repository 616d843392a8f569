//! Session and authentication state for the storefront shell.
//!
//! Provides the current-user store, derived authorization flags, and the
//! hard-navigation seam used by logout and global 401 handling.

mod error;
mod location;
mod session;
mod user;

pub use error::AuthError;
pub use location::{MemoryLocation, PageLocation};
pub use session::{
    SessionEndpoints, SessionState, SessionStore, SessionStoreBuilder, WeakSessionStore,
};
pub use user::{User, UserInfo};
