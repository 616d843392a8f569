//! User types.

use serde::{Deserialize, Serialize};

/// The signed-in shopper, as returned by the user-info endpoint.
///
/// Only `is_admin` drives authorization; the rest is display data and
/// defaults when the backend omits it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct User {
    /// User ID.
    pub id: u64,
    /// Login handle on the identity provider.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Trust level granted by the identity provider.
    pub trust_level: i32,
    /// Store credit.
    pub balance: f64,
    /// Store administrator flag.
    pub is_admin: bool,
    /// Blocked from purchasing.
    pub is_blocked: bool,
    /// RFC 3339 timestamp of the last login.
    pub last_login_at: Option<String>,
}

impl User {
    /// Get display name, falling back to the username.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// Body of `GET /api/user/info`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub user: User,
}
