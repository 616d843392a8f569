//! Full-page navigation.

use std::sync::{Mutex, PoisonError};

/// The page's address bar: assigning leaves the application entirely.
///
/// Router navigation never goes through here. Only hard redirects do
/// (logout, global 401 handling), which reload the shell from scratch.
pub trait PageLocation: Send + Sync {
    /// Navigate the whole page to `href`.
    fn assign(&self, href: &str);
}

/// A location that records hard navigations instead of performing them.
#[derive(Debug, Default)]
pub struct MemoryLocation {
    visits: Mutex<Vec<String>>,
}

impl MemoryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every href assigned so far, oldest first.
    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent href, i.e. where the page would be now.
    pub fn current(&self) -> Option<String> {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl PageLocation for MemoryLocation {
    fn assign(&self, href: &str) {
        tracing::info!(href, "hard navigation");
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(href.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_assignment_wins() {
        let location = MemoryLocation::new();
        assert_eq!(location.current(), None);

        location.assign("/auth/logout");
        location.assign("/login");

        assert_eq!(location.visits(), vec!["/auth/logout", "/login"]);
        assert_eq!(location.current().as_deref(), Some("/login"));
    }
}
