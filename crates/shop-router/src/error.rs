//! Routing errors.

use thiserror::Error;

/// Errors building or resolving against the route table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No route (not even a catch-all) matches the path.
    #[error("no route matches {0}")]
    NoMatch(String),

    /// Named target does not exist.
    #[error("unknown route name: {0}")]
    UnknownName(String),

    /// Named target needs a param that was not supplied.
    #[error("route {route} requires param {param}")]
    MissingParam { route: String, param: String },

    /// Two routes share a name.
    #[error("duplicate route name: {0}")]
    DuplicateName(String),

    /// Malformed path pattern.
    #[error("invalid route pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Reasons a navigation did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Target or redirect could not be resolved.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Guards kept redirecting.
    #[error("too many redirects navigating to {0}")]
    TooManyRedirects(String),

    /// A newer navigation started before this one was confirmed.
    #[error("navigation to {0} was superseded")]
    Cancelled(String),
}
