//! Navigation guards.

use async_trait::async_trait;

use crate::{NavigationTarget, ResolvedRoute};

/// What a guard decided about a pending navigation.
///
/// A guard returns exactly one decision per call, so a navigation can never
/// be left waiting on a guard that forgot to answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the navigation continue to the next guard, or commit it.
    Allow,
    /// Abandon this target and navigate to another one instead.
    Redirect(NavigationTarget),
}

/// Hook invoked before every route transition.
#[async_trait]
pub trait NavigationGuard: Send + Sync {
    async fn before_each(&self, to: &ResolvedRoute, from: Option<&ResolvedRoute>) -> GuardDecision;
}
