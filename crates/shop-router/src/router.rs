//! Client-side router: resolve, guard, commit.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::{
    GuardDecision, NavigationError, NavigationGuard, NavigationTarget, ResolvedRoute,
    RouteRegistry,
};

/// Upper bound on guard redirects within one navigation.
pub const MAX_REDIRECTS: usize = 10;

/// A completed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Where the navigation ended.
    pub route: ResolvedRoute,
    /// Full path originally requested, when guards redirected.
    pub redirected_from: Option<String>,
}

/// Owns the route table, the guard chain and the current route.
///
/// Navigations may overlap. Each one is stamped when it starts; only the
/// most recently started navigation is allowed to commit.
pub struct Router {
    registry: RouteRegistry,
    guards: Vec<Arc<dyn NavigationGuard>>,
    current: RwLock<Option<ResolvedRoute>>,
    latest: AtomicU64,
}

impl Router {
    pub fn new(registry: RouteRegistry) -> Self {
        Self {
            registry,
            guards: Vec::new(),
            current: RwLock::new(None),
            latest: AtomicU64::new(0),
        }
    }

    /// Register a guard. Guards run in registration order.
    pub fn before_each(mut self, guard: Arc<dyn NavigationGuard>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// The committed route, `None` before the first navigation.
    pub fn current(&self) -> Option<ResolvedRoute> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Navigate to `target`, running every guard on every hop.
    pub async fn push(
        &self,
        target: impl Into<NavigationTarget>,
    ) -> Result<Navigation, NavigationError> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let requested = self.registry.resolve(&target.into())?;
        let from = self.current();

        let mut to = requested.clone();
        let mut redirects = 0;
        'hop: loop {
            for guard in &self.guards {
                let decision = guard.before_each(&to, from.as_ref()).await;
                if self.latest.load(Ordering::SeqCst) != ticket {
                    tracing::debug!(to = %to.full_path(), "navigation superseded");
                    return Err(NavigationError::Cancelled(to.full_path()));
                }
                if let GuardDecision::Redirect(next) = decision {
                    redirects += 1;
                    if redirects > MAX_REDIRECTS {
                        return Err(NavigationError::TooManyRedirects(requested.full_path()));
                    }
                    to = self.registry.resolve(&next)?;
                    tracing::debug!(
                        from = %requested.full_path(),
                        to = %to.full_path(),
                        "guard redirect"
                    );
                    continue 'hop;
                }
            }
            break;
        }

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(to.clone());
        tracing::debug!(path = %to.full_path(), "navigated");
        Ok(Navigation {
            redirected_from: (redirects > 0).then(|| requested.full_path()),
            route: to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RouteRecord;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    fn registry() -> RouteRegistry {
        RouteRegistry::new(vec![
            RouteRecord::new("/", "views/Home").named("Home"),
            RouteRecord::new("/login", "views/Login").named("Login"),
            RouteRecord::new("/orders", "views/Orders").named("Orders").requires_auth(),
            RouteRecord::new("/loop", "views/Loop").named("Loop"),
        ])
        .unwrap()
    }

    /// Sends protected routes to Login and counts calls.
    #[derive(Default)]
    struct DenyProtected(AtomicUsize);

    #[async_trait]
    impl NavigationGuard for DenyProtected {
        async fn before_each(
            &self,
            to: &ResolvedRoute,
            _from: Option<&ResolvedRoute>,
        ) -> GuardDecision {
            self.0.fetch_add(1, Ordering::SeqCst);
            if to.meta.requires_auth() {
                GuardDecision::Redirect(NavigationTarget::named("Login"))
            } else {
                GuardDecision::Allow
            }
        }
    }

    struct AlwaysLoop;

    #[async_trait]
    impl NavigationGuard for AlwaysLoop {
        async fn before_each(
            &self,
            _to: &ResolvedRoute,
            _from: Option<&ResolvedRoute>,
        ) -> GuardDecision {
            GuardDecision::Redirect(NavigationTarget::named("Loop"))
        }
    }

    /// Holds navigations to `/orders` until released.
    #[derive(Default)]
    struct Gate(Notify);

    #[async_trait]
    impl NavigationGuard for Gate {
        async fn before_each(
            &self,
            to: &ResolvedRoute,
            _from: Option<&ResolvedRoute>,
        ) -> GuardDecision {
            if to.path() == "/orders" {
                self.0.notified().await;
            }
            GuardDecision::Allow
        }
    }

    #[tokio::test]
    async fn test_push_without_guards() {
        let router = Router::new(registry());
        assert!(router.current().is_none());

        let nav = router.push("/orders").await.unwrap();
        assert!(nav.route.is_named("Orders"));
        assert_eq!(nav.redirected_from, None);
        assert_eq!(router.current(), Some(nav.route));
    }

    #[tokio::test]
    async fn test_redirect_runs_guards_again() {
        let guard = Arc::new(DenyProtected::default());
        let router = Router::new(registry()).before_each(guard.clone());

        let nav = router.push("/orders").await.unwrap();

        assert!(nav.route.is_named("Login"));
        assert_eq!(nav.redirected_from.as_deref(), Some("/orders"));
        // Once for /orders, once for /login.
        assert_eq!(guard.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_redirect_loop_is_bounded() {
        let router = Router::new(registry()).before_each(Arc::new(AlwaysLoop));
        assert_eq!(
            router.push("/").await,
            Err(NavigationError::TooManyRedirects("/".into()))
        );
        assert!(router.current().is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_target() {
        let router = Router::new(registry());
        assert!(matches!(
            router.push("/nope").await,
            Err(NavigationError::Route(crate::RouteError::NoMatch(_)))
        ));
    }

    #[tokio::test]
    async fn test_newer_navigation_supersedes_pending_one() {
        let gate = Arc::new(Gate::default());
        let router = Arc::new(Router::new(registry()).before_each(gate.clone()));

        let slow = tokio::spawn({
            let router = router.clone();
            async move { router.push("/orders").await }
        });
        tokio::task::yield_now().await;

        let fast = router.push("/login").await.unwrap();
        gate.0.notify_one();

        assert_eq!(
            slow.await.unwrap(),
            Err(NavigationError::Cancelled("/orders".into()))
        );
        assert_eq!(router.current(), Some(fast.route));
    }
}
