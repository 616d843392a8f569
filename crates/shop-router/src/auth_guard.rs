//! Authentication gate for protected routes.

use async_trait::async_trait;
use shop_auth::{AuthError, SessionStore};

use crate::{GuardDecision, NavigationGuard, NavigationTarget, ResolvedRoute};

/// Outcome of the authentication gate for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    Allowed,
    /// No usable session. `redirect` is the full path originally requested.
    DeniedToLogin { redirect: String },
    /// Signed in, but the target is admin-only.
    DeniedToHome,
}

/// Guard consulting the [`SessionStore`] before protected navigations.
///
/// Authorization is re-derived from the store on every navigation; nothing
/// is cached between calls.
pub struct AuthGuard {
    session: SessionStore,
    login_route: String,
    home_route: String,
}

impl AuthGuard {
    pub fn new(session: SessionStore) -> Self {
        Self {
            session,
            login_route: "Login".to_string(),
            home_route: "Home".to_string(),
        }
    }

    /// Override the route names used for redirects.
    pub fn with_routes(mut self, login: impl Into<String>, home: impl Into<String>) -> Self {
        self.login_route = login.into();
        self.home_route = home.into();
        self
    }

    /// Check the session against `to`'s access flags.
    ///
    /// Fetches the user at most once, and only when the target is protected
    /// and no user is loaded yet. A failed fetch is returned as
    /// [`AuthError::SessionFetch`]; a loaded non-admin user asking for an
    /// admin route gets [`AuthError::InsufficientPermissions`].
    pub async fn authorize(&self, to: &ResolvedRoute) -> Result<(), AuthError> {
        if !to.meta.is_protected() {
            return Ok(());
        }

        if self.session.user().is_none() {
            self.session.fetch_user().await?;
        }

        if to.meta.requires_admin() && !self.session.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(())
    }

    /// Decide whether `to` may be entered.
    pub async fn evaluate(&self, to: &ResolvedRoute) -> AuthDecision {
        match self.authorize(to).await {
            Ok(()) => AuthDecision::Allowed,
            Err(error) if error.is_auth_failure() => {
                tracing::debug!(to = %to.full_path(), %error, "no session, sending to login");
                AuthDecision::DeniedToLogin {
                    redirect: to.full_path(),
                }
            }
            Err(error) => {
                tracing::debug!(to = %to.full_path(), %error, "admin route denied");
                AuthDecision::DeniedToHome
            }
        }
    }
}

#[async_trait]
impl NavigationGuard for AuthGuard {
    async fn before_each(
        &self,
        to: &ResolvedRoute,
        _from: Option<&ResolvedRoute>,
    ) -> GuardDecision {
        match self.evaluate(to).await {
            AuthDecision::Allowed => GuardDecision::Allow,
            AuthDecision::DeniedToLogin { redirect } => GuardDecision::Redirect(
                NavigationTarget::named(&self.login_route).with_query("redirect", redirect),
            ),
            AuthDecision::DeniedToHome => {
                GuardDecision::Redirect(NavigationTarget::named(&self.home_route))
            }
        }
    }
}
