//! Shell assembly.

use std::sync::Arc;

use shop_auth::{MemoryLocation, PageLocation, SessionStore};
use shop_data::{HttpClient, ReqwestTransport, RequestInterceptor, StatusInterceptor, Transport};
use shop_notify::{Clipboard, CopyFeedback, ToastStore};
use shop_router::{
    AuthGuard, Navigation, NavigationError, NavigationTarget, RouteRecord, RouteRegistry, Router,
};

use crate::invalidation::SessionInvalidationHandler;
use crate::routes::{names, storefront_routes};
use crate::{ShellConfig, ShellError};

/// The storefront shell: one HTTP client, one session, one router and one
/// toast slot, wired together.
///
/// Clones are not provided; share a `Shell` behind an `Arc`.
pub struct Shell {
    config: ShellConfig,
    http: HttpClient,
    session: SessionStore,
    router: Router,
    toasts: ToastStore,
    location: Arc<dyn PageLocation>,
}

impl Shell {
    /// Start building a shell from `config`.
    pub fn builder(config: ShellConfig) -> ShellBuilder {
        ShellBuilder {
            config,
            transport: None,
            location: None,
            routes: None,
            request_interceptors: Vec::new(),
        }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// The shared HTTP client. Every request goes through the 401 handler.
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn toasts(&self) -> &ToastStore {
        &self.toasts
    }

    /// Hard-navigation target used by logout and the 401 handler.
    pub fn location(&self) -> &Arc<dyn PageLocation> {
        &self.location
    }

    /// Navigate through the guarded router.
    pub async fn navigate(
        &self,
        target: impl Into<NavigationTarget>,
    ) -> Result<Navigation, NavigationError> {
        self.router.push(target).await
    }

    /// Forget the user and leave through the server-side logout.
    pub fn logout(&self) {
        self.session.logout();
    }

    /// Copy-to-clipboard feedback using the configured reset delay.
    pub fn copy_feedback(&self, clipboard: Arc<dyn Clipboard>) -> CopyFeedback {
        CopyFeedback::with_reset(clipboard, self.config.copy_feedback())
    }
}

/// Builder for [`Shell`].
pub struct ShellBuilder {
    config: ShellConfig,
    transport: Option<Arc<dyn Transport>>,
    location: Option<Arc<dyn PageLocation>>,
    routes: Option<Vec<RouteRecord>>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl ShellBuilder {
    /// Use `transport` instead of a real HTTP stack.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use `location` for hard navigations.
    pub fn location(mut self, location: Arc<dyn PageLocation>) -> Self {
        self.location = Some(location);
        self
    }

    /// Replace the storefront route table.
    pub fn routes(mut self, routes: Vec<RouteRecord>) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Run `interceptor` on every outbound request.
    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> Result<Shell, ShellError> {
        let config = self.config;
        config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config.origin)?),
        };
        let location: Arc<dyn PageLocation> = match self.location {
            Some(location) => location,
            None => Arc::new(MemoryLocation::new()),
        };

        let handler = Arc::new(SessionInvalidationHandler::new(
            location.clone(),
            config.login_path.clone(),
        ));
        let mut http = HttpClient::builder(transport).config(config.client_config());
        for interceptor in self.request_interceptors {
            http = http.request_interceptor(interceptor);
        }
        let http = http
            .response_interceptor(Arc::new(StatusInterceptor::new(handler.clone())))
            .build();

        let session = SessionStore::builder(http.clone(), location.clone())
            .endpoints(config.session_endpoints())
            .single_flight(config.single_flight_user_fetch)
            .build();
        handler.attach(&session);

        let registry = RouteRegistry::new(self.routes.unwrap_or_else(storefront_routes))?;
        let router = Router::new(registry).before_each(Arc::new(
            AuthGuard::new(session.clone()).with_routes(names::LOGIN, names::HOME),
        ));

        let toasts = ToastStore::with_duration(config.toast_duration());

        tracing::info!(
            origin = %config.origin,
            api_base_url = config.api_base_url.as_deref().unwrap_or("same-origin"),
            routes = router.registry().entries().len(),
            "shell ready"
        );

        Ok(Shell {
            config,
            http,
            session,
            router,
            toasts,
            location,
        })
    }
}
