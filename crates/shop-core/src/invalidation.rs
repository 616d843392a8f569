//! Global handling of rejected sessions.

use std::sync::{Arc, OnceLock};

use shop_auth::{PageLocation, SessionStore, WeakSessionStore};
use shop_data::{AuthFailureListener, Request};

/// Reacts to any 401 from any request: forgets the user and reloads the page
/// at the login path.
///
/// This bypasses the router entirely and does not coordinate with a guard
/// that may be evaluating at the same time; whichever redirect happens last
/// decides where the user ends up.
pub struct SessionInvalidationHandler {
    location: Arc<dyn PageLocation>,
    login_path: String,
    session: OnceLock<WeakSessionStore>,
}

impl SessionInvalidationHandler {
    pub fn new(location: Arc<dyn PageLocation>, login_path: impl Into<String>) -> Self {
        Self {
            location,
            login_path: login_path.into(),
            session: OnceLock::new(),
        }
    }

    /// Attach the store to clear. The store is built on top of the client
    /// this handler listens to, so it can only be attached afterwards and is
    /// held weakly.
    pub fn attach(&self, session: &SessionStore) {
        if self.session.set(session.downgrade()).is_err() {
            tracing::warn!("session store already attached");
        }
    }
}

impl AuthFailureListener for SessionInvalidationHandler {
    fn on_unauthorized(&self, request: &Request) {
        tracing::warn!(url = %request.url, "session rejected, reloading at login");
        if let Some(session) = self.session.get().and_then(WeakSessionStore::upgrade) {
            session.clear();
        }
        self.location.assign(&self.login_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_auth::MemoryLocation;
    use shop_data::{HttpClient, Method, MockTransport, Response, StatusInterceptor};

    #[tokio::test]
    async fn test_401_clears_session_and_redirects() {
        let mock = Arc::new(MockTransport::new());
        mock.route(
            Method::Get,
            "/api/user/info",
            Ok(Response::json_body(
                200,
                &serde_json::json!({ "user": { "id": 1 } }),
            )),
        );
        mock.route(Method::Get, "/api/orders", Ok(Response::status_only(401)));

        let location = Arc::new(MemoryLocation::new());
        let handler = Arc::new(SessionInvalidationHandler::new(location.clone(), "/login"));
        let client = HttpClient::builder(mock)
            .response_interceptor(Arc::new(StatusInterceptor::new(handler.clone())))
            .build();
        let session = SessionStore::new(client.clone(), location.clone());
        handler.attach(&session);

        session.fetch_user().await.unwrap();
        let err = client.get("/api/orders").send().await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(!session.is_authenticated());
        assert_eq!(location.visits(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_handler_does_not_keep_session_alive() {
        let mock = Arc::new(MockTransport::new());
        mock.route(Method::Get, "/api/orders", Ok(Response::status_only(401)));

        let location = Arc::new(MemoryLocation::new());
        let handler = Arc::new(SessionInvalidationHandler::new(location.clone(), "/login"));
        let client = HttpClient::builder(mock)
            .response_interceptor(Arc::new(StatusInterceptor::new(handler.clone())))
            .build();
        let session = SessionStore::new(client.clone(), location.clone());
        handler.attach(&session);
        let weak = session.downgrade();

        drop(session);
        assert!(weak.upgrade().is_none());

        // The redirect still happens once the store is gone.
        assert!(client.get("/api/orders").send().await.is_err());
        assert_eq!(location.visits(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_other_statuses_do_not_redirect() {
        let mock = Arc::new(MockTransport::new());
        mock.route(Method::Get, "/api/admin/stats", Ok(Response::status_only(403)));
        mock.route(Method::Get, "/api/boom", Ok(Response::status_only(500)));

        let location = Arc::new(MemoryLocation::new());
        let handler = Arc::new(SessionInvalidationHandler::new(location.clone(), "/login"));
        let client = HttpClient::builder(mock)
            .response_interceptor(Arc::new(StatusInterceptor::new(handler)))
            .build();

        assert!(client.get("/api/admin/stats").send().await.is_err());
        assert!(client.get("/api/boom").send().await.is_err());
        assert!(client.get("/api/unrouted").send().await.is_err());
        assert!(location.visits().is_empty());
    }
}
