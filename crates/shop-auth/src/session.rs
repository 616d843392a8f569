//! Client-side session store.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use shop_data::HttpClient;

use crate::location::PageLocation;
use crate::user::{User, UserInfo};
use crate::AuthError;

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// The loaded user, if any.
    pub user: Option<User>,
    /// A user fetch is in flight.
    pub loading: bool,
}

/// Backend endpoints used by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEndpoints {
    /// Returns `{"user": ...}` for the current session.
    pub user_info: String,
    /// Server-side logout; visited with a full page load.
    pub logout: String,
}

impl Default for SessionEndpoints {
    fn default() -> Self {
        Self {
            user_info: "/api/user/info".to_string(),
            logout: "/auth/logout".to_string(),
        }
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<User, AuthError>>>;

/// The slot only holds a weak handle: once every caller has dropped its
/// future the request is dropped too.
type PendingFetch = WeakShared<BoxFuture<'static, Result<User, AuthError>>>;

struct StoreInner {
    client: HttpClient,
    location: Arc<dyn PageLocation>,
    endpoints: SessionEndpoints,
    state: RwLock<SessionState>,
    single_flight: bool,
    in_flight: Mutex<Option<PendingFetch>>,
}

/// Holds the current user for the lifetime of the shell.
///
/// The user is never persisted: each process starts with no user and
/// loads it lazily through [`fetch_user`](Self::fetch_user). Clones share
/// the same state.
///
/// By default overlapping fetches are independent and the last response to
/// arrive wins. [`SessionStoreBuilder::single_flight`] coalesces them into
/// one request instead.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    /// Create a store with default endpoints.
    pub fn new(client: HttpClient, location: Arc<dyn PageLocation>) -> Self {
        Self::builder(client, location).build()
    }

    pub fn builder(client: HttpClient, location: Arc<dyn PageLocation>) -> SessionStoreBuilder {
        SessionStoreBuilder {
            client,
            location,
            endpoints: SessionEndpoints::default(),
            single_flight: false,
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    /// The loaded user, if any.
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// A user fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    /// A user is loaded.
    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    /// The loaded user is a store administrator.
    pub fn is_admin(&self) -> bool {
        self.read().user.as_ref().is_some_and(|u| u.is_admin)
    }

    /// Load the current user from the backend.
    ///
    /// On success the user is stored and returned. On failure the user is
    /// cleared and the error returned. `loading` is reset either way.
    pub async fn fetch_user(&self) -> Result<User, AuthError> {
        if !self.inner.single_flight {
            return self.fetch_user_once().await;
        }

        let pending = {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref().and_then(WeakShared::upgrade) {
                Some(pending) => {
                    tracing::debug!("joining in-flight user fetch");
                    pending
                }
                None => {
                    let store = self.clone();
                    let pending: SharedFetch = async move {
                        let result = store.fetch_user_once().await;
                        *store
                            .inner
                            .in_flight
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner) = None;
                        result
                    }
                    .boxed()
                    .shared();
                    *slot = pending.downgrade();
                    pending
                }
            }
        };
        pending.await
    }

    async fn fetch_user_once(&self) -> Result<User, AuthError> {
        let loading = LoadingGuard::start(self);
        let result = self
            .inner
            .client
            .get_json::<UserInfo>(&self.inner.endpoints.user_info)
            .await;
        drop(loading);

        let mut state = self.write();
        match result {
            Ok(info) => {
                tracing::debug!(
                    user_id = info.user.id,
                    admin = info.user.is_admin,
                    "user loaded"
                );
                state.user = Some(info.user.clone());
                Ok(info.user)
            }
            Err(error) => {
                tracing::warn!(%error, "user fetch failed, clearing session");
                state.user = None;
                Err(AuthError::SessionFetch(error))
            }
        }
    }

    /// Forget the user without leaving the page.
    pub fn clear(&self) {
        self.write().user = None;
    }

    /// Forget the user and hand the page to the server-side logout.
    pub fn logout(&self) {
        self.write().user = None;
        tracing::info!("logging out");
        self.inner.location.assign(&self.inner.endpoints.logout);
    }

    /// A handle that does not keep the store alive.
    pub fn downgrade(&self) -> WeakSessionStore {
        WeakSessionStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Non-owning reference to a [`SessionStore`].
#[derive(Clone)]
pub struct WeakSessionStore {
    inner: Weak<StoreInner>,
}

impl WeakSessionStore {
    /// The store, if it is still alive.
    pub fn upgrade(&self) -> Option<SessionStore> {
        self.inner.upgrade().map(|inner| SessionStore { inner })
    }
}

/// Sets `loading` for as long as it lives, so a dropped fetch still resets it.
struct LoadingGuard<'a>(&'a SessionStore);

impl<'a> LoadingGuard<'a> {
    fn start(store: &'a SessionStore) -> Self {
        store.write().loading = true;
        Self(store)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.write().loading = false;
    }
}

/// Builder for [`SessionStore`].
pub struct SessionStoreBuilder {
    client: HttpClient,
    location: Arc<dyn PageLocation>,
    endpoints: SessionEndpoints,
    single_flight: bool,
}

impl SessionStoreBuilder {
    /// Override backend endpoints.
    pub fn endpoints(mut self, endpoints: SessionEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Coalesce concurrent [`SessionStore::fetch_user`] calls into a single
    /// request whose result every caller shares.
    pub fn single_flight(mut self, enabled: bool) -> Self {
        self.single_flight = enabled;
        self
    }

    pub fn build(self) -> SessionStore {
        SessionStore {
            inner: Arc::new(StoreInner {
                client: self.client,
                location: self.location,
                endpoints: self.endpoints,
                state: RwLock::new(SessionState::default()),
                single_flight: self.single_flight,
                in_flight: Mutex::new(None),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLocation;
    use std::time::Duration;
    use shop_data::{FetchError, Method, MockTransport, Response};

    const INFO: &str = "/api/user/info";

    fn user_reply(id: u64, is_admin: bool) -> Result<Response, FetchError> {
        let user = serde_json::json!({
            "id": id,
            "username": format!("u{}", id),
            "is_admin": is_admin,
        });
        Ok(Response::json_body(200, &serde_json::json!({ "user": user })))
    }

    fn store_with(
        mock: &Arc<MockTransport>,
        single_flight: bool,
    ) -> (SessionStore, Arc<MemoryLocation>) {
        let client = HttpClient::builder(mock.clone()).build();
        let location = Arc::new(MemoryLocation::new());
        let store = SessionStore::builder(client, location.clone())
            .single_flight(single_flight)
            .build();
        (store, location)
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let (store, _) = store_with(&Arc::new(MockTransport::new()), false);
        assert_eq!(store.snapshot(), SessionState::default());
        assert!(!store.is_authenticated());
        assert!(!store.is_admin());
    }

    #[tokio::test]
    async fn test_fetch_user_success() {
        let mock = Arc::new(MockTransport::new());
        mock.route(Method::Get, INFO, user_reply(3, true));
        let (store, _) = store_with(&mock, false);

        let user = store.fetch_user().await.unwrap();

        assert_eq!(user.id, 3);
        assert!(store.is_authenticated());
        assert!(store.is_admin());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_failure_clears_user_and_surfaces_error() {
        let mock = Arc::new(MockTransport::new());
        mock.enqueue(Method::Get, INFO, user_reply(3, false));
        mock.enqueue(Method::Get, INFO, Ok(Response::status_only(500)));
        let (store, _) = store_with(&mock, false);

        store.fetch_user().await.unwrap();
        let err = store.fetch_user().await.unwrap_err();

        assert!(matches!(err, AuthError::SessionFetch(ref e) if e.status() == Some(500)));
        assert_eq!(store.user(), None);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_loading_while_in_flight() {
        let mock = Arc::new(MockTransport::new());
        let reply = mock.defer(Method::Get, INFO);
        let (store, _) = store_with(&mock, false);

        let task = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_user().await }
        });
        mock.wait_for_calls(1).await;
        assert!(store.is_loading());

        reply.send(user_reply(1, false)).unwrap();
        task.await.unwrap().unwrap();
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_overlapping_fetches_last_response_wins() {
        let mock = Arc::new(MockTransport::new());
        let first_reply = mock.defer(Method::Get, INFO);
        let second_reply = mock.defer(Method::Get, INFO);
        let (store, _) = store_with(&mock, false);

        let first = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_user().await }
        });
        mock.wait_for_calls(1).await;
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_user().await }
        });
        mock.wait_for_calls(2).await;

        // The call issued second answers first.
        second_reply.send(user_reply(2, false)).unwrap();
        second.await.unwrap().unwrap();
        // Its completion already reset `loading`, although the first call
        // is still outstanding.
        assert!(!store.is_loading());
        assert_eq!(store.user().map(|u| u.id), Some(2));

        first_reply.send(user_reply(1, false)).unwrap();
        first.await.unwrap().unwrap();

        assert_eq!(store.user().map(|u| u.id), Some(1));
        assert!(!store.is_loading());
        assert_eq!(mock.call_count(INFO), 2);
    }

    #[tokio::test]
    async fn test_single_flight_coalesces() {
        let mock = Arc::new(MockTransport::new());
        let reply = mock.defer(Method::Get, INFO);
        let (store, _) = store_with(&mock, true);

        let a = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_user().await }
        });
        let b = tokio::spawn({
            let store = store.clone();
            async move { store.fetch_user().await }
        });
        mock.wait_for_calls(1).await;
        tokio::task::yield_now().await;

        reply.send(user_reply(9, true)).unwrap();
        assert_eq!(a.await.unwrap().unwrap().id, 9);
        assert_eq!(b.await.unwrap().unwrap().id, 9);
        assert_eq!(mock.call_count(INFO), 1);

        // A later call issues a fresh request.
        mock.route(Method::Get, INFO, user_reply(10, false));
        assert_eq!(store.fetch_user().await.unwrap().id, 10);
        assert_eq!(mock.call_count(INFO), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_fetch_resets_loading() {
        let mock = Arc::new(MockTransport::new());
        let _reply = mock.defer(Method::Get, INFO);
        let (store, _) = store_with(&mock, false);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), store.fetch_user()).await;

        assert!(timed_out.is_err());
        assert_eq!(mock.call_count(INFO), 1);
        assert!(!store.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_restarts_after_callers_give_up() {
        let mock = Arc::new(MockTransport::new());
        let _stalled = mock.defer(Method::Get, INFO);
        let (store, _) = store_with(&mock, true);

        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), store.fetch_user()).await;
        assert!(timed_out.is_err());
        assert!(!store.is_loading());

        mock.route(Method::Get, INFO, user_reply(4, false));
        assert_eq!(store.fetch_user().await.unwrap().id, 4);
        assert_eq!(mock.call_count(INFO), 2);
    }

    #[tokio::test]
    async fn test_weak_handle_does_not_keep_store_alive() {
        let (store, _) = store_with(&Arc::new(MockTransport::new()), false);
        let weak = store.downgrade();
        assert!(weak.upgrade().is_some());

        drop(store);
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_then_navigates() {
        let mock = Arc::new(MockTransport::new());
        mock.route(Method::Get, INFO, user_reply(3, false));
        let (store, location) = store_with(&mock, false);
        store.fetch_user().await.unwrap();

        store.logout();

        assert!(!store.is_authenticated());
        assert_eq!(location.visits(), vec!["/auth/logout"]);
    }
}
