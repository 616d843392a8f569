//! Transports: the seam between the client pipeline and the network.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::{oneshot, Notify};

use crate::{FetchError, Method, Request, Response};

/// Sends a single request and returns the raw response.
///
/// Transports report every HTTP status as `Ok`; status classification is the
/// client's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, FetchError>;
}

/// Network transport backed by `reqwest`.
///
/// Requests with [`Request::with_credentials`] go through a client with a
/// cookie jar, so session cookies set by the backend travel on every later
/// credentialed request. Other requests use a client without one.
pub struct ReqwestTransport {
    credentialed: reqwest::Client,
    anonymous: reqwest::Client,
    origin: reqwest::Url,
}

impl ReqwestTransport {
    /// Create a transport resolving relative URLs against `origin`.
    pub fn new(origin: &str) -> Result<Self, FetchError> {
        let origin =
            reqwest::Url::parse(origin).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            credentialed: build_client(true)?,
            anonymous: build_client(false)?,
            origin,
        })
    }

    fn client_for(&self, with_credentials: bool) -> &reqwest::Client {
        if with_credentials {
            &self.credentialed
        } else {
            &self.anonymous
        }
    }

    fn resolve(&self, url: &str) -> Result<reqwest::Url, FetchError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            reqwest::Url::parse(url)
        } else {
            self.origin.join(url)
        }
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        };
        let url = self.resolve(&request.url)?;
        let timeout_ms = request.timeout.as_millis() as u64;

        let mut builder = self
            .client_for(request.with_credentials)
            .request(method, url)
            .timeout(request.timeout);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(timeout_ms)
            } else {
                FetchError::RequestError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::RequestError(e.to_string()))?
            .to_vec();

        Ok(Response::new(status, headers, body))
    }
}

fn build_client(cookie_store: bool) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .cookie_store(cookie_store)
        .build()
        .map_err(|e| FetchError::RequestError(e.to_string()))
}

type Reply = Result<Response, FetchError>;

enum MockReply {
    Ready(Reply),
    Deferred(oneshot::Receiver<Reply>),
}

/// In-memory scripted transport.
///
/// Replies are looked up by method and URL: queued one-shot replies first,
/// then the standing reply for the route, then a bare 404. Deferred replies
/// stay pending until the test sends on the returned channel, which makes
/// response ordering fully controllable.
#[derive(Default)]
pub struct MockTransport {
    queued: Mutex<HashMap<(Method, String), VecDeque<MockReply>>>,
    standing: Mutex<HashMap<(Method, String), Reply>>,
    calls: Mutex<Vec<Request>>,
    called: Notify,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `url` with `reply`.
    pub fn route(&self, method: Method, url: impl Into<String>, reply: Reply) {
        lock(&self.standing).insert((method, url.into()), reply);
    }

    /// Answer the next call to `url` with `reply`.
    pub fn enqueue(&self, method: Method, url: impl Into<String>, reply: Reply) {
        lock(&self.queued)
            .entry((method, url.into()))
            .or_default()
            .push_back(MockReply::Ready(reply));
    }

    /// Hold the next call to `url` open until a reply is sent on the channel.
    pub fn defer(&self, method: Method, url: impl Into<String>) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        lock(&self.queued)
            .entry((method, url.into()))
            .or_default()
            .push_back(MockReply::Deferred(rx));
        tx
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<Request> {
        lock(&self.calls).clone()
    }

    /// Number of requests received for `url`.
    pub fn call_count(&self, url: &str) -> usize {
        lock(&self.calls).iter().filter(|r| r.url == url).count()
    }

    /// Wait until at least `n` requests have arrived in total.
    pub async fn wait_for_calls(&self, n: usize) {
        loop {
            let notified = self.called.notified();
            if lock(&self.calls).len() >= n {
                return;
            }
            notified.await;
        }
    }

    fn next_reply(&self, key: &(Method, String)) -> MockReply {
        if let Some(reply) = lock(&self.queued).get_mut(key).and_then(VecDeque::pop_front) {
            return reply;
        }
        let standing = lock(&self.standing).get(key).cloned();
        MockReply::Ready(standing.unwrap_or_else(|| Ok(Response::status_only(404))))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let key = (request.method, request.url.clone());
        lock(&self.calls).push(request);
        self.called.notify_waiters();

        match self.next_reply(&key) {
            MockReply::Ready(reply) => reply,
            MockReply::Deferred(rx) => rx.await.unwrap_or_else(|_| {
                Err(FetchError::RequestError("mock reply dropped".into()))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn get(url: &str) -> Request {
        Request {
            method: Method::Get,
            url: url.to_string(),
            headers: HashMap::new(),
            body: None,
            with_credentials: true,
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_queued_before_standing() {
        let mock = MockTransport::new();
        mock.route(Method::Get, "/a", Ok(Response::status_only(200)));
        mock.enqueue(Method::Get, "/a", Ok(Response::status_only(500)));

        assert_eq!(mock.send(get("/a")).await.unwrap().status, 500);
        assert_eq!(mock.send(get("/a")).await.unwrap().status, 200);
        assert_eq!(mock.send(get("/a")).await.unwrap().status, 200);
        assert_eq!(mock.call_count("/a"), 3);
    }

    #[tokio::test]
    async fn test_unrouted_is_404() {
        let mock = MockTransport::new();
        assert_eq!(mock.send(get("/nowhere")).await.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_deferred_reply() {
        let mock = std::sync::Arc::new(MockTransport::new());
        let tx = mock.defer(Method::Get, "/slow");

        let pending = tokio::spawn({
            let mock = mock.clone();
            async move { mock.send(get("/slow")).await }
        });
        mock.wait_for_calls(1).await;
        tx.send(Ok(Response::status_only(204))).unwrap();

        assert_eq!(pending.await.unwrap().unwrap().status, 204);
    }

    #[test]
    fn test_reqwest_transport_resolves_relative_urls() {
        let transport = ReqwestTransport::new("https://shop.example.com").unwrap();
        assert_eq!(
            transport.resolve("/api/user/info").unwrap().as_str(),
            "https://shop.example.com/api/user/info"
        );
        assert_eq!(
            transport.resolve("http://other.test/x").unwrap().as_str(),
            "http://other.test/x"
        );
    }

    #[test]
    fn test_reqwest_transport_rejects_bad_origin() {
        assert!(matches!(
            ReqwestTransport::new("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_reqwest_transport_picks_client_per_request() {
        let transport = ReqwestTransport::new("https://shop.example.com").unwrap();
        assert!(std::ptr::eq(transport.client_for(true), &transport.credentialed));
        assert!(std::ptr::eq(transport.client_for(false), &transport.anonymous));
    }
}
